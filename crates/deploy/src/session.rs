//! The deployment session state machine.
//!
//! One [`DeploySession`] value owns the whole mutable state of a deployment
//! flow: the chosen salt, the predicted address and the submission status.
//! It is driven only by explicit caller actions (request address, request
//! deploy, confirm), never by background timers.
//!
//! States: `Idle → AddressPending → AddressReady → Submitting → Pending →
//! Succeeded | Failed`.
//!
//! The async legs (prediction, submission) are split into a `begin_*` call
//! that returns an epoch-tagged ticket and an `apply_*` call that accepts
//! the result. A result whose ticket no longer matches the session epoch is
//! discarded rather than applied to superseded state, which is what makes
//! salt changes and session resets safe while a network call is in flight.

use alloy_core::primitives::{Address, B256, Bytes, U256};

use crate::{
    error::DeployError,
    fees::{DomainTable, FeeBundle},
};

/// Hash of the origin-chain transaction.
pub type TxHash = B256;

/// Everything the origin transaction commits to, built fresh per attempt.
///
/// Immutable once submitted; a changed salt or destination set always goes
/// through a new intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentIntent {
    pub salt: U256,
    pub bytecode: Bytes,
    pub bundle: FeeBundle,
}

/// Origin-transaction status, owned solely by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    /// Accepted by the origin chain, cross-chain delivery in progress.
    Pending,
    /// Origin transaction confirmed.
    Succeeded,
}

/// The submitted deployment, from origin acceptance to terminal status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTransaction {
    pub tx_hash: TxHash,
    pub intent: DeploymentIntent,
    pub status: TxStatus,
}

/// Where the deployment flow currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No salt chosen.
    Idle,
    /// Address prediction in flight for this salt.
    AddressPending { salt: U256 },
    /// Predicted address available for the current (salt, bytecode) pair.
    AddressReady { salt: U256, address: Address },
    /// Intent built, origin transaction with the signer.
    Submitting { intent: DeploymentIntent },
    /// Origin transaction accepted; cross-chain completion unconfirmed.
    Pending,
    /// Origin transaction confirmed. Terminal.
    Succeeded,
    /// A step failed before or during submission. Terminal.
    Failed { error: DeployError },
}

/// Ticket tying an in-flight prediction to the session epoch that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionTicket {
    epoch: u64,
}

/// Ticket tying an in-flight submission to the session epoch that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket {
    epoch: u64,
}

/// Session-owned deployment state. One logical flow per session; a second
/// deploy request while one is in flight is rejected, not queued.
#[derive(Debug)]
pub struct DeploySession {
    state: SessionState,
    epoch: u64,
    transaction: Option<DeploymentTransaction>,
}

impl Default for DeploySession {
    fn default() -> Self {
        Self::new()
    }
}

impl DeploySession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            epoch: 0,
            transaction: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The submitted transaction, if the flow reached `Pending`.
    pub fn transaction(&self) -> Option<&DeploymentTransaction> {
        self.transaction.as_ref()
    }

    /// The origin tx hash while the deployment is pending confirmation.
    pub fn pending_tx_hash(&self) -> Option<TxHash> {
        match self.state {
            SessionState::Pending => self.transaction.as_ref().map(|tx| tx.tx_hash),
            _ => None,
        }
    }

    /// Start an address prediction for `salt`.
    ///
    /// Allowed from `Idle`, `AddressPending` and `AddressReady`; starting a
    /// prediction for a new salt supersedes any earlier one (its ticket goes
    /// stale). Rejected while a deployment is in flight, and from terminal
    /// states until [`reset`](Self::reset).
    pub fn begin_prediction(
        &mut self,
        salt: U256,
        bytecode: &Bytes,
    ) -> Result<PredictionTicket, DeployError> {
        match self.state {
            SessionState::Submitting { .. } | SessionState::Pending => {
                return Err(DeployError::DeploymentInFlight);
            }
            SessionState::Succeeded | SessionState::Failed { .. } => {
                return Err(DeployError::InvalidInput(
                    "session is terminal; reset before starting a new deployment".to_string(),
                ));
            }
            SessionState::Idle
            | SessionState::AddressPending { .. }
            | SessionState::AddressReady { .. } => {}
        }

        if bytecode.is_empty() {
            let error = DeployError::InvalidInput("bytecode must not be empty".to_string());
            self.state = SessionState::Failed {
                error: error.clone(),
            };
            return Err(error);
        }

        self.epoch += 1;
        self.state = SessionState::AddressPending { salt };
        tracing::debug!(%salt, epoch = self.epoch, "Address prediction started");
        Ok(PredictionTicket { epoch: self.epoch })
    }

    /// Apply the outcome of a prediction started with `ticket`.
    ///
    /// Returns `Ok(None)` when the result was stale (superseded salt or
    /// reset session) and was discarded without touching the current state.
    pub fn apply_prediction(
        &mut self,
        ticket: PredictionTicket,
        result: Result<Address, DeployError>,
    ) -> Result<Option<Address>, DeployError> {
        if ticket.epoch != self.epoch {
            tracing::debug!(
                ticket_epoch = ticket.epoch,
                session_epoch = self.epoch,
                "Discarding stale prediction result"
            );
            return Ok(None);
        }
        let SessionState::AddressPending { salt } = &self.state else {
            return Ok(None);
        };
        let salt = *salt;

        match result {
            Ok(address) => {
                tracing::info!(%salt, %address, "Predicted deployment address");
                self.state = SessionState::AddressReady { salt, address };
                Ok(Some(address))
            }
            Err(error) => {
                tracing::warn!(%salt, %error, "Address prediction failed");
                self.state = SessionState::Failed {
                    error: error.clone(),
                };
                Err(error)
            }
        }
    }

    /// Aggregate fees for `destinations`, build the deployment intent and
    /// move to `Submitting`.
    ///
    /// Requires a ready address. Rejected without a state change while a
    /// deployment is already in flight; aggregation failures are terminal.
    pub fn begin_submission(
        &mut self,
        bytecode: &Bytes,
        destinations: &[String],
        table: &DomainTable,
    ) -> Result<(SubmissionTicket, DeploymentIntent), DeployError> {
        let salt = match &self.state {
            SessionState::Submitting { .. } | SessionState::Pending => {
                return Err(DeployError::DeploymentInFlight);
            }
            SessionState::AddressReady { salt, .. } => *salt,
            _ => return Err(DeployError::AddressNotReady),
        };

        let bundle = match table.aggregate(destinations) {
            Ok(bundle) => bundle,
            Err(error) => {
                tracing::warn!(%error, "Fee aggregation failed");
                self.state = SessionState::Failed {
                    error: error.clone(),
                };
                return Err(error);
            }
        };

        let intent = DeploymentIntent {
            salt,
            bytecode: bytecode.clone(),
            bundle,
        };

        self.epoch += 1;
        self.state = SessionState::Submitting {
            intent: intent.clone(),
        };
        tracing::info!(
            %salt,
            destinations = ?intent.bundle.chains,
            total_fee = %intent.bundle.total,
            "Submitting deployment intent"
        );
        Ok((SubmissionTicket { epoch: self.epoch }, intent))
    }

    /// Apply the signer's outcome for a submission started with `ticket`.
    ///
    /// Stale results are discarded (`Ok(None)`); a previously succeeded
    /// transaction is never overwritten by a late failure.
    pub fn apply_submission(
        &mut self,
        ticket: SubmissionTicket,
        result: Result<TxHash, DeployError>,
    ) -> Result<Option<TxHash>, DeployError> {
        if ticket.epoch != self.epoch {
            tracing::debug!(
                ticket_epoch = ticket.epoch,
                session_epoch = self.epoch,
                "Discarding stale submission result"
            );
            return Ok(None);
        }
        let SessionState::Submitting { intent } = &self.state else {
            return Ok(None);
        };

        match result {
            Ok(tx_hash) => {
                tracing::info!(%tx_hash, "Origin transaction accepted");
                self.transaction = Some(DeploymentTransaction {
                    tx_hash,
                    intent: intent.clone(),
                    status: TxStatus::Pending,
                });
                self.state = SessionState::Pending;
                Ok(Some(tx_hash))
            }
            Err(error) => {
                tracing::warn!(%error, "Origin transaction submission failed");
                self.state = SessionState::Failed {
                    error: error.clone(),
                };
                Err(error)
            }
        }
    }

    /// Record that the origin transaction is confirmed: `Pending → Succeeded`.
    pub fn confirm(&mut self) {
        if self.state == SessionState::Pending {
            if let Some(tx) = self.transaction.as_mut() {
                tx.status = TxStatus::Succeeded;
            }
            self.state = SessionState::Succeeded;
            tracing::info!("Deployment succeeded on the origin chain");
        }
    }

    /// Return to `Idle`, invalidating any in-flight call result.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.state = SessionState::Idle;
        self.transaction = None;
    }
}
