//! The deployment orchestrator: drives one session through prediction,
//! fee aggregation, origin-transaction submission and confirmation.
//!
//! The orchestrator owns the session exclusively, so the happens-before
//! edges of the flow (predicted address before intent, intent before
//! submission) fall out of the sequential `await`s here, while the ticket
//! checks inside [`DeploySession`] keep externally driven sessions safe.

use std::time::Duration;

use alloy_core::primitives::{Address, Bytes, U256};

use crate::{
    abi,
    error::DeployError,
    fees::DomainTable,
    predict::{Predictor, salt_word},
    session::{DeploySession, DeploymentIntent, SessionState, TxHash},
    signer::{Signer, TransactionRequest},
};

/// Interval between receipt checks when waiting for confirmation.
const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// One deployment flow: a session plus the capabilities that drive it.
pub struct Orchestrator<P, S> {
    session: DeploySession,
    predictor: P,
    signer: S,
    table: DomainTable,
    factory: Address,
    bytecode: Bytes,
}

impl<P: Predictor, S: Signer> Orchestrator<P, S> {
    pub fn new(
        predictor: P,
        signer: S,
        table: DomainTable,
        factory: Address,
        bytecode: Bytes,
    ) -> Self {
        Self {
            session: DeploySession::new(),
            predictor,
            signer,
            table,
            factory,
            bytecode,
        }
    }

    pub fn session(&self) -> &DeploySession {
        &self.session
    }

    /// Abandon the current attempt and return the session to `Idle`.
    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// Predict the deployment address for `salt`.
    ///
    /// `Idle/AddressReady → AddressPending → AddressReady`, or `Failed` on
    /// a predictor error. Re-running with a different salt discards the
    /// previous prediction.
    pub async fn request_address(&mut self, salt: U256) -> Result<Address, DeployError> {
        let ticket = self.session.begin_prediction(salt, &self.bytecode)?;
        let result = self.predictor.predict(salt, &self.bytecode).await;
        match self.session.apply_prediction(ticket, result)? {
            Some(address) => Ok(address),
            // Unreachable while this orchestrator owns the session, but a
            // superseded result must never be reported as the current one.
            None => Err(DeployError::StaleSession),
        }
    }

    /// Aggregate fees for `destinations`, submit the origin transaction and
    /// move the session to `Pending`.
    ///
    /// Requires a ready address; rejected while an earlier deployment is
    /// still in flight.
    pub async fn deploy(&mut self, destinations: &[String]) -> Result<TxHash, DeployError> {
        let (ticket, intent) =
            self.session
                .begin_submission(&self.bytecode, destinations, &self.table)?;
        let tx = build_deploy_transaction(self.factory, &intent);
        let result = self.signer.send(tx).await;
        match self.session.apply_submission(ticket, result)? {
            Some(tx_hash) => Ok(tx_hash),
            None => Err(DeployError::StaleSession),
        }
    }

    /// Check once whether the origin transaction is confirmed, moving
    /// `Pending → Succeeded` when it is.
    ///
    /// Destination-chain delivery is the relay network's concern and is not
    /// tracked here; only the origin leg is confirmed.
    pub async fn check_confirmation(&mut self) -> Result<bool, DeployError> {
        if *self.session.state() == SessionState::Succeeded {
            return Ok(true);
        }
        let Some(tx_hash) = self.session.pending_tx_hash() else {
            return Err(DeployError::InvalidInput(
                "no deployment is pending confirmation".to_string(),
            ));
        };

        if self.signer.confirmed(tx_hash).await? {
            self.session.confirm();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Poll the origin chain until the transaction confirms or `timeout`
    /// elapses.
    pub async fn wait_confirmed(&mut self, timeout: Duration) -> Result<(), DeployError> {
        let started = std::time::Instant::now();
        loop {
            if self.check_confirmation().await? {
                return Ok(());
            }
            if started.elapsed() > timeout {
                return Err(DeployError::ConfirmationTimeout(timeout.as_secs()));
            }
            tokio::time::sleep(CONFIRMATION_POLL_INTERVAL).await;
        }
    }
}

/// Build the `xDeployer` origin transaction for a deployment intent.
///
/// `xDeployer(address,uint256[],bytes,bytes,uint256[],bool,bytes,uint256)`,
/// payable with the aggregated fee total. The refund address is the factory
/// itself and no initializer call is attached.
pub fn build_deploy_transaction(factory: Address, intent: &DeploymentIntent) -> TransactionRequest {
    let domains: Vec<U256> = intent.bundle.domains.iter().map(|d| U256::from(*d)).collect();
    let data = abi::encode_call(
        "xDeployer(address,uint256[],bytes,bytes,uint256[],bool,bytes,uint256)",
        &[
            abi::Token::Address(factory),
            abi::Token::UintArray(domains),
            abi::Token::Bytes(salt_word(intent.salt).to_vec()),
            abi::Token::Bytes(intent.bytecode.to_vec()),
            abi::Token::UintArray(intent.bundle.fees.clone()),
            abi::Token::Bool(false),
            abi::Token::Bytes(Vec::new()),
            abi::Token::Uint(intent.bundle.total),
        ],
    );

    TransactionRequest {
        to: factory,
        data,
        value: intent.bundle.total,
    }
}
