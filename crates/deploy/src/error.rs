//! The error taxonomy of the deployment flow.
//!
//! Every fallible operation in this crate returns a [`DeployError`] kind
//! the caller can match on; transport details are flattened into the
//! message of the relevant kind. Kinds are `Clone + PartialEq` so terminal
//! session states can store the failure that produced them.

/// Errors surfaced by the deployment flow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeployError {
    /// Malformed caller input (salt, bytecode, addresses, state misuse).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A selected destination is not in the configured domain table.
    #[error("unknown destination chain: {0}")]
    UnknownDestination(String),
    /// The destination selection was empty.
    #[error("no destination chains selected")]
    NoDestinationsSelected,
    /// Summing per-destination fees overflowed.
    #[error("fee aggregation overflowed")]
    FeeOverflow,
    /// No usable compiled artifact at the given location.
    #[error("artifact not found: {0}")]
    ArtifactNotFound(String),
    /// The storage upload failed; publishing is single best-effort.
    #[error("publish failed: {0}")]
    Publish(String),
    /// The address prediction call failed.
    #[error("address prediction failed: {0}")]
    Prediction(String),
    /// The signer declined or the node rejected the origin transaction.
    #[error("submission rejected: {0}")]
    SubmissionRejected(String),
    /// The origin transaction was accepted but did not confirm in time.
    #[error("origin transaction not confirmed within {0}s")]
    ConfirmationTimeout(u64),
    /// A deployment is already Submitting or Pending on this session.
    #[error("a deployment is already in flight")]
    DeploymentInFlight,
    /// Submission was requested before an address prediction completed.
    #[error("no predicted address for this deployment intent")]
    AddressNotReady,
    /// The session moved on while this operation was in progress.
    #[error("the session changed since this operation started")]
    StaleSession,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_input() {
        assert_eq!(
            DeployError::UnknownDestination("moonriver".to_string()).to_string(),
            "unknown destination chain: moonriver"
        );
        assert_eq!(
            DeployError::NoDestinationsSelected.to_string(),
            "no destination chains selected"
        );
        assert_eq!(
            DeployError::ConfirmationTimeout(120).to_string(),
            "origin transaction not confirmed within 120s"
        );
    }
}
