//! crossx-deploy - Cross-chain deterministic contract deployment.
//!
//! This crate implements the deployment protocol behind crossx: publish a
//! compiled artifact to content-addressed storage, predict the salt-derived
//! address the factory will produce on every destination chain, aggregate
//! per-destination relay fees into one origin transaction, and track that
//! transaction to confirmation.

mod abi;
mod artifact;
mod config;
mod error;
mod fees;
mod orchestrator;
mod predict;
mod publish;
pub mod rpc;
mod session;
mod signer;

pub use artifact::{CompiledArtifact, locate_latest};
pub use config::{
    CROSSX_CONF_FILENAME, ChainEntry, CrossxConfig, DEFAULT_FACTORY_ADDRESS,
    DEFAULT_RELAY_FEE_WEI, StorageConfig,
};
pub use error::DeployError;
pub use fees::{DomainEntry, DomainTable, FeeBundle};
pub use orchestrator::{Orchestrator, build_deploy_transaction};
pub use predict::{Predictor, RpcPredictor, create2_address, parse_salt, salt_word};
pub use publish::{ContentId, StorageClient, deployment_link};
pub use session::{
    DeploySession, DeploymentIntent, DeploymentTransaction, PredictionTicket, SessionState,
    SubmissionTicket, TxHash, TxStatus,
};
pub use signer::{RpcSigner, Signer, TransactionRequest};
