//! End-to-end tests for the crossx deployment flow, driven entirely
//! through the public API with in-process predictor/signer capabilities.
//! No network or node is required.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use alloy_core::primitives::{Address, Bytes, U256};
use crossx_deploy::{
    CompiledArtifact, ContentId, CrossxConfig, DeployError, DomainEntry, DomainTable,
    Orchestrator, Predictor, SessionState, Signer, TransactionRequest, TxHash,
    create2_address, deployment_link, locate_latest, parse_salt,
};
use tempdir::TempDir;

/// Predictor that derives the address locally, exactly as the factory's
/// read-only call would.
struct FactoryPredictor {
    factory: Address,
}

impl Predictor for FactoryPredictor {
    async fn predict(&self, salt: U256, bytecode: &Bytes) -> Result<Address, DeployError> {
        Ok(create2_address(self.factory, salt, bytecode))
    }
}

/// Signer that counts submissions through a shared handle.
struct RecordingSigner {
    reject: bool,
    sends: Arc<AtomicUsize>,
}

impl RecordingSigner {
    fn new(reject: bool) -> (Self, Arc<AtomicUsize>) {
        let sends = Arc::new(AtomicUsize::new(0));
        (
            Self {
                reject,
                sends: sends.clone(),
            },
            sends,
        )
    }
}

impl Signer for RecordingSigner {
    async fn send(&self, tx: TransactionRequest) -> Result<TxHash, DeployError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        if self.reject {
            return Err(DeployError::SubmissionRejected("declined".to_string()));
        }
        assert!(!tx.data.is_empty());
        Ok(TxHash::with_last_byte(0x42))
    }

    async fn confirmed(&self, _tx_hash: TxHash) -> Result<bool, DeployError> {
        Ok(true)
    }
}

fn factory() -> Address {
    "0x4e59b44847b379578588920cA78FbF26c0B4956C"
        .parse()
        .unwrap()
}

fn table() -> DomainTable {
    let fee = U256::from(10_000_000_000_000_000u64); // 0.01 ether
    DomainTable::new(vec![
        DomainEntry {
            name: "chain-x".to_string(),
            domain: 1,
            fee,
        },
        DomainEntry {
            name: "chain-y".to_string(),
            domain: 2,
            fee,
        },
    ])
}

fn orchestrator(signer: RecordingSigner) -> Orchestrator<FactoryPredictor, RecordingSigner> {
    Orchestrator::new(
        FactoryPredictor { factory: factory() },
        signer,
        table(),
        factory(),
        Bytes::from(vec![0xAA, 0xBB]),
    )
}

fn select(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn deploy_to_two_chains_from_salt_string() {
    let salt = parse_salt("42").unwrap();
    let (signer, _sends) = RecordingSigner::new(false);
    let mut orch = orchestrator(signer);

    let predicted = orch.request_address(salt).await.unwrap();
    // Prediction is deterministic across independent invocations.
    assert_eq!(predicted, orch.request_address(salt).await.unwrap());

    let tx_hash = orch
        .deploy(&select(&["chain-x", "chain-y"]))
        .await
        .unwrap();

    let tx = orch.session().transaction().unwrap();
    assert_eq!(tx.tx_hash, tx_hash);
    assert_eq!(tx.intent.bundle.domains, vec![1, 2]);
    assert_eq!(
        tx.intent.bundle.fees,
        vec![
            U256::from(10_000_000_000_000_000u64),
            U256::from(10_000_000_000_000_000u64)
        ]
    );
    assert_eq!(
        tx.intent.bundle.total,
        U256::from(20_000_000_000_000_000u64)
    );

    assert!(orch.check_confirmation().await.unwrap());
    assert_eq!(*orch.session().state(), SessionState::Succeeded);
}

#[tokio::test]
async fn empty_selection_fails_without_touching_the_signer() {
    let (signer, sends) = RecordingSigner::new(false);
    let mut orch = orchestrator(signer);
    orch.request_address(parse_salt("42").unwrap())
        .await
        .unwrap();

    let err = orch.deploy(&[]).await.unwrap_err();
    assert_eq!(err, DeployError::NoDestinationsSelected);
    assert!(matches!(
        orch.session().state(),
        SessionState::Failed { .. }
    ));
    assert_eq!(sends.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn signer_rejection_requires_a_fresh_intent() {
    let (signer, sends) = RecordingSigner::new(true);
    let mut orch = orchestrator(signer);
    orch.request_address(parse_salt("42").unwrap())
        .await
        .unwrap();

    let err = orch.deploy(&select(&["chain-x"])).await.unwrap_err();
    assert!(matches!(err, DeployError::SubmissionRejected(_)));
    assert_eq!(sends.load(Ordering::SeqCst), 1);

    // Terminal until reset.
    assert!(orch
        .request_address(parse_salt("42").unwrap())
        .await
        .is_err());
    orch.reset();
    assert_eq!(*orch.session().state(), SessionState::Idle);
}

#[tokio::test]
async fn reentrancy_guard_blocks_second_deploy_while_pending() {
    let (signer, sends) = RecordingSigner::new(false);
    let mut orch = orchestrator(signer);
    orch.request_address(parse_salt("42").unwrap())
        .await
        .unwrap();
    orch.deploy(&select(&["chain-x"])).await.unwrap();

    let err = orch.deploy(&select(&["chain-y"])).await.unwrap_err();
    assert_eq!(err, DeployError::DeploymentInFlight);
    assert_eq!(sends.load(Ordering::SeqCst), 1);
    assert_eq!(*orch.session().state(), SessionState::Pending);
}

#[test]
fn artifact_to_link_pipeline_offline_legs() {
    let tmp = TempDir::new("crossx-flow").unwrap();
    let build = tmp.path().join("artifacts/contracts/Token.sol");
    std::fs::create_dir_all(&build).unwrap();
    let artifact = serde_json::json!({
        "contractName": "Token",
        "abi": [{"type": "constructor", "inputs": []}],
        "bytecode": "0xaabb",
    });
    std::fs::write(build.join("Token.json"), artifact.to_string()).unwrap();

    let located: CompiledArtifact = locate_latest(&tmp.path().join("artifacts")).unwrap();
    assert_eq!(located.name, "Token");
    assert_eq!(located.bytecode, Bytes::from(vec![0xAA, 0xBB]));

    // The publisher is an external network capability; the link format is
    // what the pipeline guarantees.
    let config = CrossxConfig::default();
    let cid = ContentId::new("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG").unwrap();
    let link = deployment_link(&config.link_host, &cid).unwrap();
    assert_eq!(
        link.as_str(),
        "https://crossx.vercel.app/deploy/QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG"
    );
}
