//! crossx is a CLI to compile a contract once and deploy the same bytecode
//! to many chains at one deterministic address, paying per-destination
//! relay fees from a single origin transaction.

mod cli;

use std::path::{Path, PathBuf};
use std::time::Duration;

use alloy_core::primitives::Address;
use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Commands};
use crossx_deploy::{
    CROSSX_CONF_FILENAME, CompiledArtifact, CrossxConfig, Orchestrator, RpcPredictor, RpcSigner,
    StorageClient, deployment_link, locate_latest, parse_salt, rpc,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Init { dir, force } => init(&config, &dir, force),
        Commands::Ship {
            project_dir,
            compile_cmd,
            skip_compile,
        } => ship(&config, &project_dir, &compile_cmd, skip_compile).await,
        Commands::Predict {
            salt,
            artifact,
            project_dir,
        } => predict(&config, &salt, artifact.as_deref(), &project_dir).await,
        Commands::Deploy {
            salt,
            chains,
            from,
            wait,
            wait_timeout,
            artifact,
            project_dir,
        } => {
            deploy(
                &config,
                &salt,
                &chains,
                from.as_deref(),
                wait,
                wait_timeout,
                artifact.as_deref(),
                &project_dir,
            )
            .await
        }
        Commands::Chains => chains(&config),
    }
}

/// Load the configuration: explicit path, `./Crossx.toml` when present,
/// otherwise the built-in defaults.
fn load_config(path: Option<&Path>) -> Result<CrossxConfig> {
    if let Some(path) = path {
        return CrossxConfig::load_from_file(path);
    }
    let local = PathBuf::from(CROSSX_CONF_FILENAME);
    if local.exists() {
        return CrossxConfig::load_from_file(&local);
    }
    let config = CrossxConfig::default();
    config.validate()?;
    Ok(config)
}

fn init(config: &CrossxConfig, dir: &Path, force: bool) -> Result<()> {
    let path = dir.join(CROSSX_CONF_FILENAME);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists, pass --force to overwrite",
            path.display()
        );
    }
    config.save_to_file(&path)?;
    println!("{}", path.display());
    Ok(())
}

/// The artifact pipeline: compile, locate the newest artifact, publish it
/// and print the shareable deployment link.
async fn ship(
    config: &CrossxConfig,
    project_dir: &Path,
    compile_cmd: &str,
    skip_compile: bool,
) -> Result<()> {
    if !skip_compile {
        tracing::info!(cmd = %compile_cmd, "Compiling contracts...");
        let status = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(compile_cmd)
            .current_dir(project_dir)
            .status()
            .await
            .with_context(|| format!("Failed to run compiler command: {compile_cmd}"))?;
        if !status.success() {
            anyhow::bail!("Compiler command failed with {status}");
        }
    }

    let artifact = locate_latest(&project_dir.join("artifacts"))?;

    let storage = StorageClient::new(
        rpc::create_client()?,
        &config.storage.api_url,
        config.storage.auth_token.clone(),
    )?;
    let cid = storage.publish(&artifact).await?;

    let link = deployment_link(&config.link_host, &cid)?;
    tracing::info!(contract = %artifact.name, %cid, "Artifact published");
    println!("Deploy your contract at {link}");
    Ok(())
}

/// Load an artifact from an explicit file or the project build tree.
fn load_artifact(artifact: Option<&Path>, project_dir: &Path) -> Result<CompiledArtifact> {
    let artifact = match artifact {
        Some(path) => CompiledArtifact::from_file(path)?,
        None => locate_latest(&project_dir.join("artifacts"))?,
    };
    Ok(artifact)
}

async fn predict(
    config: &CrossxConfig,
    salt: &str,
    artifact: Option<&Path>,
    project_dir: &Path,
) -> Result<()> {
    let salt = parse_salt(salt)?;
    let artifact = load_artifact(artifact, project_dir)?;
    let predictor = RpcPredictor::new(rpc::create_client()?, &config.rpc_url, config.factory()?);

    // The signer leg is unused for a read-only prediction; the orchestrator
    // still enforces the state machine.
    let signer = RpcSigner::new(
        rpc::create_client()?,
        &config.rpc_url,
        config.sender()?.unwrap_or(Address::ZERO),
    );
    let mut orch = Orchestrator::new(
        predictor,
        signer,
        config.domain_table(),
        config.factory()?,
        artifact.bytecode.clone(),
    );

    let address = orch.request_address(salt).await?;
    println!("{address}");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn deploy(
    config: &CrossxConfig,
    salt: &str,
    chains: &[String],
    from: Option<&str>,
    wait: bool,
    wait_timeout: u64,
    artifact: Option<&Path>,
    project_dir: &Path,
) -> Result<()> {
    let salt = parse_salt(salt)?;
    let artifact = load_artifact(artifact, project_dir)?;

    let sender = match from {
        Some(raw) => raw
            .parse::<Address>()
            .with_context(|| format!("Malformed sender address: {raw}"))?,
        None => config
            .sender()?
            .context("No sender account: set sender_address in Crossx.toml or pass --from")?,
    };

    let factory = config.factory()?;
    let predictor = RpcPredictor::new(rpc::create_client()?, &config.rpc_url, factory);
    let signer = RpcSigner::new(rpc::create_client()?, &config.rpc_url, sender);
    let mut orch = Orchestrator::new(
        predictor,
        signer,
        config.domain_table(),
        factory,
        artifact.bytecode.clone(),
    );

    let address = orch.request_address(salt).await?;
    tracing::info!(contract = %artifact.name, %address, "Predicted deployment address");

    let tx_hash = orch.deploy(chains).await?;
    println!("Origin transaction: {tx_hash}");
    println!("Track delivery at {}", config.explorer_link(&tx_hash.to_string()));

    if wait {
        tracing::info!("Waiting for the origin transaction to confirm...");
        orch.wait_confirmed(Duration::from_secs(wait_timeout)).await?;
        tracing::info!("Origin transaction confirmed");
    }

    Ok(())
}

fn chains(config: &CrossxConfig) -> Result<()> {
    let mut table = comfy_table::Table::new();
    table.set_header(vec!["Chain", "Domain", "Relay fee (wei)"]);
    for entry in config.domain_table().entries() {
        table.add_row(vec![
            entry.name.clone(),
            entry.domain.to_string(),
            entry.fee.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}
