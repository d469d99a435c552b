use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

/// Default command used to produce compiled artifacts.
pub const DEFAULT_COMPILE_CMD: &str = "npx hardhat compile";

#[derive(Parser)]
#[command(name = "crossx")]
#[command(
    author,
    version,
    about = "Deploy one contract to many chains at the same deterministic address"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "CROSSX_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// Path to a Crossx.toml configuration file (or a directory containing
    /// one). Defaults to the current directory when present.
    #[arg(long, alias = "conf", env = "CROSSX_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default Crossx.toml to a directory.
    Init {
        /// Directory to write the configuration to.
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Overwrite an existing configuration file.
        #[arg(long)]
        force: bool,
    },

    /// Compile the project, publish the newest artifact and print the
    /// shareable deployment link.
    Ship {
        /// Project directory containing the contract sources and build
        /// output.
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Command used to invoke the external compiler toolchain.
        #[arg(long, env = "CROSSX_COMPILE_CMD", default_value = DEFAULT_COMPILE_CMD)]
        compile_cmd: String,

        /// Skip compilation and publish the newest existing artifact.
        #[arg(long)]
        skip_compile: bool,
    },

    /// Predict the deployment address for a salt without deploying.
    Predict {
        /// Caller-chosen salt (decimal or 0x-prefixed hex).
        #[arg(long)]
        salt: String,

        /// Path to a specific artifact JSON file. When omitted, the newest
        /// artifact under the project build tree is used.
        #[arg(long)]
        artifact: Option<PathBuf>,

        /// Project directory containing the build output.
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// Deploy the contract to the selected destination chains.
    Deploy {
        /// Caller-chosen salt (decimal or 0x-prefixed hex).
        #[arg(long)]
        salt: String,

        /// Destination chain names, comma-separated or repeated.
        #[arg(long, required = true, value_delimiter = ',')]
        chains: Vec<String>,

        /// Sender account (unlocked on the origin node). Overrides the
        /// configured sender_address.
        #[arg(long, env = "CROSSX_FROM")]
        from: Option<String>,

        /// Wait for the origin transaction to confirm before exiting.
        #[arg(long)]
        wait: bool,

        /// Confirmation wait timeout, in seconds.
        #[arg(long, default_value_t = 120)]
        wait_timeout: u64,

        /// Path to a specific artifact JSON file. When omitted, the newest
        /// artifact under the project build tree is used.
        #[arg(long)]
        artifact: Option<PathBuf>,

        /// Project directory containing the build output.
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// List the configured destination chains, domains and relay fees.
    Chains,
}
