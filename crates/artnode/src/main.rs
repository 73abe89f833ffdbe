//! ArtNode - Art-Net 4 node for regular hosts
//!
//! Loads the params file, wires the engine to the host collaborators and
//! runs the poll loop until the process is terminated.

mod logging;
mod logging_setup;

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use artnode_core::ArtNetNode;
use artnode_io::{
    FileFailSafeStore, LoggedLightSet, NodeParams, ParamsStore, SystemHardware, UdpNetwork,
};
use clap::Parser;
use tracing::info;

use crate::logging::LogConfig;

/// Pause between poll-loop iterations
const LOOP_INTERVAL: Duration = Duration::from_micros(500);

#[derive(Parser, Debug)]
#[command(version, about = "Art-Net 4 node")]
struct Cli {
    /// Params file (.ron or .json), created with defaults when missing
    #[arg(short, long, default_value = "artnode.ron")]
    config: PathBuf,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Also write log files into this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Fail-safe scene file, next to the params file by default
    #[arg(long)]
    failsafe_file: Option<PathBuf>,
}

impl Cli {
    fn log_config(&self) -> LogConfig {
        let mut config = LogConfig {
            level: self.log_level.clone(),
            ..LogConfig::default()
        };
        if let Some(dir) = &self.log_dir {
            config.file_output = true;
            config.log_directory = dir.clone();
        }
        config
    }

    fn failsafe_path(&self) -> PathBuf {
        self.failsafe_file
            .clone()
            .unwrap_or_else(|| self.config.with_extension("failsafe"))
    }
}

fn build_node(cli: &Cli) -> Result<ArtNetNode> {
    let params = NodeParams::load_or_create(&cli.config)
        .with_context(|| format!("Failed to load params from {}", cli.config.display()))?;
    info!(
        "Params loaded from {} ({} port(s) configured)",
        cli.config.display(),
        params.node.ports.len()
    );

    let mut node = ArtNetNode::new(
        &params.node,
        Box::new(UdpNetwork::new(params.interface.clone())),
        Box::new(LoggedLightSet::new()),
        Box::new(SystemHardware::new(params.node.short_name.clone())),
    )
    .context("Invalid node configuration")?;
    node.set_failsafe_store(Box::new(FileFailSafeStore::new(cli.failsafe_path())));
    node.set_node_store(Box::new(ParamsStore::new(cli.config.clone(), params)));
    Ok(node)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging_setup::init(&cli.log_config())?;

    info!("=== ArtNode {} starting ===", env!("CARGO_PKG_VERSION"));

    let mut node = build_node(&cli)?;
    node.start().context("Failed to open the Art-Net socket")?;

    loop {
        node.run();
        thread::sleep(LOOP_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artnode_core::NodeStatus;
    use tempfile::TempDir;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["artnode"]);
        assert_eq!(cli.config, PathBuf::from("artnode.ron"));
        assert_eq!(cli.failsafe_path(), PathBuf::from("artnode.failsafe"));
        assert!(!cli.log_config().file_output);
    }

    #[test]
    fn test_cli_log_dir_enables_file_output() {
        let cli = Cli::parse_from(["artnode", "--log-dir", "/tmp/logs", "--log-level", "debug"]);
        let config = cli.log_config();
        assert!(config.file_output);
        assert_eq!(config.log_directory, PathBuf::from("/tmp/logs"));
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_build_node_creates_params() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("node.json");
        let cli = Cli::parse_from(["artnode", "--config", config.to_str().unwrap()]);

        let node = build_node(&cli).unwrap();
        assert!(config.exists());
        assert_eq!(node.status(), NodeStatus::Standby);
    }
}
