//! File-backed persistence of settings changed over the network

use std::path::{Path, PathBuf};

use artnode_core::{FailSafe, MergeMode, NodeStore, OutputStyle, PortParams, PortProtocol};
use tracing::{debug, warn};

use crate::params::NodeParams;

/// [`NodeStore`] that rewrites the params file on every change
pub struct ParamsStore {
    path: PathBuf,
    params: NodeParams,
}

impl ParamsStore {
    pub fn new(path: impl Into<PathBuf>, params: NodeParams) -> Self {
        Self {
            path: path.into(),
            params,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn params(&self) -> &NodeParams {
        &self.params
    }

    fn port_mut(&mut self, port: usize) -> &mut PortParams {
        if self.params.node.ports.len() <= port {
            self.params.node.ports.resize(port + 1, PortParams::default());
        }
        &mut self.params.node.ports[port]
    }

    fn persist(&mut self) {
        match self.params.save(&self.path) {
            Ok(()) => debug!("Params saved to {}", self.path.display()),
            Err(e) => warn!("Failed to save params to {}: {}", self.path.display(), e),
        }
    }
}

impl NodeStore for ParamsStore {
    fn save_short_name(&mut self, name: &str) {
        self.params.node.short_name = name.to_string();
        self.persist();
    }

    fn save_long_name(&mut self, name: &str) {
        self.params.node.long_name = name.to_string();
        self.persist();
    }

    fn save_universe(&mut self, port: usize, address: u16) {
        self.port_mut(port).universe = address;
        self.persist();
    }

    fn save_merge_mode(&mut self, port: usize, mode: MergeMode) {
        self.port_mut(port).merge_mode = mode;
        self.persist();
    }

    fn save_protocol(&mut self, port: usize, sacn: bool) {
        self.port_mut(port).protocol = if sacn {
            PortProtocol::Sacn
        } else {
            PortProtocol::ArtNet
        };
        self.persist();
    }

    fn save_output_style(&mut self, port: usize, style: OutputStyle) {
        self.port_mut(port).output_style = style;
        self.persist();
    }

    fn save_rdm_enabled(&mut self, port: usize, enabled: bool) {
        self.port_mut(port).rdm_enabled = enabled;
        self.persist();
    }

    fn save_failsafe(&mut self, failsafe: FailSafe) {
        self.params.node.failsafe = failsafe;
        self.persist();
    }
}
