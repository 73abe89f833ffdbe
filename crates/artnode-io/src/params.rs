//! On-disk params file
//!
//! A params file holds the node configuration plus the host interface
//! settings, wrapped with a format version and timestamps. It is read and
//! written as RON or JSON depending on the file extension.

use std::fs::File;
use std::io::{Read, Write};
use std::net::Ipv4Addr;
use std::path::Path;

use artnode_core::NodeConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{IoError, Result};

/// Version stamped into saved params files.
///
/// Bump when a change to `NodeParams` cannot be read by older builds.
pub const PARAMS_FILE_VERSION: &str = "1.0.0";

/// Maximum accepted params file size (1 MB).
pub const MAX_PARAMS_FILE_SIZE: u64 = 1024 * 1024;

/// Network interface the node presents in its replies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceParams {
    pub ip: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub mac: [u8; 6],
    /// Address the UDP socket binds to
    pub bind_ip: Ipv4Addr,
}

impl Default for InterfaceParams {
    fn default() -> Self {
        Self {
            ip: Ipv4Addr::new(2, 0, 0, 1),
            netmask: Ipv4Addr::new(255, 0, 0, 0),
            gateway: Ipv4Addr::UNSPECIFIED,
            mac: [0x02, 0x00, 0x00, 0x00, 0x00, 0x01],
            bind_ip: Ipv4Addr::UNSPECIFIED,
        }
    }
}

/// Top-level structure of a params file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeParams {
    /// Format version of the file.
    pub version: String,
    pub metadata: ParamsMetadata,
    #[serde(default)]
    pub interface: InterfaceParams,
    #[serde(default)]
    pub node: NodeConfig,
}

/// Timestamps kept alongside the params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamsMetadata {
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Default for NodeParams {
    fn default() -> Self {
        Self::new(NodeConfig::default())
    }
}

impl NodeParams {
    /// Wrap a node configuration, stamping both timestamps with now.
    pub fn new(node: NodeConfig) -> Self {
        let now = Utc::now();
        Self {
            version: PARAMS_FILE_VERSION.to_string(),
            metadata: ParamsMetadata {
                created_at: now,
                modified_at: now,
            },
            interface: InterfaceParams::default(),
            node,
        }
    }

    /// Load and validate a params file.
    ///
    /// Fails on a version mismatch or on a configuration the engine rejects.
    pub fn load(path: &Path) -> Result<Self> {
        let params = Self::load_with_limit(path, MAX_PARAMS_FILE_SIZE)?;
        if params.version != PARAMS_FILE_VERSION {
            return Err(IoError::VersionMismatch {
                expected: PARAMS_FILE_VERSION.to_string(),
                found: params.version,
            });
        }
        params.node.validate()?;
        Ok(params)
    }

    /// Load `path`, or write and return the defaults when it does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }
        info!("Params file {} not found, writing defaults", path.display());
        let mut params = Self::default();
        params.save(path)?;
        Ok(params)
    }

    fn load_with_limit(path: &Path, limit: u64) -> Result<Self> {
        let size = std::fs::metadata(path)?.len();
        if size > limit {
            return Err(IoError::FileTooLarge { size, limit });
        }

        let extension = extension(path);
        let mut content = String::new();
        match extension {
            "json" => {
                File::open(path)?.read_to_string(&mut content)?;
                Ok(serde_json::from_str(&content)?)
            }
            "ron" => {
                File::open(path)?.read_to_string(&mut content)?;
                Ok(ron::from_str(&content)?)
            }
            _ => Err(IoError::UnsupportedFormat(extension.to_string())),
        }
    }

    /// Write the params, updating `modified_at`.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        let extension = extension(path);
        self.metadata.modified_at = Utc::now();

        match extension {
            "json" => {
                let file = File::create(path)?;
                serde_json::to_writer_pretty(file, self)?;
            }
            "ron" => {
                let s = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
                File::create(path)?.write_all(s.as_bytes())?;
            }
            _ => return Err(IoError::UnsupportedFormat(extension.to_string())),
        }
        Ok(())
    }
}

fn extension(path: &Path) -> &str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("ron")
}

#[cfg(test)]
mod tests {
    use super::*;
    use artnode_core::{FailSafe, PortDirection, PortParams};
    use tempfile::TempDir;

    fn sample() -> NodeParams {
        NodeParams::new(NodeConfig {
            short_name: "Truss 3".to_string(),
            failsafe: FailSafe::Off,
            ports: vec![PortParams {
                direction: PortDirection::Output,
                universe: 0x0102,
                ..PortParams::default()
            }],
            ..NodeConfig::default()
        })
    }

    #[test]
    fn test_ron_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("node.ron");
        let mut params = sample();
        params.save(&path).unwrap();

        let loaded = NodeParams::load(&path).unwrap();
        assert_eq!(loaded.node, params.node);
        assert_eq!(loaded.interface, params.interface);
        assert_eq!(loaded.metadata.created_at, params.metadata.created_at);
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("node.json");
        let mut params = sample();
        params.save(&path).unwrap();
        assert_eq!(NodeParams::load(&path).unwrap().node, params.node);
    }

    #[test]
    fn test_version_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("node.ron");
        let mut params = sample();
        params.version = "0.1.0".to_string();
        params.save(&path).unwrap();

        match NodeParams::load(&path) {
            Err(IoError::VersionMismatch { expected, found }) => {
                assert_eq!(expected, PARAMS_FILE_VERSION);
                assert_eq!(found, "0.1.0");
            }
            other => panic!("expected version mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("node.json");
        let mut params = sample();
        params.node.failsafe = FailSafe::Record;
        params.save(&path).unwrap();
        assert!(matches!(NodeParams::load(&path), Err(IoError::InvalidConfig(_))));
    }

    #[test]
    fn test_unsupported_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("node.txt");
        assert!(matches!(
            sample().save(&path),
            Err(IoError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_file_too_large() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("node.ron");
        std::fs::write(&path, vec![b' '; 1024]).unwrap();

        match NodeParams::load_with_limit(&path, 500) {
            Err(IoError::FileTooLarge { size, limit }) => {
                assert_eq!(size, 1024);
                assert_eq!(limit, 500);
            }
            other => panic!("expected size error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fresh.ron");
        let created = NodeParams::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(NodeParams::load(&path).unwrap().node, created.node);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(
            &path,
            r#"{
                "version": "1.0.0",
                "metadata": {
                    "created_at": "2024-01-01T00:00:00Z",
                    "modified_at": "2024-01-01T00:00:00Z"
                },
                "node": { "short_name": "Partial" }
            }"#,
        )
        .unwrap();

        let params = NodeParams::load(&path).unwrap();
        assert_eq!(params.node.short_name, "Partial");
        assert_eq!(params.interface, InterfaceParams::default());
    }
}
