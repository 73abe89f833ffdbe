//! ArtNode IO - Host collaborators for the Art-Net node engine
//!
//! This crate provides the pieces the engine needs to run on a regular host:
//! - UDP transport bound to the Art-Net port
//! - Versioned params files (RON or JSON)
//! - File-backed persistence of settings changed over the network
//! - File-backed fail-safe scene storage
//! - Clock, indicator and a logging output stage

pub mod error;
pub mod failsafe;
pub mod hardware;
pub mod network;
pub mod params;
pub mod store;

pub use error::{IoError, Result};
pub use failsafe::FileFailSafeStore;
pub use hardware::{LoggedLightSet, SystemHardware};
pub use network::UdpNetwork;
pub use params::{InterfaceParams, NodeParams, ParamsMetadata, MAX_PARAMS_FILE_SIZE, PARAMS_FILE_VERSION};
pub use store::ParamsStore;
