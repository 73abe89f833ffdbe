//! RDM support: UIDs, message framing, Tables of Devices and discovery

pub mod controller;
pub mod discovery;
pub mod message;
pub mod tod;
pub mod uid;

pub use controller::{ProxyOutcome, RdmController, RDM_RESPONSE_TIMEOUT_MICROS};
pub use discovery::{Discovery, DiscoveryMode};
pub use message::RdmMessage;
pub use tod::{Tod, TOD_CAPACITY};
pub use uid::Uid;
