//! Collaborator interfaces consumed by the node
//!
//! The node owns one implementation of each behind a `Box<dyn ...>`. Required
//! collaborators ([`Network`], [`LightSet`], [`Hardware`]) are passed at
//! construction; the rest are attached through setters on
//! [`ArtNetNode`](crate::ArtNetNode).

use std::io;
use std::net::Ipv4Addr;

use crate::packets::{ArtTimeCode, ArtTimeSync, ArtTrigger};
use crate::port::{MergeMode, OutputStyle};

/// Opaque socket handle returned by [`Network::begin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketHandle(pub u32);

/// UDP transport
pub trait Network {
    /// Bind a socket to `port`
    fn begin(&mut self, port: u16) -> io::Result<SocketHandle>;

    /// Close a socket
    fn end(&mut self, _handle: SocketHandle) {}

    /// Non-blocking receive; `None` when nothing is pending
    fn recv_from(&mut self, handle: SocketHandle, buf: &mut [u8]) -> Option<(usize, Ipv4Addr, u16)>;

    fn send_to(&mut self, handle: SocketHandle, data: &[u8], ip: Ipv4Addr, port: u16) -> io::Result<()>;

    fn ip(&self) -> Ipv4Addr;

    fn netmask(&self) -> Ipv4Addr;

    fn gateway(&self) -> Ipv4Addr {
        Ipv4Addr::UNSPECIFIED
    }

    fn broadcast_ip(&self) -> Ipv4Addr {
        let ip = u32::from(self.ip());
        let mask = u32::from(self.netmask());
        Ipv4Addr::from(ip | !mask)
    }

    fn mac_address(&self) -> [u8; 6];

    fn is_dhcp_capable(&self) -> bool {
        false
    }

    fn is_dhcp_used(&self) -> bool {
        false
    }

    /// Whether remote IP programming (ArtIpProg) may change settings
    fn has_ip_privilege(&self) -> bool {
        false
    }

    fn set_ip(&mut self, _ip: Ipv4Addr) -> io::Result<()> {
        Err(io::ErrorKind::Unsupported.into())
    }

    fn set_netmask(&mut self, _netmask: Ipv4Addr) -> io::Result<()> {
        Err(io::ErrorKind::Unsupported.into())
    }

    fn set_gateway(&mut self, _gateway: Ipv4Addr) -> io::Result<()> {
        Err(io::ErrorKind::Unsupported.into())
    }

    fn enable_dhcp(&mut self) -> io::Result<()> {
        Err(io::ErrorKind::Unsupported.into())
    }
}

/// DMX output device for all output ports
pub trait LightSet {
    fn start(&mut self, port: usize);

    fn stop(&mut self, port: usize);

    fn set_data(&mut self, port: usize, data: &[u8]);

    fn blackout(&mut self, blackout: bool);

    fn full_on(&mut self);

    fn set_output_style(&mut self, _port: usize, _style: OutputStyle) {}

    fn get_output_style(&self, _port: usize) -> OutputStyle {
        OutputStyle::Delta
    }
}

/// Status LED patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedMode {
    Off,
    #[default]
    Normal,
    /// DMX is flowing
    Data,
    /// Locate
    Fast,
}

/// Board services
pub trait Hardware {
    /// Monotonic milliseconds, wrapping at `u32::MAX`
    fn millis(&self) -> u32;

    fn set_led_mode(&mut self, mode: LedMode);

    fn watchdog_feed(&mut self) {}

    /// Board or host name used in the NodeReport
    fn system_name(&self) -> &str {
        "ArtNode"
    }
}

/// Byte-addressable storage for recorded fail-safe frames
pub trait FailSafeStore {
    fn write_start(&mut self) -> io::Result<()>;
    fn write(&mut self, offset: usize, data: &[u8]) -> io::Result<()>;
    fn write_end(&mut self) -> io::Result<()>;
    fn read_start(&mut self) -> io::Result<()>;
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> io::Result<()>;
    fn read_end(&mut self) -> io::Result<()>;
}

/// Physical RDM bus
pub trait RdmTransport {
    /// Transmit a complete RDM frame, start code included
    fn send_raw(&mut self, port: usize, data: &[u8]) -> io::Result<()>;

    /// Wait at most `timeout_micros` for a frame; zero polls
    fn receive_timeout(&mut self, port: usize, timeout_micros: u32) -> Option<Vec<u8>>;
}

/// DMX receivers for input ports
pub trait DmxInput {
    fn start(&mut self, port: usize);

    fn stop(&mut self, port: usize);

    /// Frame received since the last call if it differs from the previous one
    fn changed_data(&mut self, port: usize) -> Option<Vec<u8>>;

    /// Last frame received, possibly empty
    fn current_data(&mut self, port: usize) -> Vec<u8>;

    fn updates_per_second(&self, port: usize) -> u32;
}

/// sACN (E1.31) side of an Art-Net 4 node
pub trait SacnBridge {
    fn set_universe(&mut self, port: usize, universe: u16, enabled: bool);

    fn set_merge_mode(&mut self, port: usize, mode: MergeMode);

    fn set_priority(&mut self, port: usize, priority: u8);

    fn clear(&mut self, port: usize);

    /// GoodOutput bits for a port driven by the bridge
    fn good_output(&self, port: usize) -> u8;

    fn start(&mut self) {}

    fn stop(&mut self) {}

    fn run(&mut self) {}
}

/// Persistence of remotely programmed settings
///
/// Every method defaults to a no-op so stores only implement what they keep.
pub trait NodeStore {
    fn save_short_name(&mut self, _name: &str) {}
    fn save_long_name(&mut self, _name: &str) {}
    fn save_universe(&mut self, _port: usize, _address: u16) {}
    fn save_merge_mode(&mut self, _port: usize, _mode: MergeMode) {}
    fn save_protocol(&mut self, _port: usize, _sacn: bool) {}
    fn save_output_style(&mut self, _port: usize, _style: OutputStyle) {}
    fn save_rdm_enabled(&mut self, _port: usize, _enabled: bool) {}
    fn save_failsafe(&mut self, _failsafe: crate::FailSafe) {}
}

/// Optional front panel or status display
pub trait DisplayHandler {
    fn show_short_name(&mut self, _name: &str) {}
    fn show_long_name(&mut self, _name: &str) {}
    fn show_universe(&mut self, _port: usize, _address: u16) {}
    fn show_merge_mode(&mut self, _port: usize, _mode: MergeMode) {}
    fn show_failsafe(&mut self, _failsafe: crate::FailSafe) {}
}

pub trait TimeCodeHandler {
    fn handle_time_code(&mut self, time_code: &ArtTimeCode);
}

pub trait TimeSyncHandler {
    fn handle_time_sync(&mut self, time_sync: &ArtTimeSync);
}

pub trait TriggerHandler {
    fn handle_trigger(&mut self, trigger: &ArtTrigger<'_>);
}
