use std::net::Ipv4Addr;

use tracing::{debug, info, warn};

use super::ArtNetNode;
use crate::packets::ipprog::command;
use crate::packets::{ArtIpProg, ArtIpProgReply, ArtTimeCode, ArtTimeSync, ArtTrigger};

/// Art-Net default address: 2.x.y.z from the low MAC bytes
fn default_ip(mac: &[u8; 6]) -> (Ipv4Addr, Ipv4Addr) {
    (
        Ipv4Addr::new(2, mac[3], mac[4], mac[5]),
        Ipv4Addr::new(255, 0, 0, 0),
    )
}

impl ArtNetNode {
    pub(super) fn handle_ip_prog(&mut self, data: &[u8], from: Ipv4Addr) {
        let Some(prog) = ArtIpProg::decode(data) else {
            return;
        };
        if !self.network.has_ip_privilege() {
            debug!("ArtIpProg from {} ignored, no privilege to change the address", from);
            return;
        }

        if let Err(e) = self.apply_ip_prog(&prog) {
            warn!("ArtIpProg from {} failed: {}", from, e);
        }

        let len = ArtIpProgReply {
            ip: self.network.ip(),
            netmask: self.network.netmask(),
            gateway: self.network.gateway(),
            dhcp: self.network.is_dhcp_used(),
        }
        .encode(&mut self.tx);
        self.send(len, from);
    }

    fn apply_ip_prog(&mut self, prog: &ArtIpProg) -> std::io::Result<()> {
        if prog.has(command::ENABLE_DHCP) {
            info!("Enabling DHCP");
            return self.network.enable_dhcp();
        }
        if prog.has(command::RESET_TO_DEFAULT) {
            let (ip, netmask) = default_ip(&self.network.mac_address());
            info!("Resetting network to {}/{}", ip, netmask);
            self.network.set_ip(ip)?;
            return self.network.set_netmask(netmask);
        }
        if prog.has(command::PROGRAM_IP) {
            info!("Programming IP {}", prog.ip);
            self.network.set_ip(prog.ip)?;
        }
        if prog.has(command::PROGRAM_NETMASK) {
            info!("Programming netmask {}", prog.netmask);
            self.network.set_netmask(prog.netmask)?;
        }
        if prog.has(command::PROGRAM_GATEWAY) {
            info!("Programming gateway {}", prog.gateway);
            self.network.set_gateway(prog.gateway)?;
        }
        Ok(())
    }

    pub(super) fn handle_time_code(&mut self, data: &[u8]) {
        let Some(time_code) = ArtTimeCode::decode(data) else {
            return;
        };
        if let Some(handler) = self.time_code_handler.as_mut() {
            handler.handle_time_code(&time_code);
        }
    }

    pub(super) fn handle_time_sync(&mut self, data: &[u8]) {
        let Some(time_sync) = ArtTimeSync::decode(data) else {
            return;
        };
        if let Some(handler) = self.time_sync_handler.as_mut() {
            handler.handle_time_sync(&time_sync);
        }
    }

    pub(super) fn handle_trigger(&mut self, data: &[u8]) {
        let Some(trigger) = ArtTrigger::decode(data) else {
            return;
        };
        if !trigger.is_for(self.oem) {
            return;
        }
        if let Some(handler) = self.trigger_handler.as_mut() {
            handler.handle_trigger(&trigger);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ip_from_mac() {
        let (ip, netmask) = default_ip(&[0x00, 0x50, 0xC2, 0x0A, 0x0B, 0x0C]);
        assert_eq!(ip, Ipv4Addr::new(2, 10, 11, 12));
        assert_eq!(netmask, Ipv4Addr::new(255, 0, 0, 0));
    }
}
