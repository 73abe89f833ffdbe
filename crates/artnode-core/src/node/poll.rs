use std::net::Ipv4Addr;

use tracing::{debug, trace};

use super::{ArtNetNode, DiagTarget, NodeStatus};
use crate::packets::poll::diag_priority;
use crate::packets::{ArtDiagData, ArtPoll, PollReply};
use crate::poll::PollAction;
use crate::port::{PortDirection, PortProtocol, MAX_PORTS};
use crate::status::{good_output, port_type, status1, status2, status3};

/// NodeReport counter wraps at four decimal digits
const REPORT_COUNTER_WRAP: u16 = 10_000;

impl ArtNetNode {
    pub(super) fn handle_poll(&mut self, data: &[u8], from: Ipv4Addr, now: u32) {
        let Some(poll) = ArtPoll::decode(data) else {
            return;
        };

        self.state.reply_on_change = poll.reply_on_change();
        if poll.diagnostics() {
            match self.state.diag_poller {
                None => self.state.diag_poller = Some(from),
                Some(ip) if ip != from => self.state.diag_shared = true,
                Some(_) => {}
            }
            // Shared diagnostics are broadcast at the lowest priority asked for
            if self.state.diag_shared {
                self.state.diag_priority = self.state.diag_priority.min(poll.diag_priority);
                self.state.diag = DiagTarget::Broadcast;
            } else {
                self.state.diag_priority = poll.diag_priority;
                self.state.diag = if poll.diagnostics_unicast() {
                    DiagTarget::Unicast(from)
                } else {
                    DiagTarget::Broadcast
                };
            }
        } else {
            self.state.diag = DiagTarget::Off;
        }

        match self.poll_queue.request(from, now) {
            PollAction::SendNow => {
                self.send_poll_replies(Some(from));
                self.poll_queue.mark_sent(now);
            }
            PollAction::Queued | PollAction::AlreadyQueued => {}
            PollAction::Dropped => debug!("ArtPoll from {} dropped, reply queue full", from),
        }
    }

    /// Send queued replies whose delay has elapsed
    pub(super) fn drain_poll_replies(&mut self, now: u32) {
        while let Some(ip) = self.poll_queue.take_due(now) {
            trace!("Sending queued ArtPollReply to {}", ip);
            self.send_poll_replies(Some(ip));
            self.poll_queue.mark_sent(now);
        }
    }

    /// Unsolicited broadcast after a state change, when a controller asked
    pub(super) fn send_on_change(&mut self) {
        if self.state.reply_on_change && self.state.is_changed {
            self.send_poll_replies(None);
        }
    }

    /// One ArtPollReply per enabled port, or a single one when none is
    /// enabled. `None` broadcasts.
    pub(super) fn send_poll_replies(&mut self, destination: Option<Ipv4Addr>) {
        let ip = destination.unwrap_or_else(|| self.network.broadcast_ip());
        // Only unsolicited replies are counted
        if destination.is_none() && self.state.status == NodeStatus::On {
            self.state.report_counter = (self.state.report_counter + 1) % REPORT_COUNTER_WRAP;
        }

        if self.ports.all_disabled() {
            let reply = self.base_poll_reply();
            let len = reply.encode(&mut self.tx);
            self.send(len, ip);
        }
        let enabled: Vec<usize> = self
            .ports
            .iter()
            .filter(|(_, config)| config.is_enabled())
            .map(|(port, _)| port)
            .collect();
        for port in enabled {
            if let Some(reply) = self.build_poll_reply(port) {
                let len = reply.encode(&mut self.tx);
                self.send(len, ip);
            }
        }
        self.state.is_changed = false;
    }

    fn node_report(&self) -> String {
        format!(
            "#{:04x} [{:04}] {} AvV",
            self.state.report_code as u16,
            self.state.report_counter,
            self.hardware.system_name()
        )
    }

    /// Node-wide fields, no port
    fn base_poll_reply(&self) -> PollReply {
        let mut status1 = self.state.indicator.status1_bits() | status1::PAP_NETWORK;
        if self.rdm.is_some() {
            status1 |= status1::RDM_CAPABLE;
        }

        let mut status2 = status2::PORT_ADDRESS_15BIT
            | status2::OUTPUT_STYLE_SWITCH
            | status2::RDM_SWITCH;
        if self.sacn.is_some() {
            status2 |= status2::SACN_ABLE_TO_SWITCH;
        }
        if self.network.is_dhcp_capable() {
            status2 |= status2::DHCP_CAPABLE;
        }
        if self.network.is_dhcp_used() {
            status2 |= status2::IP_DHCP;
        }

        let ip = self.network.ip();
        PollReply {
            ip,
            firmware_version: self.firmware_version,
            oem: self.oem,
            status1,
            esta_manufacturer: self.esta_manufacturer,
            short_name: self.short_name.clone(),
            long_name: self.long_name.clone(),
            node_report: self.node_report(),
            acn_priority: self.acn_priority,
            mac: self.network.mac_address(),
            bind_ip: ip,
            status2,
            status3: self.failsafe.status3_bits() | status3::FAILSAFE_CONTROL,
            default_responder_uid: self
                .rdm
                .as_ref()
                .map(|rdm| *rdm.uid().as_bytes())
                .unwrap_or_default(),
            ..PollReply::default()
        }
    }

    /// Snapshot of the reply for the bind page of `port`
    pub fn build_poll_reply(&self, port: usize) -> Option<PollReply> {
        if port >= MAX_PORTS {
            return None;
        }
        let config = self.ports.get(port)?;
        let mut reply = self.base_poll_reply();
        reply.bind_index = (port + 1) as u8;
        reply.net_switch = config.net_switch;
        reply.sub_switch = config.sub_switch;

        match config.direction {
            PortDirection::Disabled => return Some(reply),
            PortDirection::Output => {
                let output = &self.outputs[port];
                let mut good = output.good_output;
                if output.is_transmitting {
                    good |= good_output::DATA_IS_BEING_TRANSMITTED;
                }
                if config.protocol == PortProtocol::Sacn {
                    if let Some(bridge) = self.sacn.as_ref() {
                        good |= bridge.good_output(port);
                    }
                }
                reply.port_types[0] = port_type::OUTPUT_ARTNET | port_type::PROTOCOL_DMX;
                reply.good_output[0] = good;
                reply.good_output_b[0] = output.good_output_b;
                reply.sw_out[0] = config.universe_switch;
            }
            PortDirection::Input => {
                reply.port_types[0] = port_type::INPUT_ARTNET | port_type::PROTOCOL_DMX;
                reply.good_input[0] = self.inputs[port].good_input;
                reply.sw_in[0] = config.universe_switch;
            }
        }
        reply.num_ports = 1;
        Some(reply)
    }

    /// Send an ArtDiagData message if a controller asked for this priority
    pub fn send_diag(&mut self, priority: u8, text: &str) {
        if self.state.status != NodeStatus::On || priority < self.state.diag_priority {
            return;
        }
        let ip = match self.state.diag {
            DiagTarget::Off => return,
            DiagTarget::Unicast(ip) => ip,
            DiagTarget::Broadcast => self.network.broadcast_ip(),
        };
        let len = ArtDiagData {
            priority,
            logical_port: 0,
            text,
        }
        .encode(&mut self.tx);
        self.send(len, ip);
    }

    pub(super) fn diag_low(&mut self, text: &str) {
        self.send_diag(diag_priority::LOW, text);
    }
}
