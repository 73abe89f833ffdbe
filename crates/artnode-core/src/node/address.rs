use std::net::Ipv4Addr;

use tracing::{debug, info};

use super::{ArtNetNode, Indicator};
use crate::failsafe::FailSafe;
use crate::packets::address::{command, ProgramValue, INPUT_DISABLE};
use crate::packets::{ArtAddress, ArtInput};
use crate::port::{split_port_address, MergeMode, OutputStyle, PortDirection, PortProtocol, MAX_PORTS, UNIVERSE_SIZE};
use crate::status::{good_input, ReportCode};

/// Highest sACN priority accepted through ArtAddress
const MAX_ACN_PRIORITY: u8 = 200;

/// Port a bind index refers to; each port has its own bind page
fn port_for_bind_index(bind_index: u8) -> usize {
    usize::from(bind_index.max(1) - 1)
}

impl ArtNetNode {
    pub(super) fn handle_address(&mut self, data: &[u8], from: Ipv4Addr) {
        let Some(address) = ArtAddress::decode(data) else {
            return;
        };
        let port = port_for_bind_index(address.bind_index);
        if port >= MAX_PORTS {
            debug!("ArtAddress for unknown bind index {}", address.bind_index);
            return;
        }

        if let Some(name) = address.short_name() {
            self.set_short_name(&name);
            self.state.report_code = ReportCode::ShortNameOk;
        }
        if let Some(name) = address.long_name() {
            self.set_long_name(&name);
            self.state.report_code = ReportCode::LongNameOk;
        }

        let (default_net, default_sub, default_universe) =
            split_port_address(self.default_addresses[port]);

        match ProgramValue::decode(address.net_switch, 0x7F) {
            ProgramValue::Set(net) => self.program_net(port, net),
            ProgramValue::Default => self.program_net(port, default_net),
            ProgramValue::NoChange => {}
        }
        match ProgramValue::decode(address.sub_switch, 0x0F) {
            ProgramValue::Set(sub) => self.program_sub(port, sub),
            ProgramValue::Default => self.program_sub(port, default_sub),
            ProgramValue::NoChange => {}
        }

        let direction = self.ports.get(port).map(|config| config.direction);
        let universe_switch = match direction {
            Some(PortDirection::Output) => Some(address.sw_out[0]),
            Some(PortDirection::Input) => Some(address.sw_in[0]),
            _ => None,
        };
        if let (Some(direction), Some(switch)) = (direction, universe_switch) {
            let universe = match ProgramValue::decode(switch, 0x0F) {
                ProgramValue::Set(universe) => Some(universe),
                ProgramValue::Default => Some(default_universe),
                ProgramValue::NoChange => None,
            };
            if let Some(universe) = universe {
                if self.ports.set_universe_switch(port, direction, universe).is_ok() {
                    self.port_address_changed(port);
                }
            }
        }

        if address.acn_priority <= MAX_ACN_PRIORITY {
            self.acn_priority = address.acn_priority;
            if let Some(bridge) = self.sacn.as_mut() {
                bridge.set_priority(port, address.acn_priority);
            }
        }

        self.handle_address_command(port, address.command);
        self.state.is_changed = true;
        self.send_poll_replies(Some(from));
    }

    fn program_net(&mut self, port: usize, net: u8) {
        if self.ports.set_net_switch(port, net).is_ok() {
            self.port_address_changed(port);
        }
    }

    fn program_sub(&mut self, port: usize, sub: u8) {
        if self.ports.set_subnet_switch(port, sub).is_ok() {
            self.port_address_changed(port);
        }
    }

    fn handle_address_command(&mut self, bind_port: usize, cmd: u8) {
        // Per-port commands carry the port in the low nibble
        let port = bind_port + usize::from(cmd & 0x0F);
        let per_port = cmd & 0xF0 != 0 && cmd & 0x0F < 4 && port < MAX_PORTS;

        match cmd {
            command::NONE => {}
            command::CANCEL_MERGE => {
                for output in &mut self.outputs {
                    output.clear_sources();
                }
                self.state.is_merge_mode = false;
                info!("Merge cancelled");
            }
            command::LED_NORMAL => self.state.indicator = Indicator::Normal,
            command::LED_MUTE => self.state.indicator = Indicator::Mute,
            command::LED_LOCATE => self.state.indicator = Indicator::Locate,
            command::RESET_RX_FLAGS => {
                for input in &mut self.inputs {
                    input.good_input &= !good_input::ERRORS;
                }
                self.state.report_code = ReportCode::PowerOk;
            }
            command::FAIL_HOLD..=command::FAIL_RECORD => {
                if let Some(failsafe) = FailSafe::from_address_command(cmd) {
                    self.set_failsafe(failsafe);
                }
            }
            _ if per_port => self.handle_port_command(port, cmd & 0xF0),
            _ => debug!("Unsupported ArtAddress command {:#04x}", cmd),
        }
    }

    fn handle_port_command(&mut self, port: usize, group: u8) {
        let result = match group {
            command::MERGE_LTP_0 => self.set_merge_mode(port, MergeMode::Ltp),
            command::MERGE_HTP_0 => self.set_merge_mode(port, MergeMode::Htp),
            command::ARTNET_SEL_0 => self.set_port_protocol(port, PortProtocol::ArtNet),
            command::ACN_SEL_0 => self.set_port_protocol(port, PortProtocol::Sacn),
            command::CLEAR_OP_0 => {
                self.clear_port_output(port);
                Ok(())
            }
            command::STYLE_DELTA_0 => self.set_output_style(port, OutputStyle::Delta),
            command::STYLE_CONST_0 => self.set_output_style(port, OutputStyle::Constant),
            command::RDM_ENABLE_0 => self.set_rdm(port, true),
            command::RDM_DISABLE_0 => self.set_rdm(port, false),
            _ => {
                debug!("Unsupported ArtAddress port command {:#04x}", group);
                Ok(())
            }
        };
        if let Err(e) = result {
            debug!("ArtAddress command on port {} failed: {}", port, e);
        }
    }

    /// Zero the output buffer of a port
    fn clear_port_output(&mut self, port: usize) {
        let Some(config) = self.ports.get(port) else {
            return;
        };
        if config.protocol == PortProtocol::Sacn {
            if let Some(bridge) = self.sacn.as_mut() {
                bridge.clear(port);
            }
            return;
        }
        self.outputs[port].set_output(&[0; UNIVERSE_SIZE]);
        self.push_output(port);
    }

    pub(super) fn handle_input(&mut self, data: &[u8], from: Ipv4Addr) {
        let Some(input) = ArtInput::decode(data) else {
            return;
        };
        let port = port_for_bind_index(input.bind_index);
        let is_input = self.ports.get(port).is_some_and(|config| config.is_input());
        if !is_input {
            return;
        }

        let disable = input.input[0] & INPUT_DISABLE != 0;
        let state = &mut self.inputs[port];
        let was_disabled = state.good_input & good_input::DISABLED != 0;
        if disable {
            state.good_input |= good_input::DISABLED;
        } else {
            state.good_input &= !good_input::DISABLED;
        }

        if disable != was_disabled {
            debug!("Input port {} {}", port, if disable { "disabled" } else { "enabled" });
            if let Some(dmx_input) = self.dmx_input.as_mut() {
                if disable {
                    dmx_input.stop(port);
                } else {
                    dmx_input.start(port);
                }
            }
            self.state.is_changed = true;
        }
        self.send_poll_replies(Some(from));
    }
}
