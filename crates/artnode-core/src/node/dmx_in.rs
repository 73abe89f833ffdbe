use std::net::Ipv4Addr;

use tracing::trace;

use super::{ArtNetNode, INPUT_KEEPALIVE_MILLIS};
use crate::packets::ArtDmx;
use crate::port::{PortProtocol, MAX_PORTS};
use crate::status::good_input;

impl ArtNetNode {
    /// Forward DMX received on input ports to the network
    pub(super) fn handle_dmx_in(&mut self, now: u32) {
        let Some(dmx_input) = self.dmx_input.as_mut() else {
            return;
        };

        let mut frames: Vec<(usize, Vec<u8>)> = Vec::new();
        for port in 0..MAX_PORTS {
            let active = self.ports.get(port).is_some_and(|config| {
                config.is_input() && config.protocol == PortProtocol::ArtNet
            });
            let input = &mut self.inputs[port];
            if !active || input.good_input & good_input::DISABLED != 0 {
                continue;
            }

            if let Some(data) = dmx_input.changed_data(port) {
                input.good_input |= good_input::DATA_RECEIVED;
                input.keepalive_millis = None;
                frames.push((port, data));
                continue;
            }
            if dmx_input.updates_per_second(port) != 0 {
                continue;
            }

            // Input went quiet: keep the last frame alive on the network
            if input.good_input & good_input::DATA_RECEIVED != 0 {
                input.good_input &= !good_input::DATA_RECEIVED;
                input.keepalive_millis = Some(now);
                frames.push((port, dmx_input.current_data(port)));
            } else if let Some(since) = input.keepalive_millis {
                if now.wrapping_sub(since) > INPUT_KEEPALIVE_MILLIS {
                    input.keepalive_millis = Some(now);
                    frames.push((port, dmx_input.current_data(port)));
                }
            }
        }

        for (port, data) in frames {
            self.send_input_dmx(port, &data, now);
        }
    }

    fn send_input_dmx(&mut self, port: usize, data: &[u8], now: u32) {
        let Some(config) = self.ports.get(port) else {
            return;
        };
        let (port_address, local_merge) = (config.port_address, config.local_merge);

        let input = &mut self.inputs[port];
        input.sequence = input.sequence % 255 + 1;
        let packet = ArtDmx {
            sequence: input.sequence,
            physical: port as u8,
            port_address,
            data,
        };
        let destination = input.destination_ip;
        let len = packet.encode(&mut self.tx);
        let ip = destination.unwrap_or_else(|| self.network.broadcast_ip());
        trace!("Input port {}: {} slots to {}", port, data.len(), ip);
        self.send(len, ip);

        if local_merge {
            let own_ip: Ipv4Addr = self.network.ip();
            self.merge_dmx(port_address, port as u8, data, own_ip, now);
        }
    }
}
