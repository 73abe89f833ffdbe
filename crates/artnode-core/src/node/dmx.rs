use std::net::Ipv4Addr;

use tracing::{debug, trace};

use super::ArtNetNode;
use crate::merge::MergeResult;
use crate::packets::ArtDmx;

impl ArtNetNode {
    pub(super) fn handle_dmx(&mut self, data: &[u8], from: Ipv4Addr, now: u32) {
        let Some(dmx) = ArtDmx::decode(data) else {
            return;
        };
        self.state.last_dmx_ip = Some(from);
        self.state.last_dmx_millis = Some(now);
        self.merge_dmx(dmx.port_address, dmx.physical, dmx.data, from, now);
    }

    /// Feed a frame into every output port listening on `port_address`
    pub(super) fn merge_dmx(
        &mut self,
        port_address: u16,
        physical: u8,
        data: &[u8],
        from: Ipv4Addr,
        now: u32,
    ) {
        let targets: Vec<usize> = self.ports.output_ports_for(port_address).collect();
        if targets.is_empty() {
            trace!("No output port for Port-Address {:#06x}", port_address);
            return;
        }

        for port in targets {
            let mode = self
                .ports
                .get(port)
                .map(|config| config.merge_mode)
                .unwrap_or_default();
            let output = &mut self.outputs[port];
            let was_merging = output.is_merging();

            if was_merging
                && !self.disable_merge_timeout
                && output.check_merge_timeouts(now, self.merge_timeout_millis)
            {
                debug!("Port {}: merge source timed out", port);
            }

            let result = output.accept(from, physical, data, now, mode);
            if result == MergeResult::Dropped {
                debug!("Port {}: third source {} dropped", port, from);
                continue;
            }

            let is_merging = output.is_merging();
            let buffered = self.state.is_synchronous_mode && !is_merging;
            if buffered {
                output.is_data_pending = true;
            }

            if is_merging != was_merging {
                self.state.is_changed = true;
                self.diag_low(if is_merging {
                    "Entering Merging Mode"
                } else {
                    "Leaving Merging Mode"
                });
            }
            if !buffered {
                self.push_output(port);
            }
        }

        self.state.is_merge_mode = self.outputs.iter().any(|output| output.is_merging());
    }

    /// Hand the live buffer of `port` to the output device, starting it on
    /// the first frame
    pub(super) fn push_output(&mut self, port: usize) {
        let Some(output) = self.outputs.get_mut(port) else {
            return;
        };
        self.light_set.set_data(port, output.data());
        if !output.is_transmitting {
            self.light_set.start(port);
            output.is_transmitting = true;
        }
        output.is_data_pending = false;
    }

    /// ArtSync from the current DMX source switches to synchronous output
    /// and releases the buffered frames
    pub(super) fn handle_sync(&mut self, from: Ipv4Addr, now: u32) {
        if self.state.is_merge_mode || self.state.last_dmx_ip != Some(from) {
            return;
        }
        if !self.state.is_synchronous_mode {
            debug!("Entering synchronous mode, ArtSync from {}", from);
        }
        self.state.is_synchronous_mode = true;
        self.state.sync_millis = now;

        for port in 0..self.outputs.len() {
            if self.outputs[port].is_data_pending {
                self.push_output(port);
            }
        }
    }
}
