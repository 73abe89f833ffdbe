use tracing::{info, warn};

use super::{ArtNetNode, NodeStatus};
use crate::error::{NodeError, Result};
use crate::failsafe::{self, FailSafe};
use crate::packets::poll::diag_priority;

impl ArtNetNode {
    pub(super) fn check_network_loss(&mut self, now: u32) {
        if !self.network_loss.is_lost(now) {
            return;
        }
        if !self.state.is_network_lost {
            self.state.is_network_lost = true;
            warn!(
                "No Art-Net data for {} ms, applying fail-safe {:?}",
                self.network_loss.timeout_millis(),
                self.failsafe
            );
            self.send_diag(diag_priority::HIGH, "Network data loss");
        }
        self.set_network_data_loss_condition();
    }

    pub(super) fn recover_from_network_loss(&mut self) {
        if !self.state.is_network_lost {
            return;
        }
        self.state.is_network_lost = false;
        if self.state.is_blackout {
            self.light_set.blackout(false);
            self.state.is_blackout = false;
        }
        info!("Art-Net data received again");
    }

    fn set_network_data_loss_condition(&mut self) {
        self.state.is_merge_mode = false;
        self.state.is_synchronous_mode = false;

        let any_source = self.ports.iter().any(|(port, config)| {
            config.is_output() && !config.local_merge && self.outputs[port].has_source()
        });
        if !any_source {
            return;
        }

        match self.failsafe {
            FailSafe::Last | FailSafe::Record => {}
            FailSafe::Off => {
                self.light_set.blackout(true);
                self.state.is_blackout = true;
            }
            FailSafe::On => self.light_set.full_on(),
            FailSafe::Playback => {
                if let Err(e) = self.failsafe_playback() {
                    warn!("Fail-safe playback failed: {}", e);
                }
            }
        }

        for (port, config) in self.ports.iter() {
            if config.local_merge {
                continue;
            }
            let output = &mut self.outputs[port];
            output.clear_sources();
            output.clear_output();
            output.is_data_pending = false;
        }
        self.state.is_changed = true;
    }

    /// Set the network-loss behaviour; `Record` stores the live output
    /// instead and keeps the current mode
    pub fn set_failsafe(&mut self, failsafe: FailSafe) {
        if failsafe == FailSafe::Record {
            if self.state.status == NodeStatus::On {
                match self.failsafe_record() {
                    Ok(()) => info!("Fail-safe scene recorded"),
                    Err(e) => warn!("Fail-safe record failed: {}", e),
                }
            }
            return;
        }

        let changed = self.failsafe != failsafe;
        self.failsafe = failsafe;
        if changed && self.state.status == NodeStatus::On {
            if let Some(store) = self.store.as_mut() {
                store.save_failsafe(failsafe);
            }
            if let Some(display) = self.display.as_mut() {
                display.show_failsafe(failsafe);
            }
        }
        self.state.is_changed = true;
    }

    /// Store the live frame of every output port as the fail-safe scene
    pub fn failsafe_record(&mut self) -> Result<()> {
        let store = self
            .failsafe_store
            .as_deref_mut()
            .ok_or(NodeError::NotAvailable("fail-safe store"))?;
        let frames = self
            .ports
            .iter()
            .filter(|(_, config)| config.is_output())
            .map(|(port, _)| (port, self.outputs[port].data()));
        failsafe::record(store, frames)?;
        Ok(())
    }

    /// Replay the recorded scene on every output port
    pub fn failsafe_playback(&mut self) -> Result<()> {
        let store = self
            .failsafe_store
            .as_deref_mut()
            .ok_or(NodeError::NotAvailable("fail-safe store"))?;
        let ports: Vec<usize> = self
            .ports
            .iter()
            .filter(|(_, config)| config.is_output())
            .map(|(port, _)| port)
            .collect();

        let light_set = &mut self.light_set;
        let outputs = &mut self.outputs;
        failsafe::playback(store, ports, |port, frame| {
            light_set.set_data(port, frame);
            let output = &mut outputs[port];
            if !output.is_transmitting {
                light_set.start(port);
                output.is_transmitting = true;
            }
        })?;
        Ok(())
    }
}
