//! Host stand-ins for board services and the DMX output stage

use std::time::Instant;

use artnode_core::{Hardware, LedMode, LightSet, OutputStyle, MAX_PORTS, UNIVERSE_SIZE};
use tracing::{debug, info, trace};

/// Clock, indicator and watchdog of the host
pub struct SystemHardware {
    started: Instant,
    led_mode: LedMode,
    name: String,
}

impl SystemHardware {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            started: Instant::now(),
            led_mode: LedMode::default(),
            name: name.into(),
        }
    }

    pub fn led_mode(&self) -> LedMode {
        self.led_mode
    }
}

impl Default for SystemHardware {
    fn default() -> Self {
        Self::new("ArtNode")
    }
}

impl Hardware for SystemHardware {
    fn millis(&self) -> u32 {
        // Truncation wraps like a free-running millisecond counter
        self.started.elapsed().as_millis() as u32
    }

    fn set_led_mode(&mut self, mode: LedMode) {
        if mode != self.led_mode {
            info!("Indicator: {:?}", mode);
            self.led_mode = mode;
        }
    }

    fn watchdog_feed(&mut self) {
        trace!("watchdog");
    }

    fn system_name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone)]
struct PortOutput {
    data: Vec<u8>,
    running: bool,
    style: OutputStyle,
}

/// Output stage that keeps the last frame per port and logs transitions.
///
/// Used when the host has no DMX interface attached.
#[derive(Debug, Clone)]
pub struct LoggedLightSet {
    ports: [PortOutput; MAX_PORTS],
    blackout: bool,
}

impl Default for LoggedLightSet {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggedLightSet {
    pub fn new() -> Self {
        Self {
            ports: std::array::from_fn(|_| PortOutput {
                data: Vec::new(),
                running: false,
                style: OutputStyle::Delta,
            }),
            blackout: false,
        }
    }

    /// Frame currently driven on `port`, all zero while blacked out
    pub fn frame(&self, port: usize) -> Option<Vec<u8>> {
        let output = self.ports.get(port)?;
        if self.blackout {
            return Some(vec![0; output.data.len()]);
        }
        Some(output.data.clone())
    }

    pub fn is_running(&self, port: usize) -> bool {
        self.ports.get(port).is_some_and(|output| output.running)
    }
}

impl LightSet for LoggedLightSet {
    fn start(&mut self, port: usize) {
        if let Some(output) = self.ports.get_mut(port) {
            if !output.running {
                debug!("Output {} started", port);
            }
            output.running = true;
        }
    }

    fn stop(&mut self, port: usize) {
        if let Some(output) = self.ports.get_mut(port) {
            if output.running {
                debug!("Output {} stopped", port);
            }
            output.running = false;
        }
    }

    fn set_data(&mut self, port: usize, data: &[u8]) {
        if let Some(output) = self.ports.get_mut(port) {
            let n = data.len().min(UNIVERSE_SIZE);
            output.data.clear();
            output.data.extend_from_slice(&data[..n]);
            trace!("Output {}: {} slots", port, n);
        }
    }

    fn blackout(&mut self, blackout: bool) {
        if blackout != self.blackout {
            info!("Blackout {}", if blackout { "on" } else { "off" });
        }
        self.blackout = blackout;
    }

    fn full_on(&mut self) {
        info!("All outputs full on");
        for output in &mut self.ports {
            output.data = vec![0xFF; UNIVERSE_SIZE];
        }
    }

    fn set_output_style(&mut self, port: usize, style: OutputStyle) {
        if let Some(output) = self.ports.get_mut(port) {
            output.style = style;
        }
    }

    fn get_output_style(&self, port: usize) -> OutputStyle {
        self.ports
            .get(port)
            .map(|output| output.style)
            .unwrap_or(OutputStyle::Delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_monotonic() {
        let hardware = SystemHardware::default();
        let first = hardware.millis();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(hardware.millis() >= first + 5);
        assert_eq!(hardware.system_name(), "ArtNode");
    }

    #[test]
    fn test_led_mode_recorded() {
        let mut hardware = SystemHardware::new("rack-1");
        hardware.set_led_mode(LedMode::Fast);
        assert_eq!(hardware.led_mode(), LedMode::Fast);
        assert_eq!(hardware.system_name(), "rack-1");
    }

    #[test]
    fn test_light_set_frames() {
        let mut lights = LoggedLightSet::new();
        lights.start(0);
        lights.set_data(0, &[1, 2, 3]);
        assert!(lights.is_running(0));
        assert_eq!(lights.frame(0), Some(vec![1, 2, 3]));

        lights.blackout(true);
        assert_eq!(lights.frame(0), Some(vec![0, 0, 0]));
        lights.blackout(false);

        lights.full_on();
        assert_eq!(lights.frame(1).map(|f| f.len()), Some(UNIVERSE_SIZE));
        assert_eq!(lights.frame(MAX_PORTS), None);

        lights.set_output_style(2, OutputStyle::Constant);
        assert_eq!(lights.get_output_style(2), OutputStyle::Constant);
    }
}
