//! Per-port RDM controller
//!
//! Owns the physical RDM transport, one TOD and one discovery state machine
//! per port. On output ports the node is the controller on the line; on input
//! ports it answers discovery on behalf of the devices it learned from the
//! network (proxy) and hands GET/SET requests back to the node.

use tracing::{debug, trace};

use super::message::{command_class, encode_discovery_response, pid, RdmMessage, SC_RDM};
use super::{Discovery, Tod, Uid};
use crate::error::{NodeError, Result};
use crate::io::RdmTransport;
use crate::port::MAX_PORTS;

/// Bus turnaround allowed for a GET/SET response
pub const RDM_RESPONSE_TIMEOUT_MICROS: u32 = 20_000;

/// Result of feeding a frame from the line into the proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyOutcome {
    /// Discovery handled locally
    Answered,
    /// GET/SET request for a known device, to be sent to the network
    Forward(RdmMessage),
    Ignored,
}

#[derive(Debug, Clone)]
struct RdmPort {
    tod: Tod,
    discovery: Discovery,
}

pub struct RdmController {
    transport: Box<dyn RdmTransport>,
    uid: Uid,
    ports: [RdmPort; MAX_PORTS],
}

impl RdmController {
    pub fn new(transport: Box<dyn RdmTransport>, uid: Uid) -> Self {
        Self {
            transport,
            uid,
            ports: std::array::from_fn(|_| RdmPort {
                tod: Tod::new(),
                discovery: Discovery::new(uid),
            }),
        }
    }

    pub fn uid(&self) -> Uid {
        self.uid
    }

    fn port_mut(&mut self, port: usize) -> Result<&mut RdmPort> {
        self.ports.get_mut(port).ok_or(NodeError::InvalidPort(port))
    }

    /// Start a full discovery pass, clearing the TOD
    pub fn full(&mut self, port: usize) -> Result<()> {
        let state = self.port_mut(port)?;
        state.discovery.full(&mut state.tod);
        debug!("RDM port {}: full discovery", port);
        Ok(())
    }

    /// Start an incremental pass
    pub fn incremental(&mut self, port: usize) -> Result<()> {
        self.port_mut(port)?.discovery.incremental();
        debug!("RDM port {}: incremental discovery", port);
        Ok(())
    }

    pub fn stop(&mut self, port: usize) -> Result<()> {
        self.port_mut(port)?.discovery.stop();
        Ok(())
    }

    pub fn stop_all(&mut self) {
        for state in &mut self.ports {
            state.discovery.stop();
        }
    }

    pub fn is_running(&self, port: usize) -> bool {
        self.ports
            .get(port)
            .is_some_and(|state| state.discovery.is_running())
    }

    pub fn is_finished(&self, port: usize) -> bool {
        self.ports
            .get(port)
            .is_some_and(|state| state.discovery.is_finished())
    }

    /// Advance every running discovery by one bus transaction
    pub fn run(&mut self) {
        for (port, state) in self.ports.iter_mut().enumerate() {
            if state.discovery.is_running() {
                state
                    .discovery
                    .step(port, self.transport.as_mut(), &mut state.tod);
            }
        }
    }

    pub fn tod(&self, port: usize) -> Option<&Tod> {
        self.ports.get(port).map(|state| &state.tod)
    }

    pub fn tod_reset(&mut self, port: usize) -> Result<()> {
        self.port_mut(port)?.tod.reset();
        Ok(())
    }

    /// Add a UID learned from the network (ArtTodData on an input port)
    pub fn tod_add_uid(&mut self, port: usize, uid: Uid) -> Result<bool> {
        Ok(self.port_mut(port)?.tod.add_uid(uid))
    }

    /// Put a complete frame, start code included, on the line
    pub fn send_raw(&mut self, port: usize, frame: &[u8]) -> Result<()> {
        if port >= MAX_PORTS {
            return Err(NodeError::InvalidPort(port));
        }
        self.transport.send_raw(port, frame)?;
        Ok(())
    }

    pub fn receive_timeout(&mut self, port: usize, timeout_micros: u32) -> Option<Vec<u8>> {
        if port >= MAX_PORTS {
            return None;
        }
        self.transport.receive_timeout(port, timeout_micros)
    }

    /// Send an ArtRdm payload (no start code) and wait for the response
    ///
    /// The response is returned without its start code, ready for ArtRdm.
    pub fn transaction(&mut self, port: usize, packet: &[u8]) -> Result<Option<Vec<u8>>> {
        let mut frame = Vec::with_capacity(packet.len() + 1);
        frame.push(SC_RDM);
        frame.extend_from_slice(packet);
        self.send_raw(port, &frame)?;

        let response = self
            .receive_timeout(port, RDM_RESPONSE_TIMEOUT_MICROS)
            .and_then(|mut response| match response.first() {
                Some(&SC_RDM) => {
                    response.remove(0);
                    Some(response)
                }
                _ => None,
            });
        trace!(
            "RDM port {}: transaction {}",
            port,
            if response.is_some() { "answered" } else { "timed out" }
        );
        Ok(response)
    }

    /// Handle a frame received on an input port
    pub fn handle_proxy(&mut self, port: usize, frame: &[u8]) -> ProxyOutcome {
        let Some(request) = RdmMessage::decode(frame) else {
            return ProxyOutcome::Ignored;
        };
        let Some(state) = self.ports.get_mut(port) else {
            return ProxyOutcome::Ignored;
        };

        if request.command_class == command_class::DISCOVERY_COMMAND {
            let reply = match request.parameter_id {
                pid::DISC_UNIQUE_BRANCH if request.data.len() >= 2 * Uid::SIZE => {
                    let lower = Uid::from_slice(&request.data[..Uid::SIZE]).unwrap_or_default();
                    let upper = Uid::from_slice(&request.data[Uid::SIZE..]).unwrap_or_default();
                    state
                        .tod
                        .unmuted_in_range(lower.as_u64(), upper.as_u64())
                        .next()
                        .map(|uid| encode_discovery_response(&uid).to_vec())
                }
                pid::DISC_MUTE | pid::DISC_UN_MUTE => {
                    let mute = request.parameter_id == pid::DISC_MUTE;
                    if request.destination.is_broadcast() {
                        if mute {
                            for uid in state.tod.to_vec() {
                                state.tod.mute(&uid);
                            }
                        } else {
                            state.tod.unmute_all();
                        }
                        None
                    } else {
                        let known = if mute {
                            state.tod.mute(&request.destination)
                        } else {
                            state.tod.unmute(&request.destination)
                        };
                        known.then(|| request.response(request.destination, vec![0, 0]).encode())
                    }
                }
                _ => return ProxyOutcome::Ignored,
            };

            if let Some(reply) = reply {
                if let Err(e) = self.transport.send_raw(port, &reply) {
                    debug!("RDM port {}: proxy reply failed: {}", port, e);
                }
            }
            return ProxyOutcome::Answered;
        }

        if request.is_get_set_command()
            && (request.destination.is_broadcast() || state.tod.exists(&request.destination))
        {
            return ProxyOutcome::Forward(request);
        }
        ProxyOutcome::Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdm::message::decode_discovery_response;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::io;
    use std::rc::Rc;

    #[derive(Default)]
    struct Bus {
        sent: Vec<(usize, Vec<u8>)>,
        replies: VecDeque<Vec<u8>>,
    }

    struct SharedBus(Rc<RefCell<Bus>>);

    impl RdmTransport for SharedBus {
        fn send_raw(&mut self, port: usize, data: &[u8]) -> io::Result<()> {
            self.0.borrow_mut().sent.push((port, data.to_vec()));
            Ok(())
        }

        fn receive_timeout(&mut self, _port: usize, _timeout_micros: u32) -> Option<Vec<u8>> {
            self.0.borrow_mut().replies.pop_front()
        }
    }

    const CONTROLLER: Uid = Uid::new([0x7F, 0xF0, 0, 0, 0, 1]);

    fn controller() -> (RdmController, Rc<RefCell<Bus>>) {
        let bus = Rc::new(RefCell::new(Bus::default()));
        let rdm = RdmController::new(Box::new(SharedBus(bus.clone())), Uid::from_u64(0x4150_0000_0001));
        (rdm, bus)
    }

    #[test]
    fn test_transaction_strips_start_code() {
        let (mut rdm, bus) = controller();
        let request = RdmMessage {
            command_class: command_class::GET_COMMAND,
            ..RdmMessage::discovery(Uid::from_u64(7), CONTROLLER, 1, 0x0060)
        };
        let response = request.response(Uid::from_u64(7), vec![1]).encode();
        bus.borrow_mut().replies.push_back(response.clone());

        let frame = request.encode();
        let answer = rdm.transaction(2, &frame[1..]).unwrap();
        assert_eq!(answer.as_deref(), Some(&response[1..]));
        assert_eq!(bus.borrow().sent[0], (2, frame));
    }

    #[test]
    fn test_transaction_timeout() {
        let (mut rdm, _bus) = controller();
        assert_eq!(rdm.transaction(0, &[0x01, 0x18]).unwrap(), None);
        assert!(rdm.transaction(MAX_PORTS, &[0x01]).is_err());
    }

    #[test]
    fn test_proxy_answers_discovery_from_tod() {
        let (mut rdm, bus) = controller();
        rdm.tod_add_uid(1, Uid::from_u64(0x100)).unwrap();
        rdm.tod_add_uid(1, Uid::from_u64(0x200)).unwrap();

        let branch = RdmMessage::unique_branch(CONTROLLER, 0, Uid::from_u64(0x150), Uid::from_u64(0x250));
        assert_eq!(rdm.handle_proxy(1, &branch.encode()), ProxyOutcome::Answered);
        let reply = bus.borrow_mut().sent.pop().unwrap();
        assert_eq!(decode_discovery_response(&reply.1), Some(Uid::from_u64(0x200)));

        let mute = RdmMessage::discovery(Uid::from_u64(0x200), CONTROLLER, 1, pid::DISC_MUTE);
        assert_eq!(rdm.handle_proxy(1, &mute.encode()), ProxyOutcome::Answered);
        let ack = RdmMessage::decode(&bus.borrow_mut().sent.pop().unwrap().1).unwrap();
        assert_eq!(ack.source, Uid::from_u64(0x200));
        assert_eq!(ack.command_class, command_class::DISCOVERY_COMMAND_RESPONSE);

        // Muted devices stay silent
        assert_eq!(rdm.handle_proxy(1, &branch.encode()), ProxyOutcome::Answered);
        assert!(bus.borrow().sent.is_empty());
    }

    #[test]
    fn test_proxy_forwards_known_get() {
        let (mut rdm, _bus) = controller();
        rdm.tod_add_uid(0, Uid::from_u64(0x100)).unwrap();
        let get = RdmMessage {
            command_class: command_class::GET_COMMAND,
            ..RdmMessage::discovery(Uid::from_u64(0x100), CONTROLLER, 4, 0x0060)
        };
        assert_eq!(rdm.handle_proxy(0, &get.encode()), ProxyOutcome::Forward(get));

        let unknown = RdmMessage {
            command_class: command_class::GET_COMMAND,
            ..RdmMessage::discovery(Uid::from_u64(0x999), CONTROLLER, 4, 0x0060)
        };
        assert_eq!(rdm.handle_proxy(0, &unknown.encode()), ProxyOutcome::Ignored);
        assert_eq!(rdm.handle_proxy(0, &[0xCC, 0x01]), ProxyOutcome::Ignored);
    }

    #[test]
    fn test_invalid_port() {
        let (mut rdm, _bus) = controller();
        assert!(rdm.full(MAX_PORTS).is_err());
        assert!(rdm.tod(MAX_PORTS).is_none());
        assert!(!rdm.is_running(MAX_PORTS));
    }

    #[test]
    fn test_run_on_empty_line_finishes() {
        let (mut rdm, _bus) = controller();
        rdm.full(3).unwrap();
        assert!(rdm.is_running(3));
        for _ in 0..16 {
            rdm.run();
        }
        assert!(rdm.is_finished(3));
        assert!(!rdm.is_finished(0));
        assert!(rdm.tod(3).unwrap().is_empty());
    }
}
