//! Mock collaborators shared by the integration tests
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::net::Ipv4Addr;
use std::rc::Rc;

use artnode_core::packets::{decode_header, OpCode, PacketBuffer, MAX_PACKET_SIZE};
use artnode_core::{
    ArtNetNode, Hardware, LedMode, LightSet, Network, NodeConfig, PortDirection, PortParams,
    RdmTransport, SocketHandle, UNIVERSE_SIZE,
};

pub const NODE_IP: Ipv4Addr = Ipv4Addr::new(2, 0, 0, 10);
pub const NODE_MAC: [u8; 6] = [0x00, 0x50, 0xC2, 0x00, 0x00, 0x64];
pub const BROADCAST: Ipv4Addr = Ipv4Addr::new(2, 255, 255, 255);
pub const CONTROLLER_A: Ipv4Addr = Ipv4Addr::new(2, 0, 0, 1);
pub const CONTROLLER_B: Ipv4Addr = Ipv4Addr::new(2, 0, 0, 2);
pub const CONTROLLER_C: Ipv4Addr = Ipv4Addr::new(2, 0, 0, 3);

#[derive(Debug, Default)]
pub struct NetState {
    pub sent: Vec<(Ipv4Addr, Vec<u8>)>,
    pub ip: Option<Ipv4Addr>,
    pub netmask: Option<Ipv4Addr>,
    pub privileged: bool,
}

pub struct MockNetwork(pub Rc<RefCell<NetState>>);

impl Network for MockNetwork {
    fn begin(&mut self, _port: u16) -> io::Result<SocketHandle> {
        Ok(SocketHandle(1))
    }

    fn recv_from(&mut self, _handle: SocketHandle, _buf: &mut [u8]) -> Option<(usize, Ipv4Addr, u16)> {
        None
    }

    fn send_to(&mut self, _handle: SocketHandle, data: &[u8], ip: Ipv4Addr, _port: u16) -> io::Result<()> {
        self.0.borrow_mut().sent.push((ip, data.to_vec()));
        Ok(())
    }

    fn ip(&self) -> Ipv4Addr {
        self.0.borrow().ip.unwrap_or(NODE_IP)
    }

    fn netmask(&self) -> Ipv4Addr {
        self.0.borrow().netmask.unwrap_or(Ipv4Addr::new(255, 0, 0, 0))
    }

    fn mac_address(&self) -> [u8; 6] {
        NODE_MAC
    }

    fn has_ip_privilege(&self) -> bool {
        self.0.borrow().privileged
    }

    fn set_ip(&mut self, ip: Ipv4Addr) -> io::Result<()> {
        self.0.borrow_mut().ip = Some(ip);
        Ok(())
    }

    fn set_netmask(&mut self, netmask: Ipv4Addr) -> io::Result<()> {
        self.0.borrow_mut().netmask = Some(netmask);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct LightState {
    pub data: HashMap<usize, Vec<u8>>,
    pub running: HashMap<usize, bool>,
    pub starts: usize,
    pub stops: usize,
    pub blackout: bool,
    pub full_on: usize,
}

pub struct MockLightSet(pub Rc<RefCell<LightState>>);

impl LightSet for MockLightSet {
    fn start(&mut self, port: usize) {
        let mut state = self.0.borrow_mut();
        state.running.insert(port, true);
        state.starts += 1;
    }

    fn stop(&mut self, port: usize) {
        let mut state = self.0.borrow_mut();
        state.running.insert(port, false);
        state.stops += 1;
    }

    fn set_data(&mut self, port: usize, data: &[u8]) {
        self.0.borrow_mut().data.insert(port, data.to_vec());
    }

    fn blackout(&mut self, blackout: bool) {
        self.0.borrow_mut().blackout = blackout;
    }

    fn full_on(&mut self) {
        self.0.borrow_mut().full_on += 1;
    }
}

pub struct MockHardware {
    pub clock: Rc<Cell<u32>>,
    pub leds: Rc<RefCell<Vec<LedMode>>>,
}

impl Hardware for MockHardware {
    fn millis(&self) -> u32 {
        self.clock.get()
    }

    fn set_led_mode(&mut self, mode: LedMode) {
        self.leds.borrow_mut().push(mode);
    }
}

/// RDM line with responders that answer GET requests with an ACK
#[derive(Debug, Default)]
pub struct LineState {
    pub sent: Vec<(usize, Vec<u8>)>,
    pub replies: VecDeque<Vec<u8>>,
    pub incoming: VecDeque<(usize, Vec<u8>)>,
}

pub struct MockRdmLine(pub Rc<RefCell<LineState>>);

impl RdmTransport for MockRdmLine {
    fn send_raw(&mut self, port: usize, data: &[u8]) -> io::Result<()> {
        self.0.borrow_mut().sent.push((port, data.to_vec()));
        Ok(())
    }

    fn receive_timeout(&mut self, port: usize, timeout_micros: u32) -> Option<Vec<u8>> {
        let mut state = self.0.borrow_mut();
        if timeout_micros == 0 {
            let index = state.incoming.iter().position(|(p, _)| *p == port)?;
            return state.incoming.remove(index).map(|(_, frame)| frame);
        }
        state.replies.pop_front()
    }
}

pub struct Harness {
    pub node: ArtNetNode,
    pub net: Rc<RefCell<NetState>>,
    pub light: Rc<RefCell<LightState>>,
    pub clock: Rc<Cell<u32>>,
    pub leds: Rc<RefCell<Vec<LedMode>>>,
}

impl Harness {
    pub fn new(config: &NodeConfig) -> Self {
        let net = Rc::new(RefCell::new(NetState::default()));
        let light = Rc::new(RefCell::new(LightState::default()));
        let clock = Rc::new(Cell::new(1_000));
        let leds = Rc::new(RefCell::new(Vec::new()));
        let node = ArtNetNode::new(
            config,
            Box::new(MockNetwork(net.clone())),
            Box::new(MockLightSet(light.clone())),
            Box::new(MockHardware {
                clock: clock.clone(),
                leds: leds.clone(),
            }),
        )
        .expect("valid configuration");
        Self {
            node,
            net,
            light,
            clock,
            leds,
        }
    }

    /// Started node with the start-up broadcast discarded
    pub fn started(config: &NodeConfig) -> Self {
        let mut harness = Self::new(config);
        harness.node.start().expect("node starts");
        harness.take_sent();
        harness
    }

    pub fn advance(&self, millis: u32) {
        self.clock.set(self.clock.get().wrapping_add(millis));
    }

    pub fn now(&self) -> u32 {
        self.clock.get()
    }

    pub fn receive(&mut self, packet: &[u8], from: Ipv4Addr) {
        self.node.process(packet, from);
    }

    pub fn tick(&mut self) {
        self.node.process(&[], Ipv4Addr::UNSPECIFIED);
    }

    pub fn take_sent(&self) -> Vec<(Ipv4Addr, Vec<u8>)> {
        std::mem::take(&mut self.net.borrow_mut().sent)
    }

    /// Sent packets with the given OpCode
    pub fn take_sent_op(&self, op: OpCode) -> Vec<(Ipv4Addr, Vec<u8>)> {
        self.take_sent()
            .into_iter()
            .filter(|(_, data)| decode_header(data) == Some(op))
            .collect()
    }

    pub fn output(&self, port: usize) -> Vec<u8> {
        self.light.borrow().data.get(&port).cloned().unwrap_or_default()
    }
}

pub fn output_port(universe: u16) -> PortParams {
    PortParams {
        direction: PortDirection::Output,
        universe,
        ..PortParams::default()
    }
}

pub fn input_port(universe: u16) -> PortParams {
    PortParams {
        direction: PortDirection::Input,
        universe,
        ..PortParams::default()
    }
}

pub fn config_with(ports: Vec<PortParams>) -> NodeConfig {
    NodeConfig {
        ports,
        ..NodeConfig::default()
    }
}

pub fn buffer() -> Box<PacketBuffer> {
    Box::new([0; MAX_PACKET_SIZE])
}

/// Encode a packet through its `encode(&mut PacketBuffer) -> usize`
pub fn encode(f: impl FnOnce(&mut PacketBuffer) -> usize) -> Vec<u8> {
    let mut buf = buffer();
    let len = f(&mut buf);
    buf[..len].to_vec()
}

pub fn dmx(universe: u16, data: &[u8]) -> Vec<u8> {
    encode(|buf| {
        artnode_core::packets::ArtDmx {
            sequence: 0,
            physical: 0,
            port_address: universe,
            data,
        }
        .encode(buf)
    })
}

pub fn frame(value: u8) -> Vec<u8> {
    vec![value; UNIVERSE_SIZE]
}
