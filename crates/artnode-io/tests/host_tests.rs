use std::io;
use std::net::Ipv4Addr;

use artnode_core::packets::address::command;
use artnode_core::packets::{ArtAddress, ArtDmx, PacketBuffer, MAX_PACKET_SIZE};
use artnode_core::{
    ArtNetNode, FailSafe, Network, NodeConfig, PortDirection, PortParams, SocketHandle,
    FAILSAFE_STORE_SIZE,
};
use artnode_io::{
    FileFailSafeStore, InterfaceParams, LoggedLightSet, NodeParams, ParamsStore, SystemHardware,
};
use tempfile::TempDir;

const CONTROLLER: Ipv4Addr = Ipv4Addr::new(2, 0, 0, 50);

/// Network that accepts every send and never receives
struct SilentNetwork(InterfaceParams);

impl Network for SilentNetwork {
    fn begin(&mut self, _port: u16) -> io::Result<SocketHandle> {
        Ok(SocketHandle(1))
    }

    fn recv_from(&mut self, _handle: SocketHandle, _buf: &mut [u8]) -> Option<(usize, Ipv4Addr, u16)> {
        None
    }

    fn send_to(&mut self, _handle: SocketHandle, _data: &[u8], _ip: Ipv4Addr, _port: u16) -> io::Result<()> {
        Ok(())
    }

    fn ip(&self) -> Ipv4Addr {
        self.0.ip
    }

    fn netmask(&self) -> Ipv4Addr {
        self.0.netmask
    }

    fn mac_address(&self) -> [u8; 6] {
        self.0.mac
    }
}

fn encode(f: impl FnOnce(&mut PacketBuffer) -> usize) -> Vec<u8> {
    let mut buf = Box::new([0u8; MAX_PACKET_SIZE]);
    let len = f(&mut buf);
    buf[..len].to_vec()
}

fn node_with_params(dir: &TempDir) -> (ArtNetNode, std::path::PathBuf) {
    let path = dir.path().join("node.ron");
    let mut params = NodeParams::new(NodeConfig {
        ports: vec![PortParams {
            direction: PortDirection::Output,
            universe: 0x0001,
            ..PortParams::default()
        }],
        ..NodeConfig::default()
    });
    params.save(&path).unwrap();

    let params = NodeParams::load(&path).unwrap();
    let mut node = ArtNetNode::new(
        &params.node,
        Box::new(SilentNetwork(params.interface.clone())),
        Box::new(LoggedLightSet::new()),
        Box::new(SystemHardware::default()),
    )
    .unwrap();
    node.set_node_store(Box::new(ParamsStore::new(&path, params)));
    node.set_failsafe_store(Box::new(FileFailSafeStore::new(dir.path().join("failsafe.bin"))));
    node.start().unwrap();
    (node, path)
}

#[test]
fn test_remote_programming_persisted() {
    let dir = TempDir::new().unwrap();
    let (mut node, path) = node_with_params(&dir);

    let mut address = ArtAddress {
        bind_index: 1,
        command: command::FAIL_ZERO,
        ..ArtAddress::default()
    };
    address.short_name[..6].copy_from_slice(b"Rack 7");
    address.sw_out[0] = 0x85;
    node.process(&encode(|buf| address.encode(buf)), CONTROLLER);

    let saved = NodeParams::load(&path).unwrap();
    assert_eq!(saved.node.short_name, "Rack 7");
    assert_eq!(saved.node.ports[0].universe, 0x0005);
    assert_eq!(saved.node.failsafe, FailSafe::Off);
}

#[test]
fn test_failsafe_scene_written_to_file() {
    let dir = TempDir::new().unwrap();
    let (mut node, _path) = node_with_params(&dir);

    let frame = encode(|buf| {
        ArtDmx {
            sequence: 1,
            physical: 0,
            port_address: 0x0001,
            data: &[40, 50],
        }
        .encode(buf)
    });
    node.process(&frame, CONTROLLER);
    node.failsafe_record().unwrap();

    let scene = std::fs::read(dir.path().join("failsafe.bin")).unwrap();
    assert_eq!(scene.len(), FAILSAFE_STORE_SIZE);
    assert_eq!(&scene[..3], &[40, 50, 0]);
}
