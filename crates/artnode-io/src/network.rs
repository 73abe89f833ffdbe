//! UDP transport on the host network stack

use std::io;
use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};

use artnode_core::{Network, SocketHandle};
use tracing::{debug, info, trace, warn};

use crate::params::InterfaceParams;

/// Non-blocking Art-Net socket.
///
/// The node's address identity (IP, netmask, MAC) comes from the params
/// file rather than from the OS, so replies describe the interface the
/// operator configured. ArtIpProg changes are applied to that identity only.
pub struct UdpNetwork {
    interface: InterfaceParams,
    socket: Option<UdpSocket>,
    next_handle: u32,
}

impl UdpNetwork {
    pub fn new(interface: InterfaceParams) -> Self {
        Self {
            interface,
            socket: None,
            next_handle: 1,
        }
    }

    pub fn interface(&self) -> &InterfaceParams {
        &self.interface
    }

    /// Local address of the bound socket
    pub fn local_addr(&self) -> Option<std::net::SocketAddr> {
        self.socket.as_ref().and_then(|socket| socket.local_addr().ok())
    }
}

impl Network for UdpNetwork {
    fn begin(&mut self, port: u16) -> io::Result<SocketHandle> {
        let socket = UdpSocket::bind(SocketAddrV4::new(self.interface.bind_ip, port))?;
        socket.set_broadcast(true)?;
        socket.set_nonblocking(true)?;
        info!("Listening on {}", socket.local_addr()?);

        self.socket = Some(socket);
        let handle = SocketHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        Ok(handle)
    }

    fn end(&mut self, _handle: SocketHandle) {
        if self.socket.take().is_some() {
            debug!("Socket closed");
        }
    }

    fn recv_from(&mut self, _handle: SocketHandle, buf: &mut [u8]) -> Option<(usize, Ipv4Addr, u16)> {
        let socket = self.socket.as_ref()?;
        match socket.recv_from(buf) {
            Ok((len, std::net::SocketAddr::V4(from))) => Some((len, *from.ip(), from.port())),
            Ok((_, from)) => {
                trace!("Dropping datagram from {}", from);
                None
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => None,
            Err(e) => {
                warn!("Receive failed: {}", e);
                None
            }
        }
    }

    fn send_to(&mut self, _handle: SocketHandle, data: &[u8], ip: Ipv4Addr, port: u16) -> io::Result<()> {
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "socket not open"))?;
        socket.send_to(data, SocketAddrV4::new(ip, port))?;
        Ok(())
    }

    fn ip(&self) -> Ipv4Addr {
        self.interface.ip
    }

    fn netmask(&self) -> Ipv4Addr {
        self.interface.netmask
    }

    fn gateway(&self) -> Ipv4Addr {
        self.interface.gateway
    }

    fn mac_address(&self) -> [u8; 6] {
        self.interface.mac
    }

    fn has_ip_privilege(&self) -> bool {
        is_privileged()
    }

    fn set_ip(&mut self, ip: Ipv4Addr) -> io::Result<()> {
        self.interface.ip = ip;
        Ok(())
    }

    fn set_netmask(&mut self, netmask: Ipv4Addr) -> io::Result<()> {
        self.interface.netmask = netmask;
        Ok(())
    }

    fn set_gateway(&mut self, gateway: Ipv4Addr) -> io::Result<()> {
        self.interface.gateway = gateway;
        Ok(())
    }
}

#[cfg(unix)]
fn is_privileged() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn is_privileged() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback() -> UdpNetwork {
        UdpNetwork::new(InterfaceParams {
            ip: Ipv4Addr::LOCALHOST,
            bind_ip: Ipv4Addr::LOCALHOST,
            ..InterfaceParams::default()
        })
    }

    #[test]
    fn test_send_and_receive_on_loopback() {
        let mut network = loopback();
        let handle = network.begin(0).unwrap();
        let port = network.local_addr().unwrap().port();

        let mut buf = [0u8; 16];
        assert!(network.recv_from(handle, &mut buf).is_none());

        network
            .send_to(handle, b"Art-Net\0", Ipv4Addr::LOCALHOST, port)
            .unwrap();
        let mut received = None;
        for _ in 0..100 {
            received = network.recv_from(handle, &mut buf);
            if received.is_some() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        let (len, from, _) = received.unwrap();
        assert_eq!(&buf[..len], b"Art-Net\0");
        assert_eq!(from, Ipv4Addr::LOCALHOST);
    }

    #[test]
    fn test_send_without_socket_fails() {
        let mut network = loopback();
        let err = network
            .send_to(SocketHandle(1), &[0], Ipv4Addr::LOCALHOST, 6454)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
    }

    #[test]
    fn test_ip_prog_updates_identity() {
        let mut network = loopback();
        network.set_ip(Ipv4Addr::new(10, 1, 2, 3)).unwrap();
        network.set_netmask(Ipv4Addr::new(255, 255, 0, 0)).unwrap();
        assert_eq!(network.ip(), Ipv4Addr::new(10, 1, 2, 3));
        assert_eq!(network.broadcast_ip(), Ipv4Addr::new(10, 1, 255, 255));
    }
}
