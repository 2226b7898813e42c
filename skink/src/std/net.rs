use std::io;
use std::net::{ToSocketAddrs, UdpSocket};

use crate::net::Transport;

fn io_to_nb(err: io::Error) -> nb::Error<io::Error> {
  match err.kind() {
    | io::ErrorKind::WouldBlock => nb::Error::WouldBlock,
    | _ => nb::Error::Other(err),
  }
}

/// [`Transport`] over a non-blocking UDP socket connected to one peer
#[derive(Debug)]
pub struct UdpTransport(UdpSocket);

impl UdpTransport {
  /// Bind to `local` and connect to `peer`
  pub fn connect<A: ToSocketAddrs, B: ToSocketAddrs>(local: A, peer: B) -> io::Result<Self> {
    let sock = UdpSocket::bind(local)?;
    sock.connect(peer)?;
    Self::try_from(sock)
  }

  /// Borrow the socket
  pub fn socket(&self) -> &UdpSocket {
    &self.0
  }
}

impl TryFrom<UdpSocket> for UdpTransport {
  type Error = io::Error;

  /// Wrap an already-connected socket, switching it to non-blocking mode
  fn try_from(sock: UdpSocket) -> io::Result<Self> {
    sock.set_nonblocking(true)?;
    Ok(Self(sock))
  }
}

impl Transport for UdpTransport {
  type Error = io::Error;

  fn send(&self, dgram: &[u8]) -> nb::Result<(), io::Error> {
    self.0.send(dgram).map(|_| ()).map_err(io_to_nb)
  }

  fn recv(&self, buf: &mut [u8]) -> nb::Result<usize, io::Error> {
    self.0.recv(buf).map_err(io_to_nb)
  }
}
