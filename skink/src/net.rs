/// A datagram pipe to a single peer
///
/// Sessions own exactly one transport; addressing is
/// the transport's concern, so datagrams carry no address.
///
/// Operations are non-blocking; implementors yield
/// [`nb::Error::WouldBlock`] when nothing can be done right now.
pub trait Transport {
  /// The error yielded by transport operations
  type Error: core::fmt::Debug;

  /// Prepare the transport for use.
  ///
  /// Defaults to a no-op.
  fn open(&self) -> Result<(), Self::Error> {
    Ok(())
  }

  /// Release resources held by the transport.
  ///
  /// Defaults to a no-op.
  fn close(&self) -> Result<(), Self::Error> {
    Ok(())
  }

  /// Send a datagram
  fn send(&self, dgram: &[u8]) -> nb::Result<(), Self::Error>;

  /// Receive a datagram into `buf`, yielding the number of bytes written
  fn recv(&self, buf: &mut [u8]) -> nb::Result<usize, Self::Error>;
}

impl<T: Transport> Transport for &T {
  type Error = T::Error;

  fn open(&self) -> Result<(), Self::Error> {
    T::open(self)
  }

  fn close(&self) -> Result<(), Self::Error> {
    T::close(self)
  }

  fn send(&self, dgram: &[u8]) -> nb::Result<(), Self::Error> {
    T::send(self, dgram)
  }

  fn recv(&self, buf: &mut [u8]) -> nb::Result<usize, Self::Error> {
    T::recv(self, buf)
  }
}
