/// Version of the CoAP protocol that the message adheres to.
///
/// Only version 1 is supported; decoding any other value
/// yields [`MessageParseError::VersionMismatch`](super::MessageParseError::VersionMismatch).
///
/// See [RFC7252 - Message Details](https://datatracker.ietf.org/doc/html/rfc7252#section-3) for context
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Version(pub u8);

impl Version {
  /// The only version of CoAP in existence
  pub const V1: Version = Version(1);
}

impl Default for Version {
  fn default() -> Self {
    Version::V1
  }
}
