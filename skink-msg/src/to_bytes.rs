use core::fmt;

use std_alloc::vec::Vec;
use tinyvec::ArrayVec;

use crate::*;

/// Largest delta or length the extended option encoding can carry
pub const MAX_OPT_EXTENDED: u32 = u16::MAX as u32 + 269;

/// Trait allowing fallible conversion into bytes
pub trait TryIntoBytes {
  /// Error type yielded if conversion fails
  type Error;

  /// Try to convert into a collection of bytes
  ///
  /// ```
  /// use skink_msg::*;
  ///
  /// let msg = Message::new(Type::Con, Code::GET, Id(1), Token::default());
  /// let bytes: Vec<u8> = msg.try_into_bytes().unwrap();
  /// assert_eq!(bytes, vec![0b_01_00_0000, 0b000_00001, 0, 1]);
  /// ```
  fn try_into_bytes(&self) -> Result<Vec<u8>, Self::Error>;
}

/// Errors encounterable serializing an option to bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OptToBytesError {
  /// The difference between this option's number and the previous
  /// one's is larger than [`MAX_OPT_EXTENDED`]
  DeltaTooLarge(u32),
  /// The option value is longer than [`MAX_OPT_EXTENDED`]
  ValueTooLong(usize),
  /// An option was written after an option with a larger number
  #[allow(missing_docs)]
  OutOfOrder { prev: u32, number: u32 },
}

impl fmt::Display for OptToBytesError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Self::DeltaTooLarge(d) => write!(f, "option delta {} exceeds {}", d, MAX_OPT_EXTENDED),
      | Self::ValueTooLong(n) => write!(f, "option value of {} bytes exceeds {}", n, MAX_OPT_EXTENDED),
      | Self::OutOfOrder { prev, number } => {
        write!(f, "option {} written after option {}", number, prev)
      },
    }
  }
}

#[cfg(feature = "std")]
impl std::error::Error for OptToBytesError {}

/// Errors encounterable serializing to bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageToBytesError {
  /// An option could not be serialized
  Opt(OptToBytesError),
}

impl fmt::Display for MessageToBytesError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Self::Opt(e) => write!(f, "invalid option: {}", e),
    }
  }
}

#[cfg(feature = "std")]
impl std::error::Error for MessageToBytesError {}

impl TryIntoBytes for Message {
  type Error = MessageToBytesError;

  fn try_into_bytes(&self) -> Result<Vec<u8>, Self::Error> {
    let mut bytes = Vec::with_capacity(4 + self.token.len() + 1 + self.payload.0.len());

    let byte1: u8 = Byte1 { tkl: self.token.len() as u8,
                            ver: self.ver,
                            ty: self.ty }.into();
    let code: u8 = self.code.into();
    let id: [u8; 2] = self.id.into();

    bytes.push(byte1);
    bytes.push(code);

    bytes.extend(id);
    bytes.extend(self.token.as_bytes());

    self.opts
        .extend_bytes(&mut bytes)
        .map_err(MessageToBytesError::Opt)?;

    if !self.payload.0.is_empty() {
      bytes.push(0b11111111);
      bytes.extend(&self.payload.0);
    }

    Ok(bytes)
  }
}

/// Encode an option delta or length as its 4-bit nibble plus 0-2 extended bytes,
/// yielding `None` if `val` is too large to represent.
pub(crate) fn opt_len_or_delta(val: u32) -> Option<(u8, ArrayVec<[u8; 2]>)> {
  let mut bytes = ArrayVec::new();
  match val {
    | n if n > MAX_OPT_EXTENDED => None,
    | n if n >= 269 => {
      bytes.extend(((n - 269) as u16).to_be_bytes());
      Some((14, bytes))
    },
    | n if n >= 13 => {
      bytes.push((n - 13) as u8);
      Some((13, bytes))
    },
    | n => Some((n as u8, bytes)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{assert_eqb, assert_eqb_iter};

  #[test]
  fn msg() {
    let (m, expected) = crate::test_msg();
    let actual = m.try_into_bytes().unwrap();
    assert_eqb_iter!(actual, expected);
  }

  #[test]
  fn byte_1() {
    let byte = Byte1 { ver: Version(1),
                       ty: Type::Ack,
                       tkl: 3 };
    let actual: u8 = byte.into();
    let expected = 0b_01_10_0011u8;
    assert_eqb!(actual, expected)
  }

  #[test]
  fn code() {
    let code = Code { class: 2,
                      detail: 5 };
    let actual: u8 = code.into();
    let expected = 0b_010_00101_u8;
    assert_eqb!(actual, expected)
  }

  #[test]
  fn id() {
    let id = Id(16);
    let actual = u16::from_be_bytes(id.into());
    assert_eqb!(actual, 16)
  }

  #[test]
  fn len_or_delta() {
    assert_eq!(opt_len_or_delta(12).map(|(n, bs)| (n, bs.to_vec())), Some((12, vec![])));
    assert_eq!(opt_len_or_delta(13).map(|(n, bs)| (n, bs.to_vec())), Some((13, vec![0])));
    assert_eq!(opt_len_or_delta(268).map(|(n, bs)| (n, bs.to_vec())), Some((13, vec![255])));
    assert_eq!(opt_len_or_delta(269).map(|(n, bs)| (n, bs.to_vec())), Some((14, vec![0, 0])));
    assert_eq!(opt_len_or_delta(MAX_OPT_EXTENDED).map(|(n, bs)| (n, bs.to_vec())),
               Some((14, vec![255, 255])));
    assert_eq!(opt_len_or_delta(MAX_OPT_EXTENDED + 1), None);
  }

  #[test]
  fn opt_error_surfaces() {
    let mut msg = Message::default();
    msg.opts.push(OptNumber(MAX_OPT_EXTENDED + 1), OptValue::Empty);
    assert_eq!(msg.try_into_bytes(),
               Err(MessageToBytesError::Opt(OptToBytesError::DeltaTooLarge(MAX_OPT_EXTENDED + 1))));
  }
}
