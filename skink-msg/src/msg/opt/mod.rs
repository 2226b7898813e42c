use std_alloc::string::String;
use std_alloc::vec::Vec;

use toad_cursor::Cursor;
use crate::to_bytes::{opt_len_or_delta, OptToBytesError};

/// Option parsing errors
pub mod parse_error;
pub use parse_error::*;

/// Well-known option numbers & values
pub mod known;
pub use known::{ContentFormat, NoResponse, UnsupportedMediaType};

/// Ordered collection of options
pub mod options;
pub use options::*;

/// Typed view of the options in a message
pub mod headers;
pub use headers::*;

pub(crate) fn parse_opt_len_or_delta<A: AsRef<[u8]>>(head: u8,
                                                     bytes: &mut Cursor<A>,
                                                     reserved_err: OptParseError)
                                                     -> Result<u32, OptParseError> {
  match head {
    | 13 => {
      let n = bytes.next().ok_or_else(OptParseError::eof)?;
      Ok((n as u32) + 13)
    },
    | 14 => match bytes.take_exact(2) {
      | Some(&[a, b]) => Ok(u16::from_be_bytes([a, b]) as u32 + 269),
      | _ => Err(OptParseError::eof()),
    },
    | 15 => Err(reserved_err),
    | _ => Ok(head as u32),
  }
}

/// # Option Number
///
/// Identifies which option is being set (e.g. Content-Format has a Number of 12).
///
/// On the wire only the difference from the previous option's number is sent;
/// see [`Opt`].
///
/// The low bits of the number encode how unknown options must be treated:
///
/// ```text
///   0   1   2   3   4   5   6   7
/// +---+---+---+---+---+---+---+---+
/// |           | NoCacheKey| U | C |
/// +---+---+---+---+---+---+---+---+
/// ```
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct OptNumber(pub u32);

/// The kind of value an option carries, determined by its number
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum OptFormat {
  /// Zero-length
  Empty,
  /// Arbitrary bytes
  Opaque,
  /// Non-negative big-endian integer, 0-4 bytes, leading zeros stripped
  Uint,
  /// UTF-8 text
  String,
}

impl OptNumber {
  /// Critical options must be understood by the recipient,
  /// elective options may be ignored.
  pub fn is_critical(&self) -> bool {
    self.0 & 0b1 == 1
  }

  /// Unsafe options may not be forwarded blindly by a proxy
  /// that does not understand them.
  pub fn is_unsafe(&self) -> bool {
    self.0 & 0b10 == 0b10
  }

  /// Safe-to-forward options that are not part of the cache key
  pub fn is_no_cache_key(&self) -> bool {
    self.0 & 0b11110 == 0b11100
  }

  /// The kind of value this option carries.
  ///
  /// Options we do not know of are treated as opaque bytes.
  ///
  /// ```
  /// use skink_msg::{known, OptFormat, OptNumber};
  ///
  /// assert_eq!(known::no_repeat::CONTENT_FORMAT.format(), OptFormat::Uint);
  /// assert_eq!(known::repeat::PATH.format(), OptFormat::String);
  /// assert_eq!(OptNumber(2048).format(), OptFormat::Opaque);
  /// ```
  pub fn format(&self) -> OptFormat {
    use known::no_repeat::*;
    use known::repeat::*;

    match *self {
      | IF_NONE_MATCH => OptFormat::Empty,
      | IF_MATCH | ETAG => OptFormat::Opaque,
      | OBSERVE | PORT | CONTENT_FORMAT | MAX_AGE | ACCEPT | SIZE1 | NO_RESPONSE => OptFormat::Uint,
      | HOST | LOCATION_PATH | PATH | QUERY | LOCATION_QUERY | PROXY_URI | PROXY_SCHEME => {
        OptFormat::String
      },
      | _ => OptFormat::Opaque,
    }
  }
}

/// The value of an option, typed by the option's [`OptFormat`]
#[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum OptValue {
  /// No value
  Empty,
  /// An unsigned integer
  Uint(u32),
  /// A string
  String(String),
  /// Bytes
  Opaque(Vec<u8>),
}

impl Default for OptValue {
  fn default() -> Self {
    OptValue::Empty
  }
}

impl OptValue {
  fn decode(format: OptFormat, bytes: &[u8]) -> Result<Self, OptParseError> {
    match format {
      | OptFormat::Empty if bytes.is_empty() => Ok(OptValue::Empty),
      | OptFormat::Empty | OptFormat::Opaque => Ok(OptValue::Opaque(bytes.to_vec())),
      | OptFormat::Uint if bytes.len() > 4 => Err(OptParseError::UintTooWide(bytes.len())),
      | OptFormat::Uint => Ok(OptValue::Uint(bytes.iter()
                                                  .fold(0u32, |n, b| (n << 8) | *b as u32))),
      | OptFormat::String => core::str::from_utf8(bytes).map(|s| OptValue::String(s.into()))
                                                        .map_err(|_| OptParseError::InvalidUtf8),
    }
  }

  /// Wire representation of this value
  ///
  /// ```
  /// use skink_msg::OptValue;
  ///
  /// assert_eq!(OptValue::Uint(0).to_bytes(), Vec::<u8>::new());
  /// assert_eq!(OptValue::Uint(0x0102).to_bytes(), vec![1, 2]);
  /// assert_eq!(OptValue::String("a".into()).to_bytes(), vec![b'a']);
  /// ```
  pub fn to_bytes(&self) -> Vec<u8> {
    match self {
      | OptValue::Empty => Vec::new(),
      | OptValue::Uint(n) => {
        let bytes = n.to_be_bytes();
        let skip = bytes.iter().take_while(|b| **b == 0).count();
        bytes[skip..].to_vec()
      },
      | OptValue::String(s) => s.as_bytes().to_vec(),
      | OptValue::Opaque(bs) => bs.clone(),
    }
  }

  /// Get the integer in this value, if it is a [`OptValue::Uint`]
  pub fn as_uint(&self) -> Option<u32> {
    match self {
      | OptValue::Uint(n) => Some(*n),
      | _ => None,
    }
  }

  /// Get the string in this value, if it is a [`OptValue::String`]
  pub fn as_str(&self) -> Option<&str> {
    match self {
      | OptValue::String(s) => Some(s.as_str()),
      | _ => None,
    }
  }

  /// Get the bytes in this value, if it is [`OptValue::Opaque`]
  pub fn as_opaque(&self) -> Option<&[u8]> {
    match self {
      | OptValue::Opaque(bs) => Some(bs.as_slice()),
      | _ => None,
    }
  }
}

/// # Option
///
/// A (number, value) pair.
///
/// On the wire an option looks like this:
///
/// ```text
///   0   1   2   3   4   5   6   7
/// +---------------+---------------+
/// |               |               |
/// |  Option Delta | Option Length |   1 byte
/// |               |               |
/// +---------------+---------------+
/// \                               \
/// /         Option Delta          /   0-2 bytes
/// \          (extended)           \
/// +-------------------------------+
/// \                               \
/// /         Option Length         /   0-2 bytes
/// \          (extended)           \
/// +-------------------------------+
/// \                               \
/// /                               /
/// \                               \
/// /         Option Value          /   0 or more bytes
/// \                               \
/// /                               /
/// \                               \
/// +-------------------------------+
/// ```
///
/// where the delta is the difference between this option's number and
/// the previous option's, and delta & length nibbles of 13 and 14
/// mean "1 extra byte, plus 13" and "2 extra bytes, plus 269".
#[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Opt {
  /// See [`OptNumber`]
  pub number: OptNumber,
  /// See [`OptValue`]
  pub value: OptValue,
}

impl Opt {
  /// Create a new Opt
  pub fn new(number: OptNumber, value: OptValue) -> Self {
    Self { number, value }
  }

  /// Parse an option following the option numbered `prev`.
  ///
  /// Yields [`OptParseError::OptionsExhausted`] when the cursor is
  /// exhausted or positioned on the payload marker, consuming the marker.
  pub(crate) fn try_consume_bytes<A: AsRef<[u8]>>(prev: OptNumber,
                                                  bytes: &mut Cursor<A>)
                                                  -> Result<Self, OptParseError> {
    let byte1 = bytes.next()
                     .ok_or(OptParseError::OptionsExhausted)
                     .and_then(|b| {
                       if b == 0b11111111 {
                         Err(OptParseError::OptionsExhausted)
                       } else {
                         Ok(b)
                       }
                     })?;

    // extended delta bytes precede extended length bytes
    let delta = parse_opt_len_or_delta(byte1 >> 4,
                                       bytes,
                                       OptParseError::OptionDeltaReservedValue(15))?;

    let len = parse_opt_len_or_delta(byte1 & 0b00001111,
                                     bytes,
                                     OptParseError::ValueLengthReservedValue(15))?
              as usize;

    let remaining = bytes.remaining();
    let value_bytes =
      bytes.take_exact(len)
           .ok_or(OptParseError::ValueRunsPastEnd { declared: len,
                                                    remaining })?;

    let number = prev.0
                     .checked_add(delta)
                     .map(OptNumber)
                     .ok_or(OptParseError::NumberOverflow { prev: prev.0,
                                                            delta })?;
    let value = OptValue::decode(number.format(), value_bytes)?;

    Ok(Opt { number, value })
  }

  /// Given a byte buffer and the number of the option written before this one,
  /// add this Opt's bytes to the buffer.
  pub fn extend_bytes(&self,
                      prev: OptNumber,
                      bytes: &mut Vec<u8>)
                      -> Result<(), OptToBytesError> {
    let delta = self.number
                    .0
                    .checked_sub(prev.0)
                    .ok_or(OptToBytesError::OutOfOrder { prev: prev.0,
                                                         number: self.number.0 })?;
    let value = self.value.to_bytes();

    let (del, del_bytes) =
      opt_len_or_delta(delta).ok_or(OptToBytesError::DeltaTooLarge(delta))?;
    let (len, len_bytes) =
      opt_len_or_delta(value.len() as u32).ok_or(OptToBytesError::ValueTooLong(value.len()))?;

    bytes.push((del << 4) | len);
    bytes.extend(del_bytes);
    bytes.extend(len_bytes);
    bytes.extend(value);

    Ok(())
  }
}
