use core::fmt;

/// Errors encounterable while parsing an option from bytes
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Eq, Ord)]
pub enum OptParseError {
  /// Reached end of stream before parsing was finished
  UnexpectedEndOfStream,

  /// The option header declared a value longer than the bytes left in the message
  #[allow(missing_docs)]
  ValueRunsPastEnd { declared: usize, remaining: usize },

  /// Option Delta was set to 15, which is invalid.
  OptionDeltaReservedValue(u8),

  /// Value Length was set to 15, which is invalid.
  ValueLengthReservedValue(u8),

  /// Adding an option delta to the previous option number overflowed
  #[allow(missing_docs)]
  NumberOverflow { prev: u32, delta: u32 },

  /// An option whose value is a string was not valid UTF-8
  InvalidUtf8,

  /// An option whose value is an unsigned integer was wider than 4 bytes
  UintTooWide(usize),

  /// Not a true failure case; only means we tried to read the payload marker byte (0xFF)
  /// as an option header.
  OptionsExhausted,
}

impl OptParseError {
  /// Shorthand for [`OptParseError::UnexpectedEndOfStream`]
  pub fn eof() -> Self {
    Self::UnexpectedEndOfStream
  }
}

impl fmt::Display for OptParseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Self::UnexpectedEndOfStream => write!(f, "option ended unexpectedly"),
      | Self::ValueRunsPastEnd { declared, remaining } => {
        write!(f,
               "option value of {} bytes runs past the {} bytes remaining",
               declared, remaining)
      },
      | Self::OptionDeltaReservedValue(n) => write!(f, "option delta nibble {} is reserved", n),
      | Self::ValueLengthReservedValue(n) => write!(f, "option length nibble {} is reserved", n),
      | Self::NumberOverflow { prev, delta } => {
        write!(f, "option delta {} after option {} overflows", delta, prev)
      },
      | Self::InvalidUtf8 => write!(f, "string option was not valid utf-8"),
      | Self::UintTooWide(n) => write!(f, "uint option of {} bytes is wider than 4", n),
      | Self::OptionsExhausted => write!(f, "no more options"),
    }
  }
}

#[cfg(feature = "std")]
impl std::error::Error for OptParseError {}
