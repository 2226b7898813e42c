use core::fmt;

use tinyvec::ArrayVec;

/// Maximum number of bytes a [`Token`] may hold
pub const MAX_TOKEN_LEN: usize = 8;

/// # Message Token
/// The Token is used to match a response with a request.  The token
/// value is a sequence of 0 to 8 bytes.
///
/// Every message carries a token, even if it is of zero length.
///
/// Unlike the [`Id`](crate::Id), which pairs a single Confirmable with its
/// Acknowledgement, a Token correlates a request with every response it
/// produces; for an Observe registration that may be many responses.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Token(pub ArrayVec<[u8; MAX_TOKEN_LEN]>);

/// A token was constructed from more than [`MAX_TOKEN_LEN`] bytes
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TokenTooLong(pub usize);

impl fmt::Display for TokenTooLong {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f,
           "token of {} bytes exceeds the maximum of {}",
           self.0, MAX_TOKEN_LEN)
  }
}

impl Token {
  /// Borrow the bytes of this token
  pub fn as_bytes(&self) -> &[u8] {
    self.0.as_slice()
  }

  /// Number of bytes in this token
  pub fn len(&self) -> usize {
    self.0.len()
  }

  /// Is this the zero-length token?
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl<'a> TryFrom<&'a [u8]> for Token {
  type Error = TokenTooLong;

  /// ```
  /// use skink_msg::{Token, TokenTooLong};
  ///
  /// assert!(Token::try_from([1u8, 2, 3].as_ref()).is_ok());
  /// assert_eq!(Token::try_from([0u8; 9].as_ref()), Err(TokenTooLong(9)));
  /// ```
  fn try_from(bytes: &'a [u8]) -> Result<Self, Self::Error> {
    if bytes.len() > MAX_TOKEN_LEN {
      return Err(TokenTooLong(bytes.len()));
    }

    let mut arr = ArrayVec::new();
    arr.extend_from_slice(bytes);
    Ok(Token(arr))
  }
}

impl fmt::Debug for Token {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Token(")?;
    self.0.iter().try_for_each(|b| write!(f, "{:02x}", b))?;
    write!(f, ")")
  }
}
