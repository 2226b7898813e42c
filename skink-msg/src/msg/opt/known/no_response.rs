use crate::Code;

/// No-Response option value ([RFC 7967](https://www.rfc-editor.org/rfc/rfc7967#section-2.1))
///
/// A bitmask of the response classes the client is not interested in.
/// A value of `0` means the client is interested in every response.
///
/// ```
/// use skink_msg::{Code, NoResponse};
///
/// let nr = NoResponse(NoResponse::SUCCESS | NoResponse::SERVER_ERROR);
/// assert!(nr.suppresses(Code::CHANGED));
/// assert!(!nr.suppresses(Code::NOT_FOUND));
/// assert!(nr.suppresses(Code::INTERNAL_SERVER_ERROR));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoResponse(pub u8);

impl NoResponse {
  /// Not interested in 2.xx responses
  pub const SUCCESS: u8 = 0b00010;
  /// Not interested in 4.xx responses
  pub const CLIENT_ERROR: u8 = 0b01000;
  /// Not interested in 5.xx responses
  pub const SERVER_ERROR: u8 = 0b10000;

  /// Does this value suppress responses with `code`?
  ///
  /// Codes outside of 2.xx, 4.xx and 5.xx are never suppressed.
  pub fn suppresses(&self, code: Code) -> bool {
    let bit = match code.class {
      | 2 => Self::SUCCESS,
      | 4 => Self::CLIENT_ERROR,
      | 5 => Self::SERVER_ERROR,
      | _ => 0,
    };

    self.0 & bit != 0
  }
}
