use core::fmt;

/// Whether a code is for a request, response, or empty message
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum CodeKind {
  /// A request code (0.xx, excluding 0.00)
  Request,
  /// A response code ([2-5].xx)
  Response,
  /// EMPTY (0.00)
  Empty,
}

/// # Message Code
///
/// Packed on the wire as a 3-bit class and 5-bit detail (`c.dd`),
/// and written for humans as `"2.05"`.
///
/// Besides the wire form there is a decimal form, `class * 100 + detail`,
/// used when codes are passed around as plain numbers (`205` for 2.05 Content).
///
/// ```
/// use skink_msg::Code;
///
/// assert_eq!(Code { class: 2, detail: 5 }.to_string(), "2.05".to_string());
/// assert_eq!(Code::CONTENT.as_number(), 205);
/// assert_eq!(Code::from_number(404), Some(Code::NOT_FOUND));
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Code {
  /// The "class" of message codes identify it as a request or response, and provides the class of response status:
  ///
  /// |class|meaning|
  /// |---|---|
  /// |`0`|Message is a request|
  /// |`2`|Message is a success response|
  /// |`4`|Message is a client error response|
  /// |`5`|Message is a server error response|
  pub class: u8,

  /// 2-digit integer (range `[0, 32)`) that provides granular information about the response status.
  ///
  /// Will always be `0` for requests.
  pub detail: u8,
}

macro_rules! code {
  ($(#[$meta:meta])* $name:ident = $class:literal * $detail:literal) => {
    $(#[$meta])*
    pub const $name: Code = Code::new($class, $detail);
  };
}

impl Code {
  code!(
    /// 0.00 Empty
    EMPTY = 0*00
  );

  code!(
    /// 0.01 GET
    GET = 0*01
  );
  code!(
    /// 0.02 POST
    POST = 0*02
  );
  code!(
    /// 0.03 PUT
    PUT = 0*03
  );
  code!(
    /// 0.04 DELETE
    DELETE = 0*04
  );

  code!(
    /// 2.01 Created
    CREATED = 2*01
  );
  code!(
    /// 2.02 Deleted
    DELETED = 2*02
  );
  code!(
    /// 2.03 Valid
    VALID = 2*03
  );
  code!(
    /// 2.04 Changed
    CHANGED = 2*04
  );
  code!(
    /// 2.05 Content
    CONTENT = 2*05
  );

  code!(
    /// 4.00 Bad Request
    BAD_REQUEST = 4*00
  );
  code!(
    /// 4.01 Unauthorized
    UNAUTHORIZED = 4*01
  );
  code!(
    /// 4.02 Bad Option
    BAD_OPTION = 4*02
  );
  code!(
    /// 4.03 Forbidden
    FORBIDDEN = 4*03
  );
  code!(
    /// 4.04 Not Found
    NOT_FOUND = 4*04
  );
  code!(
    /// 4.05 Method Not Allowed
    METHOD_NOT_ALLOWED = 4*05
  );
  code!(
    /// 4.06 Not Acceptable
    NOT_ACCEPTABLE = 4*06
  );
  code!(
    /// 4.12 Precondition Failed
    PRECONDITION_FAILED = 4*12
  );
  code!(
    /// 4.13 Request Entity Too Large
    REQUEST_ENTITY_TOO_LARGE = 4*13
  );
  code!(
    /// 4.15 Unsupported Content-Format
    UNSUPPORTED_CONTENT_FORMAT = 4*15
  );

  code!(
    /// 5.00 Internal Server Error
    INTERNAL_SERVER_ERROR = 5*00
  );
  code!(
    /// 5.01 Not Implemented
    NOT_IMPLEMENTED = 5*01
  );
  code!(
    /// 5.02 Bad Gateway
    BAD_GATEWAY = 5*02
  );
  code!(
    /// 5.03 Service Unavailable
    SERVICE_UNAVAILABLE = 5*03
  );
  code!(
    /// 5.04 Gateway Timeout
    GATEWAY_TIMEOUT = 5*04
  );
  code!(
    /// 5.05 Proxying Not Supported
    PROXYING_NOT_SUPPORTED = 5*05
  );

  /// Create a new Code
  ///
  /// ```
  /// use skink_msg::Code;
  ///
  /// let content = Code::new(2, 05);
  /// ```
  pub const fn new(class: u8, detail: u8) -> Self {
    Self { class, detail }
  }

  /// Get the human string representation of a message code
  ///
  /// # Returns
  /// A `char` array
  ///
  /// ```
  /// use skink_msg::Code;
  ///
  /// let code = Code { class: 2, detail: 5 };
  /// let string = String::from_iter(code.to_human());
  /// assert_eq!(string, "2.05".to_string());
  /// ```
  pub fn to_human(&self) -> [char; 4] {
    let to_char = |d: u8| (b'0' + d % 10) as char;
    [to_char(self.class),
     '.',
     to_char(self.detail / 10),
     to_char(self.detail % 10)]
  }

  /// Decimal form of this code (`class * 100 + detail`)
  pub fn as_number(&self) -> u16 {
    u16::from(self.class) * 100 + u16::from(self.detail)
  }

  /// Parse the decimal form of a code, yielding `None`
  /// if the class or detail would not fit in the wire format.
  pub fn from_number(n: u16) -> Option<Self> {
    let (class, detail) = (n / 100, n % 100);
    if class > 0b111 || detail > 0b11111 {
      None
    } else {
      Some(Code::new(class as u8, detail as u8))
    }
  }

  /// Get whether this code is for a request, response, or empty message
  ///
  /// ```
  /// use skink_msg::{Code, CodeKind};
  ///
  /// assert_eq!(Code::EMPTY.kind(), CodeKind::Empty);
  /// assert_eq!(Code::GET.kind(), CodeKind::Request);
  /// assert_eq!(Code::CONTENT.kind(), CodeKind::Response);
  /// ```
  pub fn kind(&self) -> CodeKind {
    match self.class {
      | 0 if self.detail == 0 => CodeKind::Empty,
      | 0 => CodeKind::Request,
      | _ => CodeKind::Response,
    }
  }

  /// Is this a 2.xx code?
  pub fn is_success(&self) -> bool {
    self.class == 2
  }

  /// Is this a 4.xx code?
  pub fn is_client_error(&self) -> bool {
    self.class == 4
  }

  /// Is this a 5.xx code?
  pub fn is_server_error(&self) -> bool {
    self.class == 5
  }
}

impl fmt::Display for Code {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.to_human().iter().try_for_each(|c| write!(f, "{}", c))
  }
}

impl From<u8> for Code {
  fn from(b: u8) -> Self {
    let class = b >> 5;
    let detail = b & 0b0011111;

    Code { class, detail }
  }
}

/// Only the low 3 bits of `class` and low 5 bits of `detail` are kept
impl From<Code> for u8 {
  fn from(code: Code) -> u8 {
    let class = (code.class & 0b111) << 5;
    let detail = code.detail & 0b11111;

    class | detail
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_eqb;

  #[test]
  fn parse_code() {
    let byte = 0b_01_000101u8;
    let code = Code::from(byte);
    assert_eq!(code, Code { class: 2, detail: 5 })
  }

  #[test]
  fn serialize_code() {
    let code = Code { class: 2, detail: 5 };
    let actual: u8 = code.into();
    let expected = 0b_010_00101u8;
    assert_eqb!(actual, expected)
  }

  #[test]
  fn serialize_code_out_of_range() {
    let actual: u8 = Code { class: 2, detail: 37 }.into();
    assert_eqb!(actual, 0b_010_00101u8);

    let actual: u8 = Code { class: 9, detail: 1 }.into();
    assert_eqb!(actual, 0b_001_00001u8);
  }

  #[test]
  fn decimal_form() {
    assert_eq!(Code::POST.as_number(), 2);
    assert_eq!(Code::GATEWAY_TIMEOUT.as_number(), 504);
    assert_eq!(Code::from_number(415), Some(Code::UNSUPPORTED_CONTENT_FORMAT));
    assert_eq!(Code::from_number(800), None);
    assert_eq!(Code::from_number(240), None);
  }

  #[test]
  fn display() {
    assert_eq!(Code::NOT_FOUND.to_string(), "4.04");
    assert_eq!(Code::EMPTY.to_string(), "0.00");
  }
}
