use std_alloc::string::String;
use std_alloc::vec::Vec;

use toad_cursor::Cursor;

/// Message Code
pub mod code;

/// Message parsing errors
pub mod parse_error;

/// Message ID
pub mod id;

/// Message Options
pub mod opt;

/// Message Type
pub mod ty;

/// Message Token
pub mod token;

/// Message Version
pub mod ver;

pub use code::*;
pub use id::*;
pub use opt::*;
pub use parse_error::*;
pub use token::*;
pub use ty::*;
pub use ver::*;

use crate::from_bytes::TryConsumeBytes;
use crate::TryFromBytes;

/// Message payload; an empty payload is written without a payload marker
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Payload(pub Vec<u8>);

impl Payload {
  /// Borrow the bytes of the payload
  pub fn as_bytes(&self) -> &[u8] {
    &self.0
  }
}

/// Struct representing the first byte of a message.
///
/// ```text
/// CoAP version
/// |
/// |  Message type (request, response, empty)
/// |  |
/// |  |  Length of token, in bytes. (4-bit integer)
/// |  |  |
/// vv vv vvvv
/// 01 00 0000
/// ```
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub(crate) struct Byte1 {
  pub(crate) ver: Version,
  pub(crate) ty: Type,
  pub(crate) tkl: u8,
}

impl TryFrom<u8> for Byte1 {
  type Error = MessageParseError;

  fn try_from(b: u8) -> Result<Self, Self::Error> {
    let ver = b >> 6; // bits 0 & 1
    let ty = b >> 4 & 0b11; // bits 2 & 3
    let tkl = b & 0b1111u8; // last 4 bits

    Ok(Byte1 { ver: Version(ver),
               ty: Type::try_from(ty)?,
               tkl })
  }
}

impl From<Byte1> for u8 {
  fn from(b: Byte1) -> u8 {
    let ver = b.ver.0 << 6;
    let ty = u8::from(b.ty) << 4;
    let tkl = b.tkl;

    ver | ty | tkl
  }
}

/// # `Message` struct
/// Low-level representation of a CoAP message.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |Ver| T |  TKL  |      Code     |          Message ID           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Token (if any, TKL bytes) ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Options (if any) ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |1 1 1 1 1 1 1 1|    Payload (if any) ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Messages support both serializing to bytes and from bytes, by using the provided [`TryFromBytes`] and [`TryIntoBytes`](crate::TryIntoBytes) traits.
///
/// ```
/// use skink_msg::*;
///
/// let mut msg = Message::new(Type::Non, Code::POST, Id(1), Token::try_from([1u8].as_ref()).unwrap());
/// msg.set_resource_uri("coap://host?r=/a").unwrap();
/// msg.set_content_format(ContentFormat::Text);
/// msg.payload = Payload(b"hi".to_vec());
///
/// let bytes = msg.try_into_bytes().unwrap();
/// let parsed = Message::try_from_bytes(&bytes).unwrap();
///
/// assert_eq!(parsed.ty, Type::Non);
/// assert_eq!(parsed.code, Code::POST);
/// assert_eq!(parsed.resource_uri(), Some("coap://host?r=/a".to_string()));
/// assert_eq!(parsed.content_format(), Some(ContentFormat::Text));
/// assert_eq!(parsed.payload.as_bytes(), b"hi");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
  /// see [`Id`] for details
  pub id: Id,
  /// see [`Type`] for details
  pub ty: Type,
  /// see [`Version`] for details
  pub ver: Version,
  /// see [`Token`] for details
  pub token: Token,
  /// see [`Code`] for details
  pub code: Code,
  /// see [`Options`] for details
  pub opts: Options,
  /// see [`Payload`]
  pub payload: Payload,
}

impl Message {
  /// Create a message with no options or payload
  pub fn new(ty: Type, code: Code, id: Id, token: Token) -> Self {
    Self { id,
           ty,
           ver: Version::default(),
           token,
           code,
           opts: Options::new(),
           payload: Payload::default() }
  }

  /// Create a new message that ACKs this one.
  ///
  /// This needs an [`Id`] to assign to the newly created message.
  ///
  /// ```
  /// use skink_msg::*;
  ///
  /// let req = Message::new(Type::Con, Code::GET, Id(12), Token::default());
  /// let ack = req.ack(req.id);
  ///
  /// assert_eq!(ack.ty, Type::Ack);
  /// assert_eq!(ack.code, Code::EMPTY);
  /// assert_eq!(ack.id, Id(12));
  /// ```
  pub fn ack(&self, id: Id) -> Self {
    Self::new(Type::Ack, Code::EMPTY, id, self.token)
  }

  /// Create a new message that rejects this one with a Reset
  pub fn reset(&self) -> Self {
    Self::new(Type::Reset, Code::EMPTY, self.id, self.token)
  }

  /// Is this an Empty message?
  pub fn is_empty(&self) -> bool {
    self.code.kind() == CodeKind::Empty
  }

  /// Read the well-known options into typed fields
  pub fn headers(&self) -> Headers {
    Headers::from_options(&self.opts)
  }

  /// Replace the options with those described by `headers`
  pub fn set_headers(&mut self, headers: &Headers) -> Result<(), InvalidUri> {
    self.opts = headers.load_options()?;
    Ok(())
  }

  /// Get the URI this message addresses, rebuilt from its Uri-* options
  pub fn resource_uri(&self) -> Option<String> {
    self.headers().resource_uri
  }

  /// Replace the Uri-Host, Uri-Port, Uri-Path and Uri-Query options
  /// with those addressing `uri`
  pub fn set_resource_uri(&mut self, uri: &str) -> Result<(), InvalidUri> {
    opt::headers::load_uri(&mut self.opts, uri)
  }

  /// Get the Observe option; `Some(true)` means register
  pub fn observe(&self) -> Option<bool> {
    self.opts
        .get(known::no_repeat::OBSERVE)
        .and_then(OptValue::as_uint)
        .map(|n| known::observe::Action::from_value(n).is_register())
  }

  /// Set the Observe option; `true` registers (`0` on the wire)
  pub fn set_observe(&mut self, register: bool) {
    let action = known::observe::Action::from(register);
    self.opts
        .set(known::no_repeat::OBSERVE, OptValue::Uint(action.into()));
  }

  /// Get the Content-Format option
  pub fn content_format(&self) -> Option<ContentFormat> {
    self.uint_opt(known::no_repeat::CONTENT_FORMAT)
        .and_then(|n| u16::try_from(n).ok())
        .map(ContentFormat::from)
  }

  /// Set the Content-Format option
  pub fn set_content_format(&mut self, format: ContentFormat) {
    self.opts.set(known::no_repeat::CONTENT_FORMAT,
                  OptValue::Uint(u16::from(&format) as u32));
  }

  /// Get the Accept option
  pub fn accept(&self) -> Option<ContentFormat> {
    self.uint_opt(known::no_repeat::ACCEPT)
        .and_then(|n| u16::try_from(n).ok())
        .map(ContentFormat::from)
  }

  /// Get the Max-Age option
  pub fn max_age(&self) -> Option<u32> {
    self.uint_opt(known::no_repeat::MAX_AGE)
  }

  /// Get the No-Response option
  pub fn no_response(&self) -> Option<NoResponse> {
    self.uint_opt(known::no_repeat::NO_RESPONSE)
        .map(|n| NoResponse((n & 0xFF) as u8))
  }

  /// Set the No-Response option
  pub fn set_no_response(&mut self, no_response: NoResponse) {
    self.opts.set(known::no_repeat::NO_RESPONSE,
                  OptValue::Uint(no_response.0 as u32));
  }

  fn uint_opt(&self, number: OptNumber) -> Option<u32> {
    self.opts.get(number).and_then(OptValue::as_uint)
  }
}

impl<Bytes: AsRef<[u8]>> TryFromBytes<Bytes> for Message {
  type Error = MessageParseError;

  fn try_from_bytes(bytes: Bytes) -> Result<Self, Self::Error> {
    let mut bytes = Cursor::new(bytes);

    let Byte1 { tkl, ty, ver } = bytes.next()
                                      .ok_or_else(MessageParseError::eof)?
                                      .try_into()?;

    if ver != Version::V1 {
      return Err(Self::Error::VersionMismatch(ver.0));
    }

    if tkl as usize > MAX_TOKEN_LEN {
      return Err(Self::Error::InvalidTokenLength(tkl));
    }

    let code: Code = bytes.next().ok_or_else(MessageParseError::eof)?.into();
    let id: Id = Id::try_consume_bytes(&mut bytes)?;

    let token = bytes.take_exact(tkl as usize)
                     .ok_or_else(MessageParseError::eof)?;
    let token = Token::try_from(token).map_err(|_| Self::Error::InvalidTokenLength(tkl))?;

    let opts = Options::try_consume_bytes(&mut bytes).map_err(Self::Error::OptParseError)?;

    let payload = Payload(bytes.take_until_end().to_vec());

    Ok(Message { id,
                 ty,
                 ver,
                 code,
                 token,
                 opts,
                 payload })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::TryIntoBytes;

  #[test]
  fn parse_msg() {
    let (expect, msg) = crate::test_msg();
    assert_eq!(Message::try_from_bytes(&msg).unwrap(), expect)
  }

  #[test]
  fn parse_byte1() {
    let byte = 0b_01_10_0011u8;
    let byte = Byte1::try_from(byte).unwrap();
    assert_eq!(byte,
               Byte1 { ver: Version(1),
                       ty: Type::Ack,
                       tkl: 3 })
  }

  #[test]
  fn parse_id() {
    let mut id_bytes = Cursor::new(34u16.to_be_bytes());
    let id = Id::try_consume_bytes(&mut id_bytes).unwrap();
    assert_eq!(id, Id(34));
  }

  #[test]
  fn version_mismatch() {
    let bytes = [0b_10_00_0000u8, 0, 0, 1];
    assert_eq!(Message::try_from_bytes(bytes),
               Err(MessageParseError::VersionMismatch(2)));
  }

  #[test]
  fn token_too_long() {
    let bytes = [0b_01_00_1001u8, 1, 0, 1, 1, 2, 3, 4, 5, 6, 7, 8, 9];
    assert_eq!(Message::try_from_bytes(bytes),
               Err(MessageParseError::InvalidTokenLength(9)));

    assert_eq!(Token::try_from([0u8; 9].as_ref()), Err(TokenTooLong(9)));
  }

  #[test]
  fn truncated() {
    assert_eq!(Message::try_from_bytes([0b_01_00_0000u8, 1]),
               Err(MessageParseError::UnexpectedEndOfStream));
    assert_eq!(Message::try_from_bytes([0b_01_00_0100u8, 1, 0, 1, 0xAA]),
               Err(MessageParseError::UnexpectedEndOfStream));
  }

  #[test]
  fn malformed_option_runs_past_end() {
    let bytes = [0b_01_00_0000u8, 1, 0, 1, 0b1011_0101, b'a'];
    assert_eq!(Message::try_from_bytes(bytes),
               Err(MessageParseError::OptParseError(OptParseError::ValueRunsPastEnd { declared: 5, remaining: 1 })));
  }

  #[test]
  fn empty_payload_has_no_marker() {
    let msg = Message::new(Type::Con, Code::EMPTY, Id(7), Token::default());
    let bytes = msg.try_into_bytes().unwrap();
    assert_eq!(bytes, vec![0b_01_00_0000, 0, 0, 7]);
    assert_eq!(Message::try_from_bytes(&bytes).unwrap(), msg);
  }

  #[test]
  fn round_trip() {
    let token = Token::try_from([9u8, 8, 7, 6, 5, 4, 3, 2].as_ref()).unwrap();
    let mut msg = Message::new(Type::Con, Code::PUT, Id(65535), token);
    msg.set_resource_uri("coap://gw.local:5683/sensors/temp?r=/t&i=site;a&i=floor;2")
       .unwrap();
    msg.set_observe(true);
    msg.set_content_format(ContentFormat::Cbor);
    msg.set_no_response(NoResponse(NoResponse::CLIENT_ERROR));
    msg.opts.push(known::repeat::ETAG, OptValue::Opaque(vec![0xde, 0xad]));
    msg.opts.push(OptNumber(2049), OptValue::Opaque(vec![0; 300]));
    msg.payload = Payload(vec![0xFF; 20]);

    let bytes = msg.try_into_bytes().unwrap();
    assert_eq!(Message::try_from_bytes(&bytes).unwrap(), msg);
  }

  #[test]
  fn scenario_non_post() {
    let mut msg = Message::new(Type::Non, Code::POST, Id(1), Token::default());
    msg.set_resource_uri("coap://host?r=/a").unwrap();
    msg.set_content_format("text/plain".parse().unwrap());
    msg.payload = Payload(b"hi".to_vec());

    let parsed = Message::try_from_bytes(msg.try_into_bytes().unwrap()).unwrap();
    assert_eq!(parsed.ty, Type::Non);
    assert_eq!(parsed.code, Code::POST);
    assert!(parsed.resource_uri().unwrap().ends_with("/a"));
    assert_eq!(parsed.content_format(), Some(ContentFormat::Text));
    assert_eq!(parsed.payload.0, b"hi".to_vec());
  }
}
