use skink_msg::{Code, CodeKind, Message, Type};

/// A request method understood by the handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
  /// `0.01`; handled as an observe registration (or a plain read)
  Get,
  /// `0.02`
  Post,
  /// `0.03`; subscribe
  Put,
  /// `0.04`
  Delete,
}

impl Method {
  /// The method with this code, if it is one we recognize
  pub fn from_code(code: Code) -> Option<Self> {
    match code {
      | Code::GET => Some(Method::Get),
      | Code::POST => Some(Method::Post),
      | Code::PUT => Some(Method::Put),
      | Code::DELETE => Some(Method::Delete),
      | _ => None,
    }
  }

  /// The code of this method
  pub fn code(&self) -> Code {
    match self {
      | Method::Get => Code::GET,
      | Method::Post => Code::POST,
      | Method::Put => Code::PUT,
      | Method::Delete => Code::DELETE,
    }
  }
}

/// A request message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Req(pub Message);

impl Req {
  /// The method, if it is one we recognize
  pub fn method(&self) -> Option<Method> {
    Method::from_code(self.0.code)
  }

  /// Borrow the underlying message
  pub fn msg(&self) -> &Message {
    &self.0
  }
}

/// A response message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resp(pub Message);

impl Resp {
  /// Borrow the underlying message
  pub fn msg(&self) -> &Message {
    &self.0
  }
}

/// A decoded message, tagged by the interpretation of its code.
///
/// Requests and responses share one header / option / payload layout;
/// only the meaning of the code differs.
///
/// ```
/// use skink::pdu::{Method, Pdu};
/// use skink_msg::{Code, Id, Message, Token, Type};
///
/// let get = Message::new(Type::Con, Code::GET, Id(1), Token::default());
/// match Pdu::from(get) {
///   | Pdu::Request(req) => assert_eq!(req.method(), Some(Method::Get)),
///   | _ => unreachable!(),
/// }
///
/// let ping = Message::new(Type::Con, Code::EMPTY, Id(2), Token::default());
/// assert!(matches!(Pdu::from(ping), Pdu::Empty(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pdu {
  /// Code class 0, detail > 0
  Request(Req),
  /// Code class 2, 4 or 5
  Response(Resp),
  /// Code `0.00`; ACK, RST and ping
  Empty(Message),
}

impl Pdu {
  /// Borrow the underlying message
  pub fn msg(&self) -> &Message {
    match self {
      | Pdu::Request(Req(m)) | Pdu::Response(Resp(m)) | Pdu::Empty(m) => m,
    }
  }

  /// Get the underlying message
  pub fn into_msg(self) -> Message {
    match self {
      | Pdu::Request(Req(m)) | Pdu::Response(Resp(m)) | Pdu::Empty(m) => m,
    }
  }

  /// Type of the underlying message
  pub fn ty(&self) -> Type {
    self.msg().ty
  }
}

impl From<Message> for Pdu {
  fn from(msg: Message) -> Self {
    match msg.code.kind() {
      | CodeKind::Request => Pdu::Request(Req(msg)),
      | CodeKind::Response => Pdu::Response(Resp(msg)),
      | CodeKind::Empty => Pdu::Empty(msg),
    }
  }
}

#[cfg(test)]
mod tests {
  use skink_msg::{Id, Token};

  use super::*;

  fn msg(code: Code) -> Message {
    Message::new(Type::Non, code, Id(1), Token::default())
  }

  #[test]
  fn classify() {
    assert!(matches!(Pdu::from(msg(Code::CONTENT)), Pdu::Response(_)));
    assert!(matches!(Pdu::from(msg(Code::NOT_FOUND)), Pdu::Response(_)));
    assert!(matches!(Pdu::from(msg(Code::EMPTY)), Pdu::Empty(_)));

    [Method::Get, Method::Post, Method::Put, Method::Delete].iter()
                                                            .for_each(|m| match Pdu::from(msg(m.code())) {
                                                              | Pdu::Request(r) => assert_eq!(r.method(), Some(*m)),
                                                              | other => panic!("{:?}", other),
                                                            });
  }

  #[test]
  fn unknown_method() {
    match Pdu::from(msg(Code::new(0, 5))) {
      | Pdu::Request(r) => assert_eq!(r.method(), None),
      | other => panic!("{:?}", other),
    }
  }
}
