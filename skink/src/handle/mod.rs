//! # Message handlers
//!
//! Inbound messages are routed to exactly one handler, selected
//! from the message's code and type alone:
//!
//! | code | type | handler |
//! |---|---|---|
//! | `0.00` | CON | [`Handler::Ping`] |
//! | GET, POST, PUT, DELETE | any | [`Handler::Request`] |
//! | any | RST | [`Handler::Reset`] |
//! | anything else | any | [`Handler::Response`] |
//!
//! A handler yields at most one message to send back.

use skink_msg::{Message, Type};

use crate::config::Config;
use crate::dispatch::Dispatch;
use crate::pdu::{Method, Pdu};
use crate::receiver::Receiver;
use crate::transmitter::Transmitter;

mod ping;
mod request;
mod reset;
mod response;

/// Everything a handler may consult or mutate
#[derive(Debug)]
pub struct Context<'a, D> {
  /// Runtime config
  pub config: Config,
  /// Milliseconds since the clock's epoch
  pub now: u64,
  /// Dedup cache
  pub receiver: &'a Receiver,
  /// Outbound exchange state
  pub transmitter: &'a Transmitter,
  /// Application
  pub dispatch: &'a D,
}

/// The handler responsible for a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
  /// Empty confirmable; answered with a Reset
  Ping,
  /// A request for the application
  Request(Method),
  /// The peer rejected one of our messages
  Reset,
  /// Acknowledgements, responses and notifications
  Response,
}

impl Handler {
  /// Pick the handler for a message.
  ///
  /// Depends only on the message's code (through the [`Pdu`] variant
  /// and request method) and its type.
  ///
  /// ```
  /// use skink::handle::Handler;
  /// use skink::pdu::{Method, Pdu};
  /// use skink_msg::{Code, Id, Message, Token, Type};
  ///
  /// let pdu = |ty, code| Pdu::from(Message::new(ty, code, Id(1), Token::default()));
  ///
  /// assert_eq!(Handler::for_pdu(&pdu(Type::Con, Code::EMPTY)), Handler::Ping);
  /// assert_eq!(Handler::for_pdu(&pdu(Type::Non, Code::POST)),
  ///            Handler::Request(Method::Post));
  /// assert_eq!(Handler::for_pdu(&pdu(Type::Reset, Code::EMPTY)), Handler::Reset);
  /// assert_eq!(Handler::for_pdu(&pdu(Type::Ack, Code::EMPTY)), Handler::Response);
  /// assert_eq!(Handler::for_pdu(&pdu(Type::Con, Code::CONTENT)), Handler::Response);
  /// ```
  pub fn for_pdu(pdu: &Pdu) -> Self {
    match (pdu, pdu.ty()) {
      | (Pdu::Empty(_), Type::Con) => Handler::Ping,
      | (Pdu::Request(req), ty) => match req.method() {
        | Some(method) => Handler::Request(method),
        | None if ty == Type::Reset => Handler::Reset,
        | None => Handler::Response,
      },
      | (_, Type::Reset) => Handler::Reset,
      | _ => Handler::Response,
    }
  }

  /// Handle `pdu`, yielding the message to send back (if any)
  pub fn handle<D: Dispatch>(&self, ctx: &Context<'_, D>, pdu: &Pdu) -> Option<Message> {
    match (self, pdu) {
      | (Handler::Ping, _) => ping::handle(pdu.msg()),
      | (Handler::Request(method), Pdu::Request(req)) => request::handle(ctx, *method, req),
      | (Handler::Reset, _) => reset::handle(ctx, pdu.msg()),
      | _ => response::handle(ctx, pdu),
    }
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use skink_msg::{Code, Id, Token};

  use super::*;
  use crate::test::DispatchMock;

  pub(crate) struct Harness {
    pub(crate) config: Config,
    pub(crate) receiver: Receiver,
    pub(crate) transmitter: Transmitter,
    pub(crate) dispatch: DispatchMock,
  }

  impl Harness {
    pub(crate) fn new(dispatch: DispatchMock) -> Self {
      let config = Config::default();
      Self { config,
             receiver: Receiver::new(config.exchange_lifetime_millis()),
             transmitter: Transmitter::new(config, Id(100)),
             dispatch }
    }

    pub(crate) fn ctx(&self, now: u64) -> Context<'_, DispatchMock> {
      Context { config: self.config,
                now,
                receiver: &self.receiver,
                transmitter: &self.transmitter,
                dispatch: &self.dispatch }
    }

    pub(crate) fn handle(&self, msg: &Message) -> Option<Message> {
      let pdu = Pdu::from(msg.clone());
      Handler::for_pdu(&pdu).handle(&self.ctx(0), &pdu)
    }
  }

  pub(crate) fn token(b: u8) -> Token {
    Token::try_from(&[b][..]).unwrap()
  }

  fn select(ty: Type, code: Code) -> Handler {
    Handler::for_pdu(&Pdu::from(Message::new(ty, code, Id(1), Token::default())))
  }

  #[test]
  fn selection() {
    assert_eq!(select(Type::Con, Code::GET), Handler::Request(Method::Get));
    assert_eq!(select(Type::Con, Code::PUT), Handler::Request(Method::Put));
    assert_eq!(select(Type::Non, Code::DELETE), Handler::Request(Method::Delete));
    assert_eq!(select(Type::Reset, Code::POST), Handler::Request(Method::Post));
    assert_eq!(select(Type::Non, Code::EMPTY), Handler::Response);
    assert_eq!(select(Type::Reset, Code::NOT_FOUND), Handler::Reset);
    assert_eq!(select(Type::Reset, Code::new(0, 9)), Handler::Reset);
    assert_eq!(select(Type::Con, Code::new(0, 9)), Handler::Response);
  }
}
