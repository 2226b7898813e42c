use skink_msg::Message;

use crate::logging::{log_event, msg_summary};

/// CoAP ping: an empty confirmable answered with a Reset
pub(super) fn handle(msg: &Message) -> Option<Message> {
  log_event!(ping::handle, log::Level::Trace, "pong: {}", msg_summary(msg));
  Some(msg.reset())
}

#[cfg(test)]
mod tests {
  use skink_msg::{Code, Id, Type};

  use crate::handle::tests::{token, Harness};
  use crate::test::DispatchMock;

  use super::*;

  #[test]
  fn ping_is_reset() {
    let h = Harness::new(DispatchMock::content());
    let ping = Message::new(Type::Con, Code::EMPTY, Id(5), token(1));
    let pong = h.handle(&ping).unwrap();

    assert_eq!(pong.ty, Type::Reset);
    assert_eq!(pong.code, Code::EMPTY);
    assert_eq!(pong.id, Id(5));
    assert_eq!(h.dispatch.calls().len(), 0);
  }
}
