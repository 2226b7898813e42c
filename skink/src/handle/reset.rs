use skink_msg::Message;

use super::Context;
use crate::logging::{log_event, msg_summary};

/// The peer rejected a message we sent; forget the exchange
pub(super) fn handle<D>(ctx: &Context<'_, D>, msg: &Message) -> Option<Message> {
  log_event!(reset::handle, log::Level::Debug, "peer reset: {}", msg_summary(msg));
  ctx.transmitter.reset(msg.id);
  ctx.receiver.remove(msg.id);
  None
}

#[cfg(test)]
mod tests {
  use skink_msg::{Code, Type};

  use crate::handle::tests::{token, Harness};
  use crate::test::DispatchMock;
  use crate::transmitter::Correlate;

  use super::*;

  #[test]
  fn reset_forgets_exchange() {
    let h = Harness::new(DispatchMock::content());
    let id = h.transmitter
              .new_id(token(1), Correlate::OneShot(None), 0)
              .unwrap();
    h.transmitter
     .add_message(&Message::new(Type::Con, Code::GET, id, token(1)), 0);

    let rst = Message::new(Type::Reset, Code::EMPTY, id, token(1));
    assert_eq!(h.handle(&rst), None);
    assert!(h.transmitter.is_idle());
  }
}
