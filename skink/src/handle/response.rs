use skink_msg::{Message, Type};

use super::Context;
use crate::logging::{log_event, msg_summary};
use crate::pdu::{Pdu, Resp};

/// Acknowledgements, responses and observe notifications.
///
/// An ACK stops retransmission of the message it acknowledges.
/// Responses are handed to whoever is waiting on their token;
/// a confirmable (separate) response is always acknowledged, and
/// delivered only the first time it is seen.
pub(super) fn handle<D>(ctx: &Context<'_, D>, pdu: &Pdu) -> Option<Message> {
  let msg = pdu.msg();
  if msg.ty == Type::Ack && ctx.transmitter.acknowledge(msg.id) {
    log_event!(response::handle, log::Level::Trace, "{:?} acknowledged", msg.id);
  }

  match pdu {
    | Pdu::Empty(msg) => {
      if msg.ty != Type::Ack {
        log_event!(response::handle,
                   log::Level::Debug,
                   "ignoring {}",
                   msg_summary(msg));
      }
      None
    },
    | Pdu::Request(_) => {
      log_event!(response::handle,
                 log::Level::Warn,
                 "unsupported method {}, ignoring {}",
                 msg.code,
                 msg_summary(msg));
      None
    },
    | Pdu::Response(Resp(msg)) => {
      let con = msg.ty == Type::Con;

      if con && !ctx.receiver.cache_id(msg.id, ctx.now) {
        log_event!(response::handle,
                   log::Level::Debug,
                   "duplicate {}, acking without delivery",
                   msg_summary(msg));
      } else if !ctx.transmitter.dispatch_response(msg) {
        log_event!(response::handle,
                   log::Level::Debug,
                   "nobody waiting on {:?}, dropping {}",
                   msg.token,
                   msg_summary(msg));
      }

      if con {
        Some(msg.ack(msg.id))
      } else {
        None
      }
    },
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;

  use skink_msg::{Code, Id};

  use crate::handle::tests::{token, Harness};
  use crate::test::DispatchMock;
  use crate::transmitter::Correlate;

  use super::*;

  fn counting(h: &Harness, observe: bool) -> (Id, Arc<AtomicUsize>) {
    let n = Arc::new(AtomicUsize::new(0));
    let n2 = n.clone();
    let f = move |_: &Message| {
      n2.fetch_add(1, Ordering::SeqCst);
    };
    let correlate = if observe {
      Correlate::Observe(Arc::new(f))
    } else {
      Correlate::OneShot(Some(Box::new(f)))
    };

    let id = h.transmitter.new_id(token(3), correlate, 0).unwrap();
    h.transmitter
     .add_message(&Message::new(Type::Con, Code::GET, id, token(3)), 0);
    (id, n)
  }

  #[test]
  fn empty_ack_stops_retries() {
    let h = Harness::new(DispatchMock::content());
    let (id, n) = counting(&h, false);

    assert_eq!(h.handle(&Message::new(Type::Ack, Code::EMPTY, id, token(3))), None);
    assert_eq!(h.transmitter.retry_len(), 0);
    assert_eq!(h.transmitter.pending_len(), 1);
    assert_eq!(n.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn piggybacked_response_is_delivered() {
    let h = Harness::new(DispatchMock::content());
    let (id, n) = counting(&h, false);

    let rep = Message::new(Type::Ack, Code::CONTENT, id, token(3));
    assert_eq!(h.handle(&rep), None);
    assert_eq!(n.load(Ordering::SeqCst), 1);
    assert!(h.transmitter.is_idle());
  }

  #[test]
  fn separate_response_is_acked_and_delivered_once() {
    let h = Harness::new(DispatchMock::content());
    let (_, n) = counting(&h, true);

    let notif = Message::new(Type::Con, Code::CONTENT, Id(900), token(3));
    assert_eq!(h.handle(&notif), Some(notif.ack(Id(900))));
    assert_eq!(h.handle(&notif), Some(notif.ack(Id(900))));
    assert_eq!(n.load(Ordering::SeqCst), 1);

    let next = Message::new(Type::Non, Code::CONTENT, Id(901), token(3));
    assert_eq!(h.handle(&next), None);
    assert_eq!(n.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn unknown_token_is_dropped() {
    let h = Harness::new(DispatchMock::content());
    let rep = Message::new(Type::Non, Code::CONTENT, Id(1), token(99));
    assert_eq!(h.handle(&rep), None);
    assert_eq!(h.dispatch.calls().len(), 0);
  }
}
