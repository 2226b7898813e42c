use skink_msg::{Message, Type};

use super::Context;
use crate::dispatch::Dispatch;
use crate::logging::{log_event, msg_summary};
use crate::pdu::{Method, Req};

/// Dispatch a request to the application.
///
/// A confirmable request whose id is already cached is a retransmission;
/// it is acknowledged again without reaching the application.
///
/// Application errors are logged and produce no reply; the cached id is
/// forgotten so that a retransmission is dispatched again.
pub(super) fn handle<D: Dispatch>(ctx: &Context<'_, D>,
                                  method: Method,
                                  Req(req): &Req)
                                  -> Option<Message> {
  let con = req.ty == Type::Con;

  if con && !ctx.receiver.cache_id(req.id, ctx.now) {
    log_event!(request::handle,
               log::Level::Debug,
               "duplicate {}, acking without dispatch",
               msg_summary(req));
    return Some(req.ack(req.id));
  }

  let rep = match method {
    | Method::Post => nb::block!(ctx.dispatch.post(req)),
    | Method::Put => nb::block!(ctx.dispatch.put(req)),
    | Method::Get => nb::block!(ctx.dispatch.observe(req)),
    | Method::Delete => nb::block!(ctx.dispatch.delete(req)),
  };

  let mut rep = match rep {
    | Ok(rep) => rep,
    | Err(e) => {
      log_event!(request::handle,
                 log::Level::Error,
                 "{:?} failed for {}: {:?}",
                 method,
                 msg_summary(req),
                 e);
      if con {
        ctx.receiver.remove(req.id);
      }
      return None;
    },
  };

  if req.no_response().map(|nr| nr.suppresses(rep.code)) == Some(true) {
    log_event!(request::handle,
               log::Level::Trace,
               "{} response suppressed by No-Response",
               rep.code);
    return if con { Some(req.ack(req.id)) } else { None };
  }

  rep.token = req.token;
  if con {
    rep.ty = Type::Ack;
    rep.id = req.id;
  } else {
    rep.ty = Type::Non;
    rep.id = ctx.transmitter.allocate_id();
  }

  Some(rep)
}
