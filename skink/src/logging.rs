use core::fmt::Write;

use skink_msg::Message;
use tinyvec::ArrayVec;
use toad_writable::Writable;

/// Fixed-capacity text buffer; a write that would overflow it fails whole
pub(crate) type Summary = Writable<ArrayVec<[u8; 96]>>;

/// Log under the `skink` target, tagged with the component doing the logging
///
/// ```ignore
/// log_event!(Receiver::sweep, log::Level::Debug, "removed {} ids", n);
/// ```
macro_rules! log_event {
  ($at:path, $lvl:expr, $($arg:tt)+) => {
    ::log::log!(target: "skink", $lvl, "[{}] {}", stringify!($at), format_args!($($arg)+))
  };
}

pub(crate) use log_event;

pub(crate) fn msg_summary(msg: &Message) -> Summary {
  let mut buf = Summary::default();
  write!(buf,
         "{:?} {:?} {} id={} with {} byte payload",
         msg.code.kind(),
         msg.ty,
         msg.code,
         msg.id.0,
         msg.payload.0.len()).ok();
  buf
}

#[cfg(test)]
mod tests {
  use skink_msg::{Code, Id, Payload, Token, Type};

  use super::*;

  #[test]
  fn summary() {
    let mut msg = Message::new(Type::Con, Code::POST, Id(12), Token::default());
    msg.payload = Payload(vec![1, 2, 3]);
    assert_eq!(msg_summary(&msg).as_str(),
               "Request Con 0.02 id=12 with 3 byte payload");
  }

  #[test]
  fn overflowing_write_is_rejected() {
    let mut s = Summary::default();
    assert!(write!(s, "{}", "a".repeat(200)).is_err());
    assert_eq!(s.as_str(), "");

    assert!(write!(s, "{}", "a".repeat(96)).is_ok());
    assert_eq!(s.as_str().len(), 96);
  }
}
