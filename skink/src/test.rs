use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use embedded_time::rate::Fraction;
use embedded_time::Instant;
use skink_msg::{Code, Message, Payload, TryFromBytes, TryIntoBytes};

use crate::auth::Authenticator;
use crate::dispatch::Dispatch;
use crate::net::Transport;
use crate::pdu::Method;

/// Log everything to stdout, once per test binary
pub fn init_log() {
  static INIT: Once = Once::new();
  INIT.call_once(|| {
        simple_logger::init_with_level(log::Level::Trace).ok();
      });
}

/// A clock whose time (in milliseconds) is set by the test
#[derive(Debug, Clone, Default)]
pub struct ClockMock(pub Arc<AtomicU64>);

impl ClockMock {
  pub fn new() -> Self {
    Self(Arc::new(AtomicU64::new(0)))
  }

  pub fn set(&self, to: u64) {
    self.0.store(to, Ordering::SeqCst);
  }
}

impl embedded_time::Clock for ClockMock {
  type T = u64;

  const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000);

  fn try_now(&self) -> Result<Instant<Self>, embedded_time::clock::Error> {
    Ok(Instant::new(self.0.load(Ordering::SeqCst)))
  }
}

/// A mocked datagram transport
#[derive(Debug, Clone, Default)]
pub struct TransportMock {
  /// Inbound datagrams
  pub rx: Arc<Mutex<VecDeque<Vec<u8>>>>,
  /// Outbound datagrams
  pub tx: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl TransportMock {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&self, msg: &Message) {
    self.rx
        .lock()
        .unwrap()
        .push_back(msg.try_into_bytes().unwrap());
  }

  pub fn sent(&self) -> Vec<Message> {
    self.tx
        .lock()
        .unwrap()
        .iter()
        .map(|bytes| Message::try_from_bytes(bytes).unwrap())
        .collect()
  }
}

impl Transport for TransportMock {
  type Error = ();

  fn send(&self, dgram: &[u8]) -> nb::Result<(), ()> {
    self.tx.lock().unwrap().push(dgram.to_vec());
    Ok(())
  }

  fn recv(&self, buf: &mut [u8]) -> nb::Result<usize, ()> {
    let dgram = self.rx
                    .lock()
                    .unwrap()
                    .pop_front()
                    .ok_or(nb::Error::WouldBlock)?;

    buf[..dgram.len()].copy_from_slice(&dgram);
    Ok(dgram.len())
  }
}

/// A mocked application, answering every request the same way
#[derive(Debug)]
pub struct DispatchMock {
  reply: Result<Message, ()>,
  block_for: AtomicUsize,
  calls: Mutex<Vec<Method>>,
}

impl DispatchMock {
  pub fn new(reply: Result<Message, ()>) -> Self {
    Self { reply,
           block_for: AtomicUsize::new(0),
           calls: Mutex::new(vec![]) }
  }

  /// Answer 2.05 Content "ok"
  pub fn content() -> Self {
    let mut rep = Message::default();
    rep.code = Code::CONTENT;
    rep.payload = Payload(b"ok".to_vec());
    Self::new(Ok(rep))
  }

  /// Answer with an empty message (an empty ACK once piggybacked)
  pub fn empty() -> Self {
    Self::new(Ok(Message::default()))
  }

  /// Fail every request
  pub fn fault() -> Self {
    Self::new(Err(()))
  }

  /// Yield `WouldBlock` this many times before answering
  pub fn blocking_for(self, n: usize) -> Self {
    self.block_for.store(n, Ordering::SeqCst);
    self
  }

  /// Operations invoked so far
  pub fn calls(&self) -> Vec<Method> {
    self.calls.lock().unwrap().clone()
  }

  fn answer(&self, method: Method) -> nb::Result<Message, ()> {
    let blocked = self.block_for
                      .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                      .is_ok();
    if blocked {
      return Err(nb::Error::WouldBlock);
    }

    self.calls.lock().unwrap().push(method);
    self.reply.clone().map_err(nb::Error::Other)
  }
}

impl Dispatch for DispatchMock {
  type Error = ();

  fn post(&self, _: &Message) -> nb::Result<Message, ()> {
    self.answer(Method::Post)
  }

  fn put(&self, _: &Message) -> nb::Result<Message, ()> {
    self.answer(Method::Put)
  }

  fn observe(&self, _: &Message) -> nb::Result<Message, ()> {
    self.answer(Method::Get)
  }

  fn delete(&self, _: &Message) -> nb::Result<Message, ()> {
    self.answer(Method::Delete)
  }
}

/// Accepts exactly one credential, counting attempts
#[derive(Debug)]
pub struct AuthMock {
  pub token_type: &'static str,
  pub token: &'static str,
  pub attempts: AtomicUsize,
}

impl AuthMock {
  pub fn new(token_type: &'static str, token: &'static str) -> Self {
    Self { token_type,
           token,
           attempts: AtomicUsize::new(0) }
  }

  pub fn attempts(&self) -> usize {
    self.attempts.load(Ordering::SeqCst)
  }
}

impl Authenticator for AuthMock {
  fn authenticate(&self, token_type: &str, token: &str) -> bool {
    self.attempts.fetch_add(1, Ordering::SeqCst);
    token_type == self.token_type && token == self.token
  }
}
