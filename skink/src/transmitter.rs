use core::fmt;

use std_alloc::boxed::Box;
use std_alloc::collections::BTreeMap;
use std_alloc::sync::Arc;
use std_alloc::vec::Vec;

use skink_msg::{Id, Message, Token, Type};
use toad_stem::Stem;

use crate::config::Config;
use crate::retry::Attempts;

/// Invoked once with the response to a request
pub type Callback = Box<dyn FnOnce(&Message) + Send + Sync>;

/// Invoked with every notification for an observed resource
pub type ObserveCallback = Arc<dyn Fn(&Message) + Send + Sync>;

/// How responses to a request should be delivered
pub enum Correlate {
  /// Deliver the first response with a matching token, then forget the request.
  ///
  /// `None` when the response is not interesting.
  OneShot(Option<Callback>),
  /// Deliver every response with a matching token until [`Transmitter::unobserve`]
  Observe(ObserveCallback),
}

impl fmt::Debug for Correlate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Correlate::OneShot(cb) => write!(f, "OneShot(has_callback: {})", cb.is_some()),
      | Correlate::Observe(_) => write!(f, "Observe(..)"),
    }
  }
}

/// Something the retry sweep wants done
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
  /// Send this message again
  Retry(Message),
  /// The confirmable message `id` was retransmitted the maximum number
  /// of times without an acknowledgement; the exchange has failed.
  Abandoned {
    /// Id of the message that was never acknowledged
    id: Id,
    /// Token of the message that was never acknowledged
    token: Token,
  },
}

/// All message ids are tied to pending exchanges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdsExhausted;

struct Pending {
  token: Token,
  expires_at: u64,
  callback: Option<Callback>,
}

impl fmt::Debug for Pending {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Pending")
     .field("token", &self.token)
     .field("expires_at", &self.expires_at)
     .field("has_callback", &self.callback.is_some())
     .finish()
  }
}

#[derive(Debug, Clone)]
struct RetryRecord {
  next_retry_at: u64,
  attempts: Attempts,
  msg: Message,
}

/// # Retry & correlation manager
///
/// Owns the state of outbound exchanges:
///  - pending requests (message id -> token & response callback), consumed by the first matching response
///  - observe registrations (token -> callback), kept until unobserved
///  - retry records for confirmable messages that have not been acknowledged
///
/// Each table is behind its own lock; callbacks are invoked after the lock is released.
pub struct Transmitter {
  config: Config,
  lifetime: u64,
  next_id: Stem<Id>,
  pending: Stem<BTreeMap<Id, Pending>>,
  observers: Stem<BTreeMap<Token, ObserveCallback>>,
  retries: Stem<BTreeMap<Id, RetryRecord>>,
}

impl fmt::Debug for Transmitter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Transmitter")
     .field("next_id", &self.next_id)
     .field("pending", &self.pending)
     .field("observers", &self.observers.map_ref(|o| o.len()))
     .field("retries", &self.retries)
     .finish()
  }
}

impl Transmitter {
  /// Create a transmitter whose message ids start after `first_id`
  pub fn new(config: Config, first_id: Id) -> Self {
    Self { config,
           lifetime: config.exchange_lifetime_millis(),
           next_id: Stem::new(first_id),
           pending: Stem::new(BTreeMap::new()),
           observers: Stem::new(BTreeMap::new()),
           retries: Stem::new(BTreeMap::new()) }
  }

  /// Take the next message id, without registering anything against it.
  ///
  /// Ids wrap from 65535 to 1.
  pub fn allocate_id(&self) -> Id {
    self.next_id.map_mut(|id| {
                  *id = id.next();
                  *id
                })
  }

  /// Allocate a message id for a request carrying `token`,
  /// skipping ids of exchanges that are still pending, and register
  /// how responses with that token should be delivered.
  pub fn new_id(&self, token: Token, correlate: Correlate, now: u64) -> Result<Id, IdsExhausted> {
    let id = self.pending.map_ref(|pending| {
                           let mut id = None;
                           for _ in 0..u16::MAX {
                             let candidate = self.allocate_id();
                             if !pending.contains_key(&candidate) {
                               id = Some(candidate);
                               break;
                             }
                           }
                           id
                         })
                         .ok_or(IdsExhausted)?;

    let mut callback = match correlate {
      | Correlate::Observe(cb) => {
        let mut cb = Some(cb);
        self.observers.map_mut(|obs| {
                        if let Some(cb) = cb.take() {
                          obs.insert(token, cb);
                        }
                      });
        None
      },
      | Correlate::OneShot(cb) => cb,
    };

    let expires_at = now.saturating_add(self.lifetime);
    self.pending.map_mut(|pending| {
                  pending.insert(id,
                                 Pending { token,
                                           expires_at,
                                           callback: callback.take() });
                });

    Ok(id)
  }

  /// Deliver a response to whoever is waiting on its token.
  ///
  /// Observe registrations are checked first and are never removed here;
  /// otherwise the pending request with a matching token is removed along
  /// with its retry record and its callback invoked.
  ///
  /// Yields `false` if nobody was waiting for this token.
  pub fn dispatch_response(&self, msg: &Message) -> bool {
    if let Some(observer) = self.observers.map_ref(|obs| obs.get(&msg.token).cloned()) {
      observer(msg);
      return true;
    }

    let found = self.pending.map_mut(|pending| {
                              let id = pending.iter()
                                              .find(|(_, p)| p.token == msg.token)
                                              .map(|(id, _)| *id)?;
                              pending.remove(&id).map(|p| (id, p))
                            });

    match found {
      | Some((id, Pending { callback, .. })) => {
        self.retries.map_mut(|retries| retries.remove(&id));
        if let Some(callback) = callback {
          callback(msg);
        }
        true
      },
      | None => false,
    }
  }

  /// Start retransmitting `msg` if it is confirmable, beginning `ack_timeout` from `now`.
  pub fn add_message(&self, msg: &Message, now: u64) {
    if msg.ty != Type::Con {
      return;
    }

    let next_retry_at = now.saturating_add(self.config.msg.con.ack_timeout.0);
    self.retries.map_mut(|retries| {
                  retries.insert(msg.id,
                                 RetryRecord { next_retry_at,
                                               attempts: Attempts(0),
                                               msg: msg.clone() });
                });
  }

  /// The peer acknowledged `id`; stop retransmitting it.
  ///
  /// The pending exchange stays, since a separate response may follow.
  pub fn acknowledge(&self, id: Id) -> bool {
    self.retries.map_mut(|retries| retries.remove(&id)).is_some()
  }

  /// The peer rejected `id`; forget the exchange entirely.
  pub fn reset(&self, id: Id) {
    self.retries.map_mut(|retries| retries.remove(&id));
    self.pending.map_mut(|pending| pending.remove(&id));
  }

  /// Stop delivering notifications for `token`.
  ///
  /// Pending exchanges are unaffected.
  pub fn unobserve(&self, token: Token) -> bool {
    self.observers.map_mut(|obs| obs.remove(&token)).is_some()
  }

  /// Expire pending exchanges older than the exchange lifetime and
  /// walk the retry schedule.
  ///
  /// For every overdue retry record, either a [`Event::Retry`] is yielded and the
  /// next retry scheduled per the configured [`Backoff`](crate::retry::Backoff),
  /// or, once `max_retransmit` retries have been sent, the record (and its
  /// pending exchange) is dropped and [`Event::Abandoned`] yielded.
  pub fn sweep(&self, now: u64) -> Vec<Event> {
    self.pending
        .map_mut(|pending| pending.retain(|_, p| p.expires_at > now));

    let con = self.config.msg.con;
    let events = self.retries.map_mut(|retries| {
                                let mut events = Vec::new();
                                let mut abandoned = Vec::new();

                                for (id, rec) in retries.iter_mut() {
                                  if rec.next_retry_at > now {
                                    continue;
                                  }

                                  if rec.attempts >= con.max_retransmit {
                                    abandoned.push(*id);
                                    events.push(Event::Abandoned { id: *id,
                                                                   token: rec.msg.token });
                                  } else {
                                    events.push(Event::Retry(rec.msg.clone()));
                                    rec.attempts.0 += 1;
                                    rec.next_retry_at =
                                      rec.next_retry_at
                                         .saturating_add(con.backoff
                                                            .delay(con.ack_timeout, rec.attempts)
                                                            .0);
                                  }
                                }

                                abandoned.iter().for_each(|id| {
                                                  retries.remove(id);
                                                });
                                events
                              });

    events.iter()
          .filter_map(|e| match e {
            | Event::Abandoned { id, .. } => Some(*id),
            | _ => None,
          })
          .for_each(|id| {
            self.pending.map_mut(|pending| pending.remove(&id));
          });

    events
  }

  /// Is there nothing left to sweep?
  pub fn is_idle(&self) -> bool {
    self.pending.map_ref(|p| p.is_empty()) && self.retries.map_ref(|r| r.is_empty())
  }

  /// Number of pending one-shot exchanges
  pub fn pending_len(&self) -> usize {
    self.pending.map_ref(|p| p.len())
  }

  /// Number of messages awaiting acknowledgement
  pub fn retry_len(&self) -> usize {
    self.retries.map_ref(|r| r.len())
  }

  /// Forget everything
  pub fn clear(&self) {
    self.pending.map_mut(|p| p.clear());
    self.observers.map_mut(|o| o.clear());
    self.retries.map_mut(|r| r.clear());
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use skink_msg::Code;

  use super::*;
  use crate::retry::Backoff;

  fn token(b: u8) -> Token {
    Token::try_from(&[b][..]).unwrap()
  }

  fn counter() -> (Arc<AtomicUsize>, impl Fn(&Message) + Send + Sync + Clone) {
    let n = Arc::new(AtomicUsize::new(0));
    let n2 = n.clone();
    (n, move |_: &Message| {
      n2.fetch_add(1, Ordering::SeqCst);
    })
  }

  fn con(id: Id, t: Token) -> Message {
    Message::new(Type::Con, Code::GET, id, t)
  }

  #[test]
  fn ids_wrap_and_skip_pending() {
    let tx = Transmitter::new(Config::default(), Id(65534));
    assert_eq!(tx.allocate_id(), Id(65535));
    assert_eq!(tx.allocate_id(), Id(1));

    let tx = Transmitter::new(Config::default(), Id(0));
    let a = tx.new_id(token(1), Correlate::OneShot(None), 0).unwrap();
    assert_eq!(a, Id(1));

    // wrap all the way around; id 1 is still pending and must be skipped
    tx.next_id.map_mut(|id| *id = Id(u16::MAX));
    let b = tx.new_id(token(2), Correlate::OneShot(None), 0).unwrap();
    assert_eq!(b, Id(2));
  }

  #[test]
  fn one_shot_is_delivered_once() {
    let tx = Transmitter::new(Config::default(), Id(0));
    let (n, f) = counter();
    let id = tx.new_id(token(1), Correlate::OneShot(Some(Box::new(f))), 0)
               .unwrap();
    tx.add_message(&con(id, token(1)), 0);

    let resp = Message::new(Type::Ack, Code::CONTENT, id, token(1));
    assert!(tx.dispatch_response(&resp));
    assert!(!tx.dispatch_response(&resp));
    assert_eq!(n.load(Ordering::SeqCst), 1);
    assert_eq!(tx.pending_len(), 0);
    assert_eq!(tx.retry_len(), 0);
  }

  #[test]
  fn observe_is_delivered_until_unobserved() {
    let tx = Transmitter::new(Config::default(), Id(0));
    let (n, f) = counter();
    tx.new_id(token(9), Correlate::Observe(Arc::new(f)), 0)
      .unwrap();

    let notif = Message::new(Type::Non, Code::CONTENT, Id(300), token(9));
    (0..3).for_each(|_| assert!(tx.dispatch_response(&notif)));
    assert_eq!(n.load(Ordering::SeqCst), 3);

    assert!(tx.unobserve(token(9)));
    assert_eq!(tx.pending_len(), 1);

    // pending entry still matches once
    assert!(tx.dispatch_response(&notif));
    assert!(!tx.dispatch_response(&notif));
    assert_eq!(n.load(Ordering::SeqCst), 3);
  }

  #[test]
  fn unmatched_response_is_dropped() {
    let tx = Transmitter::new(Config::default(), Id(0));
    let resp = Message::new(Type::Non, Code::CONTENT, Id(1), token(1));
    assert!(!tx.dispatch_response(&resp));
  }

  #[test]
  fn non_confirmable_is_not_retried() {
    let tx = Transmitter::new(Config::default(), Id(0));
    tx.add_message(&Message::new(Type::Non, Code::GET, Id(1), token(1)), 0);
    assert_eq!(tx.retry_len(), 0);
  }

  fn retry_times(backoff: Backoff) -> (Vec<u64>, Option<u64>) {
    let mut cfg = Config::default();
    cfg.msg.con.backoff = backoff;
    let tx = Transmitter::new(cfg, Id(0));

    let id = tx.new_id(token(1), Correlate::OneShot(None), 0).unwrap();
    tx.add_message(&con(id, token(1)), 0);

    let mut retries = Vec::new();
    let mut abandoned = None;
    for now in (0..=100_000).step_by(1_000) {
      for e in tx.sweep(now) {
        match e {
          | Event::Retry(m) => {
            assert_eq!(m.id, id);
            retries.push(now)
          },
          | Event::Abandoned { id: a, token: t } => {
            assert_eq!((a, t), (id, token(1)));
            assert!(abandoned.is_none());
            abandoned = Some(now)
          },
        }
      }
    }

    assert!(tx.is_idle());
    (retries, abandoned)
  }

  #[test]
  fn exponential_backoff_retries_max_retransmit_times() {
    let (retries, abandoned) = retry_times(Backoff::Exponential);
    assert_eq!(retries, vec![2_000, 6_000, 14_000, 30_000]);
    assert_eq!(abandoned, Some(62_000));
  }

  #[test]
  fn constant_backoff_retries_max_retransmit_times() {
    let (retries, abandoned) = retry_times(Backoff::Constant);
    assert_eq!(retries, vec![2_000, 4_000, 6_000, 8_000]);
    assert_eq!(abandoned, Some(10_000));
  }

  #[test]
  fn acknowledge_stops_retries() {
    let tx = Transmitter::new(Config::default(), Id(0));
    let id = tx.new_id(token(1), Correlate::OneShot(None), 0).unwrap();
    tx.add_message(&con(id, token(1)), 0);

    assert!(tx.acknowledge(id));
    assert!(tx.sweep(60_000).is_empty());
    assert_eq!(tx.pending_len(), 1);
  }

  #[test]
  fn reset_forgets_exchange() {
    let tx = Transmitter::new(Config::default(), Id(0));
    let id = tx.new_id(token(1), Correlate::OneShot(None), 0).unwrap();
    tx.add_message(&con(id, token(1)), 0);
    tx.reset(id);
    assert!(tx.is_idle());
  }

  #[test]
  fn pending_expires_after_lifetime() {
    let tx = Transmitter::new(Config::default(), Id(0));
    tx.new_id(token(1), Correlate::OneShot(None), 0).unwrap();
    tx.sweep(246_999);
    assert_eq!(tx.pending_len(), 1);
    tx.sweep(247_000);
    assert_eq!(tx.pending_len(), 0);
  }
}
