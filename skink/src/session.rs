use core::fmt;

use std_alloc::string::String;
use std_alloc::sync::Arc;
use std_alloc::vec::Vec;

use skink_msg::{Code, Id, Message, Token, TryFromBytes, TryIntoBytes, Type};
use toad_stem::Stem;

use crate::auth::Authenticator;
use crate::config::Config;
use crate::dispatch::Dispatch;
use crate::error::{Error, What, When};
use crate::handle::{Context, Handler};
use crate::logging::{log_event, msg_summary};
use crate::net::Transport;
use crate::pdu::Pdu;
use crate::receiver::Receiver;
use crate::time::{millis_since_epoch, Clock};
use crate::token::TokenGenerator;
use crate::transmitter::{Callback, Correlate, Event, ObserveCallback, Transmitter};
use crate::uri::ResourceQuery;

/// Size of the buffer inbound datagrams are read into
pub const MAX_DGRAM_SIZE: usize = 1152;

/// Invoked with the id & token of a confirmable message that was
/// retransmitted `max_retransmit` times without being acknowledged
pub type AbandonedListener = Arc<dyn Fn(Id, Token) + Send + Sync>;

/// Who the peer authenticated as
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
  /// Kind of token presented
  pub token_type: String,
  /// Token presented
  pub token: String,
  /// Index pairs presented alongside the credential
  pub indexes: Vec<(String, String)>,
}

#[derive(Debug, Default)]
struct AuthState {
  authenticated: bool,
  identity: Option<Identity>,
}

#[cfg(feature = "std")]
#[derive(Debug, Clone)]
struct Armings {
  receiver: crate::std::Arming,
  transmitter: crate::std::Arming,
}

struct Core<C, T> {
  config: Config,
  clock: C,
  transport: T,
  receiver: Receiver,
  transmitter: Transmitter,
  tokens: TokenGenerator,
  keepalive_expires_at: Stem<u64>,
  on_abandoned: Stem<Option<AbandonedListener>>,
  #[cfg(feature = "std")]
  armings: Stem<Option<Armings>>,
}

impl<C, T> Core<C, T> {
  /// Wake the sweep timers whose tables have work in them
  fn arm_timers(&self) {
    #[cfg(feature = "std")]
    {
      self.armings.map_ref(|armings| {
                    if let Some(armings) = armings {
                      if !self.receiver.is_empty() {
                        armings.receiver.arm();
                      }
                      if !self.transmitter.is_idle() {
                        armings.transmitter.arm();
                      }
                    }
                  });
    }
  }
}

impl<C: Clock, T: Transport> Core<C, T> {
  fn now(&self, when: When) -> Result<u64, Error<T::Error>> {
    millis_since_epoch(&self.clock).map_err(|what| when.what(what))
  }

  fn send(&self, msg: &Message, when: When) -> Result<(), Error<T::Error>> {
    let bytes = msg.try_into_bytes()
                   .map_err(|e| when.what(What::ToBytes(e)))?;

    nb::block!(self.transport.send(&bytes)).map_err(|e| when.what(What::Transport(e)))?;

    log_event!(Session::send, log::Level::Trace, "sent {}", msg_summary(msg));
    Ok(())
  }

  fn touch_keepalive(&self, now: u64) {
    if let Some(interval) = self.config.keepalive {
      self.keepalive_expires_at
          .map_mut(|exp| *exp = now.saturating_add(interval.0));
    }
  }

  fn sweep_receiver(&self, now: u64) {
    let n = self.receiver.sweep(now);
    if n > 0 {
      log_event!(Session::sweep_receiver, log::Level::Trace, "forgot {} message ids", n);
    }
  }

  fn sweep_transmitter(&self, now: u64) -> Result<(), Error<T::Error>> {
    self.transmitter
        .sweep(now)
        .into_iter()
        .try_for_each(|event| match event {
          | Event::Retry(msg) => {
            log_event!(Session::sweep_transmitter,
                       log::Level::Debug,
                       "retrying {}",
                       msg_summary(&msg));
            self.send(&msg, When::SendingMessage(msg.id, msg.token))
          },
          | Event::Abandoned { id, token } => {
            log_event!(Session::sweep_transmitter,
                       log::Level::Warn,
                       "{:?} ({:?}) was never acknowledged, abandoning exchange",
                       id,
                       token);
            if let Some(listener) = self.on_abandoned.map_ref(|l| l.clone()) {
              listener(id, token);
            }
            Ok(())
          },
        })
  }

  fn keepalive_tick(&self, now: u64) -> Result<bool, Error<T::Error>> {
    let interval = match self.config.keepalive {
      | Some(interval) => interval.0,
      | None => return Ok(false),
    };

    if self.keepalive_expires_at.map_ref(|exp| *exp) > now {
      return Ok(false);
    }

    let ping = Message::new(Type::Con,
                            Code::EMPTY,
                            self.transmitter.allocate_id(),
                            Token::default());
    log_event!(Session::keepalive_tick, log::Level::Trace, "ping {:?}", ping.id);

    self.transmitter.add_message(&ping, now);
    self.arm_timers();
    self.keepalive_expires_at
        .map_mut(|exp| *exp = now.saturating_add(interval));
    self.send(&ping, When::KeepingAlive)?;
    Ok(true)
  }
}

#[cfg(feature = "std")]
#[derive(Debug)]
struct Timers {
  receiver: crate::std::Timer,
  transmitter: crate::std::Timer,
  keepalive: Option<crate::std::Timer>,
}

/// # CoAP session
///
/// The unit of state for one logical CoAP endpoint talking to one peer
/// over one [`Transport`].
///
/// Inbound datagrams are fed in with [`Session::receive`] (or pulled from
/// the transport with [`Session::poll`]); each is decoded, its sender
/// authenticated, and handled by exactly one [`Handler`], whose reply
/// (if any) is sent straight back.
///
/// Outbound requests are sent with [`Session::send_request`] and
/// [`Session::observe`]; responses are delivered to the callbacks
/// given there.
///
/// Expired dedup entries and exchanges are swept, retries fired and
/// keepalive pings sent either by [`Session::tick`] or, with feature `std`,
/// by background timers started with [`Session::start`].
pub struct Session<C, T, D, A> {
  core: Arc<Core<C, T>>,
  dispatch: D,
  auth: A,
  auth_state: Stem<AuthState>,
  #[cfg(feature = "std")]
  timers: Option<Timers>,
}

impl<C, T, D, A> fmt::Debug for Session<C, T, D, A> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Session")
     .field("config", &self.core.config)
     .field("receiver", &self.core.receiver)
     .field("transmitter", &self.core.transmitter)
     .field("auth_state", &self.auth_state)
     .finish()
  }
}

impl<C, T, D, A> Session<C, T, D, A>
  where C: Clock,
        T: Transport,
        D: Dispatch,
        A: Authenticator
{
  /// Create a session
  pub fn new(config: Config,
             clock: C,
             transport: T,
             dispatch: D,
             auth: A)
             -> Result<Self, Error<T::Error>> {
    let now = millis_since_epoch(&clock).map_err(|what| When::Lifecycle.what(what))?;
    transport.open()
             .map_err(|e| When::Lifecycle.what(What::Transport(e)))?;

    let tokens = TokenGenerator::new(&config, now);
    let core = Core { receiver: Receiver::new(config.exchange_lifetime_millis()),
                      transmitter: Transmitter::new(config, tokens.next_id()),
                      keepalive_expires_at: Stem::new(now.saturating_add(config.keepalive
                                                                               .map(|k| k.0)
                                                                               .unwrap_or(0))),
                      on_abandoned: Stem::new(None),
                      #[cfg(feature = "std")]
                      armings: Stem::new(None),
                      tokens,
                      config,
                      clock,
                      transport };

    Ok(Self { core: Arc::new(core),
              dispatch,
              auth,
              auth_state: Stem::new(AuthState::default()),
              #[cfg(feature = "std")]
              timers: None })
  }

  /// Runtime config
  pub fn config(&self) -> Config {
    self.core.config
  }

  /// Borrow the dedup cache
  pub fn receiver(&self) -> &Receiver {
    &self.core.receiver
  }

  /// Borrow the outbound exchange state
  pub fn transmitter(&self) -> &Transmitter {
    &self.core.transmitter
  }

  /// Borrow the transport
  pub fn transport(&self) -> &T {
    &self.core.transport
  }

  /// Handle an inbound datagram, yielding the reply that was sent (if any).
  ///
  /// Datagrams that cannot be decoded are discarded without reply.
  pub fn receive(&self, dgram: &[u8]) -> Result<Option<Message>, Error<T::Error>> {
    let now = self.core.now(When::Receiving)?;
    self.core.touch_keepalive(now);

    let msg = Message::try_from_bytes(dgram).map_err(|e| {
                                                log_event!(Session::receive,
                                                           log::Level::Warn,
                                                           "discarding {} byte datagram: {}",
                                                           dgram.len(),
                                                           e);
                                                When::Receiving.what(What::FromBytes(e))
                                              })?;

    log_event!(Session::receive, log::Level::Trace, "got {}", msg_summary(&msg));

    let pdu = Pdu::from(msg);
    if let Pdu::Request(req) = &pdu {
      self.ensure_authentication(req.msg(), false)?;
    }

    let ctx = Context { config: self.core.config,
                        now,
                        receiver: &self.core.receiver,
                        transmitter: &self.core.transmitter,
                        dispatch: &self.dispatch };
    let rep = Handler::for_pdu(&pdu).handle(&ctx, &pdu);

    self.arm_timers();

    match rep {
      | Some(rep) => {
        self.core.send(&rep, When::SendingMessage(rep.id, rep.token))?;
        Ok(Some(rep))
      },
      | None => Ok(None),
    }
  }

  /// Receive and handle every datagram the transport has ready,
  /// yielding the number of datagrams handled.
  ///
  /// Datagrams that fail to be handled are logged and skipped.
  pub fn poll(&self) -> Result<usize, Error<T::Error>> {
    let mut buf = [0u8; MAX_DGRAM_SIZE];
    let mut n = 0;

    loop {
      let len = match self.core.transport.recv(&mut buf) {
        | Ok(len) => len,
        | Err(nb::Error::WouldBlock) => break,
        | Err(nb::Error::Other(e)) => return Err(When::Polling.what(What::Transport(e))),
      };

      if let Err(e) = self.receive(&buf[..len]) {
        log_event!(Session::poll, log::Level::Warn, "{}", e);
      }
      n += 1;
    }

    Ok(n)
  }

  /// Sweep expired dedup entries & exchanges, fire due retries
  /// and send a keepalive ping if one is due.
  ///
  /// Only needed when background timers are not running.
  pub fn tick(&self) -> Result<(), Error<T::Error>> {
    let now = self.core.now(When::Sweeping)?;
    self.core.sweep_receiver(now);
    self.core.sweep_transmitter(now)?;
    self.core.keepalive_tick(now)?;
    Ok(())
  }

  /// Send a request, invoking `callback` with the first response.
  ///
  /// A token is generated if the request has none, and a message id
  /// is always allocated. Confirmable requests are retransmitted until
  /// acknowledged or `max_retransmit` is exhausted.
  pub fn send_request(&self,
                      msg: Message,
                      callback: Option<Callback>)
                      -> Result<Id, Error<T::Error>> {
    self.send_correlated(msg, Correlate::OneShot(callback))
        .map(|(id, _)| id)
  }

  /// Register as an observer of a resource, invoking `callback`
  /// with every notification until [`Session::unobserve`].
  ///
  /// The Observe option is set on `msg`.
  pub fn observe(&self, mut msg: Message, callback: ObserveCallback) -> Result<Token, Error<T::Error>> {
    msg.set_observe(true);
    self.send_correlated(msg, Correlate::Observe(callback))
        .map(|(_, token)| token)
  }

  /// Stop delivering notifications for `token`
  pub fn unobserve(&self, token: Token) -> bool {
    self.core.transmitter.unobserve(token)
  }

  fn send_correlated(&self, mut msg: Message, correlate: Correlate) -> Result<(Id, Token), Error<T::Error>> {
    if msg.token.is_empty() {
      msg.token = self.core.tokens.next();
    }

    let when = When::SendingMessage(msg.id, msg.token);
    let now = self.core.now(when)?;

    msg.id = self.core
                 .transmitter
                 .new_id(msg.token, correlate, now)
                 .map_err(|_| when.what(What::MessageIdsExhausted))?;

    self.core.transmitter.add_message(&msg, now);
    self.core
        .send(&msg, When::SendingMessage(msg.id, msg.token))
        .map_err(|e| {
          self.core.transmitter.reset(msg.id);
          e
        })?;

    self.core.touch_keepalive(now);
    self.arm_timers();
    Ok((msg.id, msg.token))
  }

  /// Authenticate the sender of `msg` using the `tt` & `t` query parameters.
  ///
  /// Once authenticated, the credential is not checked again unless `force`d.
  /// Without credentials, peers are accepted only if the authenticator
  /// does not [require](Authenticator::required) them.
  pub fn ensure_authentication(&self, msg: &Message, force: bool) -> Result<(), Error<T::Error>> {
    if !force && self.is_authenticated() {
      return Ok(());
    }

    let query = ResourceQuery::from_message(msg).map_err(|e| When::Authenticating.what(What::InvalidQuery(e)))?;

    let (token_type, token) = match query.credentials() {
      | Some(cred) => cred,
      | None if !self.auth.required() => return Ok(()),
      | None => {
        log_event!(Session::ensure_authentication,
                   log::Level::Warn,
                   "no credentials presented with {}",
                   msg_summary(msg));
        return Err(When::Authenticating.what(What::Unauthenticated));
      },
    };

    if !self.auth.authenticate(token_type, token) {
      log_event!(Session::ensure_authentication,
                 log::Level::Warn,
                 "rejected {} credential",
                 token_type);
      self.auth_state.map_mut(|s| *s = AuthState::default());
      return Err(When::Authenticating.what(What::Unauthenticated));
    }

    let mut identity = Some(Identity { token_type: token_type.into(),
                                       token: token.into(),
                                       indexes: query.indexes.clone() });
    self.auth_state.map_mut(|s| {
                     s.authenticated = true;
                     s.identity = identity.take();
                   });

    log_event!(Session::ensure_authentication,
               log::Level::Debug,
               "authenticated with {} credential",
               token_type);
    Ok(())
  }

  /// Has the peer authenticated?
  pub fn is_authenticated(&self) -> bool {
    self.auth_state.map_ref(|s| s.authenticated)
  }

  /// Who the peer authenticated as
  pub fn identity(&self) -> Option<Identity> {
    self.auth_state.map_ref(|s| s.identity.clone())
  }

  /// Note that traffic was seen, postponing the next keepalive ping
  pub fn update_keepalive_timestamp(&self) -> Result<(), Error<T::Error>> {
    let now = self.core.now(When::KeepingAlive)?;
    self.core.touch_keepalive(now);
    Ok(())
  }

  /// Call `f` whenever a confirmable message is abandoned
  pub fn on_abandoned<F>(&self, f: F)
    where F: Fn(Id, Token) + Send + Sync + 'static
  {
    let mut f = Some(Arc::new(f) as AbandonedListener);
    self.core.on_abandoned.map_mut(|l| *l = f.take());
  }

  /// Stop timers, forget all exchange state and close the transport.
  ///
  /// The session should not be used afterwards.
  pub fn dispose(&mut self) {
    #[cfg(feature = "std")]
    {
      self.core.armings.map_mut(|a| *a = None);
      self.timers = None;
    }

    self.core.receiver.clear();
    self.core.transmitter.clear();
    if let Err(e) = self.core.transport.close() {
      log_event!(Session::dispose, log::Level::Warn, "failed to close transport: {:?}", e);
    }
  }

  fn arm_timers(&self) {
    self.core.arm_timers();
  }
}

#[cfg(feature = "std")]
impl<C, T, D, A> Session<C, T, D, A>
  where C: Clock + Send + Sync + 'static,
        T: Transport + Send + Sync + 'static,
        D: Dispatch,
        A: Authenticator
{
  /// Start background timers sweeping the dedup & exchange tables
  /// every [`sweep_interval`](Config::sweep_interval), and sending
  /// keepalive pings if [`keepalive`](Config::keepalive) is set.
  ///
  /// The sweep timers disarm themselves while their table is empty.
  pub fn start(&mut self) -> std::io::Result<()> {
    use std::time::Duration;

    use crate::std::{Arming, Timer};

    fn now_or_log<C: Clock, T: Transport>(core: &Core<C, T>) -> Option<u64> {
      core.now(When::Sweeping)
          .map_err(|e| log_event!(Session::start, log::Level::Error, "{}", e))
          .ok()
    }

    let sweep = Duration::from_millis(self.core.config.sweep_interval.0);

    let core = self.core.clone();
    let receiver = Timer::spawn("skink-receiver", sweep, move |arming: &Arming| {
                     if let Some(now) = now_or_log(&core) {
                       core.sweep_receiver(now);
                     }
                     if core.receiver.is_empty() {
                       arming.disarm();
                       if !core.receiver.is_empty() {
                         arming.arm();
                       }
                     }
                   })?;

    let core = self.core.clone();
    let transmitter = Timer::spawn("skink-transmitter", sweep, move |arming: &Arming| {
                        if let Some(now) = now_or_log(&core) {
                          if let Err(e) = core.sweep_transmitter(now) {
                            log_event!(Session::start, log::Level::Error, "{}", e);
                          }
                        }
                        if core.transmitter.is_idle() {
                          arming.disarm();
                          if !core.transmitter.is_idle() {
                            arming.arm();
                          }
                        }
                      })?;

    let mut armings = Some(Armings { receiver: receiver.arming(),
                                     transmitter: transmitter.arming() });
    self.core.armings.map_mut(|a| *a = armings.take());

    let keepalive = match self.core.config.keepalive {
      | Some(interval) => {
        let core = self.core.clone();
        let timer = Timer::spawn("skink-keepalive",
                                 Duration::from_millis(interval.0),
                                 move |_: &Arming| {
                                   if let Some(now) = now_or_log(&core) {
                                     if let Err(e) = core.keepalive_tick(now) {
                                       log_event!(Session::start, log::Level::Error, "{}", e);
                                     }
                                   }
                                 })?;
        timer.arm();
        Some(timer)
      },
      | None => None,
    };

    self.timers = Some(Timers { receiver,
                                transmitter,
                                keepalive });
    self.arm_timers();
    Ok(())
  }
}

impl<C, T, D, A> Drop for Session<C, T, D, A> {
  fn drop(&mut self) {
    #[cfg(feature = "std")]
    {
      self.core.armings.map_mut(|a| *a = None);
      self.timers = None;
    }
    self.core.receiver.clear();
    self.core.transmitter.clear();
  }
}
