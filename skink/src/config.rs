use embedded_time::duration::Milliseconds;

use crate::retry::{Attempts, Backoff};
use crate::time::Millis;

/// Configuration options related to outbound CON messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Con {
  /// How long to wait for an ACK before the first retransmission.
  ///
  /// Defaults to 2 seconds.
  /// ```
  /// use embedded_time::duration::Milliseconds;
  /// use skink::config::Con;
  ///
  /// assert_eq!(Con::default().ack_timeout, Milliseconds(2_000u64));
  /// ```
  pub ack_timeout: Millis,
  /// Number of times we are allowed to resend a CON message
  /// before the exchange is abandoned.
  ///
  /// Defaults to 4 attempts.
  /// ```
  /// use skink::config::Con;
  /// use skink::retry::Attempts;
  ///
  /// assert_eq!(Con::default().max_retransmit, Attempts(4));
  /// ```
  pub max_retransmit: Attempts,
  /// How the wait between retransmissions grows.
  ///
  /// Defaults to [`Backoff::Exponential`].
  pub backoff: Backoff,
}

/// Configuration options related to parsing & handling messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Msg {
  /// Seed mixed into the token generator,
  /// customizable to allow for your application to generate tokens
  /// less guessably.
  ///
  /// The default value is 0, although it is
  /// best practice to set this to something else.
  /// (random integer, machine identifier)
  ///
  /// ```
  /// use skink::config::Msg;
  ///
  /// assert_eq!(Msg::default().token_seed, 0);
  /// ```
  pub token_seed: u16,

  /// Number of bytes in generated tokens, at most 8.
  ///
  /// ```
  /// use skink::config::Msg;
  ///
  /// assert_eq!(Msg::default().token_len, 8);
  /// ```
  pub token_len: u8,

  /// See [`Con`]
  pub con: Con,
}

impl Default for Con {
  fn default() -> Self {
    Con { ack_timeout: Milliseconds(2_000),
          max_retransmit: Attempts(4),
          backoff: Backoff::Exponential }
  }
}

impl Default for Msg {
  fn default() -> Self {
    Msg { token_seed: 0,
          token_len: 8,
          con: Con::default() }
  }
}

/// Runtime config
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Config {
  /// See [`Msg`]
  pub msg: Msg,
  /// How often the dedup and retry tables are swept
  ///
  /// ```
  /// use embedded_time::duration::Milliseconds;
  /// use skink::config::Config;
  ///
  /// assert_eq!(Config::default().sweep_interval, Milliseconds(1_000u64));
  /// ```
  pub sweep_interval: Millis,
  /// Send an empty CON "ping" when no traffic has been seen
  /// for this long.
  ///
  /// Disabled (`None`) by default.
  pub keepalive: Option<Millis>,
}

impl Default for Config {
  fn default() -> Self {
    Config { msg: Msg::default(),
             sweep_interval: Milliseconds(1_000),
             keepalive: None }
  }
}

impl Config {
  /// `MAX_TRANSMIT_SPAN`; the longest we might keep retransmitting
  /// a CON message, with `ACK_RANDOM_FACTOR` of 1.5 applied.
  pub fn max_transmit_span_millis(&self) -> u64 {
    let span = self.msg
                   .con
                   .backoff
                   .span(self.msg.con.ack_timeout, self.msg.con.max_retransmit)
                   .0;

    span.saturating_mul(3) / 2
  }

  /// `MAX_LATENCY`; the longest a datagram is expected to be in flight
  pub fn max_latency_millis(&self) -> u64 {
    100_000
  }

  /// `PROCESSING_DELAY`; how long a peer may take to ACK a CON
  pub fn processing_delay_millis(&self) -> u64 {
    self.msg.con.ack_timeout.0
  }

  /// `EXCHANGE_LIFETIME`; how long a message id or token stays live.
  ///
  /// ```
  /// use skink::config::Config;
  ///
  /// assert_eq!(Config::default().exchange_lifetime_millis(), 247_000);
  /// ```
  pub fn exchange_lifetime_millis(&self) -> u64 {
    self.max_transmit_span_millis()
    + (2 * self.max_latency_millis())
    + self.processing_delay_millis()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lifetime_follows_backoff() {
    let mut cfg = Config::default();
    assert_eq!(cfg.max_transmit_span_millis(), 45_000);

    cfg.msg.con.backoff = Backoff::Constant;
    assert_eq!(cfg.max_transmit_span_millis(), 12_000);
    assert_eq!(cfg.exchange_lifetime_millis(), 12_000 + 200_000 + 2_000);
  }
}
