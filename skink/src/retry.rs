use core::ops::Sub;

use embedded_time::duration::Milliseconds;

use crate::time::Millis;

/// A number of attempts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Attempts(pub u16);

impl Sub for Attempts {
  type Output = Attempts;

  fn sub(self, rhs: Self) -> Self::Output {
    Attempts(self.0.saturating_sub(rhs.0))
  }
}

/// How the wait between retransmissions of an unacknowledged
/// confirmable message grows.
///
/// Retries are counted from zero; the first retransmission happens
/// once `ack_timeout` has passed since the original was sent.
///
/// ```
/// use embedded_time::duration::Milliseconds;
/// use skink::retry::{Attempts, Backoff};
///
/// let t = Milliseconds(2_000u64);
///
/// // waits of T, 2T, 4T, 8T, 16T
/// assert_eq!(Backoff::Exponential.delay(t, Attempts(0)), Milliseconds(2_000u64));
/// assert_eq!(Backoff::Exponential.delay(t, Attempts(3)), Milliseconds(16_000u64));
///
/// // waits of T, T, T, T, T
/// assert_eq!(Backoff::Constant.delay(t, Attempts(3)), Milliseconds(2_000u64));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Backoff {
  /// Double the wait after every retransmission
  Exponential,
  /// Wait `ack_timeout` between every retransmission
  Constant,
}

impl Default for Backoff {
  fn default() -> Self {
    Backoff::Exponential
  }
}

impl Backoff {
  /// How long to wait after `attempts` retransmissions have been sent
  pub fn delay(&self, Milliseconds(ack_timeout): Millis, Attempts(attempts): Attempts) -> Millis {
    match self {
      | Backoff::Exponential => {
        let factor = 1u64.checked_shl(attempts as u32).unwrap_or(u64::MAX);
        Milliseconds(ack_timeout.saturating_mul(factor))
      },
      | Backoff::Constant => Milliseconds(ack_timeout),
    }
  }

  /// Time between the original transmission and the last retransmission
  /// when `max` retransmissions are sent
  pub fn span(&self, ack_timeout: Millis, Attempts(max): Attempts) -> Millis {
    Milliseconds((0..max).map(|n| self.delay(ack_timeout, Attempts(n)).0)
                         .fold(0u64, u64::saturating_add))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn span() {
    let t = Milliseconds(2_000u64);
    assert_eq!(Backoff::Exponential.span(t, Attempts(4)), Milliseconds(30_000u64));
    assert_eq!(Backoff::Constant.span(t, Attempts(4)), Milliseconds(8_000u64));
    assert_eq!(Backoff::Exponential.span(t, Attempts(0)), Milliseconds(0u64));
  }

  #[test]
  fn delay_saturates() {
    let t = Milliseconds(2_000u64);
    assert_eq!(Backoff::Exponential.delay(t, Attempts(200)), Milliseconds(u64::MAX));
  }
}
