use embedded_time::duration::Milliseconds;

use crate::error::What;

/// A duration, in milliseconds
pub type Millis = Milliseconds<u64>;

/// Supertrait of [`embedded_time::Clock`] pinning the
/// type of "ticks" to u64
pub trait Clock: embedded_time::Clock<T = u64> {}
impl<C: embedded_time::Clock<T = u64>> Clock for C {}

/// Milliseconds elapsed since the clock's epoch.
///
/// Every deadline kept by the runtime is expressed in these units.
pub fn millis_since_epoch<C: Clock, E>(clock: &C) -> Result<u64, What<E>> {
  let now = clock.try_now().map_err(|_| What::ClockError)?;
  Millis::try_from(now.duration_since_epoch()).map(|Milliseconds(ms)| ms)
                                              .map_err(|_| What::MillisSinceEpochWouldOverflow)
}
