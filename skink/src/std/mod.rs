use std::string::ToString;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use std::{fmt, io};

use embedded_time::rate::Fraction;

/// Networking! woohoo!
pub mod net;
pub use net::*;

/// Implement [`embedded_time::Clock`] using [`std::time`] primitives
#[derive(Debug, Clone, Copy)]
pub struct Clock(std::time::Instant);

impl Default for Clock {
  fn default() -> Self {
    Self::new()
  }
}

impl Clock {
  /// Create a new clock
  pub fn new() -> Self {
    Self(std::time::Instant::now())
  }
}

impl embedded_time::Clock for Clock {
  type T = u64;

  // microseconds
  const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000_000);

  fn try_now(&self) -> Result<embedded_time::Instant<Self>, embedded_time::clock::Error> {
    let now = std::time::Instant::now();
    let elapsed = now.duration_since(self.0);
    Ok(embedded_time::Instant::new(elapsed.as_micros() as u64))
  }
}

/// Whether a [`Timer`] should invoke its callback on the next tick
#[derive(Debug, Clone, Default)]
pub struct Arming(Arc<AtomicBool>);

impl Arming {
  /// Invoke the callback on following ticks
  pub fn arm(&self) {
    self.0.store(true, Ordering::SeqCst);
  }

  /// Skip following ticks until re-armed
  pub fn disarm(&self) {
    self.0.store(false, Ordering::SeqCst);
  }

  /// Is the timer armed?
  pub fn is_armed(&self) -> bool {
    self.0.load(Ordering::SeqCst)
  }
}

/// A periodic timer running on its own thread.
///
/// Every `period`, the callback is invoked if the timer is [armed](Arming).
/// Timers start disarmed.
///
/// Dropping the timer stops the thread and waits for an in-flight
/// tick to finish.
pub struct Timer {
  arming: Arming,
  stop: Option<mpsc::Sender<()>>,
  thread: Option<JoinHandle<()>>,
}

impl fmt::Debug for Timer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Timer")
     .field("armed", &self.arming.is_armed())
     .field("running", &self.thread.is_some())
     .finish()
  }
}

impl Timer {
  /// Start a timer thread named `name`
  pub fn spawn<F>(name: &str, period: Duration, mut tick: F) -> io::Result<Self>
    where F: FnMut(&Arming) + Send + 'static
  {
    let arming = Arming::default();
    let (stop, stopped) = mpsc::channel::<()>();

    let thread_arming = arming.clone();
    let thread = thread::Builder::new().name(name.to_string())
                                       .spawn(move || loop {
                                         match stopped.recv_timeout(period) {
                                           | Err(RecvTimeoutError::Timeout) => {
                                             if thread_arming.is_armed() {
                                               tick(&thread_arming)
                                             }
                                           },
                                           | _ => break,
                                         }
                                       })?;

    Ok(Self { arming,
              stop: Some(stop),
              thread: Some(thread) })
  }

  /// See [`Arming::arm`]
  pub fn arm(&self) {
    self.arming.arm()
  }

  /// See [`Arming::disarm`]
  pub fn disarm(&self) {
    self.arming.disarm()
  }

  /// See [`Arming::is_armed`]
  pub fn is_armed(&self) -> bool {
    self.arming.is_armed()
  }

  /// A handle arming or disarming this timer from elsewhere
  pub fn arming(&self) -> Arming {
    self.arming.clone()
  }
}

impl Drop for Timer {
  fn drop(&mut self) {
    self.stop.take();

    if let Some(thread) = self.thread.take() {
      if thread.thread().id() != thread::current().id() {
        thread.join().ok();
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::AtomicUsize;

  use super::*;

  fn counting_timer(disarm_after: usize) -> (Timer, Arc<AtomicUsize>) {
    let n = Arc::new(AtomicUsize::new(0));
    let n2 = n.clone();
    let timer = Timer::spawn("test", Duration::from_millis(5), move |arming| {
                  if n2.fetch_add(1, Ordering::SeqCst) + 1 >= disarm_after {
                    arming.disarm();
                  }
                }).unwrap();
    (timer, n)
  }

  #[test]
  fn disarmed_timer_does_not_tick() {
    let (_timer, n) = counting_timer(usize::MAX);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(n.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn callback_can_disarm() {
    let (timer, n) = counting_timer(3);
    timer.arm();
    thread::sleep(Duration::from_millis(200));
    assert_eq!(n.load(Ordering::SeqCst), 3);
    assert!(!timer.is_armed());
  }

  #[test]
  fn drop_stops_thread() {
    let (timer, n) = counting_timer(usize::MAX);
    timer.arm();
    thread::sleep(Duration::from_millis(30));
    drop(timer);
    let after_drop = n.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(30));
    assert_eq!(n.load(Ordering::SeqCst), after_drop);
  }
}
