use std_alloc::collections::BTreeMap;
use std_alloc::vec::Vec;

use skink_msg::Id;
use toad_stem::Stem;

/// # Deduplication cache
///
/// Remembers the ids of recently received confirmable messages
/// for one exchange lifetime, so that a retransmitted request can be
/// acknowledged again without being processed again.
///
/// ```
/// use skink::receiver::Receiver;
/// use skink_msg::Id;
///
/// let recv = Receiver::new(1_000);
///
/// assert!(recv.cache_id(Id(1), 0));
/// assert!(!recv.cache_id(Id(1), 10));
/// assert!(recv.is_dup(Id(1)));
///
/// recv.sweep(999);
/// assert!(recv.is_dup(Id(1)));
///
/// recv.sweep(1_000);
/// assert!(!recv.is_dup(Id(1)));
/// ```
#[derive(Debug)]
pub struct Receiver {
  seen: Stem<BTreeMap<Id, u64>>,
  lifetime: u64,
}

impl Receiver {
  /// Create a dedup cache whose entries live for `lifetime_millis`
  pub fn new(lifetime_millis: u64) -> Self {
    Self { seen: Stem::new(BTreeMap::new()),
           lifetime: lifetime_millis }
  }

  /// Remember `id` until `now + lifetime`.
  ///
  /// Yields `false` without touching the existing entry
  /// if the id was already cached.
  pub fn cache_id(&self, id: Id, now: u64) -> bool {
    let expires_at = now.saturating_add(self.lifetime);
    self.seen.map_mut(|seen| {
               if seen.contains_key(&id) {
                 false
               } else {
                 seen.insert(id, expires_at);
                 true
               }
             })
  }

  /// Has `id` been seen within the exchange lifetime?
  pub fn is_dup(&self, id: Id) -> bool {
    self.seen.map_ref(|seen| seen.contains_key(&id))
  }

  /// Forget `id`
  pub fn remove(&self, id: Id) {
    self.seen.map_mut(|seen| seen.remove(&id));
  }

  /// Forget every id whose lifetime has passed,
  /// yielding the number of ids forgotten.
  pub fn sweep(&self, now: u64) -> usize {
    self.seen.map_mut(|seen| {
               let expired = seen.iter()
                                 .filter(|(_, expires_at)| **expires_at <= now)
                                 .map(|(id, _)| *id)
                                 .collect::<Vec<_>>();

               expired.iter().for_each(|id| {
                               seen.remove(id);
                             });
               expired.len()
             })
  }

  /// Number of ids remembered
  pub fn len(&self) -> usize {
    self.seen.map_ref(|seen| seen.len())
  }

  /// Are no ids remembered?
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Forget everything
  pub fn clear(&self) {
    self.seen.map_mut(|seen| seen.clear());
  }
}
