use std_alloc::vec::Vec;

use super::{Opt, OptNumber, OptParseError, OptValue};
use toad_cursor::Cursor;
use crate::from_bytes::TryConsumeBytes;
use crate::to_bytes::OptToBytesError;

/// The options of a message, kept sorted by number.
///
/// Options sharing a number keep the order they were added in,
/// which is the order they will be written to the wire in.
///
/// ```
/// use skink_msg::{known, OptValue, Options};
///
/// let mut opts = Options::new();
/// opts.push(known::repeat::PATH, OptValue::String("b".into()));
/// opts.push(known::no_repeat::HOST, OptValue::String("host".into()));
/// opts.push(known::repeat::PATH, OptValue::String("c".into()));
///
/// let numbers = opts.iter().map(|o| o.number.0).collect::<Vec<_>>();
/// assert_eq!(numbers, vec![3, 11, 11]);
///
/// let path = opts.get_all(known::repeat::PATH)
///                .filter_map(|v| v.as_str())
///                .collect::<Vec<_>>();
/// assert_eq!(path, vec!["b", "c"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Options(Vec<Opt>);

impl Options {
  /// Create an empty option collection
  pub fn new() -> Self {
    Self(Vec::new())
  }

  /// Iterate over the options in wire order
  pub fn iter(&self) -> impl Iterator<Item = &Opt> {
    self.0.iter()
  }

  /// Number of options
  pub fn len(&self) -> usize {
    self.0.len()
  }

  /// Are there no options?
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Get the first value of an option
  pub fn get(&self, number: OptNumber) -> Option<&OptValue> {
    self.get_all(number).next()
  }

  /// Get every value of a (repeatable) option, in the order they were added
  pub fn get_all(&self, number: OptNumber) -> impl Iterator<Item = &OptValue> {
    self.0
        .iter()
        .filter(move |o| o.number == number)
        .map(|o| &o.value)
  }

  /// Does this collection contain an option?
  pub fn contains(&self, number: OptNumber) -> bool {
    self.get(number).is_some()
  }

  /// Add a value for an option, after any values already present for it
  pub fn push(&mut self, number: OptNumber, value: OptValue) {
    let ix = self.0.partition_point(|o| o.number <= number);
    self.0.insert(ix, Opt::new(number, value));
  }

  /// Replace all values of an option with a single value
  pub fn set(&mut self, number: OptNumber, value: OptValue) {
    self.remove(number);
    self.push(number, value);
  }

  /// Remove all values of an option, yielding how many were removed
  pub fn remove(&mut self, number: OptNumber) -> usize {
    let before = self.0.len();
    self.0.retain(|o| o.number != number);
    before - self.0.len()
  }

  /// Write the options to a byte buffer
  pub fn extend_bytes(&self, bytes: &mut Vec<u8>) -> Result<(), OptToBytesError> {
    self.0
        .iter()
        .try_fold(OptNumber(0), |prev, opt| opt.extend_bytes(prev, bytes).map(|_| opt.number))
        .map(|_| ())
  }
}

impl FromIterator<Opt> for Options {
  fn from_iter<T: IntoIterator<Item = Opt>>(iter: T) -> Self {
    let mut opts = Options::new();
    iter.into_iter()
        .for_each(|Opt { number, value }| opts.push(number, value));
    opts
  }
}

impl<Bytes: AsRef<[u8]>> TryConsumeBytes<Bytes> for Options {
  type Error = OptParseError;

  fn try_consume_bytes(bytes: &mut Cursor<Bytes>) -> Result<Self, Self::Error> {
    let mut opts = Vec::new();
    let mut prev = OptNumber(0);

    loop {
      match Opt::try_consume_bytes(prev, bytes) {
        | Ok(opt) => {
          prev = opt.number;
          opts.push(opt);
        },
        | Err(OptParseError::OptionsExhausted) => break Ok(Options(opts)),
        | Err(e) => break Err(e),
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::known::no_repeat::*;
  use crate::known::repeat::*;

  #[test]
  fn parse_options() {
    let mut bytes = Cursor::new([0b00010001, 0b00000001, 0b00000001, 0b00000011, 0b11111111, 9]);
    let opts = Options::try_consume_bytes(&mut bytes).unwrap();
    assert_eq!(opts,
               Options(vec![Opt::new(IF_MATCH, OptValue::Opaque(vec![1])),
                            Opt::new(IF_MATCH, OptValue::Opaque(vec![3]))]));
    assert_eq!(bytes.take_until_end(), &[9]);
  }

  #[test]
  fn set_and_remove() {
    let mut opts = Options::new();
    opts.push(QUERY, OptValue::String("a=1".into()));
    opts.push(QUERY, OptValue::String("b=2".into()));
    opts.set(CONTENT_FORMAT, OptValue::Uint(0));
    opts.set(CONTENT_FORMAT, OptValue::Uint(50));

    assert_eq!(opts.get(CONTENT_FORMAT), Some(&OptValue::Uint(50)));
    assert_eq!(opts.len(), 3);
    assert_eq!(opts.remove(QUERY), 2);
    assert!(!opts.contains(QUERY));
  }

  #[test]
  fn encode_sorted_with_deltas() {
    let opts: Options = vec![Opt::new(PATH, OptValue::String("a".into())),
                             Opt::new(HOST, OptValue::String("h".into())),
                             Opt::new(PATH, OptValue::String("b".into()))].into_iter()
                                                                          .collect();

    let mut bytes = Vec::new();
    opts.extend_bytes(&mut bytes).unwrap();
    assert_eq!(bytes,
               vec![0b0011_0001, b'h', 0b1000_0001, b'a', 0b0000_0001, b'b']);
  }
}
