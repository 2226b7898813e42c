use core::fmt;

use skink_msg::{Id, InvalidUri, MessageParseError, MessageToBytesError, Token};

use crate::uri::InvalidQuery;

/// The context that an error occurred in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum When {
  /// We were decoding or handling an inbound datagram
  Receiving,
  /// We were reading from the transport
  Polling,
  /// We were sending a message
  SendingMessage(Id, Token),
  /// We were authenticating the peer
  Authenticating,
  /// A background sweep was running
  Sweeping,
  /// We were sending a keepalive ping
  KeepingAlive,
  /// Opening or closing the transport
  Lifecycle,
}

impl When {
  /// Construct a specific error from the context the error occurred in
  pub fn what<E>(self, what: What<E>) -> Error<E> {
    Error { when: self, what }
  }
}

/// An error encounterable from within a [`Session`](crate::session::Session)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error<E> {
  /// What happened?
  pub what: What<E>,
  /// What were we doing when it happened?
  pub when: When,
}

impl<E> Error<E> {
  /// Is this error `FromBytes`?
  pub fn message_parse_error(&self) -> Option<&MessageParseError> {
    match self.what {
      | What::FromBytes(ref e) => Some(e),
      | _ => None,
    }
  }

  /// Was the peer rejected by the authenticator?
  pub fn is_unauthenticated(&self) -> bool {
    matches!(self.what, What::Unauthenticated)
  }
}

/// A contextless error with some additional debug data attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum What<E> {
  /// Some transport operation failed
  Transport(E),
  /// Serializing a message from bytes failed
  FromBytes(MessageParseError),
  /// Serializing a message to bytes failed
  ToBytes(MessageToBytesError),
  /// A resource URI could not be split into options
  InvalidUri(InvalidUri),
  /// The query parameters of a request could not be understood
  InvalidQuery(InvalidQuery),
  /// Every message id is tied to a pending exchange
  MessageIdsExhausted,
  /// The peer could not be authenticated
  Unauthenticated,
  /// The clock failed to provide timing.
  ///
  /// See [`embedded_time::clock::Error`]
  ClockError,
  /// Milliseconds since the clock's epoch did not fit in a `u64`
  MillisSinceEpochWouldOverflow,
}

impl<E: fmt::Debug> fmt::Display for What<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | What::Transport(e) => write!(f, "transport error: {:?}", e),
      | What::FromBytes(e) => write!(f, "{}", e),
      | What::ToBytes(e) => write!(f, "{}", e),
      | What::InvalidUri(e) => write!(f, "{}", e),
      | What::InvalidQuery(e) => write!(f, "{}", e),
      | What::MessageIdsExhausted => write!(f, "no message ids available"),
      | What::Unauthenticated => write!(f, "peer failed to authenticate"),
      | What::ClockError => write!(f, "clock failed to provide the time"),
      | What::MillisSinceEpochWouldOverflow => write!(f, "milliseconds since epoch overflowed"),
    }
  }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} (while {:?})", self.what, self.when)
  }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for Error<E> {}
