//! `skink` is the CoAP protocol engine of the skink constrained-device gateway.
//!
//! It sits between an unreliable datagram [`Transport`](net::Transport) and the
//! application ([`Dispatch`](dispatch::Dispatch)), and implements the reliability
//! layer of [RFC 7252](https://datatracker.ietf.org/doc/html/rfc7252):
//! - confirmable & non-confirmable exchanges
//! - deduplication of retransmitted confirmable messages ([`receiver`])
//! - retransmission with exponential backoff ([`retry`], [`transmitter`])
//! - token-correlated responses & observe notifications ([`transmitter`])
//! - bootstrap authentication & keepalive ([`session`])
//!
//! Messages themselves are provided by the [`skink_msg`] crate.
//!
//! ## Example
//! ```
//! use skink::auth::Anonymous;
//! use skink::config::Config;
//! use skink::dispatch::Dispatch;
//! use skink::net::Transport;
//! use skink::session::Session;
//! use skink_msg::{Code, Id, Message, Token, TryIntoBytes, Type};
//!
//! struct Loopback;
//! impl Transport for Loopback {
//!   type Error = ();
//!   fn send(&self, _: &[u8]) -> nb::Result<(), ()> { Ok(()) }
//!   fn recv(&self, _: &mut [u8]) -> nb::Result<usize, ()> { Err(nb::Error::WouldBlock) }
//! }
//!
//! struct Hello;
//! impl Dispatch for Hello {
//!   type Error = ();
//!   fn post(&self, _: &Message) -> nb::Result<Message, ()> {
//!     let mut rep = Message::default();
//!     rep.code = Code::CHANGED;
//!     Ok(rep)
//!   }
//!   fn put(&self, m: &Message) -> nb::Result<Message, ()> { self.post(m) }
//!   fn observe(&self, m: &Message) -> nb::Result<Message, ()> { self.post(m) }
//!   fn delete(&self, m: &Message) -> nb::Result<Message, ()> { self.post(m) }
//! }
//!
//! let session = Session::new(Config::default(),
//!                            skink::std::Clock::new(),
//!                            Loopback,
//!                            Hello,
//!                            Anonymous).unwrap();
//!
//! let req = Message::new(Type::Con, Code::POST, Id(1), Token::default());
//! let rep = session.receive(&req.try_into_bytes().unwrap()).unwrap().unwrap();
//!
//! assert_eq!(rep.ty, Type::Ack);
//! assert_eq!(rep.id, Id(1));
//! assert_eq!(rep.code, Code::CHANGED);
//! ```

#![cfg_attr(any(docsrs, feature = "docs"), feature(doc_cfg))]
// -
// style
#![allow(clippy::unused_unit)]
// -
// deny
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![deny(missing_copy_implementations)]
#![cfg_attr(not(test), deny(unsafe_code))]
// -
// warnings
#![cfg_attr(not(test), warn(unreachable_pub))]
// -
// features
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc as std_alloc;

#[cfg(test)]
pub(crate) mod test;

pub(crate) mod logging;

/// Runtime configuration
pub mod config;

/// Errors yielded by the runtime
pub mod error;

/// Time & clocks
pub mod time;

/// Retransmission backoff
pub mod retry;

/// Correlation token generation
pub mod token;

/// Deduplication of inbound messages
pub mod receiver;

/// Retransmission & response correlation of outbound messages
pub mod transmitter;

/// Messages tagged as requests, responses or empty messages
pub mod pdu;

/// Resource query parameters
pub mod uri;

/// Peer authentication
pub mod auth;

/// Application-level request handling
pub mod dispatch;

/// Datagram transports
pub mod net;

pub mod handle;

/// One logical CoAP endpoint
pub mod session;

/// `std` platform support; clocks, timers and UDP
#[cfg(feature = "std")]
#[cfg_attr(any(docsrs, feature = "docs"), doc(cfg(feature = "std")))]
pub mod std;

pub use error::{Error, What, When};
pub use session::Session;
