use skink_msg::Message;

/// Application-level resource handling
///
/// Each operation receives the inbound request and yields
/// the response to send back. The runtime fills in the
/// message type, id and token of the response; implementors
/// only need to pick a code, options and payload.
///
/// Operations may yield [`nb::Error::WouldBlock`] while the
/// response is still being computed; the handler will poll again.
///
/// Errors are logged by the runtime and result in no response being sent.
pub trait Dispatch {
  /// Application error
  type Error: core::fmt::Debug;

  /// Handle a POST
  fn post(&self, req: &Message) -> nb::Result<Message, Self::Error>;

  /// Handle a PUT (subscribe)
  fn put(&self, req: &Message) -> nb::Result<Message, Self::Error>;

  /// Handle a GET, registering or deregistering an observer
  /// when the Observe option is present
  fn observe(&self, req: &Message) -> nb::Result<Message, Self::Error>;

  /// Handle a DELETE
  fn delete(&self, req: &Message) -> nb::Result<Message, Self::Error>;
}
