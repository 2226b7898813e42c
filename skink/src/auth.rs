/// Validates the bootstrap credentials presented by a peer
///
/// Credentials travel in the `tt` (token type) and `t` (token)
/// query parameters of the first request's resource URI.
/// See [`ResourceQuery`](crate::uri::ResourceQuery).
pub trait Authenticator {
  /// Are these credentials valid?
  fn authenticate(&self, token_type: &str, token: &str) -> bool;

  /// Must peers authenticate before their requests are dispatched?
  ///
  /// Defaults to `true`.
  fn required(&self) -> bool {
    true
  }
}

/// An [`Authenticator`] that does not require authentication, and
/// accepts any credentials presented anyway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Anonymous;

impl Authenticator for Anonymous {
  fn authenticate(&self, _: &str, _: &str) -> bool {
    true
  }

  fn required(&self) -> bool {
    false
  }
}

impl<F> Authenticator for F where F: Fn(&str, &str) -> bool
{
  fn authenticate(&self, token_type: &str, token: &str) -> bool {
    self(token_type, token)
  }
}
