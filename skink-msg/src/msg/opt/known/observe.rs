/// When included in a GET request, the Observe Option extends the GET
/// method so it does not only retrieve a current representation of the
/// target resource, but also requests the server to add or remove an
/// entry in the list of observers of the resource depending on the
/// option value.  The list entry consists of the client endpoint and the
/// token specified by the client in the request.  Possible values are:
///
///    `0` (register) adds the entry to the list, if not present;
///
///    anything else (deregister) removes the entry from the list, if present
#[derive(Hash, Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum Action {
  /// Tells the resource owner we would like to observe updates to
  /// the resource we've issued a GET request for.
  Register,
  /// Tells the resource owner we would no longer like to observe updates to
  /// the resource we've issued a GET request for.
  Deregister,
}

impl Action {
  /// Interpret the value of an Observe option
  ///
  /// ```
  /// use skink_msg::known::observe::Action;
  ///
  /// assert_eq!(Action::from_value(0), Action::Register);
  /// assert_eq!(Action::from_value(1), Action::Deregister);
  /// assert_eq!(Action::from_value(12), Action::Deregister);
  /// ```
  pub fn from_value(n: u32) -> Self {
    match n {
      | 0 => Action::Register,
      | _ => Action::Deregister,
    }
  }

  /// `true` when registering
  pub fn is_register(&self) -> bool {
    *self == Action::Register
  }
}

impl From<bool> for Action {
  fn from(register: bool) -> Self {
    if register {
      Action::Register
    } else {
      Action::Deregister
    }
  }
}

impl From<Action> for u32 {
  fn from(a: Action) -> Self {
    match a {
      | Action::Register => 0,
      | Action::Deregister => 1,
    }
  }
}
