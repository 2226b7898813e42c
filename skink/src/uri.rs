use core::fmt;

use std_alloc::string::{String, ToString};
use std_alloc::vec::Vec;

use skink_msg::opt::known::repeat::QUERY;
use skink_msg::Message;

/// A query parameter could not be understood
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidQuery {
  /// `mid` was not a 16-bit integer
  MessageId(String),
  /// `i` was not a `key;value` pair
  Index(String),
}

impl fmt::Display for InvalidQuery {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | InvalidQuery::MessageId(v) => write!(f, "mid={:?} is not a message id", v),
      | InvalidQuery::Index(v) => write!(f, "i={:?} is not a key;value pair", v),
    }
  }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidQuery {}

/// The query parameters addressing a resource
///
/// ```text
/// coap://<authority>?r=<resource>&tt=<token type>&t=<token>&i=<key>;<value>
/// ```
///
/// | param | field |
/// |---|---|
/// | `r` | [`resource`](ResourceQuery::resource) |
/// | `mid` | [`message_id`](ResourceQuery::message_id) |
/// | `tt` | [`token_type`](ResourceQuery::token_type) |
/// | `t` | [`token`](ResourceQuery::token) |
/// | `ck` | [`cache_key`](ResourceQuery::cache_key) |
/// | `i` (repeatable) | [`indexes`](ResourceQuery::indexes) |
///
/// Unrecognized parameters are ignored.
///
/// ```
/// use skink::uri::ResourceQuery;
///
/// let q = ResourceQuery::parse("coap://gw?r=/a/b&tt=jwt&t=xyz&i=site;3&i=zone;west").unwrap();
///
/// assert_eq!(q.resource.as_deref(), Some("/a/b"));
/// assert_eq!(q.credentials(), Some(("jwt", "xyz")));
/// assert_eq!(q.indexes,
///            vec![("site".to_string(), "3".to_string()),
///                 ("zone".to_string(), "west".to_string())]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceQuery {
  /// The resource being addressed
  pub resource: Option<String>,
  /// Message id the peer wants this request associated with
  pub message_id: Option<u16>,
  /// Kind of security token in [`token`](ResourceQuery::token)
  pub token_type: Option<String>,
  /// Security token
  pub token: Option<String>,
  /// Key for caching the response
  pub cache_key: Option<String>,
  /// Identity index pairs
  pub indexes: Vec<(String, String)>,
}

impl ResourceQuery {
  /// Read the query portion of a URI
  pub fn parse(uri: &str) -> Result<Self, InvalidQuery> {
    let query = match uri.split_once('?') {
      | Some((_, q)) => q,
      | None => return Ok(Self::default()),
    };

    Self::from_params(query.split('&'))
  }

  /// Read the Uri-Query options of a message
  pub fn from_message(msg: &Message) -> Result<Self, InvalidQuery> {
    Self::from_params(msg.opts.get_all(QUERY).filter_map(|v| v.as_str()))
  }

  fn from_params<'a>(params: impl Iterator<Item = &'a str>) -> Result<Self, InvalidQuery> {
    params.filter(|p| !p.is_empty())
          .map(|p| p.split_once('=').unwrap_or((p, "")))
          .try_fold(Self::default(), |mut q, (k, v)| -> Result<Self, InvalidQuery> {
            match k {
              | "r" => q.resource = Some(v.to_string()),
              | "mid" => {
                q.message_id = Some(v.parse::<u16>()
                                     .map_err(|_| InvalidQuery::MessageId(v.to_string()))?)
              },
              | "tt" => q.token_type = Some(v.to_string()),
              | "t" => q.token = Some(v.to_string()),
              | "ck" => q.cache_key = Some(v.to_string()),
              | "i" => {
                let (key, val) = v.split_once(';')
                                  .ok_or_else(|| InvalidQuery::Index(v.to_string()))?;
                q.indexes.push((key.to_string(), val.to_string()));
              },
              | _ => (),
            };

            Ok(q)
          })
  }

  /// Token type & token, if both were presented
  pub fn credentials(&self) -> Option<(&str, &str)> {
    Some((self.token_type.as_deref()?, self.token.as_deref()?))
  }
}
