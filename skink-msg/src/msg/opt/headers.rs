use core::fmt;

use std_alloc::string::{String, ToString};
use std_alloc::vec::Vec;

use super::known::no_repeat::*;
use super::known::observe::Action;
use super::known::repeat::*;
use super::{ContentFormat, NoResponse, OptValue, Options};

/// A resource URI could not be split into options
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum InvalidUri {
  /// The port was not an integer in `0..=65535`
  Port,
  /// An IPv6 host literal was missing its closing `]`
  UnclosedHost,
}

impl fmt::Display for InvalidUri {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Self::Port => write!(f, "uri port is not a valid port number"),
      | Self::UnclosedHost => write!(f, "uri host is missing a closing `]`"),
    }
  }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidUri {}

/// The pieces of a resource URI that travel as Uri-* options
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct UriParts<'a> {
  pub(crate) host: Option<&'a str>,
  pub(crate) port: Option<u16>,
  pub(crate) path: Vec<&'a str>,
  pub(crate) query: Vec<&'a str>,
}

/// Split `scheme://host[:port][/path][?query]` (or a relative `/path?query`)
/// into its parts.
///
/// Percent-encoded octets are left as they are.
pub(crate) fn split_uri(uri: &str) -> Result<UriParts<'_>, InvalidUri> {
  let (authority, rest) = match uri.find("://") {
    | Some(ix) => {
      let after_scheme = &uri[ix + 3..];
      let end = after_scheme.find(|c: char| c == '/' || c == '?')
                            .unwrap_or(after_scheme.len());
      (Some(&after_scheme[..end]), &after_scheme[end..])
    },
    | None => (None, uri),
  };

  let (host, port) = match authority {
    | None | Some("") => (None, None),
    | Some(auth) if auth.starts_with('[') => {
      let close = auth.find(']').ok_or(InvalidUri::UnclosedHost)?;
      let port = match auth[close + 1..].strip_prefix(':') {
        | Some(p) => Some(p.parse::<u16>().map_err(|_| InvalidUri::Port)?),
        | None => None,
      };
      (Some(&auth[1..close]), port)
    },
    | Some(auth) => match auth.rsplit_once(':') {
      | Some((host, port)) => (Some(host), Some(port.parse::<u16>().map_err(|_| InvalidUri::Port)?)),
      | None => (Some(auth), None),
    },
  };

  let (path, query) = match rest.split_once('?') {
    | Some((path, query)) => (path, query),
    | None => (rest, ""),
  };

  Ok(UriParts { host: host.filter(|h| !h.is_empty()),
                port,
                path: path.split('/').filter(|s| !s.is_empty()).collect(),
                query: query.split('&').filter(|s| !s.is_empty()).collect() })
}

/// Inverse of [`split_uri`], always using the `coap` scheme.
///
/// Yields `None` when there is nothing to address.
pub(crate) fn join_uri<'a>(host: Option<&str>,
                           port: Option<u16>,
                           path: impl IntoIterator<Item = &'a str>,
                           query: impl IntoIterator<Item = &'a str>)
                           -> Option<String> {
  let mut uri = String::from("coap://");
  let mut any = false;

  if let Some(host) = host {
    any = true;
    if host.contains(':') {
      uri.push('[');
      uri.push_str(host);
      uri.push(']');
    } else {
      uri.push_str(host);
    }
  }

  if let Some(port) = port {
    any = true;
    uri.push(':');
    uri.push_str(&port.to_string());
  }

  path.into_iter().for_each(|seg| {
                    any = true;
                    uri.push('/');
                    uri.push_str(seg);
                  });

  query.into_iter().enumerate().for_each(|(ix, q)| {
                                 any = true;
                                 uri.push(if ix == 0 { '?' } else { '&' });
                                 uri.push_str(q);
                               });

  if any {
    Some(uri)
  } else {
    None
  }
}

/// The well-known options of a message, read into typed fields.
///
/// [`Headers::from_options`] reads every field in one scan of the options,
/// and [`Headers::load_options`] rebuilds the options from the fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers {
  /// Uri-Host, Uri-Port, Uri-Path and Uri-Query joined into
  /// `coap://host[:port][/path][?query]`
  pub resource_uri: Option<String>,
  /// Observe; `true` registers and `false` deregisters
  pub observe: Option<bool>,
  /// Content-Format
  pub content_format: Option<ContentFormat>,
  /// Max-Age
  pub max_age: Option<u32>,
  /// Accept
  pub accept: Option<ContentFormat>,
  /// Proxy-Uri
  pub proxy_uri: Option<String>,
  /// Proxy-Scheme
  pub proxy_scheme: Option<String>,
  /// Location-Path segments joined into `/a/b`
  pub location_path: Option<String>,
  /// Location-Query arguments joined into `a=1&b=2`
  pub location_query: Option<String>,
  /// If-Match
  pub if_match: Vec<Vec<u8>>,
  /// If-None-Match
  pub if_none_match: bool,
  /// ETag
  pub etags: Vec<Vec<u8>>,
  /// Size1
  pub size1: Option<u32>,
  /// No-Response
  pub no_response: Option<NoResponse>,
}

impl Headers {
  /// Read the well-known options out of a collection
  pub fn from_options(opts: &Options) -> Self {
    let mut headers = Headers::default();
    let mut host = None;
    let mut port = None;
    let mut path = Vec::new();
    let mut query = Vec::new();
    let mut location_path = Vec::new();
    let mut location_query = Vec::new();

    for opt in opts.iter() {
      let v = &opt.value;
      match opt.number {
        | HOST => host = v.as_str(),
        | PORT => port = v.as_uint().and_then(|n| u16::try_from(n).ok()),
        | PATH => path.extend(v.as_str()),
        | QUERY => query.extend(v.as_str()),
        | OBSERVE => {
          headers.observe = v.as_uint().map(|n| Action::from_value(n).is_register())
        },
        | CONTENT_FORMAT => headers.content_format = uint_format(v),
        | ACCEPT => headers.accept = uint_format(v),
        | MAX_AGE => headers.max_age = v.as_uint(),
        | SIZE1 => headers.size1 = v.as_uint(),
        | NO_RESPONSE => {
          headers.no_response = v.as_uint().map(|n| NoResponse((n & 0xFF) as u8))
        },
        | PROXY_URI => headers.proxy_uri = v.as_str().map(String::from),
        | PROXY_SCHEME => headers.proxy_scheme = v.as_str().map(String::from),
        | LOCATION_PATH => location_path.extend(v.as_str()),
        | LOCATION_QUERY => location_query.extend(v.as_str()),
        | IF_MATCH => headers.if_match.extend(v.as_opaque().map(<[u8]>::to_vec)),
        | ETAG => headers.etags.extend(v.as_opaque().map(<[u8]>::to_vec)),
        | IF_NONE_MATCH => headers.if_none_match = true,
        | _ => (),
      }
    }

    headers.resource_uri = join_uri(host, port, path, query);

    if !location_path.is_empty() {
      headers.location_path = Some(location_path.iter().fold(String::new(), |mut s, seg| {
                                                          s.push('/');
                                                          s.push_str(seg);
                                                          s
                                                        }));
    }

    if !location_query.is_empty() {
      headers.location_query = Some(location_query.join("&"));
    }

    headers
  }

  /// Rebuild a collection of options from these fields
  pub fn load_options(&self) -> Result<Options, InvalidUri> {
    let mut opts = Options::new();

    if let Some(uri) = &self.resource_uri {
      load_uri(&mut opts, uri)?;
    }

    let string = |s: &str| OptValue::String(s.into());

    if let Some(observe) = self.observe {
      opts.push(OBSERVE, OptValue::Uint(Action::from(observe).into()));
    }
    if let Some(f) = self.content_format {
      opts.push(CONTENT_FORMAT, OptValue::Uint(u16::from(&f) as u32));
    }
    if let Some(f) = self.accept {
      opts.push(ACCEPT, OptValue::Uint(u16::from(&f) as u32));
    }
    if let Some(n) = self.max_age {
      opts.push(MAX_AGE, OptValue::Uint(n));
    }
    if let Some(n) = self.size1 {
      opts.push(SIZE1, OptValue::Uint(n));
    }
    if let Some(nr) = self.no_response {
      opts.push(NO_RESPONSE, OptValue::Uint(nr.0 as u32));
    }
    if let Some(p) = &self.proxy_uri {
      opts.push(PROXY_URI, string(p));
    }
    if let Some(p) = &self.proxy_scheme {
      opts.push(PROXY_SCHEME, string(p));
    }
    if let Some(p) = &self.location_path {
      p.split('/')
       .filter(|s| !s.is_empty())
       .for_each(|seg| opts.push(LOCATION_PATH, string(seg)));
    }
    if let Some(q) = &self.location_query {
      q.split('&')
       .filter(|s| !s.is_empty())
       .for_each(|arg| opts.push(LOCATION_QUERY, string(arg)));
    }
    self.if_match
        .iter()
        .for_each(|tag| opts.push(IF_MATCH, OptValue::Opaque(tag.clone())));
    self.etags
        .iter()
        .for_each(|tag| opts.push(ETAG, OptValue::Opaque(tag.clone())));
    if self.if_none_match {
      opts.push(IF_NONE_MATCH, OptValue::Empty);
    }

    Ok(opts)
  }
}

fn uint_format(v: &OptValue) -> Option<ContentFormat> {
  v.as_uint()
   .and_then(|n| u16::try_from(n).ok())
   .map(ContentFormat::from)
}

/// Replace the Uri-* options in `opts` with those addressing `uri`
pub(crate) fn load_uri(opts: &mut Options, uri: &str) -> Result<(), InvalidUri> {
  let parts = split_uri(uri)?;

  [HOST, PORT, PATH, QUERY].into_iter().for_each(|n| {
                                         opts.remove(n);
                                       });

  if let Some(host) = parts.host {
    opts.push(HOST, OptValue::String(host.into()));
  }
  if let Some(port) = parts.port {
    opts.push(PORT, OptValue::Uint(port as u32));
  }
  parts.path
       .iter()
       .for_each(|seg| opts.push(PATH, OptValue::String((*seg).into())));
  parts.query
       .iter()
       .for_each(|q| opts.push(QUERY, OptValue::String((*q).into())));

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn split() {
    assert_eq!(split_uri("coap://host?r=/a").unwrap(),
               UriParts { host: Some("host"),
                          port: None,
                          path: vec![],
                          query: vec!["r=/a"] });

    assert_eq!(split_uri("coaps://10.0.0.1:5684/a/b?x=1&y").unwrap(),
               UriParts { host: Some("10.0.0.1"),
                          port: Some(5684),
                          path: vec!["a", "b"],
                          query: vec!["x=1", "y"] });

    assert_eq!(split_uri("coap://[::1]:5683/a").unwrap(),
               UriParts { host: Some("::1"),
                          port: Some(5683),
                          path: vec!["a"],
                          query: vec![] });

    assert_eq!(split_uri("/a?b").unwrap(),
               UriParts { host: None,
                          port: None,
                          path: vec!["a"],
                          query: vec!["b"] });

    assert_eq!(split_uri("coap://host:abc/"), Err(InvalidUri::Port));
    assert_eq!(split_uri("coap://[::1/"), Err(InvalidUri::UnclosedHost));
  }

  #[test]
  fn join() {
    assert_eq!(join_uri(Some("::1"), Some(1), ["a"], ["b=c", "d"]),
               Some("coap://[::1]:1/a?b=c&d".into()));
    assert_eq!(join_uri(None, None, Vec::new(), Vec::new()), None);
  }

  #[test]
  fn round_trip_through_options() {
    let headers = Headers { resource_uri: Some("coap://host:5683/a/b?r=/x&tt=jwt".into()),
                            observe: Some(true),
                            content_format: Some(ContentFormat::Json),
                            max_age: Some(60),
                            accept: Some(ContentFormat::Cbor),
                            proxy_uri: Some("coap://proxy/".into()),
                            proxy_scheme: Some("coap".into()),
                            location_path: Some("/c/d".into()),
                            location_query: Some("e=1&f".into()),
                            if_match: vec![vec![1, 2]],
                            if_none_match: true,
                            etags: vec![vec![3], vec![4]],
                            size1: Some(1024),
                            no_response: Some(NoResponse(NoResponse::SUCCESS)) };

    let opts = headers.load_options().unwrap();
    assert_eq!(Headers::from_options(&opts), headers);
  }

  #[test]
  fn observe_register_is_zero_on_the_wire() {
    let headers = Headers { observe: Some(true),
                            ..Default::default() };
    let opts = headers.load_options().unwrap();
    assert_eq!(opts.get(OBSERVE), Some(&OptValue::Uint(0)));

    let mut opts = Options::new();
    opts.push(OBSERVE, OptValue::Uint(7));
    assert_eq!(Headers::from_options(&opts).observe, Some(false));
  }
}
