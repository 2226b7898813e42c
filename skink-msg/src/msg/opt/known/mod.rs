/// Content-Format values
pub mod content_format;
pub use content_format::*;

/// Observe values
pub mod observe;

/// No-Response values
pub mod no_response;
pub use no_response::*;

macro_rules! opt {
  (#[doc = $doc:expr] $name:ident = $n:literal) => {
    #[doc = $doc]
    pub const $name: crate::OptNumber = crate::OptNumber($n);
  };
}

/// Non-repeatable options
pub mod no_repeat {
  opt!(#[doc = "Uri-Host; the host of the resource being requested"]
       HOST = 3);
  opt!(#[doc = "If-None-Match; perform the request only if the target does not exist"]
       IF_NONE_MATCH = 5);
  opt!(#[doc = "Observe (RFC 7641); `0` registers and any other value deregisters"]
       OBSERVE = 6);
  opt!(#[doc = "Uri-Port; see [`HOST`]"]
       PORT = 7);
  opt!(#[doc = "Content-Format; see [`ContentFormat`](super::ContentFormat)"]
       CONTENT_FORMAT = 12);
  opt!(#[doc = "Max-Age; seconds a response may be cached before it is stale"]
       MAX_AGE = 14);
  opt!(#[doc = "Accept; the Content-Format the client would like the response in"]
       ACCEPT = 17);
  opt!(#[doc = "Proxy-Uri; absolute URI of the resource when talking through a forward proxy"]
       PROXY_URI = 35);
  opt!(#[doc = "Proxy-Scheme; see [`PROXY_URI`]"]
       PROXY_SCHEME = 39);
  opt!(#[doc = "Size1; size of the request body"]
       SIZE1 = 60);
  opt!(#[doc = "No-Response (RFC 7967); see [`NoResponse`](super::NoResponse)"]
       NO_RESPONSE = 258);
}

/// Repeatable options
pub mod repeat {
  opt!(#[doc = "If-Match; perform the request only if the target matches one of these ETags"]
       IF_MATCH = 1);
  opt!(#[doc = "ETag; resource-local identifier of a representation"]
       ETAG = 4);
  opt!(#[doc = "Location-Path; one segment of the path of a created resource"]
       LOCATION_PATH = 8);
  opt!(#[doc = "Uri-Path; one segment of the path of the resource being requested"]
       PATH = 11);
  opt!(#[doc = "Uri-Query; one `key=value` argument of the request"]
       QUERY = 15);
  opt!(#[doc = "Location-Query; see [`LOCATION_PATH`]"]
       LOCATION_QUERY = 20);
}
