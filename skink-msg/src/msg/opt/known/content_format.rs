use core::fmt;
use core::str::FromStr;

/// A textual content type had no corresponding Content-Format,
/// or a Content-Format had no textual form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnsupportedMediaType;

impl fmt::Display for UnsupportedMediaType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "unsupported media type")
  }
}

#[cfg(feature = "std")]
impl std::error::Error for UnsupportedMediaType {}

/// Content-Format
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContentFormat {
  /// `text/plain; charset=utf-8`
  Text,
  /// `application/link-format`
  LinkFormat,
  /// `application/xml`
  Xml,
  /// `application/octet-stream`
  OctetStream,
  /// `application/exi`
  Exi,
  /// `application/json`
  Json,
  /// `application/cbor`
  Cbor,
  /// Another content format
  Other(u16),
}

impl ContentFormat {
  /// Convert this content format to the CoAP byte value
  pub fn bytes(&self) -> [u8; 2] {
    u16::from(self).to_be_bytes()
  }

  /// The media type this content format stands for
  ///
  /// ```
  /// use skink_msg::{ContentFormat, UnsupportedMediaType};
  ///
  /// assert_eq!(ContentFormat::Json.as_str(), Ok("application/json"));
  /// assert_eq!(ContentFormat::Other(11542).as_str(), Err(UnsupportedMediaType));
  /// ```
  pub fn as_str(&self) -> Result<&'static str, UnsupportedMediaType> {
    use ContentFormat::*;
    match self {
      | Text => Ok("text/plain"),
      | LinkFormat => Ok("application/link-format"),
      | Xml => Ok("application/xml"),
      | OctetStream => Ok("application/octet-stream"),
      | Exi => Ok("application/exi"),
      | Json => Ok("application/json"),
      | Cbor => Ok("application/cbor"),
      | Other(_) => Err(UnsupportedMediaType),
    }
  }
}

impl FromStr for ContentFormat {
  type Err = UnsupportedMediaType;

  /// Media type parameters (`; charset=utf-8`) are ignored.
  ///
  /// ```
  /// use skink_msg::{ContentFormat, UnsupportedMediaType};
  ///
  /// assert_eq!("text/plain; charset=utf-8".parse(), Ok(ContentFormat::Text));
  /// assert_eq!("image/png".parse::<ContentFormat>(), Err(UnsupportedMediaType));
  /// ```
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    use ContentFormat::*;
    let essence = s.split(';').next().unwrap_or("").trim();
    match essence {
      | "text/plain" => Ok(Text),
      | "application/link-format" => Ok(LinkFormat),
      | "application/xml" => Ok(Xml),
      | "application/octet-stream" => Ok(OctetStream),
      | "application/exi" => Ok(Exi),
      | "application/json" => Ok(Json),
      | "application/cbor" => Ok(Cbor),
      | _ => Err(UnsupportedMediaType),
    }
  }
}

impl<'a> From<&'a ContentFormat> for u16 {
  fn from(f: &'a ContentFormat) -> Self {
    use ContentFormat::*;
    match *f {
      | Text => 0,
      | LinkFormat => 40,
      | Xml => 41,
      | OctetStream => 42,
      | Exi => 47,
      | Json => 50,
      | Cbor => 60,
      | Other(n) => n,
    }
  }
}

impl From<u16> for ContentFormat {
  fn from(n: u16) -> Self {
    use ContentFormat::*;
    match n {
      | 0 => Text,
      | 40 => LinkFormat,
      | 41 => Xml,
      | 42 => OctetStream,
      | 47 => Exi,
      | 50 => Json,
      | 60 => Cbor,
      | n => Other(n),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn numeric_codes() {
    [ContentFormat::Text,
     ContentFormat::LinkFormat,
     ContentFormat::Xml,
     ContentFormat::OctetStream,
     ContentFormat::Exi,
     ContentFormat::Json,
     ContentFormat::Cbor,
     ContentFormat::Other(1234)].into_iter()
                                .for_each(|f| assert_eq!(ContentFormat::from(u16::from(&f)), f));
  }

  #[test]
  fn textual() {
    assert_eq!(ContentFormat::from_str("application/cbor"), Ok(ContentFormat::Cbor));
    assert_eq!(ContentFormat::Text.as_str().and_then(ContentFormat::from_str),
               Ok(ContentFormat::Text));
    assert_eq!(ContentFormat::from_str(""), Err(UnsupportedMediaType));
  }
}
