//! Wire-format negotiation.
//!
//! Two questions are answered per request, independently of each other:
//!
//! | Question | Header | Answer |
//! |---|---|---|
//! | How do I read the body? | `Content-Type` | [`Format`] |
//! | How do I write the reply? | `Accept` | [`OutputFormat`] |
//!
//! Matching is exact and case-sensitive. The first header value that names a
//! known MIME type wins; anything else is skipped. When `Content-Type` names
//! nothing we know, the body is read in whatever format the client asked to
//! receive, so a client that only sets `Accept` gets a symmetric exchange.

use std::fmt;

use http::HeaderMap;
use http::header::{ACCEPT, CONTENT_TYPE, HeaderName};
use tracing::debug;

use crate::codec::CodecError;

const JSON: &str = "application/json";
const XML: &str = "application/xml";
const FORM: &str = "application/x-www-form-urlencoded";

// ── Format ────────────────────────────────────────────────────────────────────

/// A format a request body can be decoded from.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Format {
    #[default]
    Json,
    Xml,
    Form,
}

impl Format {
    /// Maps an exact MIME string to a format.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            JSON => Some(Self::Json),
            XML  => Some(Self::Xml),
            FORM => Some(Self::Form),
            _    => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Json => JSON,
            Self::Xml  => XML,
            Self::Form => FORM,
        }
    }

    /// First recognised `Content-Type` value, if any.
    pub fn negotiate(headers: &HeaderMap) -> Option<Self> {
        scan(headers, CONTENT_TYPE, Self::from_mime)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

// ── OutputFormat ──────────────────────────────────────────────────────────────

/// A format a reply can be encoded into.
///
/// Form encoding is not a thing, so it has no variant here.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum OutputFormat {
    #[default]
    Json,
    Xml,
}

impl OutputFormat {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            JSON => Some(Self::Json),
            XML  => Some(Self::Xml),
            _    => None,
        }
    }

    /// The `Content-Type` value written alongside an encoded reply.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => JSON,
            Self::Xml  => XML,
        }
    }

    /// First recognised `Accept` value, if any.
    pub fn negotiate(headers: &HeaderMap) -> Option<Self> {
        scan(headers, ACCEPT, Self::from_mime)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content_type())
    }
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Self::Json,
            OutputFormat::Xml  => Self::Xml,
        }
    }
}

impl TryFrom<Format> for OutputFormat {
    type Error = CodecError;

    fn try_from(format: Format) -> Result<Self, Self::Error> {
        match format {
            Format::Json => Ok(Self::Json),
            Format::Xml  => Ok(Self::Xml),
            Format::Form => Err(CodecError::UnknownOutputFormat),
        }
    }
}

// ── Negotiation ───────────────────────────────────────────────────────────────

/// Format the reply is encoded in: `Accept`, else JSON.
pub fn output_format(headers: &HeaderMap) -> OutputFormat {
    OutputFormat::negotiate(headers).unwrap_or_default()
}

/// Format the body is decoded from: `Content-Type`, else the output format.
pub fn input_format(headers: &HeaderMap) -> Format {
    if let Some(format) = Format::negotiate(headers) {
        return format;
    }
    if let Some(value) = headers.get(CONTENT_TYPE) {
        debug!(content_type = ?value, "unrecognised content-type, falling back to accept");
    }
    output_format(headers).into()
}

fn scan<T>(headers: &HeaderMap, name: HeaderName, parse: fn(&str) -> Option<T>) -> Option<T> {
    headers
        .get_all(name)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(parse)
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(HeaderName, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn defaults_to_json_when_headers_are_absent() {
        let map = HeaderMap::new();
        assert_eq!(Format::negotiate(&map), None);
        assert_eq!(output_format(&map), OutputFormat::Json);
        assert_eq!(input_format(&map), Format::Json);
    }

    #[test]
    fn content_type_picks_the_input_format() {
        let map = headers(&[(CONTENT_TYPE, FORM), (ACCEPT, XML)]);
        assert_eq!(input_format(&map), Format::Form);
        assert_eq!(output_format(&map), OutputFormat::Xml);
    }

    #[test]
    fn input_falls_back_to_accept() {
        let map = headers(&[(ACCEPT, XML)]);
        assert_eq!(input_format(&map), Format::Xml);
    }

    #[test]
    fn unrecognised_content_type_is_ignored() {
        let map = headers(&[(CONTENT_TYPE, "text/csv"), (ACCEPT, XML)]);
        assert_eq!(Format::negotiate(&map), None);
        assert_eq!(input_format(&map), Format::Xml);
    }

    #[test]
    fn repeated_headers_are_scanned_in_order() {
        let map = headers(&[(ACCEPT, "text/html"), (ACCEPT, XML), (ACCEPT, JSON)]);
        assert_eq!(output_format(&map), OutputFormat::Xml);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let map = headers(&[(ACCEPT, "Application/XML")]);
        assert_eq!(OutputFormat::negotiate(&map), None);
    }

    #[test]
    fn accept_never_offers_form() {
        let map = headers(&[(ACCEPT, FORM), (ACCEPT, XML)]);
        assert_eq!(output_format(&map), OutputFormat::Xml);

        let map = headers(&[(ACCEPT, FORM)]);
        assert_eq!(OutputFormat::negotiate(&map), None);
    }

    #[test]
    fn form_is_not_an_output_format() {
        assert!(matches!(
            OutputFormat::try_from(Format::Form),
            Err(CodecError::UnknownOutputFormat)
        ));
        assert_eq!(OutputFormat::try_from(Format::Xml).ok(), Some(OutputFormat::Xml));
    }
}
