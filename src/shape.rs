//! Turns a successful controller reply into a response.
//!
//! Rules, in order:
//!
//! 1. status is `200` unless the reply exposes a nonzero status code;
//! 2. with a nonzero status, a non-empty location becomes `Location`;
//! 3. every cookie becomes a `Set-Cookie` on `/`: an empty value expires it
//!    at once, anything else lives for 24 hours. Invalid names are dropped
//!    and invalid value bytes are stripped;
//! 4. a raw body is written verbatim with its own content-type;
//! 5. otherwise the reply is encoded in the negotiated output format.

use http::StatusCode;
use http::header::{LOCATION, SET_COOKIE};
use tracing::{error, warn};

use crate::codec;
use crate::format::OutputFormat;
use crate::reply::Reply;
use crate::response::{Response, ResponseBuilder};

/// Lifetime of a cookie set with a non-empty value.
pub const COOKIE_MAX_AGE: u32 = 24 * 60 * 60;

pub(crate) fn shape<R: Reply + ?Sized>(reply: &R, format: OutputFormat) -> Response {
    let code = reply.as_status().map_or(0, |s| s.status_code());
    let status = if code == 0 {
        StatusCode::OK
    } else {
        match StatusCode::from_u16(code) {
            Ok(status) => status,
            Err(e) => {
                error!(code, error = %e, "reply carries an invalid status code");
                return Response::status(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
    };

    let mut builder = Response::builder().status(status);

    if code != 0 {
        if let Some(location) = reply.as_locator().map(|l| l.location()).filter(|l| !l.is_empty()) {
            builder = builder.header(LOCATION.as_str(), location);
        }
    }

    if let Some(jar) = reply.as_cookie_jar() {
        for (name, value) in jar.cookies() {
            match set_cookie(name, value) {
                Some(cookie) => builder = builder.header(SET_COOKIE.as_str(), &cookie),
                None => warn!(cookie = name.as_str(), "dropping cookie with an invalid name"),
            }
        }
    }

    if let Some(raw) = reply.as_raw() {
        return builder.bytes(raw.content_type(), raw.data().to_vec());
    }

    encoded(builder, reply, format)
}

fn encoded<R: Reply + ?Sized>(builder: ResponseBuilder, reply: &R, format: OutputFormat) -> Response {
    match codec::encode(reply, format) {
        Ok(body) => builder.bytes(format.content_type(), body),
        Err(e) => {
            error!(%format, error = %e, "error while writing data");
            Response::status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// `Set-Cookie` value for one jar entry, `None` if the name is not a token.
///
/// Bytes outside the cookie-octet set are dropped from the value, so it can
/// never carry attributes of its own.
pub(crate) fn set_cookie(name: &str, value: &str) -> Option<String> {
    if name.is_empty() || !name.bytes().all(is_token) {
        return None;
    }
    let clean: String = value.chars().filter(|&c| c.is_ascii() && is_cookie_octet(c as u8)).collect();
    if clean.len() != value.len() {
        warn!(cookie = name, "dropping invalid bytes from cookie value");
    }
    let cookie = if clean.is_empty() {
        format!("{name}=; Path=/; Max-Age=0")
    } else {
        format!("{name}={clean}; Path=/; Max-Age={COOKIE_MAX_AGE}")
    };
    Some(cookie)
}

/// RFC 7230 `tchar`.
fn is_token(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// RFC 6265 `cookie-octet`.
fn is_cookie_octet(b: u8) -> bool {
    matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use http::header::CONTENT_TYPE;
    use http_body_util::BodyExt;
    use serde::Serialize;

    use super::*;
    use crate::reply::{CookieJar, Cookies, Locator, Raw, Redirect, StatusCoder};

    #[derive(Serialize)]
    #[serde(rename_all = "PascalCase")]
    struct Outcome {
        status: String,
        code: u16,
        #[serde(skip)]
        location: String,
        #[serde(skip)]
        jar: Cookies,
    }

    impl Outcome {
        fn new(code: u16) -> Self {
            Self { status: "ok".into(), code, location: String::new(), jar: Cookies::new() }
        }
    }

    impl StatusCoder for Outcome {
        fn status_code(&self) -> u16 { self.code }
    }

    impl Locator for Outcome {
        fn location(&self) -> &str { &self.location }
    }

    impl CookieJar for Outcome {
        fn cookies(&self) -> &BTreeMap<String, String> { self.jar.cookies() }
    }

    crate::reply!(Outcome: status, location, cookies);

    async fn body(response: Response) -> Vec<u8> {
        let collected = response.into_inner().into_body().collect().await.unwrap();
        collected.to_bytes().to_vec()
    }

    #[tokio::test]
    async fn zero_status_means_ok() {
        let r = shape(&Outcome::new(0), OutputFormat::Json);
        assert_eq!(r.status_code(), StatusCode::OK);
        assert_eq!(r.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body(r).await, br#"{"Status":"ok","Code":0}"#);
    }

    #[tokio::test]
    async fn plain_values_are_ok() {
        let r = shape(&"hello".to_owned(), OutputFormat::Json);
        assert_eq!(r.status_code(), StatusCode::OK);
        assert_eq!(body(r).await, br#""hello""#);
    }

    #[test]
    fn nonzero_status_overrides() {
        let r = shape(&Outcome::new(201), OutputFormat::Json);
        assert_eq!(r.status_code(), StatusCode::CREATED);
    }

    #[test]
    fn invalid_status_is_a_500() {
        let r = shape(&Outcome::new(1000), OutputFormat::Json);
        assert_eq!(r.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn location_needs_a_status() {
        let mut outcome = Outcome::new(0);
        outcome.location = "/elsewhere".into();
        let r = shape(&outcome, OutputFormat::Json);
        assert!(r.headers().get(LOCATION).is_none());

        outcome.code = 302;
        let r = shape(&outcome, OutputFormat::Json);
        assert_eq!(r.status_code(), StatusCode::FOUND);
        assert_eq!(r.headers()[LOCATION], "/elsewhere");
    }

    #[test]
    fn empty_location_is_ignored() {
        let r = shape(&Redirect::to(301, ""), OutputFormat::Json);
        assert_eq!(r.status_code(), StatusCode::MOVED_PERMANENTLY);
        assert!(r.headers().get(LOCATION).is_none());
    }

    #[test]
    fn cookies_are_set_and_expired() {
        let mut outcome = Outcome::new(0);
        outcome.jar.set("session", "abc");
        outcome.jar.unset("legacy");

        let r = shape(&outcome, OutputFormat::Json);
        let cookies: Vec<_> = r.headers().get_all(SET_COOKIE).iter().map(|v| v.to_str().unwrap().to_owned()).collect();
        assert_eq!(cookies, ["legacy=; Path=/; Max-Age=0", "session=abc; Path=/; Max-Age=86400"]);
    }

    #[test]
    fn cookie_values_cannot_add_attributes() {
        let mut outcome = Outcome::new(0);
        outcome.jar.set("session", "a; Domain=evil.example; Max-Age=99999999");
        outcome.jar.set("bad name", "x");
        outcome.jar.set("quoted", "\"");

        let r = shape(&outcome, OutputFormat::Json);
        let cookies: Vec<_> = r.headers().get_all(SET_COOKIE).iter().map(|v| v.to_str().unwrap().to_owned()).collect();
        assert_eq!(cookies, [
            "quoted=; Path=/; Max-Age=0",
            "session=aDomain=evil.exampleMax-Age=99999999; Path=/; Max-Age=86400",
        ]);
    }

    #[test]
    fn cookie_octets() {
        assert_eq!(set_cookie("id", "abc-123_~!").as_deref(), Some("id=abc-123_~!; Path=/; Max-Age=86400"));
        assert_eq!(set_cookie("id", "a b,c\\d").as_deref(), Some("id=abcd; Path=/; Max-Age=86400"));
        assert_eq!(set_cookie("id", "caf\u{e9}").as_deref(), Some("id=caf; Path=/; Max-Age=86400"));
        assert_eq!(set_cookie("", "x"), None);
        assert_eq!(set_cookie("a=b", "x"), None);
    }

    #[tokio::test]
    async fn raw_bypasses_encoding() {
        let r = shape(&Raw::new("text/plain", "hello"), OutputFormat::Xml);
        assert_eq!(r.status_code(), StatusCode::OK);
        assert_eq!(r.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(body(r).await, b"hello");
    }

    #[tokio::test]
    async fn xml_encoding_uses_the_xml_content_type() {
        let r = shape(&Outcome::new(0), OutputFormat::Xml);
        assert_eq!(r.headers()[CONTENT_TYPE], "application/xml");
        assert_eq!(body(r).await, b"<Outcome><Status>ok</Status><Code>0</Code></Outcome>");
    }
}
