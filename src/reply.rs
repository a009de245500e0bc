//! What a controller can return.
//!
//! A reply is any `Serialize` type. On top of its body it may expose a few
//! optional capabilities, each a narrow trait of its own:
//!
//! | Capability | Trait | Effect |
//! |---|---|---|
//! | status code | [`StatusCoder`] | replaces the default `200` when nonzero |
//! | redirect | [`Locator`] | `Location` header, only with a nonzero status |
//! | cookies | [`CookieJar`] | one `Set-Cookie` per entry |
//! | raw body | [`RawBody`] | bytes and content-type written verbatim |
//!
//! [`Reply`] is how the dispatch layer asks a value which of those it has.
//! The [`reply!`](crate::reply!) macro writes the impl for you:
//!
//! ```rust
//! use restwire::{StatusCoder, reply};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Created { id: u64 }
//!
//! impl StatusCoder for Created {
//!     fn status_code(&self) -> u16 { 201 }
//! }
//!
//! reply!(Created: status);
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

// ── Capabilities ──────────────────────────────────────────────────────────────

/// Exposes an HTTP status code. `0` means "use the default".
pub trait StatusCoder {
    fn status_code(&self) -> u16;
}

/// Exposes a redirect target. An empty string means no redirect.
pub trait Locator {
    fn location(&self) -> &str;
}

/// Exposes cookies to set. An empty value deletes the cookie.
pub trait CookieJar {
    fn cookies(&self) -> &BTreeMap<String, String>;
}

/// Exposes a pre-encoded body that bypasses negotiation.
pub trait RawBody {
    fn content_type(&self) -> &str;
    fn data(&self) -> &[u8];
}

// ── Reply ─────────────────────────────────────────────────────────────────────

/// A value a controller can return.
///
/// Every accessor defaults to `None`; override the ones the type supports,
/// or let [`reply!`](crate::reply!) do it.
pub trait Reply: Serialize {
    fn as_status(&self) -> Option<&dyn StatusCoder> {
        None
    }

    fn as_locator(&self) -> Option<&dyn Locator> {
        None
    }

    fn as_cookie_jar(&self) -> Option<&dyn CookieJar> {
        None
    }

    fn as_raw(&self) -> Option<&dyn RawBody> {
        None
    }
}

/// Implements [`Reply`] for a type, wiring up the listed capabilities.
///
/// Capabilities are `status`, `location`, `cookies` and `raw`; the type must
/// implement the matching trait.
///
/// ```rust
/// # use restwire::{Cookies, CookieJar, reply};
/// # use std::collections::BTreeMap;
/// #[derive(serde::Serialize)]
/// struct Session {
///     user: String,
///     #[serde(skip)]
///     jar: Cookies,
/// }
///
/// impl CookieJar for Session {
///     fn cookies(&self) -> &BTreeMap<String, String> { self.jar.cookies() }
/// }
///
/// reply!(Session: cookies);
/// ```
#[macro_export]
macro_rules! reply {
    (@cap status) => {
        fn as_status(&self) -> ::core::option::Option<&dyn $crate::StatusCoder> {
            ::core::option::Option::Some(self)
        }
    };
    (@cap location) => {
        fn as_locator(&self) -> ::core::option::Option<&dyn $crate::Locator> {
            ::core::option::Option::Some(self)
        }
    };
    (@cap cookies) => {
        fn as_cookie_jar(&self) -> ::core::option::Option<&dyn $crate::CookieJar> {
            ::core::option::Option::Some(self)
        }
    };
    (@cap raw) => {
        fn as_raw(&self) -> ::core::option::Option<&dyn $crate::RawBody> {
            ::core::option::Option::Some(self)
        }
    };
    ($ty:ty) => {
        impl $crate::Reply for $ty {}
    };
    ($ty:ty: $($cap:ident),+ $(,)?) => {
        impl $crate::Reply for $ty {
            $( $crate::reply!(@cap $cap); )+
        }
    };
}

impl Reply for () {}
impl Reply for String {}
impl Reply for &'static str {}
impl Reply for serde_json::Value {}
impl<T: Serialize> Reply for Vec<T> {}

impl<T: Reply> Reply for Option<T> {
    fn as_status(&self) -> Option<&dyn StatusCoder> {
        self.as_ref().and_then(Reply::as_status)
    }

    fn as_locator(&self) -> Option<&dyn Locator> {
        self.as_ref().and_then(Reply::as_locator)
    }

    fn as_cookie_jar(&self) -> Option<&dyn CookieJar> {
        self.as_ref().and_then(Reply::as_cookie_jar)
    }

    fn as_raw(&self) -> Option<&dyn RawBody> {
        self.as_ref().and_then(Reply::as_raw)
    }
}

// ── Ready-made replies ────────────────────────────────────────────────────────

/// A cookie jar to embed in reply types (mark the field `#[serde(skip)]`).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Cookies(BTreeMap<String, String>);

impl Cookies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` for 24 hours.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Expires `name` on the client.
    pub fn unset(&mut self, name: impl Into<String>) {
        self.0.insert(name.into(), String::new());
    }
}

impl CookieJar for Cookies {
    fn cookies(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

/// A redirect, optionally setting cookies on the way.
///
/// Encodes to an empty object: only the status line and headers matter.
///
/// ```rust
/// use restwire::Redirect;
///
/// let mut to_home = Redirect::to(303, "/home");
/// to_home.set_cookie("session", "abc123");
/// ```
#[derive(Clone, Debug, Serialize)]
pub struct Redirect {
    #[serde(skip)]
    code: u16,
    #[serde(skip)]
    location: String,
    #[serde(skip)]
    cookies: Cookies,
}

impl Redirect {
    /// The caller picks the 3xx code.
    pub fn to(code: u16, location: impl Into<String>) -> Self {
        Self { code, location: location.into(), cookies: Cookies::new() }
    }

    pub fn set_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.set(name, value);
    }

    pub fn unset_cookie(&mut self, name: impl Into<String>) {
        self.cookies.unset(name);
    }
}

impl StatusCoder for Redirect {
    fn status_code(&self) -> u16 {
        self.code
    }
}

impl Locator for Redirect {
    fn location(&self) -> &str {
        &self.location
    }
}

impl CookieJar for Redirect {
    fn cookies(&self) -> &BTreeMap<String, String> {
        self.cookies.cookies()
    }
}

reply!(Redirect: status, location, cookies);

/// Bytes with a content-type of your choosing, whatever the client accepts.
///
/// ```rust
/// use restwire::Raw;
///
/// let csv = Raw::new("text/csv", "id,name\n1,alice\n").with_status(201);
/// ```
#[derive(Clone, Debug, Serialize)]
pub struct Raw {
    #[serde(skip)]
    content_type: String,
    #[serde(skip)]
    data: Vec<u8>,
    #[serde(skip)]
    status: u16,
}

impl Raw {
    pub fn new(content_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self { content_type: content_type.into(), data: data.into(), status: 0 }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

impl StatusCoder for Raw {
    fn status_code(&self) -> u16 {
        self.status
    }
}

impl RawBody for Raw {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}

reply!(Raw: status, raw);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Plain {
        ok: bool,
    }

    reply!(Plain);

    #[test]
    fn plain_reply_has_no_capabilities() {
        let p = Plain { ok: true };
        assert!(p.ok);
        assert!(p.as_status().is_none());
        assert!(p.as_locator().is_none());
        assert!(p.as_cookie_jar().is_none());
        assert!(p.as_raw().is_none());
    }

    #[test]
    fn redirect_exposes_status_location_and_cookies() {
        let mut r = Redirect::to(302, "/login");
        r.set_cookie("a", "1");
        r.unset_cookie("b");

        assert_eq!(r.as_status().map(|s| s.status_code()), Some(302));
        assert_eq!(r.as_locator().map(|l| l.location()), Some("/login"));
        let jar = r.as_cookie_jar().unwrap().cookies();
        assert_eq!(jar.get("a").map(String::as_str), Some("1"));
        assert_eq!(jar.get("b").map(String::as_str), Some(""));
        assert!(r.as_raw().is_none());
    }

    #[test]
    fn redirect_encodes_to_an_empty_object() {
        let body = serde_json::to_string(&Redirect::to(301, "/")).unwrap();
        assert_eq!(body, "{}");
    }

    #[test]
    fn option_delegates_to_its_content() {
        let some = Some(Raw::new("text/plain", "hi"));
        assert_eq!(some.as_raw().map(|raw| raw.data()), Some(&b"hi"[..]));

        let none: Option<Raw> = None;
        assert!(none.as_raw().is_none());
    }
}
