//! Incoming HTTP request type.
//!
//! The body is not read until a handler asks for it. Decoding is pulled by
//! the controller ([`Request::parse`]); nothing upstream touches the bytes.

use std::convert::Infallible;

use bytes::Bytes;
use http::request::Parts;
use http::{HeaderMap, Method, Uri};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty};
use hyper::body::Body;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::codec;
use crate::error::{BoxError, Error, Error500};
use crate::format::{self, Format, OutputFormat};

type BoxBody = UnsyncBoxBody<Bytes, BoxError>;

/// An incoming HTTP request.
pub struct Request {
    head: Parts,
    body: BoxBody,
}

impl Request {
    /// Wraps any `http` request whose body yields [`Bytes`].
    pub fn from_http<B>(req: http::Request<B>) -> Self
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let (head, body) = req.into_parts();
        Self { head, body: body.map_err(Into::into).boxed_unsync() }
    }

    pub fn method(&self) -> &Method { &self.head.method }
    pub fn uri(&self) -> &Uri { &self.head.uri }
    pub fn path(&self) -> &str { self.head.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.head.headers }

    /// First value of a header, if it is valid visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Format the body will be decoded from.
    pub fn input_format(&self) -> Format {
        format::input_format(&self.head.headers)
    }

    /// Format the reply will be encoded in.
    pub fn output_format(&self) -> OutputFormat {
        format::output_format(&self.head.headers)
    }

    /// Reads the whole body. A second call returns an empty body.
    ///
    /// A transport failure surfaces as a structured 500, `failed to read body`.
    pub async fn bytes(&mut self) -> Result<Bytes, Error> {
        let body = std::mem::replace(&mut self.body, empty());
        match body.collect().await {
            Ok(collected) => Ok(collected.to_bytes()),
            Err(e) => Err(Error::structured(Error500::with_message("failed to read body")).caused_by(e)),
        }
    }

    /// Reads the body and decodes it according to [`Request::input_format`].
    ///
    /// Malformed input surfaces as a structured 500,
    /// `failed to parse body: <reason>`.
    ///
    /// ```rust,no_run
    /// # use restwire::{Error, Params, Request};
    /// #[derive(serde::Deserialize)]
    /// struct NewUser { name: String }
    ///
    /// async fn create(mut req: Request, _: Params) -> Result<String, Error> {
    ///     let user: NewUser = req.parse().await?;
    ///     Ok(user.name)
    /// }
    /// ```
    pub async fn parse<T: DeserializeOwned>(&mut self) -> Result<T, Error> {
        let format = self.input_format();
        let body = self.bytes().await?;
        codec::decode(&body, format).map_err(|e| {
            debug!(%format, error = %e, "failed to parse body");
            Error::structured(Error500::with_message(format!("failed to parse body: {e}")))
        })
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.head.method)
            .field("uri", &self.head.uri)
            .field("headers", &self.head.headers)
            .finish_non_exhaustive()
    }
}

fn empty() -> BoxBody {
    Empty::<Bytes>::new().map_err(|never: Infallible| match never {}).boxed_unsync()
}
