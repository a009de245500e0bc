//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup via [`matchit`]. Two
//! registration paths share the trees:
//!
//! - [`Router::on`] and the method shortcuts take a [`Controller`] and wrap
//!   it in the dispatch adapter;
//! - [`Router::raw`] and the `raw_*` shortcuts take a [`RawHandler`] and
//!   register it untouched.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::header::ALLOW;
use http::{Method, StatusCode};
use http_body_util::Full;
use hyper::body::Body;
use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::error::BoxError;
use crate::handler::{BoxedHandler, Controller, RawHandler};
use crate::params::Params;
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each registration returns `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

/// Why a lookup found nothing.
enum Miss {
    NotFound,
    MethodNotAllowed(Vec<Method>),
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a controller for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax, catch-alls `{*name}`:
    ///
    /// ```rust,no_run
    /// # use restwire::{Error, Params, Request, Router};
    /// # async fn show(_: Request, _: Params) -> Result<String, Error> { Ok(String::new()) }
    /// # async fn create(_: Request, _: Params) -> Result<String, Error> { Ok(String::new()) }
    /// Router::new()
    ///     .on(http::Method::GET,  "/users/{id}", show)
    ///     .on(http::Method::POST, "/users",      create);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid pattern or conflicts with a route
    /// already registered for `method`.
    pub fn on(self, method: Method, path: &str, controller: impl Controller) -> Self {
        self.add(method, path, controller.into_boxed_handler())
    }

    /// Register a raw handler, bypassing negotiation and shaping.
    ///
    /// # Panics
    ///
    /// Same as [`Router::on`].
    pub fn raw(self, method: Method, path: &str, handler: impl RawHandler) -> Self {
        self.add(method, path, handler.into_boxed_handler())
    }

    pub fn get(self, path: &str, controller: impl Controller) -> Self {
        self.on(Method::GET, path, controller)
    }

    pub fn post(self, path: &str, controller: impl Controller) -> Self {
        self.on(Method::POST, path, controller)
    }

    pub fn put(self, path: &str, controller: impl Controller) -> Self {
        self.on(Method::PUT, path, controller)
    }

    pub fn delete(self, path: &str, controller: impl Controller) -> Self {
        self.on(Method::DELETE, path, controller)
    }

    pub fn head(self, path: &str, controller: impl Controller) -> Self {
        self.on(Method::HEAD, path, controller)
    }

    pub fn raw_get(self, path: &str, handler: impl RawHandler) -> Self {
        self.raw(Method::GET, path, handler)
    }

    pub fn raw_post(self, path: &str, handler: impl RawHandler) -> Self {
        self.raw(Method::POST, path, handler)
    }

    pub fn raw_put(self, path: &str, handler: impl RawHandler) -> Self {
        self.raw(Method::PUT, path, handler)
    }

    pub fn raw_delete(self, path: &str, handler: impl RawHandler) -> Self {
        self.raw(Method::DELETE, path, handler)
    }

    pub fn raw_head(self, path: &str, handler: impl RawHandler) -> Self {
        self.raw(Method::HEAD, path, handler)
    }

    fn add(mut self, method: Method, path: &str, handler: BoxedHandler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Routes one request and produces one response.
    ///
    /// Unknown paths answer `404`; a known path under another method answers
    /// `405` with an `Allow` header.
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<Full<Bytes>>
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();

        let response = match self.lookup(&method, &path) {
            Ok((handler, params)) => handler.call(Request::from_http(req), params).await,
            Err(Miss::NotFound) => Response::status(StatusCode::NOT_FOUND),
            Err(Miss::MethodNotAllowed(allowed)) => {
                let allow = allowed.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
                Response::builder()
                    .status(StatusCode::METHOD_NOT_ALLOWED)
                    .header(ALLOW.as_str(), &allow)
                    .no_body()
            }
        };

        debug!(%method, %path, status = response.status_code().as_u16(), "request handled");
        response.into_inner()
    }

    fn lookup(&self, method: &Method, path: &str) -> Result<(BoxedHandler, Params), Miss> {
        if let Some(matched) = self.routes.get(method).and_then(|tree| tree.at(path).ok()) {
            return Ok((Arc::clone(matched.value), Params::from(&matched.params)));
        }

        let mut allowed: Vec<Method> = self
            .routes
            .iter()
            .filter(|(m, tree)| *m != method && tree.at(path).is_ok())
            .map(|(m, _)| m.clone())
            .collect();

        if allowed.is_empty() {
            Err(Miss::NotFound)
        } else {
            allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            Err(Miss::MethodNotAllowed(allowed))
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
