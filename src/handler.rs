//! Handler traits and type erasure.
//!
//! # Two kinds of handler
//!
//! - a **controller** returns `Result<impl Reply, Error>` and goes through
//!   the dispatch layer (negotiation, shaping, error classification);
//! - a **raw handler** returns anything [`IntoResponse`] and is answered
//!   exactly as written.
//!
//! # How async handlers are stored
//!
//! The router holds handlers of *different* types in a single map, so both
//! kinds are hidden behind one trait object:
//!
//! ```text
//! async fn show(req, params) -> Result<User, Error>  ← user writes this
//!        ↓ router.get("/users/{id}", show)
//! show.into_boxed_handler()                          ← Controller blanket impl
//!        ↓
//! Arc::new(Dispatch(show))                           ← adapter wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(req, params)  at request time         ← one vtable dispatch
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::dispatch::Dispatch;
use crate::error::Error;
use crate::params::Params;
use crate::reply::Reply;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public handler traits.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request, params: Params) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Controller ────────────────────────────────────────────────────────────────

/// Implemented for every function usable as a controller:
///
/// ```text
/// async fn name(req: Request, params: Params) -> Result<impl Reply, Error>
/// ```
///
/// Sealed: only the blanket impl below satisfies it.
pub trait Controller: private::SealedController + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

impl<F, Fut, R> private::SealedController for F
where
    F: Fn(Request, Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, Error>> + Send + 'static,
    R: Reply + Send + 'static,
{
}

impl<F, Fut, R> Controller for F
where
    F: Fn(Request, Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, Error>> + Send + 'static,
    R: Reply + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(Dispatch::new(self))
    }
}

// ── RawHandler ────────────────────────────────────────────────────────────────

/// Implemented for every function usable as a raw handler:
///
/// ```text
/// async fn name(req: Request, params: Params) -> impl IntoResponse
/// ```
pub trait RawHandler: private::SealedRaw + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

impl<F, Fut, R> private::SealedRaw for F
where
    F: Fn(Request, Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> RawHandler for F
where
    F: Fn(Request, Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(Passthrough(self))
    }
}

/// Passes the handler's own response straight through.
struct Passthrough<F>(F);

impl<F, Fut, R> ErasedHandler for Passthrough<F>
where
    F: Fn(Request, Params) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request, params: Params) -> BoxFuture {
        let fut = (self.0)(req, params);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Because the sealing traits are private, external crates cannot implement
/// the handler traits on their own types.
mod private {
    pub trait SealedController {}
    pub trait SealedRaw {}
}
