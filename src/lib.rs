//! # restwire
//!
//! A thin dispatch layer for HTTP handlers. Controllers return plain data or
//! an error; restwire does the HTTP part.
//!
//! ## The contract
//!
//! A controller is an async function:
//!
//! ```text
//! async fn name(req: Request, params: Params) -> Result<impl Reply, Error>
//! ```
//!
//! What restwire owns, once, for every controller:
//!
//! - **Negotiation** — the reply format comes from `Accept`
//!   (`application/json` or `application/xml`, JSON by default); the body
//!   format comes from `Content-Type` (JSON, XML or
//!   `application/x-www-form-urlencoded`), falling back to the reply format.
//! - **Decoding** — on demand, through [`Request::parse`].
//! - **Shaping** — status code, redirects, cookies and raw bodies come from
//!   optional capabilities on the reply (see [`Reply`]).
//! - **Errors** — structured errors ([`Error::structured`]) go to the client
//!   with their own status; anything else becomes a fixed, non-leaking 500.
//!
//! Routing is [`matchit`]. Handlers that want full control over the response
//! register through the `raw_*` methods and skip all of the above.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use restwire::{Error, Params, Request, Router, Server, StatusCoder, reply};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize, Serialize)]
//! #[serde(rename_all = "PascalCase")]
//! struct Ticket {
//!     status: String,
//!     code: u16,
//! }
//!
//! impl StatusCoder for Ticket {
//!     fn status_code(&self) -> u16 { self.code }
//! }
//!
//! impl std::fmt::Display for Ticket {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         f.write_str(&self.status)
//!     }
//! }
//!
//! reply!(Ticket: status);
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .get("/tickets/{id}", show)
//!         .post("/tickets",     create);
//!
//!     Server::bind("0.0.0.0:8081").serve(app).await.unwrap();
//! }
//!
//! async fn show(_req: Request, params: Params) -> Result<Ticket, Error> {
//!     let id = params.get("id").unwrap_or("unknown");
//!     Ok(Ticket { status: format!("ticket {id}"), code: 200 })
//! }
//!
//! async fn create(mut req: Request, _params: Params) -> Result<Ticket, Error> {
//!     let ticket: Ticket = req.parse().await?;
//!     if ticket.status.is_empty() {
//!         return Err(Error::structured(Ticket { status: "empty status".into(), code: 422 }));
//!     }
//!     Ok(Ticket { code: 201, ..ticket })
//! }
//! ```

mod classify;
mod dispatch;
mod error;
mod form;
mod handler;
mod params;
mod reply;
mod request;
mod response;
mod router;
mod server;
mod shape;
mod xml;

pub mod codec;
pub mod format;

pub use codec::CodecError;
pub use error::{BoxError, Error, Error500, GENERIC_MESSAGE, ServeError};
pub use form::FormError;
pub use format::{Format, OutputFormat};
pub use handler::{Controller, RawHandler};
pub use params::Params;
pub use reply::{CookieJar, Cookies, Locator, Raw, RawBody, Redirect, Reply, StatusCoder};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use shape::COOKIE_MAX_AGE;
