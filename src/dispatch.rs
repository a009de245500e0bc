//! The dispatch adapter: runs a controller and turns its result into a
//! response.
//!
//! Per request:
//!
//! ```text
//! Received ─▶ Invoked ─┬─ Ok(reply) ─▶ shape ────┬─▶ Written
//!                      └─ Err(error) ─▶ classify ┘
//! ```
//!
//! The output format is negotiated before the controller runs, since the
//! controller takes ownership of the request. Body decoding is not done
//! here: controllers call [`Request::parse`] when they want a typed body.

use std::future::Future;

use crate::classify::classify;
use crate::error::Error;
use crate::handler::{BoxFuture, ErasedHandler};
use crate::params::Params;
use crate::reply::Reply;
use crate::request::Request;
use crate::shape::shape;

/// A controller wrapped into the router's native handler shape.
pub(crate) struct Dispatch<F>(F);

impl<F> Dispatch<F> {
    pub(crate) fn new(controller: F) -> Self {
        Self(controller)
    }
}

impl<F, Fut, R> ErasedHandler for Dispatch<F>
where
    F: Fn(Request, Params) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, Error>> + Send + 'static,
    R: Reply + Send + 'static,
{
    fn call(&self, req: Request, params: Params) -> BoxFuture {
        let format = req.output_format();
        let fut = (self.0)(req, params);
        Box::pin(async move {
            match fut.await {
                Ok(reply) => shape(&reply, format),
                Err(err) => classify(&err, format),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::StatusCode;
    use http::header::{ACCEPT, CONTENT_TYPE};
    use http_body_util::{BodyExt, Full};

    use super::*;
    use crate::error::Error500;

    fn request(accept: &str) -> Request {
        let req = http::Request::builder()
            .header(ACCEPT, accept)
            .body(Full::new(Bytes::new()))
            .unwrap();
        Request::from_http(req)
    }

    async fn greet(_req: Request, params: Params) -> Result<String, Error> {
        Ok(format!("hello {}", params.get("name").unwrap_or("nobody")))
    }

    async fn refuse(_req: Request, _params: Params) -> Result<(), Error> {
        Err(Error::structured(Error500::with_message("down for maintenance")))
    }

    #[tokio::test]
    async fn success_is_shaped() {
        let handler = Dispatch::new(greet);
        let params = Params::from_iter([("name", "ada")]);
        let r = handler.call(request("application/json"), params).await;

        assert_eq!(r.status_code(), StatusCode::OK);
        let body = r.into_inner().into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, r#""hello ada""#);
    }

    #[tokio::test]
    async fn failure_is_classified_in_the_accepted_format() {
        let handler = Dispatch::new(refuse);
        let r = handler.call(request("application/xml"), Params::new()).await;

        assert_eq!(r.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(r.headers()[CONTENT_TYPE], "application/xml");
        let body = r.into_inner().into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, "<Error500><Message>down for maintenance</Message></Error500>");
    }
}
