//! Turns a controller error into a response.
//!
//! Structured errors are sent as-is with their own status. Everything else
//! becomes a `500` carrying [`Error500::new`]; the original message and its
//! causes are only logged.

use http::StatusCode;
use tracing::{debug, error};

use crate::codec;
use crate::error::{Error, Error500};
use crate::format::OutputFormat;
use crate::response::Response;

pub(crate) fn classify(err: &Error, format: OutputFormat) -> Response {
    let chain = err.chain();
    match (err.status_code(), err.encode(format)) {
        (Some(code), Some(encoded)) => {
            if code >= 500 {
                error!(status = code, error = %err, cause = %chain, "controller failed");
            } else {
                debug!(status = code, error = %err, cause = %chain, "controller refused request");
            }
            match (StatusCode::from_u16(code), encoded) {
                (Ok(status), Ok(body)) => write(status, body, format),
                (status, body) => {
                    error!(
                        status = code,
                        valid_status = status.is_ok(),
                        error = ?body.err(),
                        "error while writing error"
                    );
                    Response::status(StatusCode::INTERNAL_SERVER_ERROR)
                }
            }
        }
        _ => {
            error!(error = %err, cause = %chain, "controller failed");
            generic(format)
        }
    }
}

/// The non-leaking 500.
pub(crate) fn generic(format: OutputFormat) -> Response {
    match codec::encode(&Error500::new(), format) {
        Ok(body) => write(StatusCode::INTERNAL_SERVER_ERROR, body, format),
        Err(e) => {
            error!(error = %e, "error while writing error");
            Response::status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn write(status: StatusCode, body: Vec<u8>, format: OutputFormat) -> Response {
    Response::builder().status(status).bytes(format.content_type(), body)
}
