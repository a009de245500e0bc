//! Body codec.
//!
//! Decoding turns request bytes into any `DeserializeOwned` type, encoding
//! turns any `Serialize` type into reply bytes. The format is always chosen
//! by the caller; see [`crate::format`] for how requests pick one.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::form::{self, FormError};
use crate::format::{Format, OutputFormat};
use crate::xml;

/// Failure to decode or encode a body.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("xml: {0}")]
    XmlDecode(#[from] quick_xml::DeError),

    #[error("xml: {0}")]
    XmlEncode(#[from] quick_xml::SeError),

    #[error("form: {0}")]
    Form(#[from] FormError),

    /// A form was requested as an encoding target.
    #[error("unknown output format")]
    UnknownOutputFormat,
}

/// Decodes `body` as `format` into a fresh `T`.
pub fn decode<T: DeserializeOwned>(body: &[u8], format: Format) -> Result<T, CodecError> {
    let value = match format {
        Format::Json => serde_json::from_slice(body)?,
        Format::Xml  => quick_xml::de::from_reader(body)?,
        Format::Form => form::from_bytes(body)?,
    };
    Ok(value)
}

/// Encodes `value` as `format`.
///
/// Values without a name of their own get a fixed XML root; `()` encodes to
/// an empty XML body.
///
/// The matching `Content-Type` is [`OutputFormat::content_type`].
pub fn encode<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<Vec<u8>, CodecError> {
    let bytes = match format {
        OutputFormat::Json => serde_json::to_vec(value)?,
        OutputFormat::Xml  => xml::to_vec(value)?,
    };
    Ok(bytes)
}
