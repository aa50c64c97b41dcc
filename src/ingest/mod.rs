//! Ingestion normalizer.
//!
//! Turns wire payloads into canonical entities: [`decompress`] bounds and
//! unpacks gzip bodies, [`decode`] parses either wire format into a
//! [`CanonicalRequest`], and [`encode_response`] renders the
//! partial-success envelope in the request's own format.

pub mod decode;
pub mod decompress;
pub mod response;

pub use decode::{decode, CanonicalRequest, Normalized};
pub use decompress::{decompress, ContentEncoding, MAX_DECODED_BYTES};
pub use response::{encode_response, PartialSuccess};

use crate::error::EngineError;
use crate::wire::{SignalKind, WireFormat};

/// Decompresses and decodes a payload in one step.
///
/// # Errors
///
/// Propagates [`EngineError::Payload`] from decompression and
/// [`EngineError::Decode`] from decoding.
pub fn ingest_payload(
    signal: SignalKind,
    format: WireFormat,
    encoding: ContentEncoding,
    body: &[u8],
) -> Result<CanonicalRequest, EngineError> {
    let bytes = decompress(body, encoding)?;
    let request = decode(signal, format, &bytes)?;

    tracing::debug!(
        signal = %signal,
        compressed_len = body.len(),
        decoded_len = bytes.len(),
        "decoded export payload"
    );

    Ok(request)
}
