//! Payload decompression.
//!
//! Only gzip (and its `x-gzip` alias) is supported. Decoding is bounded by
//! [`MAX_DECODED_BYTES`] so a small compressed body cannot expand into an
//! unbounded allocation; the ceiling pairs with the transport's body-size
//! limit on the compressed side.

use crate::error::EngineError;
use flate2::read::MultiGzDecoder;
use std::io::Read;

/// Ceiling on the decoded size of a compressed payload.
pub const MAX_DECODED_BYTES: u64 = 32 * 1024 * 1024;

/// Supported content encodings for inbound payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentEncoding {
    /// No compression.
    #[default]
    Identity,
    /// Gzip compression (`gzip` or `x-gzip`).
    Gzip,
}

impl ContentEncoding {
    /// Resolves a `content-encoding` header value.
    ///
    /// # Errors
    ///
    /// Returns a [`EngineError::Payload`] error for any encoding other
    /// than identity, gzip, or x-gzip.
    pub fn from_header(value: Option<&str>) -> Result<Self, EngineError> {
        match value.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
            None | Some("") | Some("identity") => Ok(Self::Identity),
            Some("gzip") | Some("x-gzip") => Ok(Self::Gzip),
            Some(other) => Err(EngineError::Payload(format!(
                "unsupported content encoding: {other}"
            ))),
        }
    }
}

/// Decompresses a payload according to its declared encoding.
///
/// # Errors
///
/// Returns a [`EngineError::Payload`] error if the stream is corrupt or
/// the decoded size exceeds [`MAX_DECODED_BYTES`].
pub fn decompress(payload: &[u8], encoding: ContentEncoding) -> Result<Vec<u8>, EngineError> {
    match encoding {
        ContentEncoding::Identity => Ok(payload.to_vec()),
        ContentEncoding::Gzip => {
            let mut decoded = Vec::new();
            let mut decoder = MultiGzDecoder::new(payload).take(MAX_DECODED_BYTES + 1);
            decoder
                .read_to_end(&mut decoded)
                .map_err(|e| EngineError::Payload(format!("corrupt gzip payload: {e}")))?;

            if decoded.len() as u64 > MAX_DECODED_BYTES {
                tracing::warn!(
                    compressed_len = payload.len(),
                    limit = MAX_DECODED_BYTES,
                    "rejecting payload exceeding decompression ceiling"
                );
                return Err(EngineError::Payload(format!(
                    "decoded payload exceeds {MAX_DECODED_BYTES} bytes"
                )));
            }

            Ok(decoded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_encoding_resolution() {
        assert_eq!(
            ContentEncoding::from_header(None).unwrap(),
            ContentEncoding::Identity
        );
        assert_eq!(
            ContentEncoding::from_header(Some("gzip")).unwrap(),
            ContentEncoding::Gzip
        );
        assert_eq!(
            ContentEncoding::from_header(Some("X-Gzip")).unwrap(),
            ContentEncoding::Gzip
        );
        assert!(matches!(
            ContentEncoding::from_header(Some("br")),
            Err(EngineError::Payload(_))
        ));
    }

    #[test]
    fn test_identity_passthrough() {
        let payload = b"raw bytes";
        assert_eq!(
            decompress(payload, ContentEncoding::Identity).unwrap(),
            payload
        );
    }

    #[test]
    fn test_gzip_round_trip() {
        let payload = b"some telemetry payload".repeat(100);
        let compressed = gzip(&payload);
        assert_eq!(
            decompress(&compressed, ContentEncoding::Gzip).unwrap(),
            payload
        );
    }

    #[test]
    fn test_corrupt_stream_rejected() {
        assert!(matches!(
            decompress(b"definitely not gzip", ContentEncoding::Gzip),
            Err(EngineError::Payload(_))
        ));
    }

    #[test]
    fn test_truncated_stream_rejected() {
        let compressed = gzip(b"payload");
        let truncated = &compressed[..compressed.len() / 2];
        assert!(matches!(
            decompress(truncated, ContentEncoding::Gzip),
            Err(EngineError::Payload(_))
        ));
    }
}
