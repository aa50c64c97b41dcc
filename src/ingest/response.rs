//! Export response encoding.
//!
//! A response must mirror the request's wire format: binary in, binary
//! out. The partial-success envelope carries an optional rejected-item
//! count and error message; when nothing was rejected the envelope is
//! omitted entirely, which is still a success response.

use crate::error::EngineError;
use crate::wire::proto::collector;
use crate::wire::{SignalKind, WireFormat};
use prost::Message;

/// The partial-success outcome of an export request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartialSuccess {
    /// Number of rejected items (spans, data points, or log records).
    pub rejected: i64,
    /// Human-readable reason, when items were rejected.
    pub error_message: Option<String>,
}

impl PartialSuccess {
    /// A fully successful outcome.
    #[must_use]
    pub fn accepted() -> Self {
        Self::default()
    }

    /// An outcome with `rejected` dropped items of the given kind.
    #[must_use]
    pub fn rejecting(rejected: i64, signal: SignalKind) -> Self {
        if rejected == 0 {
            return Self::accepted();
        }
        let noun = match signal {
            SignalKind::Traces => "spans",
            SignalKind::Logs => "log records",
            SignalKind::Metrics => "data points",
        };
        Self {
            rejected,
            error_message: Some(format!("{rejected} {noun} were rejected")),
        }
    }

    /// Returns true when nothing was rejected and no message is carried.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rejected == 0 && self.error_message.is_none()
    }
}

/// Encodes an export response in the request's wire format.
///
/// # Errors
///
/// Returns a [`EngineError::Decode`] error if JSON serialization fails,
/// which would indicate a defect rather than caller input.
pub fn encode_response(
    signal: SignalKind,
    format: WireFormat,
    partial: &PartialSuccess,
) -> Result<Vec<u8>, EngineError> {
    match format {
        WireFormat::Protobuf => Ok(encode_protobuf(signal, partial)),
        WireFormat::Json => encode_json(signal, partial),
    }
}

fn encode_protobuf(signal: SignalKind, partial: &PartialSuccess) -> Vec<u8> {
    match signal {
        SignalKind::Traces => {
            let response = collector::trace::v1::ExportTraceServiceResponse {
                partial_success: (!partial.is_empty()).then(|| {
                    collector::trace::v1::ExportTracePartialSuccess {
                        rejected_spans: partial.rejected,
                        error_message: partial.error_message.clone().unwrap_or_default(),
                    }
                }),
            };
            response.encode_to_vec()
        }
        SignalKind::Logs => {
            let response = collector::logs::v1::ExportLogsServiceResponse {
                partial_success: (!partial.is_empty()).then(|| {
                    collector::logs::v1::ExportLogsPartialSuccess {
                        rejected_log_records: partial.rejected,
                        error_message: partial.error_message.clone().unwrap_or_default(),
                    }
                }),
            };
            response.encode_to_vec()
        }
        SignalKind::Metrics => {
            let response = collector::metrics::v1::ExportMetricsServiceResponse {
                partial_success: (!partial.is_empty()).then(|| {
                    collector::metrics::v1::ExportMetricsPartialSuccess {
                        rejected_data_points: partial.rejected,
                        error_message: partial.error_message.clone().unwrap_or_default(),
                    }
                }),
            };
            response.encode_to_vec()
        }
    }
}

fn encode_json(signal: SignalKind, partial: &PartialSuccess) -> Result<Vec<u8>, EngineError> {
    let body = if partial.is_empty() {
        serde_json::json!({})
    } else {
        let rejected_field = match signal {
            SignalKind::Traces => "rejectedSpans",
            SignalKind::Logs => "rejectedLogRecords",
            SignalKind::Metrics => "rejectedDataPoints",
        };
        let mut envelope = serde_json::Map::new();
        envelope.insert(
            rejected_field.to_string(),
            serde_json::Value::String(partial.rejected.to_string()),
        );
        if let Some(message) = &partial.error_message {
            envelope.insert(
                "errorMessage".to_string(),
                serde_json::Value::String(message.clone()),
            );
        }
        serde_json::json!({ "partialSuccess": envelope })
    };

    serde_json::to_vec(&body)
        .map_err(|e| EngineError::Decode(format!("response serialization failed: {e}")))
}
