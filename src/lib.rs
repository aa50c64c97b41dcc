//! Sightline Telemetry Engine
//!
//! This crate is the core of the Sightline observability platform: it
//! normalizes OTLP traces, logs, and metrics from the wire into a canonical
//! model, writes them to a columnar store, compiles structured filters into
//! parameterized queries with cursor pagination, and maintains a discovery
//! index of known metric identities.
//!
//! The HTTP layer that fronts this engine (routing, content negotiation,
//! JSON schema validation, status-code mapping) lives outside this crate and
//! calls into it through [`ingest`], the [`storage`] store traits, and
//! [`query`] filters.
//!
//! # Modules
//!
//! - [`models`] - Canonical data models for spans, logs, and metric points
//! - [`wire`] - Wire-format tags and the OTLP protobuf message set
//! - [`ingest`] - Payload decompression, decoding, and response encoding
//! - [`coerce`] - Lossless value and timestamp coercion for storage rows
//! - [`query`] - Filters, cursors, and the SQL translator
//! - [`discovery`] - Incremental index of metric identities and attributes
//! - [`storage`] - Store traits with ClickHouse and in-memory engines
//!
//! # Example
//!
//! ```
//! use sightline::models::{LogRecord, SeverityLevel};
//!
//! let record = LogRecord::new("1700000000000000000", "payment accepted", "billing")
//!     .with_severity(9, "INFO")
//!     .with_attribute("order.id", "A-1009");
//!
//! assert!(record.validate_record().is_ok());
//! assert_eq!(record.severity_level(), SeverityLevel::Info);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod coerce;
pub mod discovery;
pub mod error;
pub mod ingest;
pub mod models;
pub mod query;
pub mod storage;
pub mod wire;

pub use error::EngineError;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
pub use validator;
