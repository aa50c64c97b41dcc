//! Filters, cursors, and the SQL translator.
//!
//! Everything here is a pure function from structured filter values to
//! query artifacts; execution lives with the storage engines.

pub mod cursor;
pub mod discover;
pub mod filter;
pub mod translate;

pub use cursor::{paginate, Cursor, Page, SortOrder};
pub use filter::{
    effective_limit, LogFilter, MetricFilter, TraceFilter, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use translate::{
    compile_log_search, compile_metric_search, compile_trace_search, CompiledQuery, SqlValue,
};
