//! Pagination cursors.
//!
//! A cursor is the opaque string `"{timestamp}:{tiebreaker}"` derived from
//! the last retained row of a page: decimal nanoseconds plus a
//! signal-specific tiebreaker (span id for traces, point hash for metrics,
//! nothing for logs). Callers treat it as opaque; only the query
//! translator reads it back.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Requested sort direction. Newest-first is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest rows first.
    Asc,
    /// Newest rows first.
    #[default]
    Desc,
}

impl SortOrder {
    /// The SQL keyword for this direction.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// The strict comparison operator that selects rows *after* a cursor
    /// position in this direction.
    #[must_use]
    pub fn beyond(self) -> &'static str {
        match self {
            Self::Asc => ">",
            Self::Desc => "<",
        }
    }
}

/// A parsed pagination cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    /// Primary sort position: decimal nanoseconds.
    pub timestamp_nanos: String,
    /// Secondary sort position, when the signal has one.
    pub tiebreaker: Option<String>,
}

impl Cursor {
    /// Builds a cursor from a row's sort key.
    #[must_use]
    pub fn new(timestamp_nanos: impl Into<String>, tiebreaker: Option<String>) -> Self {
        Self {
            timestamp_nanos: timestamp_nanos.into(),
            tiebreaker,
        }
    }

    /// Parses an opaque cursor string.
    ///
    /// # Errors
    ///
    /// Returns a [`EngineError::Cursor`] error if the timestamp part is not
    /// a decimal integer or a declared tiebreaker is empty. This fails
    /// before any query text is built.
    pub fn parse(raw: &str) -> Result<Self, EngineError> {
        let (timestamp, tiebreaker) = match raw.split_once(':') {
            Some((ts, tb)) => (ts, Some(tb)),
            None => (raw, None),
        };

        if timestamp.parse::<i128>().is_err() {
            return Err(EngineError::Cursor(format!(
                "cursor timestamp is not a decimal integer: {raw:?}"
            )));
        }
        if let Some(tb) = tiebreaker {
            if tb.is_empty() {
                return Err(EngineError::Cursor(format!(
                    "cursor tiebreaker is empty: {raw:?}"
                )));
            }
        }

        Ok(Self {
            timestamp_nanos: timestamp.to_string(),
            tiebreaker: tiebreaker.map(str::to_string),
        })
    }

    /// Renders the opaque cursor string.
    #[must_use]
    pub fn render(&self) -> String {
        match &self.tiebreaker {
            Some(tb) => format!("{}:{tb}", self.timestamp_nanos),
            None => self.timestamp_nanos.clone(),
        }
    }

    /// The tiebreaker parsed as a point hash.
    ///
    /// # Errors
    ///
    /// Returns a [`EngineError::Cursor`] error if the tiebreaker is missing
    /// or not an unsigned 64-bit decimal.
    pub fn point_hash(&self) -> Result<u64, EngineError> {
        self.tiebreaker
            .as_deref()
            .and_then(|tb| tb.parse().ok())
            .ok_or_else(|| {
                EngineError::Cursor("metric cursor requires a numeric tiebreaker".to_string())
            })
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// The rows of this page, in requested order.
    pub data: Vec<T>,
    /// Cursor for the next page, or `None` on the last page.
    #[serde(rename = "nextCursor")]
    pub next_cursor: Option<String>,
}

/// Trims a `limit+1` fetch down to a page.
///
/// If the extra probe row is present it is dropped and a cursor is derived
/// from the last *retained* row via `sort_key`; otherwise the page is
/// terminal and the cursor is `None`.
pub fn paginate<T>(
    mut rows: Vec<T>,
    limit: usize,
    sort_key: impl Fn(&T) -> Cursor,
) -> Page<T> {
    if rows.len() > limit {
        rows.truncate(limit);
        let next_cursor = rows.last().map(|row| sort_key(row).render());
        Page {
            data: rows,
            next_cursor,
        }
    } else {
        Page {
            data: rows,
            next_cursor: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_tiebreaker() {
        let cursor = Cursor::parse("1700000000000000000:b7ad6b7169203331").unwrap();
        assert_eq!(cursor.timestamp_nanos, "1700000000000000000");
        assert_eq!(cursor.tiebreaker.as_deref(), Some("b7ad6b7169203331"));
        assert_eq!(cursor.render(), "1700000000000000000:b7ad6b7169203331");
    }

    #[test]
    fn test_parse_timestamp_only() {
        let cursor = Cursor::parse("-1").unwrap();
        assert_eq!(cursor.timestamp_nanos, "-1");
        assert_eq!(cursor.tiebreaker, None);
        assert_eq!(cursor.render(), "-1");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Cursor::parse("not-nanos:tb"),
            Err(EngineError::Cursor(_))
        ));
        assert!(matches!(Cursor::parse(""), Err(EngineError::Cursor(_))));
        assert!(matches!(
            Cursor::parse("123:"),
            Err(EngineError::Cursor(_))
        ));
    }

    #[test]
    fn test_point_hash_tiebreaker() {
        let cursor = Cursor::parse("5:18446744073709551615").unwrap();
        assert_eq!(cursor.point_hash().unwrap(), u64::MAX);

        let text = Cursor::parse("5:abc").unwrap();
        assert!(matches!(text.point_hash(), Err(EngineError::Cursor(_))));
        let missing = Cursor::parse("5").unwrap();
        assert!(matches!(missing.point_hash(), Err(EngineError::Cursor(_))));
    }

    #[test]
    fn test_paginate_trims_probe_row() {
        let rows = vec![30, 20, 10];
        let page = paginate(rows, 2, |row| Cursor::new(row.to_string(), None));
        assert_eq!(page.data, vec![30, 20]);
        assert_eq!(page.next_cursor.as_deref(), Some("20"));
    }

    #[test]
    fn test_paginate_terminal_page() {
        let rows = vec![30, 20];
        let page = paginate(rows, 2, |row| Cursor::new(row.to_string(), None));
        assert_eq!(page.data, vec![30, 20]);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn test_sort_order_helpers() {
        assert_eq!(SortOrder::Desc.keyword(), "DESC");
        assert_eq!(SortOrder::Desc.beyond(), "<");
        assert_eq!(SortOrder::Asc.keyword(), "ASC");
        assert_eq!(SortOrder::Asc.beyond(), ">");
    }
}
