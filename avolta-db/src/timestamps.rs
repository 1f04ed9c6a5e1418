//! Timestamp encoding for TEXT columns.
//!
//! Everything is written as fixed-width UTC (`2024-01-31T23:59:59.000000Z`)
//! so that SQL string comparison orders instants correctly. Reads also accept
//! plain RFC 3339 and SQLite's `datetime('now')` format.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};

const STORAGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

pub fn to_db(value: &DateTime<Utc>) -> String {
    value.format(STORAGE_FORMAT).to_string()
}

pub fn to_db_opt(value: &Option<DateTime<Utc>>) -> Option<String> {
    value.as_ref().map(to_db)
}

pub fn from_db(value: &str, column: &str) -> Result<DateTime<Utc>> {
    if value.contains('T') {
        Ok(DateTime::parse_from_rfc3339(value)
            .with_context(|| format!("Failed to parse {} as RFC3339", column))?
            .with_timezone(&Utc))
    } else {
        Ok(NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
            .with_context(|| format!("Failed to parse {} as SQLite format", column))?
            .and_utc())
    }
}

pub fn from_db_opt(value: Option<String>, column: &str) -> Result<Option<DateTime<Utc>>> {
    value.map(|v| from_db(&v, column)).transpose()
}
