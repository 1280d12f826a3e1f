pub(crate) mod anthropic;

use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, Utc};
use feed_cache::{ExtractError, FetchError, StorageError};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum RouteError {
    #[error("Upstream fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Upstream page changed: {0}")]
    Extract(#[from] ExtractError),

    #[error("Cache error: {0}")]
    Storage(#[from] StorageError),
}

impl RouteError {
    pub(crate) fn status_code(&self) -> StatusCode {
        match self {
            Self::Fetch(_) | Self::Extract(_) => StatusCode::BAD_GATEWAY,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Accept RFC 3339 timestamps and bare `YYYY-MM-DD` dates (taken as UTC midnight)
pub(crate) fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
