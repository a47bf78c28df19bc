//! Click entity representing a single persisted redirect.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A click recorded when a shortened link is accessed.
///
/// Only click workers create these, one per processed
/// [`crate::domain::click_event::ClickEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
}

impl Click {
    /// Creates a new Click instance.
    ///
    /// Client metadata is optional to handle requests without the
    /// corresponding headers.
    pub fn new(
        id: i64,
        link_id: i64,
        clicked_at: DateTime<Utc>,
        user_agent: Option<String>,
        ip: Option<String>,
    ) -> Self {
        Self {
            id,
            link_id,
            clicked_at,
            user_agent,
            ip,
        }
    }
}

/// Input data for recording a new click.
///
/// `clicked_at` is the time of the redirect, not the time of the write, so
/// queueing delay does not skew analytics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClick {
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
}
