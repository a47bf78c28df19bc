//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};

use crate::domain::entities::NewClick;

/// An in-memory record of one redirect, queued for asynchronous persistence.
///
/// Passed from the redirect path to the click workers through
/// [`crate::domain::click_queue::ClickQueue`]. This decouples the redirect
/// response from database writes.
///
/// Fields are private: an event is fixed at construction and leaves the
/// queue only by being converted with [`ClickEvent::into_new_click`] or
/// dropped.
///
/// # Usage Flow
///
/// 1. Created by [`crate::application::services::RedirectService`] with request metadata
/// 2. Offered to the queue (non-blocking, may be dropped when full)
/// 3. Dequeued by a worker in [`crate::domain::click_worker`]
/// 4. Converted to [`NewClick`] for persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    link_id: i64,
    clicked_at: DateTime<Utc>,
    user_agent: Option<String>,
    ip: Option<String>,
}

impl ClickEvent {
    /// Creates a click event stamped with the current time.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let event = ClickEvent::new(42, Some("192.168.1.1".to_string()), Some("Mozilla/5.0"));
    /// ```
    pub fn new(link_id: i64, ip: Option<String>, user_agent: Option<&str>) -> Self {
        Self::at(link_id, Utc::now(), ip, user_agent)
    }

    /// Creates a click event with an explicit timestamp.
    pub fn at(
        link_id: i64,
        clicked_at: DateTime<Utc>,
        ip: Option<String>,
        user_agent: Option<&str>,
    ) -> Self {
        Self {
            link_id,
            clicked_at,
            user_agent: user_agent.map(|s| s.to_string()),
            ip,
        }
    }

    pub fn link_id(&self) -> i64 {
        self.link_id
    }

    pub fn clicked_at(&self) -> DateTime<Utc> {
        self.clicked_at
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    /// Consumes the event, producing the insert input for a [`crate::domain::entities::Click`].
    pub fn into_new_click(self) -> NewClick {
        NewClick {
            link_id: self.link_id,
            clicked_at: self.clicked_at,
            user_agent: self.user_agent,
            ip: self.ip,
        }
    }
}
