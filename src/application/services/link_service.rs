//! Link creation and retrieval service.

use std::sync::Arc;

use metrics::counter;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{DEFAULT_CODE_LENGTH, generate_code};
use crate::utils::url_normalizer::normalize_url;

/// Default number of short code candidates tried per link.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Tuning for short code allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationSettings {
    /// Length of generated codes.
    pub code_length: usize,
    /// Candidates tried before giving up with [`AppError::AllocationExhausted`].
    pub max_retries: u32,
}

impl Default for AllocationSettings {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Service for creating and retrieving shortened links.
pub struct LinkService<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
    settings: AllocationSettings,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    /// Creates a new link service.
    pub fn new(link_repository: Arc<L>, settings: AllocationSettings) -> Self {
        Self {
            link_repository,
            settings,
        }
    }

    pub fn settings(&self) -> AllocationSettings {
        self.settings
    }

    /// Shortens `long_url` under a freshly allocated unique code.
    ///
    /// # Allocation
    ///
    /// Each attempt generates a random candidate, skips it if a lookup finds
    /// it taken, and otherwise inserts it. The lookup only narrows the race
    /// window: two callers can both miss and then insert the same code, so a
    /// [`AppError::Conflict`] from the insert is treated as one more
    /// collision. The storage constraint is the final arbiter.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the URL is invalid
    /// - [`AppError::AllocationExhausted`] if every attempt collided
    /// - [`AppError::Storage`] if a lookup or insert fails for another reason
    /// - [`AppError::Internal`] if the random source fails
    pub async fn create_unique_link(&self, long_url: &str) -> Result<Link, AppError> {
        let long_url = normalize_url(long_url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        let max_retries = self.settings.max_retries;

        for attempt in 1..=max_retries {
            let code = generate_code(self.settings.code_length).map_err(|e| {
                AppError::internal(
                    "Failed to generate short code",
                    json!({ "reason": e.to_string() }),
                )
            })?;

            if self.link_repository.find_by_code(&code).await?.is_some() {
                counter!("short_code_collisions_total").increment(1);
                debug!(code = %code, attempt, max_retries, "Short code already exists, retrying");
                continue;
            }

            let new_link = NewLink {
                code,
                long_url: long_url.clone(),
            };

            match self.link_repository.create(new_link).await {
                Ok(link) => {
                    info!(code = %link.code, link_id = link.id, attempt, "Short link created");
                    return Ok(link);
                }
                Err(AppError::Conflict { details, .. }) => {
                    counter!("short_code_collisions_total").increment(1);
                    warn!(
                        attempt,
                        max_retries,
                        %details,
                        "Short code taken concurrently, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        warn!(attempts = max_retries, "Short code allocation exhausted");
        Err(AppError::AllocationExhausted {
            attempts: max_retries,
        })
    }

    /// Retrieves a link by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the code.
    /// Returns [`AppError::Storage`] on storage errors.
    pub async fn get_link_by_code(&self, code: &str) -> Result<Link, AppError> {
        self.link_repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))
    }

    /// Lists every link, oldest first.
    pub async fn list_links(&self) -> Result<Vec<Link>, AppError> {
        self.link_repository.list_all().await
    }

    pub async fn count_links(&self) -> Result<i64, AppError> {
        self.link_repository.count().await
    }
}
