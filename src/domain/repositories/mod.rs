//! Repository trait definitions for the domain layer.
//!
//! These traits are the only way the core reaches storage. Any backend that
//! satisfies them is interchangeable.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Link creation, lookup and listing
//! - [`ClickRepository`] - Click persistence and counting
//!
//! # Implementations
//!
//! - `crate::infrastructure::persistence::{PgLinkRepository, PgClickRepository}` - PostgreSQL
//! - `crate::infrastructure::persistence::InMemoryStore` - process-local, implements both
//! - Mock implementations are auto-generated via `mockall` for unit tests

pub mod click_repository;
pub mod link_repository;

pub use click_repository::ClickRepository;
pub use link_repository::LinkRepository;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
