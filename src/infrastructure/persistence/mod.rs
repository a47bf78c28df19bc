//! Repository implementations.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Link storage and retrieval in PostgreSQL
//! - [`PgClickRepository`] - Click persistence and counting in PostgreSQL
//! - [`InMemoryStore`] - Process-local storage implementing both traits

pub mod memory_store;
pub mod pg_click_repository;
pub mod pg_link_repository;

pub use memory_store::InMemoryStore;
pub use pg_click_repository::PgClickRepository;
pub use pg_link_repository::PgLinkRepository;
