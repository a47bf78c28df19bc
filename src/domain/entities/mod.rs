//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without business logic.
//!
//! # Entity Types
//!
//! - [`Link`] - A shortened URL mapping
//! - [`Click`] - A persisted redirect of a shortened link
//!
//! Creation inputs live in separate structs (`NewLink`, `NewClick`) that
//! omit storage-assigned fields such as ids.

pub mod click;
pub mod link;

pub use click::{Click, NewClick};
pub use link::{Link, NewLink};
