//! Helper functions used across the application.
//!
//! - [`code_generator`] - Random short code generation
//! - [`url_normalizer`] - Long URL validation and canonicalization

pub mod code_generator;
pub mod url_normalizer;
