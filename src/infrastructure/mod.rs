//! Infrastructure layer: concrete storage and outbound HTTP.
//!
//! - [`persistence`] - Repository implementations (PostgreSQL, in-memory)
//! - [`http_probe`] - Reachability checks used by the link health monitor

pub mod http_probe;
pub mod persistence;
