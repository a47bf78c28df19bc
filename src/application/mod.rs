//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls, validation, and the click queue.
//! They depend only on the domain traits, so tests substitute mocks or the
//! in-memory store.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Collision-safe short link allocation and lookup
//! - [`services::redirect_service::RedirectService`] - Redirect resolution feeding the click queue
//! - [`services::stats_service::StatsService`] - Click counts per link
//! - [`services::link_monitor::LinkMonitor`] - Background reachability checks

pub mod services;
