//! Business logic services for the application layer.

pub mod link_monitor;
pub mod link_service;
pub mod redirect_service;
pub mod stats_service;

pub use link_monitor::{LinkMonitor, StatusChange};
pub use link_service::{AllocationSettings, LinkService};
pub use redirect_service::{ClientInfo, RedirectService};
pub use stats_service::{LinkStats, StatsService};
