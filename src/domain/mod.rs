//! Domain layer containing business entities and the click pipeline.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`click_event`] - Click tracking event model
//! - [`click_queue`] - Bounded queue between redirects and workers
//! - [`click_worker`] - Worker pool persisting click events
//! - [`url_probe`] - Reachability check port for the link monitor
//!
//! The domain layer has no dependency on concrete storage. Repository traits
//! define the contracts implemented by the infrastructure layer.
//!
//! # Click Processing Flow
//!
//! 1. A redirect resolves a link and builds a [`click_event::ClickEvent`]
//! 2. The event is offered to [`click_queue::ClickQueue`] without waiting;
//!    it is dropped if the queue is full
//! 3. A worker from [`click_worker::ClickWorkerPool`] dequeues it
//! 4. The click is persisted via [`repositories::ClickRepository`]

pub mod click_event;
pub mod click_queue;
pub mod click_worker;
pub mod entities;
pub mod repositories;
pub mod url_probe;
