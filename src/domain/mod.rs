//! Domain layer: entities, repository contracts and access tracking.
//!
//! The domain layer has no dependencies on infrastructure or presentation code.
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`access_event`] - Redirect event passed to the background worker
//! - [`access_worker`] - Asynchronous access log writer
//!
//! # Access Recording Flow
//!
//! 1. The redirect handler resolves a short code
//! 2. An [`access_event::AccessEvent`] is sent to a bounded channel
//! 3. [`access_worker::run_access_worker`] persists it with retry
//! 4. [`repositories::AccessRepository::record`] logs the access and bumps `click_count`

pub mod access_event;
pub mod access_worker;
pub mod entities;
pub mod repositories;
