//! Habitrack server library
//!
//! - `api` - HTTP routes, extractors and error responses
//! - `core` - Configuration, CLI, startup and shutdown
//! - `data` - Habit store backends
//! - `domain` - Completion tracking, ownership and the habit service
//! - `utils` - Retry and date helpers

pub mod api;
pub mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
