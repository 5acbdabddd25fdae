//! Companion Core
//!
//! Platform-independent half of the caregiving companion: records, the
//! persistence gateway, owner/child scoped repositories, entity stores and
//! the routine board's ordered task list.

pub mod config;
pub mod domain;
pub mod forms;
pub mod gateway;
pub mod identity;
pub mod notify;
pub mod repository;
pub mod routine;
pub mod services;
pub mod stores;

pub use config::{AppConfig, ConfigError};
pub use services::{AppServices, ServiceError};
