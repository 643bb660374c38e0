//! Shared utilities for stockcast
//!
//! This crate provides common functionality used across the stockcast workspace:
//! tracing setup and environment-based configuration helpers.

pub mod config;
pub mod logging;

pub use config::{env_var, load_dotenv};
pub use logging::{LogFormat, init_tracing, init_tracing_with};
