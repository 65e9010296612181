//! Shared library for cross-cutting concerns in Context Capsule Rust libraries.
//!
//! This crate provides centralized implementations for:
//! - Configuration errors and environment variable parsing
//! - Tracing subscriber initialisation

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod env;
pub mod error;
pub mod tracing_config;

pub use env::{EnvLookup, ProcessEnv, load_dotenv, parse_var, parse_var_or};
pub use error::ConfigError;
pub use tracing_config::{TracingConfig, init_tracing, try_init_tracing};
