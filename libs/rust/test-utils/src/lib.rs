//! Shared test utilities for Context Capsule Rust libraries.
//!
//! This crate provides:
//! - Proptest generators for artifacts, metadata and payloads
//! - Key store doubles that count, slow down or fail
//! - Fixtures with sample artifacts and known-answer vectors

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod generators;
pub mod mocks;
pub mod fixtures;

pub use generators::*;
