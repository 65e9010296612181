//! Environment variable lookup and parsing.
//!
//! Configuration loaders take an [`EnvLookup`] rather than reading the process
//! environment directly, so tests can feed a plain map.

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::ConfigError;

/// Source of configuration variables.
pub trait EnvLookup {
    /// Returns the value of `name`, if set.
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

impl EnvLookup for HashMap<&str, &str> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).map(|v| (*v).to_string())
    }
}

/// Loads a `.env` file into the process environment if one exists.
///
/// A missing file is not an error.
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }
}

/// Parses `name` if present. Empty values count as absent.
///
/// # Errors
///
/// Returns `ConfigError::ParseError` when the value does not parse as `T`.
pub fn parse_var<T, E>(env: &E, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    E: EnvLookup + ?Sized,
{
    match env.get(name) {
        Some(val) if !val.trim().is_empty() => val
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::ParseError {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        _ => Ok(None),
    }
}

/// Parses `name`, falling back to `default` when unset.
///
/// # Errors
///
/// Returns `ConfigError::ParseError` when the value does not parse as `T`.
pub fn parse_var_or<T, E>(env: &E, name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    E: EnvLookup + ?Sized,
{
    Ok(parse_var(env, name)?.unwrap_or(default))
}
