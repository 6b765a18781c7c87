#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Species parameter lookup for the aquastock calculator.
//!
//! Raw species records come from an external catalog (a hosted
//! `PostgREST` backend in production, an in-memory table offline and in
//! tests) through the [`SpeciesDataSource`] trait. Records are loosely
//! typed: numbers may arrive as strings with unit suffixes, keys vary in
//! casing, and fields may be missing. The [`resolver`] turns whatever the
//! source returns into a complete [`SpeciesParameters`], substituting the
//! fallback default per field and recording what it substituted.
//!
//! [`SpeciesParameters`]: aquastock_species_models::SpeciesParameters

pub mod http;
pub mod memory;
pub mod parsing;
pub mod resolver;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use resolver::SpeciesResolver;

/// Default per-request timeout for species lookups.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default number of species fetched concurrently.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Errors that can occur while talking to a species data source.
#[derive(Debug, Error)]
pub enum SpeciesError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a local catalog file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend answered with a non-success status.
    #[error("Species service returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (possibly truncated).
        body: String,
    },

    /// The lookup did not complete in time.
    #[error("Species lookup timed out after {timeout:?}")]
    Timeout {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

/// A catalog of raw species records.
///
/// Implementations return the record stored under `common_name`, or
/// `None` when no such record exists. Matching may be exact or
/// case-insensitive; the resolver retries alternative casings itself.
/// A failed lookup must be reported as an error, never as `None`.
#[async_trait]
pub trait SpeciesDataSource: Send + Sync {
    /// Fetches the raw record for one species.
    ///
    /// # Errors
    ///
    /// Returns [`SpeciesError`] if the source cannot be reached or
    /// answers with something other than a record or "not found".
    async fn fetch(&self, common_name: &str) -> Result<Option<serde_json::Value>, SpeciesError>;
}

/// Creates the species data source described by environment variables.
///
/// - `AQUASTOCK_SPECIES_URL` (required): backend base URL
/// - `AQUASTOCK_SPECIES_API_KEY` (optional): sent as `apikey` and bearer token
/// - `AQUASTOCK_SPECIES_TABLE` (optional, default `fish_species`)
///
/// # Errors
///
/// Returns [`SpeciesError::Config`] if `AQUASTOCK_SPECIES_URL` is unset
/// or empty.
pub fn create_species_source_from_env() -> Result<Box<dyn SpeciesDataSource>, SpeciesError> {
    let base_url = std::env::var("AQUASTOCK_SPECIES_URL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| SpeciesError::Config {
            message: "AQUASTOCK_SPECIES_URL environment variable not set".to_string(),
        })?;
    let api_key = std::env::var("AQUASTOCK_SPECIES_API_KEY")
        .ok()
        .filter(|v| !v.is_empty());
    let table =
        std::env::var("AQUASTOCK_SPECIES_TABLE").unwrap_or_else(|_| "fish_species".to_string());

    log::info!("Using species catalog at {base_url} (table={table})");

    Ok(Box::new(http::HttpSpeciesSource::new(
        base_url, table, api_key,
    )))
}
