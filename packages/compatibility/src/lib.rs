#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Group compatibility checks for a fish selection.
//!
//! Pairwise judgments come from an external [`PairwiseCompatibilityOracle`]
//! (a hosted service in production, a scripted table offline and in
//! tests). The [`aggregator`] expands the selection, asks the oracle,
//! deduplicates the returned pairs and reduces them to one
//! [`GroupCompatibilityResult`].
//!
//! Unlike species lookups, oracle failures are never papered over: a
//! failed, timed-out or unreadable oracle response is a
//! [`CompatibilityError`], not a "compatible" verdict.
//!
//! [`GroupCompatibilityResult`]: aquastock_compatibility_models::GroupCompatibilityResult

pub mod aggregator;
pub mod http;
pub mod labels;
pub mod scripted;

use std::time::Duration;

use aquastock_compatibility_models::PairJudgment;
use async_trait::async_trait;
use thiserror::Error;

pub use aggregator::{aggregate, check_group};
pub use scripted::StaticOracle;

/// Default timeout for one oracle call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors that can occur while checking group compatibility.
#[derive(Debug, Error)]
pub enum CompatibilityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a local judgments file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The oracle answered with a non-success status.
    #[error("Compatibility service returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (possibly truncated).
        body: String,
    },

    /// The oracle did not answer in time.
    #[error("Compatibility check timed out after {timeout:?}")]
    Timeout {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The response could not be interpreted as pairwise judgments.
    #[error("Malformed compatibility response: {message}")]
    MalformedResponse {
        /// What was wrong with it.
        message: String,
    },

    /// The oracle used a classification label with no known meaning.
    #[error("Unrecognized compatibility label: {label:?}")]
    UnrecognizedLabel {
        /// The label as received.
        label: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

/// A service that judges every pairing within a list of fish.
///
/// `expanded_names` repeats each species once per requested fish, so the
/// oracle also judges same-species pairings. Implementations may return
/// the same logical pair more than once.
#[async_trait]
pub trait PairwiseCompatibilityOracle: Send + Sync {
    /// Judges all pairings in `expanded_names`.
    ///
    /// # Errors
    ///
    /// Returns [`CompatibilityError`] if the oracle cannot be reached or
    /// its response cannot be read.
    async fn check_group(
        &self,
        expanded_names: &[String],
    ) -> Result<Vec<PairJudgment>, CompatibilityError>;
}

/// Creates the compatibility oracle described by environment variables.
///
/// - `AQUASTOCK_ORACLE_URL` (required): oracle base URL
/// - `AQUASTOCK_ORACLE_API_KEY` (optional): sent as a bearer token
///
/// # Errors
///
/// Returns [`CompatibilityError::Config`] if `AQUASTOCK_ORACLE_URL` is
/// unset or empty.
pub fn create_oracle_from_env() -> Result<Box<dyn PairwiseCompatibilityOracle>, CompatibilityError>
{
    let base_url = std::env::var("AQUASTOCK_ORACLE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| CompatibilityError::Config {
            message: "AQUASTOCK_ORACLE_URL environment variable not set".to_string(),
        })?;
    let api_key = std::env::var("AQUASTOCK_ORACLE_API_KEY")
        .ok()
        .filter(|v| !v.is_empty());

    log::info!("Using compatibility oracle at {base_url}");

    Ok(Box::new(http::HttpOracle::new(base_url, api_key)))
}
