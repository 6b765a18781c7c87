#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The aquastock calculation engine.
//!
//! A [`CalculationRequest`] is an immutable snapshot of the tank
//! dimensions and fish selection. [`Calculator::calculate`] turns it into
//! a [`CalculationOutcome`]:
//!
//! 1. validate the input (species selected, non-zero volume)
//! 2. resolve species parameters and run the group compatibility check
//!    concurrently, then join
//! 3. block on tank shape incompatibilities (pre-calculation limits)
//! 4. block on an incompatible group verdict
//! 5. compute recommendations and attach live shape and conditional
//!    compatibility warnings
//!
//! Incomplete input and blocking verdicts are outcomes, not errors. The
//! only [`CalculationError`] is an unavailable compatibility oracle,
//! which must never be mistaken for "no issues found".
//!
//! [`CalculationSession`] tags requests with increasing ids so that
//! results of superseded requests are dropped.

pub mod calculator;
pub mod history;
pub mod outcome;
pub mod request;
pub mod session;
pub mod settings;

use aquastock_compatibility::CompatibilityError;
use thiserror::Error;

pub use calculator::Calculator;
pub use history::HistoryRecord;
pub use outcome::{CalculationOutcome, CalculationResult, InputIncomplete};
pub use request::{CalculationRequest, RequestId};
pub use session::CalculationSession;
pub use settings::ServiceSettings;

/// Errors that prevent a calculation from producing any outcome.
#[derive(Debug, Error)]
pub enum CalculationError {
    /// The group compatibility check could not be completed. The
    /// calculation must not be finalized until it is retried.
    #[error("Compatibility data unavailable: {0}")]
    DataUnavailable(#[from] CompatibilityError),
}

impl CalculationError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::DataUnavailable(inner) => matches!(
                inner,
                CompatibilityError::Http(_)
                    | CompatibilityError::Status { .. }
                    | CompatibilityError::Timeout { .. }
            ),
        }
    }
}
