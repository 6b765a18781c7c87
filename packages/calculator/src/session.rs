//! Request supersession.
//!
//! Each new request, and each explicit invalidation, moves the session to
//! a new id. A calculation that finishes after its id stopped being
//! current is discarded instead of being returned.

use std::sync::atomic::{AtomicU64, Ordering};

use aquastock_species_models::FishSelection;
use aquastock_tank::TankDimensions;

use crate::{CalculationError, CalculationOutcome, CalculationRequest, Calculator, RequestId};

/// Issues request ids and drops results of superseded requests.
pub struct CalculationSession {
    calculator: Calculator,
    current: AtomicU64,
}

impl CalculationSession {
    /// Creates a session with no request in flight.
    #[must_use]
    pub const fn new(calculator: Calculator) -> Self {
        Self {
            calculator,
            current: AtomicU64::new(0),
        }
    }

    /// The underlying calculator.
    #[must_use]
    pub const fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    /// Builds a request with a fresh id, superseding every earlier one.
    pub fn begin(
        &self,
        dimensions: TankDimensions,
        selection: FishSelection,
    ) -> CalculationRequest {
        let id = RequestId::new(self.current.fetch_add(1, Ordering::SeqCst) + 1);
        log::debug!("request {id}: started");
        CalculationRequest::new(id, dimensions, selection)
    }

    /// Marks every request issued so far as stale, e.g. after the inputs
    /// were cleared.
    pub fn invalidate(&self) {
        let next = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!("session invalidated, current id is now #{next}");
    }

    /// Whether `id` is the most recent request.
    #[must_use]
    pub fn is_current(&self, id: RequestId) -> bool {
        self.current.load(Ordering::SeqCst) == id.get()
    }

    /// Runs `request` and returns its outcome, or `None` if the request
    /// was superseded while it ran. Errors of superseded requests are
    /// discarded as well.
    ///
    /// # Errors
    ///
    /// Returns [`CalculationError`] if the request is still current and
    /// the calculation failed.
    pub async fn run(
        &self,
        request: &CalculationRequest,
    ) -> Result<Option<CalculationOutcome>, CalculationError> {
        let result = self.calculator.calculate(request).await;

        if !self.is_current(request.id) {
            log::warn!("request {}: superseded, discarding result", request.id);
            return Ok(None);
        }

        result.map(Some)
    }
}
