//! Request validation and calculation orchestration.

use std::sync::Arc;
use std::time::Duration;

use aquastock_compatibility::{PairwiseCompatibilityOracle, check_group};
use aquastock_species::SpeciesResolver;
use aquastock_species_models::SpeciesParameters;
use aquastock_stocking::{
    CheckMode, ShapeIncompatibility, StockingRules, check_selection, check_species, recommend,
};
use aquastock_tank::{TankDimensions, calculate_volume_liters_with};

use crate::outcome::{CalculationOutcome, CalculationResult, InputIncomplete};
use crate::{CalculationError, CalculationRequest, ServiceSettings};

/// Runs calculations against a species source and a compatibility
/// oracle.
#[derive(Clone)]
pub struct Calculator {
    resolver: SpeciesResolver,
    oracle: Arc<dyn PairwiseCompatibilityOracle>,
    rules: Arc<StockingRules>,
    oracle_timeout: Duration,
}

impl Calculator {
    /// Creates a calculator using the default oracle timeout.
    #[must_use]
    pub fn new(
        resolver: SpeciesResolver,
        oracle: Arc<dyn PairwiseCompatibilityOracle>,
        rules: StockingRules,
    ) -> Self {
        Self {
            resolver,
            oracle,
            rules: Arc::new(rules),
            oracle_timeout: aquastock_compatibility::DEFAULT_TIMEOUT,
        }
    }

    /// Applies timeouts and concurrency to both the resolver and the
    /// oracle call.
    #[must_use]
    pub fn with_settings(mut self, settings: ServiceSettings) -> Self {
        self.resolver = self
            .resolver
            .with_timeout(settings.timeout)
            .with_concurrency(settings.concurrency);
        self.oracle_timeout = settings.timeout;
        self
    }

    /// The rules in effect.
    #[must_use]
    pub fn rules(&self) -> &StockingRules {
        &self.rules
    }

    /// Water volume of `dimensions` in liters.
    #[must_use]
    pub fn volume(&self, dimensions: &TankDimensions) -> f64 {
        calculate_volume_liters_with(dimensions, self.rules.bowl_volume_liters)
    }

    /// Checks that `request` can be calculated and returns its volume.
    ///
    /// # Errors
    ///
    /// Returns the [`InputIncomplete`] reason when no species are
    /// selected, or when a shape that depends on its dimensions has a
    /// zero volume.
    pub fn validate(&self, request: &CalculationRequest) -> Result<f64, InputIncomplete> {
        if request.selection.is_empty() {
            return Err(InputIncomplete::NoSpecies);
        }
        let volume = self.volume(&request.dimensions);
        if !request.dimensions.shape.is_fixed_volume() && volume <= 0.0 {
            return Err(InputIncomplete::InvalidDimensions);
        }
        Ok(volume)
    }

    /// Runs one calculation.
    ///
    /// # Errors
    ///
    /// Returns [`CalculationError::DataUnavailable`] if the group
    /// compatibility check fails or times out. Species lookups never
    /// fail; they fall back to default parameters.
    pub async fn calculate(
        &self,
        request: &CalculationRequest,
    ) -> Result<CalculationOutcome, CalculationError> {
        let volume = match self.validate(request) {
            Ok(volume) => volume,
            Err(reason) => {
                log::info!("request {}: not calculated: {reason}", request.id);
                return Ok(CalculationOutcome::InputIncomplete(reason));
            }
        };
        let shape = request.dimensions.shape;
        let names = request.selection.names();

        log::info!(
            "request {}: {shape} tank, {volume:.1} L, {} species",
            request.id,
            names.len()
        );

        let (resolved, group) = tokio::join!(
            self.resolver.resolve_all(&names),
            check_group(
                self.oracle.as_ref(),
                &request.selection,
                self.oracle_timeout,
                self.rules.duplicate_pairs,
            ),
        );
        let params: Vec<&SpeciesParameters> = resolved.iter().map(|r| &r.parameters).collect();

        let flags = check_selection(
            &self.rules,
            CheckMode::PreCalculation,
            shape,
            volume,
            params.iter().copied(),
        );
        if !flags.is_empty() {
            log::info!(
                "request {}: blocked by {} shape incompatibilities",
                request.id,
                flags.len()
            );
            return Ok(CalculationOutcome::ShapeIncompatible {
                tank_volume_liters: volume,
                flags,
            });
        }

        let compatibility = group.map_err(|e| {
            log::warn!("request {}: compatibility check failed: {e}", request.id);
            CalculationError::DataUnavailable(e)
        })?;

        if let Some(group) = compatibility.as_ref().filter(|g| g.is_blocking()) {
            log::info!("request {}: blocked: {}", request.id, group.summary());
            return Ok(CalculationOutcome::GroupIncompatible {
                compatibility: group.surfaced(),
            });
        }

        let recommendations = recommend(&self.rules, volume, &request.selection, &resolved);
        let shape_warnings = check_selection(
            &self.rules,
            CheckMode::Live,
            shape,
            volume,
            params.iter().copied(),
        );
        let conditional_warnings = compatibility
            .as_ref()
            .map(|g| g.conditional_pairs().cloned().collect())
            .unwrap_or_default();

        log::info!(
            "request {}: completed with {} recommendations",
            request.id,
            recommendations.len()
        );

        Ok(CalculationOutcome::Completed(Box::new(CalculationResult {
            request_id: request.id,
            dimensions: request.dimensions,
            tank_volume_liters: volume,
            species: resolved,
            recommendations,
            shape_warnings,
            compatibility,
            conditional_warnings,
        })))
    }

    /// Live shape check for one species, as run when it is added or the
    /// dimensions change. Returns `None` when the species fits or the
    /// dimensions are incomplete.
    pub async fn check_species_fit(
        &self,
        dimensions: &TankDimensions,
        common_name: &str,
    ) -> Option<ShapeIncompatibility> {
        let volume = self.volume(dimensions);
        if !dimensions.shape.is_fixed_volume() && volume <= 0.0 {
            return None;
        }
        let resolved = self.resolver.resolve(common_name).await;
        check_species(
            &self.rules,
            CheckMode::Live,
            dimensions.shape,
            volume,
            &resolved.parameters,
        )
    }
}
