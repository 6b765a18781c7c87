//! Species parameter resolution with per-field fallback.
//!
//! Lookups try the name as given and then a few alternative casings.
//! A species that cannot be found, or whose source fails or times out,
//! still resolves to a complete record built from the fallback
//! defaults; the [`ParameterProvenance`] says which of those happened.

use std::sync::Arc;
use std::time::Duration;

use aquastock_species_models::{ParameterProvenance, ResolvedSpecies, SpeciesParameters};
use futures::stream::{self, StreamExt as _};

use crate::parsing::resolve_record;
use crate::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT, SpeciesDataSource, SpeciesError};

/// Resolves [`SpeciesParameters`] from a [`SpeciesDataSource`].
#[derive(Clone)]
pub struct SpeciesResolver {
    source: Arc<dyn SpeciesDataSource>,
    timeout: Duration,
    concurrency: usize,
}

impl SpeciesResolver {
    /// Creates a resolver with the default timeout and concurrency.
    #[must_use]
    pub fn new(source: Arc<dyn SpeciesDataSource>) -> Self {
        Self {
            source,
            timeout: DEFAULT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Sets the time limit for resolving one species, covering every
    /// casing attempt.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets how many species are fetched at once. Values below 1 are
    /// raised to 1.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Resolves one species. Never fails.
    pub async fn resolve(&self, common_name: &str) -> ResolvedSpecies {
        let lookup = tokio::time::timeout(self.timeout, self.lookup(common_name))
            .await
            .unwrap_or_else(|_| {
                Err(SpeciesError::Timeout {
                    timeout: self.timeout,
                })
            });

        match lookup {
            Ok(Some(record)) => resolve_record(common_name, &record),
            Ok(None) => {
                log::info!("species '{common_name}' not in catalog, using defaults");
                ResolvedSpecies {
                    parameters: SpeciesParameters::with_defaults(common_name),
                    provenance: ParameterProvenance::NotFound,
                }
            }
            Err(e) => {
                log::warn!("species lookup for '{common_name}' failed, using defaults: {e}");
                ResolvedSpecies {
                    parameters: SpeciesParameters::with_defaults(common_name),
                    provenance: ParameterProvenance::Unavailable {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    /// Resolves several species concurrently and returns them in input
    /// order once every lookup has finished.
    pub async fn resolve_all(&self, common_names: &[&str]) -> Vec<ResolvedSpecies> {
        let mut results: Vec<(usize, ResolvedSpecies)> =
            stream::iter(common_names.iter().enumerate().map(|(idx, name)| async move {
                (idx, self.resolve(name).await)
            }))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        results.sort_by_key(|(idx, _)| *idx);
        results.into_iter().map(|(_, resolved)| resolved).collect()
    }

    async fn lookup(&self, common_name: &str) -> Result<Option<serde_json::Value>, SpeciesError> {
        for candidate in casing_candidates(common_name) {
            if let Some(record) = self.source.fetch(&candidate).await? {
                if candidate != common_name.trim() {
                    log::debug!("species '{common_name}' found under casing '{candidate}'");
                }
                return Ok(Some(record));
            }
        }
        Ok(None)
    }
}

/// The name as given, followed by its lowercase, title-case, and
/// uppercase forms, without duplicates.
#[must_use]
pub fn casing_candidates(common_name: &str) -> Vec<String> {
    let trimmed = common_name.trim();
    let mut candidates: Vec<String> = Vec::with_capacity(4);
    for candidate in [
        trimmed.to_string(),
        trimmed.to_lowercase(),
        title_case(trimmed),
        trimmed.to_uppercase(),
    ] {
        if !candidate.is_empty() && !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

/// Capitalizes the first letter of every whitespace- or hyphen-separated
/// word and lowercases the rest.
fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for c in value.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        at_word_start = c.is_whitespace() || c == '-';
    }
    out
}
