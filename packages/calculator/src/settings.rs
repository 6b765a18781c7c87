//! Timeouts and concurrency for external lookups.

use std::time::Duration;

use aquastock_species::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT};

/// Tunables for calls that leave the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSettings {
    /// Timeout for each species lookup and for the oracle call.
    pub timeout: Duration,
    /// Number of species looked up at once.
    pub concurrency: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl ServiceSettings {
    /// Reads `AQUASTOCK_TIMEOUT_SECS` and `AQUASTOCK_CONCURRENCY`,
    /// keeping the default for anything unset or invalid.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var("AQUASTOCK_TIMEOUT_SECS").ok().as_deref(),
            std::env::var("AQUASTOCK_CONCURRENCY").ok().as_deref(),
        )
    }

    fn from_values(timeout_secs: Option<&str>, concurrency: Option<&str>) -> Self {
        let defaults = Self::default();

        let timeout = timeout_secs
            .and_then(|raw| parse_positive("AQUASTOCK_TIMEOUT_SECS", raw))
            .map_or(defaults.timeout, Duration::from_secs);
        let concurrency = concurrency
            .and_then(|raw| parse_positive("AQUASTOCK_CONCURRENCY", raw))
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(defaults.concurrency);

        Self {
            timeout,
            concurrency,
        }
    }
}

fn parse_positive(name: &str, raw: &str) -> Option<u64> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            log::warn!("Ignoring invalid {name}={raw:?}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_values_use_defaults() {
        let settings = ServiceSettings::from_values(None, None);
        assert_eq!(settings, ServiceSettings::default());
        assert_eq!(settings.timeout, Duration::from_secs(15));
        assert_eq!(settings.concurrency, 8);
    }

    #[test]
    fn valid_values_are_used() {
        let settings = ServiceSettings::from_values(Some("30"), Some(" 4 "));
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.concurrency, 4);
    }

    #[test]
    fn invalid_values_fall_back() {
        let settings = ServiceSettings::from_values(Some("0"), Some("lots"));
        assert_eq!(settings, ServiceSettings::default());
    }
}
