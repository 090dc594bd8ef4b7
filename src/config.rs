//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Currency symbol used when a cashback carries none.
pub const DEFAULT_CURRENCY: &str = "₹";

/// Default number of confetti particles per burst.
pub const DEFAULT_PARTICLE_COUNT: usize = 50;

/// Runtime settings for the reveal.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealSettings {
    /// Multiplier applied to every schedule delay (1.0 = real time).
    pub time_scale: f64,
    /// Confetti particles generated per burst.
    pub particle_count: usize,
    /// Currency symbol for cashback amounts without one.
    pub default_currency: String,
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            particle_count: DEFAULT_PARTICLE_COUNT,
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl RevealSettings {
    /// Load settings from `REWARD_REVEAL_*` environment variables.
    ///
    /// Unset variables fall back to the defaults; set-but-invalid values are rejected.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let time_scale = match lookup("REWARD_REVEAL_TIME_SCALE") {
            Some(raw) => parse_time_scale(&raw)?,
            None => defaults.time_scale,
        };

        let particle_count = match lookup("REWARD_REVEAL_PARTICLES") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: "REWARD_REVEAL_PARTICLES".to_string(),
                    message: e.to_string(),
                })?,
            None => defaults.particle_count,
        };

        let default_currency = lookup("REWARD_REVEAL_CURRENCY")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.default_currency);

        Ok(Self {
            time_scale,
            particle_count,
            default_currency,
        })
    }

    /// Scale a schedule delay by `time_scale`. An unusable factor leaves the delay as is.
    pub fn scale(&self, delay: Duration) -> Duration {
        let nanos = (delay.as_nanos() as f64 * self.time_scale).round();
        if !nanos.is_finite() || nanos < 0.0 || nanos > u64::MAX as f64 {
            return delay;
        }
        Duration::from_nanos(nanos as u64)
    }
}

fn parse_time_scale(raw: &str) -> Result<f64, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        key: "REWARD_REVEAL_TIME_SCALE".to_string(),
        message,
    };

    let scale: f64 = raw.trim().parse().map_err(|e| invalid(format!("{e}")))?;
    if !scale.is_finite() || scale <= 0.0 {
        return Err(invalid(format!("must be a positive number, got {scale}")));
    }
    Ok(scale)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let settings = RevealSettings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings, RevealSettings::default());
        assert_eq!(settings.default_currency, "₹");
    }

    #[test]
    fn reads_overrides() {
        let settings = RevealSettings::from_lookup(lookup_from(&[
            ("REWARD_REVEAL_TIME_SCALE", "0.5"),
            ("REWARD_REVEAL_PARTICLES", "12"),
            ("REWARD_REVEAL_CURRENCY", "$"),
        ]))
        .unwrap();
        assert_eq!(settings.time_scale, 0.5);
        assert_eq!(settings.particle_count, 12);
        assert_eq!(settings.default_currency, "$");
    }

    #[test]
    fn rejects_non_positive_scale() {
        for bad in ["0", "-1", "NaN", "inf", "fast"] {
            let err = RevealSettings::from_lookup(lookup_from(&[("REWARD_REVEAL_TIME_SCALE", bad)]))
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { .. }), "{bad}");
        }
    }

    #[test]
    fn rejects_bad_particle_count() {
        let lookup = lookup_from(&[("REWARD_REVEAL_PARTICLES", "lots")]);
        let err = RevealSettings::from_lookup(lookup).unwrap_err();
        assert!(err.to_string().contains("REWARD_REVEAL_PARTICLES"));
    }

    #[test]
    fn scale_applies_factor() {
        let settings = RevealSettings {
            time_scale: 2.0,
            ..Default::default()
        };
        assert_eq!(settings.scale(Duration::from_millis(700)), Duration::from_millis(1400));
        assert_eq!(
            RevealSettings::default().scale(Duration::from_millis(700)),
            Duration::from_millis(700)
        );
    }
}
