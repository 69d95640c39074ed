use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound for any per-character error probability.
pub const MAX_ERROR_RATE: f64 = 0.3;

pub const DEFAULT_PROFILE: &str = "normal";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingProfile {
    pub name: String,
    /// Scales every pause. Larger is slower.
    pub speed_multiplier: f64,
    /// Probability of a misclick on an eligible character, in `[0, MAX_ERROR_RATE]`.
    pub error_rate: f64,
    pub mistakes_enabled: bool,
}

impl TypingProfile {
    pub fn with_mistakes(&self, enabled: bool) -> Self {
        Self {
            mistakes_enabled: enabled,
            ..self.clone()
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("unknown profile {name:?} (available: {available})")]
    UnknownProfile { name: String, available: String },
}

struct CatalogEntry {
    name: &'static str,
    speed_multiplier: f64,
    error_rate: f64,
    mistakes_enabled: bool,
}

const CATALOG: [CatalogEntry; 4] = [
    CatalogEntry {
        name: "slow",
        speed_multiplier: 1.4,
        error_rate: 0.03,
        mistakes_enabled: true,
    },
    CatalogEntry {
        name: "normal",
        speed_multiplier: 1.0,
        error_rate: 0.05,
        mistakes_enabled: true,
    },
    CatalogEntry {
        name: "fast",
        speed_multiplier: 0.7,
        error_rate: 0.08,
        mistakes_enabled: true,
    },
    CatalogEntry {
        name: "careful",
        speed_multiplier: 1.2,
        error_rate: 0.01,
        mistakes_enabled: true,
    },
];

impl CatalogEntry {
    fn to_profile(&self) -> TypingProfile {
        TypingProfile {
            name: self.name.to_string(),
            speed_multiplier: self.speed_multiplier,
            error_rate: self.error_rate,
            mistakes_enabled: self.mistakes_enabled,
        }
    }
}

/// All built-in profiles, in catalog order.
pub fn catalog() -> Vec<TypingProfile> {
    CATALOG.iter().map(CatalogEntry::to_profile).collect()
}

pub fn profile_names() -> Vec<&'static str> {
    CATALOG.iter().map(|entry| entry.name).collect()
}

/// Resolve a catalog profile and apply CLI-level overrides.
///
/// - `error_override >= 0` replaces the catalog error rate, clamped to `[0, MAX_ERROR_RATE]`.
///   Negative (or NaN) keeps the catalog value.
/// - `speed_override > 0` multiplies the catalog speed multiplier, as long as the product
///   stays finite and positive. Anything else keeps it.
pub fn resolve(
    name: &str,
    speed_override: f64,
    error_override: f64,
) -> Result<TypingProfile, ProfileError> {
    let entry = CATALOG
        .iter()
        .find(|entry| entry.name == name)
        .ok_or_else(|| ProfileError::UnknownProfile {
            name: name.to_string(),
            available: profile_names().join(", "),
        })?;

    let mut profile = entry.to_profile();

    if error_override >= 0.0 {
        profile.error_rate = error_override.clamp(0.0, MAX_ERROR_RATE);
    }
    if speed_override > 0.0 {
        let scaled = profile.speed_multiplier * speed_override;
        // Overflow to infinity or underflow to zero keeps the catalog speed.
        if scaled.is_finite() && scaled > 0.0 {
            profile.speed_multiplier = scaled;
        }
    }

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_error_override_keeps_catalog_rate() {
        let p = resolve("careful", 1.0, -1.0).unwrap();
        assert_eq!(p.error_rate, 0.01);
    }

    #[test]
    fn error_override_is_clamped() {
        assert_eq!(resolve("normal", 1.0, 0.9).unwrap().error_rate, MAX_ERROR_RATE);
        assert_eq!(resolve("normal", 1.0, 0.0).unwrap().error_rate, 0.0);
        assert_eq!(resolve("normal", 1.0, 0.12).unwrap().error_rate, 0.12);
    }

    #[test]
    fn nan_error_override_keeps_catalog_rate() {
        assert_eq!(resolve("fast", 1.0, f64::NAN).unwrap().error_rate, 0.08);
    }

    #[test]
    fn speed_override_compounds_with_catalog() {
        let p = resolve("slow", 2.0, -1.0).unwrap();
        assert!((p.speed_multiplier - 2.8).abs() < 1e-9);

        let p = resolve("slow", 0.0, -1.0).unwrap();
        assert_eq!(p.speed_multiplier, 1.4);

        let p = resolve("slow", -3.0, -1.0).unwrap();
        assert_eq!(p.speed_multiplier, 1.4);
    }

    #[test]
    fn unknown_profile_lists_available_names() {
        let err = resolve("turbo", 1.0, -1.0).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("turbo"));
        assert!(msg.contains("slow, normal, fast, careful"));
    }

    #[test]
    fn with_mistakes_only_touches_the_flag() {
        let p = resolve("normal", 1.0, -1.0).unwrap();
        let off = p.with_mistakes(false);
        assert!(!off.mistakes_enabled);
        assert_eq!(off.error_rate, p.error_rate);
        assert_eq!(off.name, "normal");
    }
}
