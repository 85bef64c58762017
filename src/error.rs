use thiserror::Error;

/// Rejected effect configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be finite (got {value})")]
    NotFinite { field: &'static str, value: f32 },
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f32 },
}

impl ConfigError {
    /// Checks that `value` is finite and non-negative.
    pub fn check_non_negative(field: &'static str, value: f32) -> Result<(), Self> {
        if !value.is_finite() {
            return Err(Self::NotFinite { field, value });
        }
        if value < 0.0 {
            return Err(Self::Negative { field, value });
        }
        Ok(())
    }

    /// Checks that `value` is finite.
    pub fn check_finite(field: &'static str, value: f32) -> Result<(), Self> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(Self::NotFinite { field, value })
        }
    }
}

/// Recoverable conditions reported by a region toggle.
///
/// None of these stop the toggle: it falls back to the normal configuration
/// and re-evaluates on the next tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    #[error("no region configured")]
    NoRegion,
    #[error("region object `{0}` does not exist in the scene")]
    MissingRegionObject(String),
    #[error("visual target `{0}` does not exist in the scene")]
    MissingTarget(String),
}
