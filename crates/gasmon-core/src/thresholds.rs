//! Pollutant thresholds and categorization.
//!
//! Two independent classifications are provided:
//!
//! - **Eco**: a fixed per-pollutant ppm ceiling. Values at or below it are
//!   "eco". The ceilings approximate monthly averages and are reused as-is
//!   for daily values. Used for display only, never for storage decisions.
//! - **Gas level**: a three-band rating of an instantaneous value, used to
//!   colour live readings.
//!
//! # Example
//!
//! ```
//! use gasmon_core::{GasLevel, is_eco};
//! use gasmon_types::Pollutant;
//!
//! assert!(is_eco(Pollutant::Co, 50.0));
//! assert!(!is_eco(Pollutant::Nh3, 10.5));
//! assert_eq!(GasLevel::of(Pollutant::Co2, 650.0), Some(GasLevel::Moderate));
//! ```

use serde::{Deserialize, Serialize};

use gasmon_types::Pollutant;

/// `true` when `value` is at or below the pollutant's eco ceiling.
///
/// `NaN` is never eco.
pub fn is_eco(pollutant: Pollutant, value: f64) -> bool {
    EcoThresholds::default().is_eco(pollutant, value)
}

/// Per-pollutant eco ceilings in ppm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EcoThresholds {
    /// Ethanol ceiling.
    pub etanol: f64,
    /// CO2 ceiling.
    pub co2: f64,
    /// CO ceiling.
    pub co: f64,
    /// NH3 ceiling.
    pub nh3: f64,
}

impl Default for EcoThresholds {
    fn default() -> Self {
        Self {
            etanol: 10.0,
            co2: 100_000.0,
            co: 50.0,
            nh3: 10.0,
        }
    }
}

impl EcoThresholds {
    /// The ceiling for one pollutant.
    pub fn ceiling(&self, pollutant: Pollutant) -> f64 {
        match pollutant {
            Pollutant::Etanol => self.etanol,
            Pollutant::Co2 => self.co2,
            Pollutant::Co => self.co,
            Pollutant::Nh3 => self.nh3,
        }
    }

    /// `true` when `value` does not exceed the ceiling.
    pub fn is_eco(&self, pollutant: Pollutant, value: f64) -> bool {
        value <= self.ceiling(pollutant)
    }
}

/// Rating of an instantaneous concentration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GasLevel {
    /// Below the first band.
    Good,
    /// Between the two bands.
    Moderate,
    /// At or above the second band.
    High,
}

impl GasLevel {
    /// Band limits `(good_below, moderate_below)` for a pollutant.
    pub fn bands(pollutant: Pollutant) -> (f64, f64) {
        match pollutant {
            Pollutant::Co2 => (400.0, 1000.0),
            Pollutant::Co => (9.0, 35.0),
            Pollutant::Etanol | Pollutant::Nh3 => (25.0, 50.0),
        }
    }

    /// Classify a value; `None` when it is not a finite number.
    pub fn of(pollutant: Pollutant, value: f64) -> Option<GasLevel> {
        if !value.is_finite() {
            return None;
        }
        let (good, moderate) = Self::bands(pollutant);
        Some(if value < good {
            GasLevel::Good
        } else if value < moderate {
            GasLevel::Moderate
        } else {
            GasLevel::High
        })
    }

    /// Human-readable name.
    pub fn description(&self) -> &'static str {
        match self {
            GasLevel::Good => "Good",
            GasLevel::Moderate => "Moderate",
            GasLevel::High => "High",
        }
    }
}
