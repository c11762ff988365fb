//! Core types for gasmon sensor data.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ParseError;
use crate::keys::{DayKey, MonthKey};

/// Maximum number of readings retained in the today tier.
pub const TODAY_CAPACITY: usize = 100;

/// A gas measured by the sensor.
///
/// All concentrations are in parts per million.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Pollutant {
    /// Ethanol vapour (the sensor reports it as `Etanol`).
    Etanol,
    /// Carbon dioxide.
    Co2,
    /// Carbon monoxide.
    Co,
    /// Ammonia.
    Nh3,
}

impl Pollutant {
    /// Every pollutant, in wire order.
    pub const ALL: [Pollutant; 4] = [
        Pollutant::Etanol,
        Pollutant::Co2,
        Pollutant::Co,
        Pollutant::Nh3,
    ];

    /// The lowercase field name used in frames and in persisted JSON.
    pub fn key(&self) -> &'static str {
        match self {
            Pollutant::Etanol => "etanol",
            Pollutant::Co2 => "co2",
            Pollutant::Co => "co",
            Pollutant::Nh3 => "nh3",
        }
    }

    /// Human-readable label with chemical subscripts.
    pub fn label(&self) -> &'static str {
        match self {
            Pollutant::Etanol => "Etanol",
            Pollutant::Co2 => "CO₂",
            Pollutant::Co => "CO",
            Pollutant::Nh3 => "NH₃",
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Pollutant {
    type Err = ParseError;

    /// Case-insensitive match against the field names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Pollutant::ALL
            .into_iter()
            .find(|p| p.key() == lower)
            .ok_or_else(|| ParseError::UnknownPollutant(s.to_string()))
    }
}

/// Anything carrying the four pollutant concentrations.
///
/// A `None` or non-finite value means the concentration is unavailable.
pub trait PollutantSample {
    /// Raw value of one pollutant.
    fn value(&self, pollutant: Pollutant) -> Option<f64>;

    /// Value of one pollutant, or `None` when absent or not a finite number.
    fn available(&self, pollutant: Pollutant) -> Option<f64> {
        self.value(pollutant).filter(|v| v.is_finite())
    }
}

/// An entity with a natural key that is unique within its tier.
pub trait Keyed {
    /// The key type; its ordering is chronological.
    type Key: Ord + Copy + fmt::Display;

    /// The entity's key.
    fn key(&self) -> Self::Key;
}

/// One raw sample received from the sensor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Reading {
    /// Free-text location reported by the sensor.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub location: Option<String>,
    /// Ethanol concentration in ppm.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub etanol: Option<f64>,
    /// CO2 concentration in ppm.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub co2: Option<f64>,
    /// CO concentration in ppm.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub co: Option<f64>,
    /// NH3 concentration in ppm.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub nh3: Option<f64>,
    /// When the reading was received.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub date_time: OffsetDateTime,
}

impl Reading {
    /// A reading with no values, stamped at `date_time`.
    pub fn new(date_time: OffsetDateTime) -> Self {
        Self {
            location: None,
            etanol: None,
            co2: None,
            co: None,
            nh3: None,
            date_time,
        }
    }

    /// Set one pollutant value.
    #[must_use]
    pub fn with(mut self, pollutant: Pollutant, value: f64) -> Self {
        *self.slot(pollutant) = Some(value);
        self
    }

    /// Set the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// The UTC calendar day this reading belongs to.
    pub fn day(&self) -> DayKey {
        DayKey::of(self.date_time)
    }

    fn slot(&mut self, pollutant: Pollutant) -> &mut Option<f64> {
        match pollutant {
            Pollutant::Etanol => &mut self.etanol,
            Pollutant::Co2 => &mut self.co2,
            Pollutant::Co => &mut self.co,
            Pollutant::Nh3 => &mut self.nh3,
        }
    }
}

impl PollutantSample for Reading {
    fn value(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::Etanol => self.etanol,
            Pollutant::Co2 => self.co2,
            Pollutant::Co => self.co,
            Pollutant::Nh3 => self.nh3,
        }
    }
}

/// The mean of all readings taken on one calendar day.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DailyAggregate {
    /// The day averaged; unique within the history tier.
    pub date: DayKey,
    /// Mean ethanol concentration in ppm.
    #[cfg_attr(feature = "serde", serde(default))]
    pub etanol: Option<f64>,
    /// Mean CO2 concentration in ppm.
    #[cfg_attr(feature = "serde", serde(default))]
    pub co2: Option<f64>,
    /// Mean CO concentration in ppm.
    #[cfg_attr(feature = "serde", serde(default))]
    pub co: Option<f64>,
    /// Mean NH3 concentration in ppm.
    #[cfg_attr(feature = "serde", serde(default))]
    pub nh3: Option<f64>,
}

impl PollutantSample for DailyAggregate {
    fn value(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::Etanol => self.etanol,
            Pollutant::Co2 => self.co2,
            Pollutant::Co => self.co,
            Pollutant::Nh3 => self.nh3,
        }
    }
}

impl Keyed for DailyAggregate {
    type Key = DayKey;

    fn key(&self) -> DayKey {
        self.date
    }
}

/// The mean of all daily aggregates in one calendar month.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MonthlyAggregate {
    /// The month averaged; unique within the monthly tier.
    pub month: MonthKey,
    /// Mean ethanol concentration in ppm.
    #[cfg_attr(feature = "serde", serde(default))]
    pub etanol: Option<f64>,
    /// Mean CO2 concentration in ppm.
    #[cfg_attr(feature = "serde", serde(default))]
    pub co2: Option<f64>,
    /// Mean CO concentration in ppm.
    #[cfg_attr(feature = "serde", serde(default))]
    pub co: Option<f64>,
    /// Mean NH3 concentration in ppm.
    #[cfg_attr(feature = "serde", serde(default))]
    pub nh3: Option<f64>,
    /// Number of days averaged.
    #[cfg_attr(feature = "serde", serde(default))]
    pub day_count: u32,
}

impl PollutantSample for MonthlyAggregate {
    fn value(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::Etanol => self.etanol,
            Pollutant::Co2 => self.co2,
            Pollutant::Co => self.co,
            Pollutant::Nh3 => self.nh3,
        }
    }
}

impl Keyed for MonthlyAggregate {
    type Key = MonthKey;

    fn key(&self) -> MonthKey {
        self.month
    }
}
