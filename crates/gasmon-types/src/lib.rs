//! Platform-agnostic types for gasmon gas-concentration sensors.
//!
//! This crate provides the data model shared by the rollup engine
//! (gasmon-core) and its front ends.
//!
//! # Features
//!
//! - Sensor readings and their daily and monthly aggregates
//! - Calendar keys (`YYYY-MM-DD`, `YYYY-MM`) with strict parsing
//! - The text-frame decoder for the sensor protocol
//! - Error types for key parsing
//!
//! # Example
//!
//! ```
//! use gasmon_types::frame::parse_frame;
//! use time::OffsetDateTime;
//!
//! let reading = parse_frame("CO2:412.7ppm,CO:15.2ppm").stamp(OffsetDateTime::now_utc());
//! assert_eq!(reading.co2, Some(412.7));
//! ```

pub mod error;
pub mod frame;
pub mod keys;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use frame::{ParsedFrame, parse_frame};
pub use keys::{DayKey, MonthKey};
pub use types::{
    DailyAggregate, Keyed, MonthlyAggregate, Pollutant, PollutantSample, Reading, TODAY_CAPACITY,
};
