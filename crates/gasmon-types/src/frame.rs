//! Decoding of the sensor's text frames.
//!
//! A frame is a comma-separated list of `key:value` pairs, for example
//! `Location:Kitchen,Etanol:25.3ppm,CO2:412.7ppm,CO:15.2ppm,NH3:8.9ppm`.
//!
//! Decoding never fails. Unknown keys are dropped, and a numeric value that
//! does not parse is kept as `NaN` so that display code can report it as
//! unavailable.

use time::OffsetDateTime;

use crate::types::{Pollutant, PollutantSample, Reading};

/// Unit suffix stripped from numeric values.
const UNIT_SUFFIX: &str = "ppm";

/// The decoded contents of one frame, before it is timestamped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFrame {
    /// Trimmed location text, if the frame carried one.
    pub location: Option<String>,
    /// Ethanol concentration in ppm.
    pub etanol: Option<f64>,
    /// CO2 concentration in ppm.
    pub co2: Option<f64>,
    /// CO concentration in ppm.
    pub co: Option<f64>,
    /// NH3 concentration in ppm.
    pub nh3: Option<f64>,
}

impl ParsedFrame {
    /// `true` when the frame contained no recognized key.
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && Pollutant::ALL.iter().all(|p| self.value(*p).is_none())
    }

    /// Attach the receive time, producing a [`Reading`].
    pub fn stamp(self, date_time: OffsetDateTime) -> Reading {
        Reading {
            location: self.location,
            etanol: self.etanol,
            co2: self.co2,
            co: self.co,
            nh3: self.nh3,
            date_time,
        }
    }

    fn set(&mut self, pollutant: Pollutant, value: f64) {
        let slot = match pollutant {
            Pollutant::Etanol => &mut self.etanol,
            Pollutant::Co2 => &mut self.co2,
            Pollutant::Co => &mut self.co,
            Pollutant::Nh3 => &mut self.nh3,
        };
        *slot = Some(value);
    }
}

impl PollutantSample for ParsedFrame {
    fn value(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::Etanol => self.etanol,
            Pollutant::Co2 => self.co2,
            Pollutant::Co => self.co,
            Pollutant::Nh3 => self.nh3,
        }
    }
}

/// Decode one text frame.
///
/// # Examples
///
/// ```
/// use gasmon_types::frame::parse_frame;
///
/// let frame = parse_frame("Etanol:25.3ppm,CO2:412.7ppm,CO:15.2ppm,NH3:8.9ppm");
/// assert_eq!(frame.etanol, Some(25.3));
/// assert_eq!(frame.co2, Some(412.7));
/// assert_eq!(frame.co, Some(15.2));
/// assert_eq!(frame.nh3, Some(8.9));
///
/// let frame = parse_frame("Foo:1,CO:2");
/// assert_eq!(frame.co, Some(2.0));
/// assert_eq!(frame.etanol, None);
/// ```
pub fn parse_frame(frame: &str) -> ParsedFrame {
    let mut parsed = ParsedFrame::default();

    for part in frame.split(',') {
        let Some((key, value)) = part.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }

        if key.eq_ignore_ascii_case("location") {
            parsed.location = Some(value.trim().to_string());
        } else if let Ok(pollutant) = key.parse::<Pollutant>() {
            parsed.set(pollutant, parse_ppm(value));
        }
    }

    parsed
}

/// Parse a concentration such as ` 412.7ppm `, yielding `NaN` on failure.
fn parse_ppm(value: &str) -> f64 {
    let value = value.trim();
    let split = value.len().saturating_sub(UNIT_SUFFIX.len());
    let number = match value.get(split..) {
        Some(tail) if tail.eq_ignore_ascii_case(UNIT_SUFFIX) => &value[..split],
        _ => value,
    };
    number.trim().parse().unwrap_or(f64::NAN)
}
