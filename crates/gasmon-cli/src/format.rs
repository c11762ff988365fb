//! Output formatting for readings and aggregates.

use owo_colors::OwoColorize;
use time::format_description::well_known::Rfc3339;

use gasmon_core::{
    DailyAggregate, GasLevel, MonthlyAggregate, Pollutant, PollutantSample, Reading, is_eco,
};

/// Width of one pollutant column in tables.
const VALUE_WIDTH: usize = 10;

/// Formatting options derived from flags and config.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    pub no_color: bool,
}

impl FormatOptions {
    pub fn new(no_color: bool) -> Self {
        Self { no_color }
    }
}

/// Format one value to one decimal, padded to the column width.
///
/// Eco values are green and the rest red; missing values read `N/A`.
pub fn format_value(pollutant: Pollutant, value: Option<f64>, opts: &FormatOptions) -> String {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        let text = format!("{:>VALUE_WIDTH$}", "N/A");
        return if opts.no_color {
            text
        } else {
            text.dimmed().to_string()
        };
    };

    let text = format!("{:>VALUE_WIDTH$.1}", v);
    if opts.no_color {
        text
    } else if is_eco(pollutant, v) {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

/// Gas level label for a live value, colored by severity.
pub fn format_level(pollutant: Pollutant, value: f64, opts: &FormatOptions) -> String {
    let Some(level) = GasLevel::of(pollutant, value) else {
        return "N/A".to_string();
    };
    let label = level.description();
    if opts.no_color {
        return label.to_string();
    }
    match level {
        GasLevel::Good => label.green().to_string(),
        GasLevel::Moderate => label.yellow().to_string(),
        GasLevel::High => label.red().bold().to_string(),
    }
}

fn header(first: &str, first_width: usize, extra: &[&str], opts: &FormatOptions) -> String {
    let mut line = format!("{:<first_width$}", first);
    for pollutant in Pollutant::ALL {
        line.push_str(&format!(" {:>VALUE_WIDTH$}", pollutant.key().to_uppercase()));
    }
    for column in extra {
        line.push_str(&format!(" {:>VALUE_WIDTH$}", column));
    }
    let rule = "-".repeat(line.len());
    if opts.no_color {
        format!("{}\n{}\n", line, rule)
    } else {
        format!("{}\n{}\n", line.bold(), rule.dimmed())
    }
}

fn row(
    first: &str,
    first_width: usize,
    sample: &impl PollutantSample,
    opts: &FormatOptions,
) -> String {
    let mut line = format!("{:<first_width$}", first);
    for pollutant in Pollutant::ALL {
        line.push(' ');
        line.push_str(&format_value(pollutant, sample.value(pollutant), opts));
    }
    line
}

/// Table of today's readings, oldest first.
pub fn format_readings_text(readings: &[Reading], opts: &FormatOptions) -> String {
    if readings.is_empty() {
        return "No readings recorded today.\n".to_string();
    }

    let mut output = header("Time", 25, &["Location"], opts);
    for reading in readings {
        let stamp = reading
            .date_time
            .format(&Rfc3339)
            .unwrap_or_else(|_| reading.date_time.to_string());
        output.push_str(&row(&stamp, 25, reading, opts));
        if let Some(location) = &reading.location {
            output.push_str(&format!(" {:>VALUE_WIDTH$}", location));
        }
        output.push('\n');
    }
    output.push_str(&format!("\n{} readings\n", readings.len()));
    output
}

/// Table of daily averages, newest first.
pub fn format_daily_text(days: &[DailyAggregate], opts: &FormatOptions) -> String {
    if days.is_empty() {
        return "No daily averages stored.\n".to_string();
    }

    let mut output = header("Date", 12, &[], opts);
    for day in days {
        output.push_str(&row(&day.date.to_string(), 12, day, opts));
        output.push('\n');
    }
    output.push_str(&format!("\n{} days\n", days.len()));
    output
}

/// Table of monthly averages, newest first.
pub fn format_monthly_text(months: &[MonthlyAggregate], opts: &FormatOptions) -> String {
    if months.is_empty() {
        return "No monthly averages stored.\n".to_string();
    }

    let mut output = header("Month", 10, &["Days"], opts);
    for month in months {
        output.push_str(&row(&month.month.short_label(), 10, month, opts));
        output.push_str(&format!(" {:>VALUE_WIDTH$}\n", month.day_count));
    }
    output.push_str(&format!("\n{} months\n", months.len()));
    output
}

/// One line for a freshly stored reading: each value with its gas level.
pub fn format_live_reading(reading: &Reading, opts: &FormatOptions) -> String {
    let time = reading
        .date_time
        .format(&Rfc3339)
        .unwrap_or_else(|_| reading.date_time.to_string());
    let mut parts = Vec::new();
    for pollutant in Pollutant::ALL {
        if let Some(v) = reading.available(pollutant) {
            parts.push(format!(
                "{} {:.1} ppm ({})",
                pollutant.label(),
                v,
                format_level(pollutant, v, opts)
            ));
        }
    }
    let location = reading
        .location
        .as_deref()
        .map(|l| format!(" [{}]", l))
        .unwrap_or_default();
    if opts.no_color {
        format!("{}{}  {}", time, location, parts.join("  "))
    } else {
        format!("{}{}  {}", time.dimmed(), location, parts.join("  "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn plain() -> FormatOptions {
        FormatOptions::new(true)
    }

    #[test]
    fn test_format_value_one_decimal() {
        let text = format_value(Pollutant::Co2, Some(412.66), &plain());
        assert_eq!(text.trim(), "412.7");
        assert_eq!(text.len(), VALUE_WIDTH);
    }

    #[test]
    fn test_format_value_missing_and_nan() {
        assert_eq!(format_value(Pollutant::Co, None, &plain()).trim(), "N/A");
        assert_eq!(
            format_value(Pollutant::Co, Some(f64::NAN), &plain()).trim(),
            "N/A"
        );
    }

    #[test]
    fn test_format_value_colored_by_eco() {
        let colored = FormatOptions::new(false);
        let eco = format_value(Pollutant::Nh3, Some(1.0), &colored);
        let not_eco = format_value(Pollutant::Nh3, Some(12.0), &colored);
        assert!(eco.contains("\x1b[32m"));
        assert!(not_eco.contains("\x1b[31m"));
    }

    #[test]
    fn test_format_level_labels() {
        assert_eq!(format_level(Pollutant::Co2, 399.0, &plain()), "Good");
        assert_eq!(format_level(Pollutant::Co2, 400.0, &plain()), "Moderate");
        assert_eq!(format_level(Pollutant::Co, 35.0, &plain()), "High");
        assert_eq!(format_level(Pollutant::Co, f64::INFINITY, &plain()), "N/A");
    }

    #[test]
    fn test_readings_table() {
        let readings = vec![
            Reading::new(datetime!(2025-01-02 10:00 UTC))
                .with(Pollutant::Co2, 412.7)
                .with_location("Kitchen"),
        ];
        let text = format_readings_text(&readings, &plain());
        assert!(text.starts_with("Time"));
        assert!(text.contains("2025-01-02T10:00:00Z"));
        assert!(text.contains("412.7"));
        assert!(text.contains("Kitchen"));
        assert!(text.contains("N/A"));
        assert!(text.ends_with("1 readings\n"));
    }

    #[test]
    fn test_empty_tables() {
        assert!(format_readings_text(&[], &plain()).starts_with("No readings"));
        assert!(format_daily_text(&[], &plain()).starts_with("No daily"));
        assert!(format_monthly_text(&[], &plain()).starts_with("No monthly"));
    }

    #[test]
    fn test_live_reading_skips_missing_values() {
        let reading = Reading::new(datetime!(2025-01-02 10:00 UTC)).with(Pollutant::Co, 12.0);
        let line = format_live_reading(&reading, &plain());
        assert!(line.contains("CO 12.0 ppm (Moderate)"));
        assert!(!line.contains("NH₃"));
    }
}
