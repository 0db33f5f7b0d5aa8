//! Formatting and unit conversion for dashboard values
//!
//! Stateless value-to-string helpers. Power values are MW, CO₂ values are
//! gCO₂/h. Aggregates arrive as raw text; unknown ones are reported and yield
//! an empty string.

use crate::types::TimeAggregate;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::error;

pub const DEFAULT_NUM_DIGITS: usize = 3;

const CO2_PER_MINUTE: &str = "of CO₂eq/min";

const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

/// SI-prefixed number with `digits` significant digits, trailing zeros kept
pub fn format_si(value: f64, digits: usize) -> String {
    let digits = digits.clamp(1, 21);
    if value == 0.0 {
        return format!("{:.*}", digits - 1, 0.0);
    }
    let sign = if value < 0.0 { "−" } else { "" };
    let abs = value.abs();

    // Exponent of the value after rounding, so 999.6 lands on "1.00k"
    let scientific = format!("{:.*e}", digits - 1, abs);
    let exponent: i32 = scientific
        .split_once('e')
        .and_then(|(_, e)| e.parse().ok())
        .unwrap_or(0);

    let prefix = exponent.div_euclid(3).clamp(-8, 8);
    let scaled = abs / 10f64.powi(prefix * 3);
    let decimals = usize::try_from(digits as i32 - 1 - (exponent - prefix * 3)).unwrap_or(0);
    let unit = SI_PREFIXES[usize::try_from(prefix + 8).unwrap_or(8)];
    format!("{}{:.*}{}", sign, decimals, scaled, unit)
}

/// MW in, watts with SI prefix out; `None` and NaN pass through as `None`
pub fn format_power(mw: Option<f64>, digits: usize) -> Option<String> {
    let mw = mw.filter(|v| !v.is_nan())?;
    Some(format!("{}W", format_si(mw * 1e6, digits)))
}

/// gCO₂/h in, per-minute emissions out (tonnes from 1 g/h up, grams below)
pub fn format_co2(grams_per_hour: Option<f64>, digits: usize) -> Option<String> {
    let g = grams_per_hour.filter(|v| !v.is_nan())?;
    let tonnes_per_minute = g / 60.0 / 1e6;
    if g >= 1.0 {
        Some(format!(
            "{}t {}",
            format_si(tonnes_per_minute, digits),
            CO2_PER_MINUTE
        ))
    } else {
        Some(format!(
            "{}g {}",
            format_si(tonnes_per_minute * 1e6, digits),
            CO2_PER_MINUTE
        ))
    }
}

/// Display unit for a power axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerScale {
    pub unit: &'static str,
    /// Divide MW values by this to express them in `unit`
    pub formatting_factor: f64,
}

pub fn scale_power(max_power_mw: f64) -> PowerScale {
    if max_power_mw < 1.0 {
        PowerScale {
            unit: "kW",
            formatting_factor: 1e-3,
        }
    } else if max_power_mw < 1e3 {
        PowerScale {
            unit: "MW",
            formatting_factor: 1.0,
        }
    } else {
        PowerScale {
            unit: "GW",
            formatting_factor: 1e3,
        }
    }
}

/// Exact lowercase names only; anything else is reported and rejected
fn parse_aggregate(time_aggregate: &str) -> Option<TimeAggregate> {
    match time_aggregate {
        "hourly" => Some(TimeAggregate::Hourly),
        "daily" => Some(TimeAggregate::Daily),
        "monthly" => Some(TimeAggregate::Monthly),
        "yearly" => Some(TimeAggregate::Yearly),
        _ => {
            error!("{} is not implemented", time_aggregate);
            None
        }
    }
}

/// Long date, with the time of day for hourly data
pub fn format_date(date: Option<DateTime<Utc>>, time_aggregate: Option<&str>, tz: Tz) -> String {
    let (Some(date), Some(time_aggregate)) = (date, time_aggregate.filter(|t| !t.is_empty()))
    else {
        return String::new();
    };
    let local = date.with_timezone(&tz);
    match parse_aggregate(time_aggregate) {
        Some(TimeAggregate::Hourly) => local.format("%B %-d, %Y at %-I:%M %p").to_string(),
        Some(TimeAggregate::Daily | TimeAggregate::Monthly | TimeAggregate::Yearly) => {
            local.format("%B %-d, %Y").to_string()
        }
        None => String::new(),
    }
}

/// Span covered by one chart at the given aggregate
pub fn format_time_range(time_aggregate: &str) -> String {
    match parse_aggregate(time_aggregate) {
        Some(TimeAggregate::Hourly) => "24 hours".to_string(),
        Some(TimeAggregate::Daily) => "month".to_string(),
        Some(TimeAggregate::Monthly) => "year".to_string(),
        Some(TimeAggregate::Yearly) => "5 years".to_string(),
        None => String::new(),
    }
}

/// Short axis label for one data point
pub fn format_date_tick(
    date: Option<DateTime<Utc>>,
    time_aggregate: Option<&str>,
    tz: Tz,
) -> String {
    let (Some(date), Some(time_aggregate)) = (date, time_aggregate.filter(|t| !t.is_empty()))
    else {
        return String::new();
    };
    let local = date.with_timezone(&tz);
    let pattern = match parse_aggregate(time_aggregate) {
        Some(TimeAggregate::Hourly) => "%-I:%M %p",
        Some(TimeAggregate::Daily) => "%B %-d",
        Some(TimeAggregate::Monthly) => "%b",
        Some(TimeAggregate::Yearly) => "%Y",
        None => return String::new(),
    };
    local.format(pattern).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, 1, 14, 5, 0).unwrap()
    }

    #[test]
    fn si_formatting_keeps_significant_digits() {
        assert_eq!(format_si(1500.0, 3), "1.50k");
        assert_eq!(format_si(12345.0, 3), "12.3k");
        assert_eq!(format_si(999.6, 3), "1.00k");
        assert_eq!(format_si(0.0, 3), "0.00");
        assert_eq!(format_si(42.0, 2), "42");
    }

    #[test]
    fn power_is_formatted_in_watts() {
        assert_eq!(format_power(Some(1.5), 3).as_deref(), Some("1.50MW"));
        assert_eq!(format_power(Some(0.0123), 3).as_deref(), Some("12.3kW"));
        assert_eq!(format_power(Some(2500.0), 2).as_deref(), Some("2.5GW"));
        assert_eq!(format_power(None, 3), None);
        assert_eq!(format_power(Some(f64::NAN), 3), None);
    }

    #[test]
    fn co2_switches_between_tonnes_and_grams() {
        assert_eq!(
            format_co2(Some(6e7), DEFAULT_NUM_DIGITS).as_deref(),
            Some("1.00t of CO₂eq/min")
        );
        assert_eq!(
            format_co2(Some(0.6), DEFAULT_NUM_DIGITS).as_deref(),
            Some("10.0mg of CO₂eq/min")
        );
        assert_eq!(format_co2(None, DEFAULT_NUM_DIGITS), None);
    }

    #[test]
    fn power_scale_thresholds() {
        assert_eq!(scale_power(0.5).unit, "kW");
        assert_eq!(scale_power(1.0).unit, "MW");
        assert_eq!(scale_power(999.0).formatting_factor, 1.0);
        assert_eq!(scale_power(1000.0).unit, "GW");
    }

    #[test]
    fn dates_follow_aggregate() {
        let tz = chrono_tz::UTC;
        assert_eq!(
            format_date(Some(sample_date()), Some("hourly"), tz),
            "March 1, 2021 at 2:05 PM"
        );
        assert_eq!(
            format_date(Some(sample_date()), Some("monthly"), tz),
            "March 1, 2021"
        );
        assert_eq!(
            format_date(
                Some(sample_date()),
                Some("hourly"),
                chrono_tz::Europe::Copenhagen
            ),
            "March 1, 2021 at 3:05 PM"
        );
    }

    #[test]
    fn ticks_follow_aggregate() {
        let tz = chrono_tz::UTC;
        let date = Some(sample_date());
        assert_eq!(format_date_tick(date, Some("hourly"), tz), "2:05 PM");
        assert_eq!(format_date_tick(date, Some("daily"), tz), "March 1");
        assert_eq!(format_date_tick(date, Some("monthly"), tz), "Mar");
        assert_eq!(format_date_tick(date, Some("yearly"), tz), "2021");
    }

    #[test]
    fn unrecognized_or_missing_inputs_yield_empty() {
        let tz = chrono_tz::UTC;
        assert_eq!(format_date(Some(sample_date()), Some("weekly"), tz), "");
        assert_eq!(format_date(None, Some("hourly"), tz), "");
        assert_eq!(format_date(Some(sample_date()), None, tz), "");
        assert_eq!(format_date_tick(Some(sample_date()), Some(""), tz), "");
        assert_eq!(format_time_range("fortnightly"), "");
        assert_eq!(format_time_range("yearly"), "5 years");
        assert_eq!(format_time_range("hourly"), "24 hours");
    }

    #[test]
    fn aggregate_names_must_match_exactly() {
        let tz = chrono_tz::UTC;
        assert_eq!(format_date(Some(sample_date()), Some("Hourly"), tz), "");
        assert_eq!(format_date_tick(Some(sample_date()), Some(" daily "), tz), "");
        assert_eq!(format_time_range("YEARLY"), "");
        assert_eq!(format_time_range("monthly"), "year");
    }
}
