//! Period keys: how a plan's days are named, ordered and labelled.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key of the only period in a single-day plan.
pub const DAILY_KEY: &str = "daily";

/// Keys of a weekly plan, in week order.
pub const WEEKDAY_KEYS: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Calendar keys of a monthly plan (`dd-mm-yyyy`).
pub const DATE_KEY_FORMAT: &str = "%d-%m-%Y";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodMode {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl PeriodMode {
    /// Period keys a freshly created plan of this mode starts with.
    pub fn default_keys(&self, today: NaiveDate) -> Vec<String> {
        match self {
            PeriodMode::Daily => vec![DAILY_KEY.to_string()],
            PeriodMode::Weekly => WEEKDAY_KEYS.iter().map(|k| k.to_string()).collect(),
            PeriodMode::Monthly => vec![format_date_key(today)],
        }
    }
}

impl fmt::Display for PeriodMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodMode::Daily => write!(f, "daily"),
            PeriodMode::Weekly => write!(f, "weekly"),
            PeriodMode::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for PeriodMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(PeriodMode::Daily),
            "weekly" => Ok(PeriodMode::Weekly),
            "monthly" => Ok(PeriodMode::Monthly),
            _ => Err(format!(
                "Invalid plan mode '{}'. Valid options: daily, weekly, monthly",
                s
            )),
        }
    }
}

pub fn format_date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), DATE_KEY_FORMAT).ok()
}

fn weekday_index(key: &str) -> Option<usize> {
    let key = key.trim().to_lowercase();
    WEEKDAY_KEYS
        .iter()
        .zip(WEEKDAY_NAMES.iter())
        .position(|(short, long)| key == *short || key == long.to_lowercase())
}

/// Number of a `day_N` style key.
fn day_number(key: &str) -> Option<u32> {
    let key = key.trim().to_lowercase();
    if !key.starts_with("day") {
        return None;
    }
    let digits: String = key.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Sort key for period keys. Derived ordering puts the daily key first, then
/// weekdays in week order, dates chronologically, numbered days numerically
/// and any other key alphabetically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum PeriodOrder {
    Daily,
    Weekday(usize),
    Date(NaiveDate),
    Numbered(u32),
    Other(String),
}

pub fn period_order(key: &str) -> PeriodOrder {
    if key == DAILY_KEY {
        PeriodOrder::Daily
    } else if let Some(index) = weekday_index(key) {
        PeriodOrder::Weekday(index)
    } else if let Some(date) = parse_date_key(key) {
        PeriodOrder::Date(date)
    } else if let Some(n) = day_number(key) {
        PeriodOrder::Numbered(n)
    } else {
        PeriodOrder::Other(key.to_string())
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (1, n) if n != 11 => "st",
        (2, n) if n != 12 => "nd",
        (3, n) if n != 13 => "rd",
        _ => "th",
    }
}

/// `18th Oct, 2026`
pub fn format_range_date(date: NaiveDate) -> String {
    format!(
        "{}{} {}",
        date.day(),
        ordinal_suffix(date.day()),
        date.format("%b, %Y")
    )
}

/// Heading shown for a period. Numbered days are dated from `start` when known.
pub fn period_label(key: &str, start: Option<NaiveDate>) -> String {
    match period_order(key) {
        PeriodOrder::Daily => "Daily".to_string(),
        PeriodOrder::Weekday(index) => WEEKDAY_NAMES[index].to_string(),
        PeriodOrder::Date(date) => format_range_date(date),
        PeriodOrder::Numbered(n) => {
            let offset = Duration::days(i64::from(n.max(1) - 1));
            match start.and_then(|start| start.checked_add_signed(offset)) {
                Some(date) => format!("Day {} ({})", n, format_range_date(date)),
                None => format!("Day {}", n),
            }
        }
        PeriodOrder::Other(key) => key,
    }
}
