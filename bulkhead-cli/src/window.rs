//! Time-window arguments such as `30d` or `6m`.
//!
//! The window only labels the report; the snapshot is always read at the
//! requested revision.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum WindowUnit {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl WindowUnit {
    fn parse(unit: &str) -> Option<Self> {
        match unit {
            "h" | "hour" | "hours" => Some(Self::Hour),
            "d" | "day" | "days" => Some(Self::Day),
            "w" | "week" | "weeks" => Some(Self::Week),
            "m" | "month" | "months" => Some(Self::Month),
            "y" | "year" | "years" => Some(Self::Year),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub(crate) enum TimeWindow {
    #[default]
    AllTime,
    Last { amount: u32, unit: WindowUnit },
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim().to_lowercase();
        if trimmed.is_empty() || trimmed == "all" || trimmed == "all-time" {
            return Ok(Self::AllTime);
        }

        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, unit) = trimmed.split_at(split);
        let invalid = || format!("invalid time window '{input}': expected e.g. 30d, 2w, 6m or 1y");

        let amount: u32 = digits.parse().map_err(|_| invalid())?;
        if amount == 0 {
            return Err(invalid());
        }
        let unit = WindowUnit::parse(unit.trim()).ok_or_else(invalid)?;
        Ok(Self::Last { amount, unit })
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllTime => f.write_str("all time"),
            Self::Last { amount: 1, unit } => write!(f, "last {}", unit.name()),
            Self::Last { amount, unit } => write!(f, "last {amount} {}s", unit.name()),
        }
    }
}
