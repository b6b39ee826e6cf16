use std::fmt::Display;

use anyhow::{anyhow, bail};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type HabitId = i64;

/// How a habit is logged and drawn. Boolean habits track done/not-done and chart as a step
/// function, numeric habits carry an arbitrary value and chart as a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HabitKind {
    Boolean,
    Numeric,
}

impl HabitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitKind::Boolean => "boolean",
            HabitKind::Numeric => "numeric",
        }
    }

    pub fn parse(value: &str) -> anyhow::Result<Self> {
        match value {
            "boolean" => Ok(HabitKind::Boolean),
            "numeric" => Ok(HabitKind::Numeric),
            other => Err(anyhow!("Unknown habit kind {other}")),
        }
    }

    /// Parses a logged value the way the kind expects it. Boolean habits accept yes/no style
    /// answers and store them as 1/0.
    pub fn parse_value(&self, raw: &str) -> anyhow::Result<f64> {
        match self {
            HabitKind::Boolean => match raw.to_ascii_lowercase().as_str() {
                "y" | "yes" | "true" | "1" => Ok(1.),
                "n" | "no" | "false" | "0" => Ok(0.),
                other => bail!("Expected yes/no value for a boolean habit, got {other}"),
            },
            HabitKind::Numeric => raw
                .parse::<f64>()
                .map_err(|e| anyhow!("Expected a number for a numeric habit, got {raw}: {e}")),
        }
    }
}

impl Display for HabitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A tracked behavior. `target_value` is an explicit option: zero is a real target that draws a
/// guide line at zero, `None` draws nothing. `default_value` is what a day without a log counts
/// as, and is the only field that can be mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub kind: HabitKind,
    pub target_value: Option<f64>,
    pub default_value: f64,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for [Habit]. Identity and creation time are assigned by storage.
#[derive(Debug, Clone)]
pub struct NewHabit {
    pub name: String,
    pub kind: HabitKind,
    pub target_value: Option<f64>,
    pub default_value: f64,
}

/// One recorded value for one habit on one calendar day. Uniqueness of (habit, date) is
/// enforced by storage, a later write replaces the value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub habit_id: HabitId,
    pub date: NaiveDate,
    pub value: f64,
}

/// Inclusive date range filter for log queries.
#[derive(Debug, Clone, Copy)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::HabitKind;

    #[test]
    fn kind_round_trips_through_str() {
        assert_eq!(
            HabitKind::parse(HabitKind::Boolean.as_str()).unwrap(),
            HabitKind::Boolean
        );
        assert_eq!(
            HabitKind::parse(HabitKind::Numeric.as_str()).unwrap(),
            HabitKind::Numeric
        );
        assert!(HabitKind::parse("weekly").is_err());
    }

    #[test]
    fn boolean_value_parsing() {
        for yes in ["y", "yes", "TRUE", "1"] {
            assert_eq!(HabitKind::Boolean.parse_value(yes).unwrap(), 1.);
        }
        for no in ["n", "No", "false", "0"] {
            assert_eq!(HabitKind::Boolean.parse_value(no).unwrap(), 0.);
        }
        assert!(HabitKind::Boolean.parse_value("2.5").is_err());
    }

    #[test]
    fn numeric_value_parsing() {
        assert_eq!(HabitKind::Numeric.parse_value("2.5").unwrap(), 2.5);
        assert!(HabitKind::Numeric.parse_value("plenty").is_err());
    }
}
