use std::fmt::Display;

use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::ValueEnum;
use now::DateTimeNow;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

/// Parses a free-form user date ("yesterday", "15/03/2025", "3 days ago") down to a calendar
/// day. Logging and progress ranges both work in whole days.
pub fn parse_user_date(value: &str, style: DateStyle) -> Result<NaiveDate> {
    let parsed = parse_date_string(value, Local::now(), style.into())
        .map_err(|e| anyhow!("Failed to parse date {value}: {e}"))?;
    Ok(parsed
        .with_timezone(&Local)
        .beginning_of_day()
        .date_naive())
}
