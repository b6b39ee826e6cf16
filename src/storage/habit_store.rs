use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::utils::time::date_to_day_key;

use super::entities::{DateRange, Habit, HabitId, HabitKind, LogEntry, NewHabit};

/// Interface for abstracting habit persistence. The chart and wallpaper side only ever reads,
/// the cli writes through the same trait.
pub trait HabitStore {
    fn insert_habit(&self, habit: NewHabit) -> Result<Habit>;

    fn habit(&self, id: HabitId) -> Result<Option<Habit>>;

    fn habit_by_name(&self, name: &str) -> Result<Option<Habit>>;

    /// All habits ordered by name.
    fn habits(&self) -> Result<Vec<Habit>>;

    /// Removes a habit and, through the schema, all of its logs. Returns whether a habit
    /// actually existed.
    fn delete_habit(&self, id: HabitId) -> Result<bool>;

    /// The only habit mutation: changing what an unlogged day counts as.
    fn set_default_value(&self, id: HabitId, default_value: f64) -> Result<()>;

    /// Records a value for (habit, date). A second write for the same day replaces the first,
    /// the log table never holds two rows for one day.
    fn upsert_log(&self, id: HabitId, date: NaiveDate, value: f64) -> Result<()>;

    /// Log rows for a habit ordered by date, optionally restricted to an inclusive range.
    fn logs(&self, id: HabitId, range: Option<DateRange>) -> Result<Vec<LogEntry>>;
}

/// The main realization of [HabitStore] on top of a sqlite connection.
pub struct SqliteHabitStore {
    conn: Connection,
}

impl SqliteHabitStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
        let kind: String = row.get("kind")?;
        let created_at: String = row.get("created_at")?;
        Ok(Habit {
            id: row.get("id")?,
            name: row.get("name")?,
            kind: HabitKind::parse(&kind).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    e.into(),
                )
            })?,
            target_value: row.get("target_value")?,
            default_value: row.get("default_value")?,
            created_at: parse_timestamp(&created_at).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    5,
                    rusqlite::types::Type::Text,
                    e.into(),
                )
            })?,
        })
    }

    fn log_from_row(row: &Row<'_>) -> rusqlite::Result<LogEntry> {
        let date: String = row.get("date")?;
        Ok(LogEntry {
            habit_id: row.get("habit_id")?,
            date: parse_day_key(&date).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    1,
                    rusqlite::types::Type::Text,
                    e.into(),
                )
            })?,
            value: row.get("value")?,
        })
    }
}

impl HabitStore for SqliteHabitStore {
    fn insert_habit(&self, habit: NewHabit) -> Result<Habit> {
        let created_at = Utc::now();
        self.conn
            .execute(
                "INSERT INTO habits (name, kind, target_value, default_value, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    habit.name,
                    habit.kind.as_str(),
                    habit.target_value,
                    habit.default_value,
                    created_at.to_rfc3339(),
                ],
            )
            .with_context(|| format!("Failed to add habit {}", habit.name))?;
        let id = self.conn.last_insert_rowid();
        debug!("Added habit {} with id {id}", habit.name);
        Ok(Habit {
            id,
            name: habit.name,
            kind: habit.kind,
            target_value: habit.target_value,
            default_value: habit.default_value,
            created_at,
        })
    }

    fn habit(&self, id: HabitId) -> Result<Option<Habit>> {
        let habit = self
            .conn
            .query_row(
                "SELECT id, name, kind, target_value, default_value, created_at
                 FROM habits WHERE id = ?1",
                params![id],
                Self::habit_from_row,
            )
            .optional()?;
        Ok(habit)
    }

    fn habit_by_name(&self, name: &str) -> Result<Option<Habit>> {
        let habit = self
            .conn
            .query_row(
                "SELECT id, name, kind, target_value, default_value, created_at
                 FROM habits WHERE name = ?1",
                params![name],
                Self::habit_from_row,
            )
            .optional()?;
        Ok(habit)
    }

    fn habits(&self) -> Result<Vec<Habit>> {
        let mut statement = self.conn.prepare(
            "SELECT id, name, kind, target_value, default_value, created_at
             FROM habits ORDER BY name",
        )?;
        let habits = statement
            .query_map([], Self::habit_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(habits)
    }

    fn delete_habit(&self, id: HabitId) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM habits WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn set_default_value(&self, id: HabitId, default_value: f64) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE habits SET default_value = ?1 WHERE id = ?2",
            params![default_value, id],
        )?;
        anyhow::ensure!(updated > 0, "No habit with id {id}");
        Ok(())
    }

    fn upsert_log(&self, id: HabitId, date: NaiveDate, value: f64) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO habit_logs (habit_id, date, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT (habit_id, date) DO UPDATE SET value = excluded.value",
                params![id, date_to_day_key(date), value],
            )
            .with_context(|| format!("Failed to log habit {id} for {date}"))?;
        Ok(())
    }

    fn logs(&self, id: HabitId, range: Option<DateRange>) -> Result<Vec<LogEntry>> {
        let mut statement;
        let rows = match range {
            Some(range) => {
                statement = self.conn.prepare(
                    "SELECT habit_id, date, value FROM habit_logs
                     WHERE habit_id = ?1 AND date >= ?2 AND date <= ?3
                     ORDER BY date",
                )?;
                statement.query_map(
                    params![id, date_to_day_key(range.start), date_to_day_key(range.end)],
                    Self::log_from_row,
                )?
            }
            None => {
                statement = self.conn.prepare(
                    "SELECT habit_id, date, value FROM habit_logs
                     WHERE habit_id = ?1 ORDER BY date",
                )?;
                statement.query_map(params![id], Self::log_from_row)?
            }
        };
        let logs = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(logs)
    }
}

fn parse_day_key(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date in storage: {value}"))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid timestamp in storage: {value}"))?
        .with_timezone(&Utc))
}
