use anyhow::Result;

use crate::{storage::habit_store::HabitStore, utils::clock::Clock};

use super::{
    dates::{parse_user_date, DateStyle},
    habit::resolve_habit,
};

/// Records a value for one habit on one day. Logging the same day twice replaces the earlier
/// value, storage keeps a single row per (habit, day).
pub fn process_log(
    store: &impl HabitStore,
    clock: &impl Clock,
    reference: &str,
    raw_value: &str,
    date: Option<String>,
    date_style: DateStyle,
) -> Result<()> {
    let habit = resolve_habit(store, reference)?;
    let value = habit.kind.parse_value(raw_value)?;
    let date = match date {
        Some(raw) => parse_user_date(&raw, date_style)?,
        None => clock.today(),
    };

    store.upsert_log(habit.id, date, value)?;
    println!("Logged {value} for {} on {date}", habit.name);
    Ok(())
}
