use ansi_term::Colour;
use anyhow::Result;
use chrono::NaiveDate;

use crate::{
    chart::{render::palette_color, series::assemble_series},
    storage::{
        entities::{Habit, HabitKind},
        habit_store::HabitStore,
    },
    utils::clock::Clock,
};

use super::{
    dates::{parse_user_date, DateStyle},
    habit::resolve_habit,
};

/// Prints a per-day table of habit values over a date range. The same gap-filled series the
/// chart uses backs the table, so both views always agree.
pub fn process_progress(
    store: &impl HabitStore,
    clock: &impl Clock,
    references: &[String],
    start: Option<String>,
    end: Option<String>,
    date_style: DateStyle,
) -> Result<()> {
    let habits: Vec<Habit> = if references.is_empty() {
        store.habits()?
    } else {
        references
            .iter()
            .map(|r| resolve_habit(store, r))
            .collect::<Result<_>>()?
    };

    if habits.is_empty() {
        println!("No habits or logs found.");
        return Ok(());
    }

    let today = clock.today();
    let end = match end {
        Some(raw) => parse_user_date(&raw, date_style)?.min(today),
        None => today,
    };
    let start = start.map(|raw| parse_user_date(&raw, date_style)).transpose()?;

    for (index, habit) in habits.iter().enumerate() {
        let color = palette_color(index);
        let header = Colour::RGB(color.0, color.1, color.2)
            .bold()
            .paint(format!("{} ({})", habit.name, habit.kind));
        println!("\n{header}");

        let logs = store.logs(habit.id, None)?;
        if logs.is_empty() {
            println!("  no logs yet");
            continue;
        }

        let series = assemble_series(habit.default_value, &logs, today);
        for (date, value) in clip_series(&series, start, end) {
            println!("  {date}\t{}", format_value(habit.kind, value));
        }
    }
    Ok(())
}

/// Restricts a series to the requested range. `start` of `None` keeps the habit's own start.
fn clip_series(
    series: &[(NaiveDate, f64)],
    start: Option<NaiveDate>,
    end: NaiveDate,
) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
    series
        .iter()
        .copied()
        .filter(move |&(date, _)| start.map_or(true, |s| date >= s) && date <= end)
}

fn format_value(kind: HabitKind, value: f64) -> String {
    match kind {
        HabitKind::Boolean if value == 1. => "Yes".into(),
        HabitKind::Boolean if value == 0. => "No".into(),
        _ => value.to_string(),
    }
}
