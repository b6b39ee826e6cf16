use ansi_term::Colour;
use anyhow::{bail, Result};

use crate::{
    chart::render::palette_color,
    storage::{
        entities::{Habit, HabitKind, NewHabit},
        habit_store::HabitStore,
    },
};

/// Resolves a user-supplied habit reference, numeric id first, then exact name.
pub fn resolve_habit(store: &impl HabitStore, reference: &str) -> Result<Habit> {
    if let Ok(id) = reference.parse::<i64>() {
        if let Some(habit) = store.habit(id)? {
            return Ok(habit);
        }
    }
    if let Some(habit) = store.habit_by_name(reference)? {
        return Ok(habit);
    }
    bail!("No habit matching '{reference}'. Use `habitwall list` to see what exists.")
}

pub fn process_add(
    store: &impl HabitStore,
    name: String,
    kind: HabitKind,
    target: Option<f64>,
    default: f64,
) -> Result<()> {
    let habit = store.insert_habit(NewHabit {
        name,
        kind,
        target_value: target,
        default_value: default,
    })?;
    println!("Added habit {} ({}) with id {}", habit.name, habit.kind, habit.id);
    Ok(())
}

pub fn process_list(store: &impl HabitStore) -> Result<()> {
    let habits = store.habits()?;
    if habits.is_empty() {
        println!("No habits yet. Add one with `habitwall add`.");
        return Ok(());
    }
    for (index, habit) in habits.iter().enumerate() {
        let color = palette_color(index);
        let name = Colour::RGB(color.0, color.1, color.2).paint(habit.name.as_str());
        let target = habit
            .target_value
            .map(|t| format!("target {t}"))
            .unwrap_or_else(|| "no target".into());
        println!(
            "{}\t{}\t{}\t{}\tdefault {}",
            habit.id, name, habit.kind, target, habit.default_value
        );
    }
    Ok(())
}

pub fn process_remove(store: &impl HabitStore, reference: &str) -> Result<()> {
    let habit = resolve_habit(store, reference)?;
    store.delete_habit(habit.id)?;
    println!("Removed habit {} and all of its logs", habit.name);
    Ok(())
}

pub fn process_set_default(store: &impl HabitStore, reference: &str, value: f64) -> Result<()> {
    let habit = resolve_habit(store, reference)?;
    store.set_default_value(habit.id, value)?;
    println!("Days without a log now count as {value} for {}", habit.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use crate::storage::{
        entities::{HabitKind, NewHabit},
        habit_store::{HabitStore, SqliteHabitStore},
        open_in_memory,
    };

    use super::resolve_habit;

    #[test]
    fn resolves_by_id_and_name() -> Result<()> {
        let store = SqliteHabitStore::new(open_in_memory()?);
        let habit = store.insert_habit(NewHabit {
            name: "Exercise".into(),
            kind: HabitKind::Boolean,
            target_value: None,
            default_value: 0.,
        })?;

        assert_eq!(resolve_habit(&store, &habit.id.to_string())?.id, habit.id);
        assert_eq!(resolve_habit(&store, "Exercise")?.id, habit.id);
        assert!(resolve_habit(&store, "Missing").is_err());
        Ok(())
    }

    #[test]
    fn numeric_name_falls_back_to_name_lookup() -> Result<()> {
        let store = SqliteHabitStore::new(open_in_memory()?);
        let habit = store.insert_habit(NewHabit {
            name: "100".into(),
            kind: HabitKind::Numeric,
            target_value: None,
            default_value: 0.,
        })?;
        // "100" isn't a known id, so the name lookup should still find it.
        assert_eq!(resolve_habit(&store, "100")?.id, habit.id);
        Ok(())
    }
}
