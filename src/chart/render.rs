use anyhow::Result;
use chrono::{Duration, NaiveDate};
use plotters::{
    coord::Shift,
    prelude::*,
    series::DashedLineSeries,
};
use tracing::debug;

use crate::storage::{
    entities::{Habit, HabitId, HabitKind},
    habit_store::HabitStore,
};

use super::series::{assemble_series, earliest_log_date};

/// Colors habits cycle through, assigned by position in the request so a habit keeps its color
/// between renders of the same selection.
pub const PALETTE: [RGBColor; 7] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x8c, 0x56, 0x4b),
    RGBColor(0xe3, 0x77, 0xc2),
];

pub fn palette_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

/// Vertical nudge applied per boolean habit so several 0/1 step lines and their guides don't
/// sit exactly on top of each other.
const BOOLEAN_OFFSET: f64 = 0.02;

/// One habit's plottable data: the gap-filled daily series plus the habit row it came from.
pub struct HabitSeries {
    pub habit: Habit,
    pub points: Vec<(NaiveDate, f64)>,
    /// Position in the original selection, drives the palette and the boolean offset.
    pub index: usize,
}

impl HabitSeries {
    fn vertical_offset(&self) -> f64 {
        match self.habit.kind {
            HabitKind::Boolean => self.index as f64 * BOOLEAN_OFFSET,
            HabitKind::Numeric => 0.,
        }
    }
}

/// Visual knobs the two consumers differ on. The interactive png export uses the light theme,
/// the wallpaper pipeline the dark one with the legend pushed to the side.
#[derive(Debug, Clone)]
pub struct ChartStyle {
    pub background: RGBColor,
    pub text: RGBColor,
    pub grid: RGBColor,
    pub caption_size: u32,
    pub margin: u32,
    pub legend_on_side: bool,
}

impl ChartStyle {
    pub fn light() -> Self {
        Self {
            background: RGBColor(255, 255, 255),
            text: RGBColor(30, 30, 30),
            grid: RGBColor(200, 200, 200),
            caption_size: 32,
            margin: 20,
            legend_on_side: false,
        }
    }

    /// Dark styling matching the generated wallpaper background.
    pub fn dark() -> Self {
        Self {
            background: RGBColor(0x1e, 0x1e, 0x1e),
            text: RGBColor(220, 220, 220),
            grid: RGBColor(60, 60, 60),
            caption_size: 48,
            margin: 60,
            legend_on_side: true,
        }
    }
}

/// Assembled, backend-independent progress chart. Rendering draws into any plotters drawing
/// area, file handling and windowing stay with the caller.
pub struct ProgressChart {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub series: Vec<HabitSeries>,
}

impl ProgressChart {
    /// Gathers series for the selected habits. The x axis starts at the earliest log across the
    /// selection (today when nothing is logged); habits without any logs are skipped from
    /// plotting while each remaining habit's series starts at its own first logged day.
    pub fn assemble(
        store: &impl HabitStore,
        habit_ids: &[HabitId],
        today: NaiveDate,
    ) -> Result<Self> {
        let mut start = today;
        let mut series = Vec::new();

        for (index, &id) in habit_ids.iter().enumerate() {
            let Some(habit) = store.habit(id)? else {
                debug!("Skipping unknown habit {id}");
                continue;
            };
            let logs = store.logs(id, None)?;
            let Some(first_logged) = earliest_log_date(&logs) else {
                debug!("Skipping habit {} without logs", habit.name);
                continue;
            };
            start = start.min(first_logged);
            let points = assemble_series(habit.default_value, &logs, today);
            series.push(HabitSeries {
                habit,
                points,
                index,
            });
        }

        Ok(Self {
            start,
            end: today,
            series,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Draws the chart onto `area`. An empty selection produces a captioned placeholder
    /// instead of failing.
    pub fn draw<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        style: &ChartStyle,
    ) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        area.fill(&style.background)?;

        if self.is_empty() {
            area.titled(
                "No habit data yet",
                ("sans-serif", style.caption_size).into_font().color(&style.text),
            )?;
            area.present()?;
            return Ok(());
        }

        let (y_min, y_max) = self.value_range();
        // A selection logged only today still needs a non-degenerate x axis.
        let axis_end = if self.start == self.end {
            self.end + Duration::days(1)
        } else {
            self.end
        };

        let mut chart = ChartBuilder::on(area)
            .caption(
                "Habit Progress",
                ("sans-serif", style.caption_size)
                    .into_font()
                    .color(&style.text),
            )
            .margin(style.margin)
            .x_label_area_size(60)
            .y_label_area_size(60)
            .build_cartesian_2d(self.start..axis_end, y_min..y_max)?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Value")
            .light_line_style(style.grid.mix(0.4))
            .bold_line_style(style.grid)
            .axis_style(style.text.mix(0.8))
            .label_style(("sans-serif", 16).into_font().color(&style.text))
            .x_label_formatter(&|date| date.format("%Y-%m-%d").to_string())
            .x_labels(10)
            .draw()?;

        for series in &self.series {
            let color = palette_color(series.index);
            let offset = series.vertical_offset();

            let points: Vec<(NaiveDate, f64)> = series
                .points
                .iter()
                .map(|&(date, value)| (date, value + offset))
                .collect();

            match series.habit.kind {
                HabitKind::Boolean => {
                    chart
                        .draw_series(LineSeries::new(
                            step_points(&points),
                            color.stroke_width(3),
                        ))?
                        .label(format!("{} (Actual)", series.habit.name))
                        .legend(move |(x, y)| {
                            PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3))
                        });
                }
                HabitKind::Numeric => {
                    chart
                        .draw_series(LineSeries::new(
                            points.iter().copied(),
                            color.stroke_width(3),
                        ))?
                        .label(format!("{} (Actual)", series.habit.name))
                        .legend(move |(x, y)| {
                            PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3))
                        });
                }
            }

            chart.draw_series(
                points
                    .iter()
                    .map(|&point| Circle::new(point, 3, color.mix(0.9).filled())),
            )?;

            if let Some(target) = series.habit.target_value {
                let target = target + offset;
                chart
                    .draw_series(DashedLineSeries::new(
                        [(self.start, target), (axis_end, target)],
                        8,
                        6,
                        color.mix(0.6).stroke_width(2),
                    ))?
                    .label(format!("{} (Target)", series.habit.name))
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.mix(0.6).stroke_width(2))
                    });
            }
        }

        let legend_position = if style.legend_on_side {
            SeriesLabelPosition::MiddleRight
        } else {
            SeriesLabelPosition::UpperLeft
        };
        chart
            .configure_series_labels()
            .position(legend_position)
            .background_style(style.background.mix(0.8))
            .border_style(style.grid)
            .label_font(("sans-serif", 16).into_font().color(&style.text))
            .draw()?;

        area.present()?;
        Ok(())
    }

    /// Padded min/max over every plotted value, offsets and target guides included.
    fn value_range(&self) -> (f64, f64) {
        let mut min = f64::MAX;
        let mut max = f64::MIN;
        for series in &self.series {
            let offset = series.vertical_offset();
            for &(_, value) in &series.points {
                min = min.min(value + offset);
                max = max.max(value + offset);
            }
            if let Some(target) = series.habit.target_value {
                min = min.min(target + offset);
                max = max.max(target + offset);
            }
        }
        let padding = ((max - min) * 0.1).max(0.1);
        (min - padding, max + padding)
    }
}

/// Turns a daily series into step-function segments, holding each value until the next day's
/// value takes over.
fn step_points(points: &[(NaiveDate, f64)]) -> Vec<(NaiveDate, f64)> {
    let mut result = Vec::with_capacity(points.len() * 2);
    for pair in points.windows(2) {
        let (date, value) = pair[0];
        let (next_date, _) = pair[1];
        result.push((date, value));
        result.push((next_date, value));
    }
    if let Some(&last) = points.last() {
        result.push(last);
    }
    result
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use plotters::prelude::*;

    use crate::storage::{
        entities::{HabitKind, NewHabit},
        habit_store::{HabitStore, SqliteHabitStore},
        open_in_memory,
    };

    use super::{palette_color, step_points, ChartStyle, ProgressChart, PALETTE};

    fn day(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn test_store() -> SqliteHabitStore {
        SqliteHabitStore::new(open_in_memory().unwrap())
    }

    fn draw_to_buffer(chart: &ProgressChart, style: &ChartStyle) -> Result<()> {
        let mut buffer = vec![0u8; 640 * 480 * 3];
        let area = BitMapBackend::with_buffer(&mut buffer, (640, 480)).into_drawing_area();
        chart.draw(&area, style)
    }

    #[test]
    fn palette_cycles_deterministically() {
        assert_eq!(palette_color(0), PALETTE[0]);
        assert_eq!(palette_color(6), PALETTE[6]);
        assert_eq!(palette_color(7), PALETTE[0]);
        assert_eq!(palette_color(15), PALETTE[1]);
    }

    #[test]
    fn zero_habits_renders_placeholder() -> Result<()> {
        let store = test_store();
        let chart = ProgressChart::assemble(&store, &[], day(5))?;
        assert!(chart.is_empty());
        draw_to_buffer(&chart, &ChartStyle::light())?;
        draw_to_buffer(&chart, &ChartStyle::dark())?;
        Ok(())
    }

    #[test]
    fn habits_without_logs_are_skipped() -> Result<()> {
        let store = test_store();
        let logged = store.insert_habit(NewHabit {
            name: "Exercise".into(),
            kind: HabitKind::Boolean,
            target_value: Some(1.),
            default_value: 0.,
        })?;
        let unlogged = store.insert_habit(NewHabit {
            name: "Water".into(),
            kind: HabitKind::Numeric,
            target_value: None,
            default_value: 2.,
        })?;
        store.upsert_log(logged.id, day(2), 1.)?;

        let chart = ProgressChart::assemble(&store, &[logged.id, unlogged.id], day(5))?;
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].habit.id, logged.id);
        assert_eq!(chart.start, day(2));
        assert_eq!(chart.end, day(5));
        Ok(())
    }

    #[test]
    fn shared_start_is_earliest_across_selection() -> Result<()> {
        let store = test_store();
        let first = store.insert_habit(NewHabit {
            name: "Reading".into(),
            kind: HabitKind::Numeric,
            target_value: Some(30.),
            default_value: 0.,
        })?;
        let second = store.insert_habit(NewHabit {
            name: "Exercise".into(),
            kind: HabitKind::Boolean,
            target_value: None,
            default_value: 0.,
        })?;
        store.upsert_log(first.id, day(3), 20.)?;
        store.upsert_log(second.id, day(1), 1.)?;

        let chart = ProgressChart::assemble(&store, &[first.id, second.id], day(5))?;
        assert_eq!(chart.start, day(1));
        // Each habit's own series still begins at its own first log.
        assert_eq!(chart.series[0].points[0].0, day(3));
        assert_eq!(chart.series[1].points[0].0, day(1));
        Ok(())
    }

    #[test]
    fn unknown_ids_are_ignored() -> Result<()> {
        let store = test_store();
        let chart = ProgressChart::assemble(&store, &[42], day(5))?;
        assert!(chart.is_empty());
        Ok(())
    }

    #[test]
    fn mixed_kinds_draw_without_error() -> Result<()> {
        let store = test_store();
        let boolean = store.insert_habit(NewHabit {
            name: "Exercise".into(),
            kind: HabitKind::Boolean,
            target_value: Some(1.),
            default_value: 0.,
        })?;
        let numeric = store.insert_habit(NewHabit {
            name: "Water".into(),
            kind: HabitKind::Numeric,
            target_value: Some(0.),
            default_value: 2.,
        })?;
        store.upsert_log(boolean.id, day(1), 1.)?;
        store.upsert_log(numeric.id, day(2), 3.)?;

        let chart = ProgressChart::assemble(&store, &[boolean.id, numeric.id], day(4))?;
        assert_eq!(chart.series.len(), 2);
        draw_to_buffer(&chart, &ChartStyle::light())?;
        draw_to_buffer(&chart, &ChartStyle::dark())?;
        Ok(())
    }

    #[test]
    fn single_day_selection_draws() -> Result<()> {
        let store = test_store();
        let habit = store.insert_habit(NewHabit {
            name: "Water".into(),
            kind: HabitKind::Numeric,
            target_value: None,
            default_value: 2.,
        })?;
        store.upsert_log(habit.id, day(5), 2.5)?;

        let chart = ProgressChart::assemble(&store, &[habit.id], day(5))?;
        assert_eq!(chart.series[0].points, vec![(day(5), 2.5)]);
        draw_to_buffer(&chart, &ChartStyle::light())?;
        Ok(())
    }

    #[test]
    fn step_points_hold_values_between_days() {
        let points = vec![(day(1), 1.), (day(2), 0.), (day(3), 1.)];
        let stepped = step_points(&points);
        assert_eq!(
            stepped,
            vec![
                (day(1), 1.),
                (day(2), 1.),
                (day(2), 0.),
                (day(3), 0.),
                (day(3), 1.),
            ]
        );
    }
}
