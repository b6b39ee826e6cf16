use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{storage::entities::LogEntry, utils::time::date_range};

/// Builds the dense daily series for one habit: one value per calendar day from the first
/// logged day (or `today` when nothing was ever logged) through `today`, logged values where
/// they exist and the habit's default everywhere else.
///
/// Duplicate rows for one day collapse deterministically, the last row in input order wins.
/// The schema doesn't produce duplicates, this only guards the api boundary.
pub fn assemble_series(
    default_value: f64,
    logs: &[LogEntry],
    today: NaiveDate,
) -> Vec<(NaiveDate, f64)> {
    let by_date: BTreeMap<NaiveDate, f64> =
        logs.iter().map(|log| (log.date, log.value)).collect();

    let start = by_date.keys().next().copied().unwrap_or(today);

    date_range(start, today)
        .map(|day| (day, by_date.get(&day).copied().unwrap_or(default_value)))
        .collect()
}

/// First day any of the habits was logged, used as the shared chart start.
pub fn earliest_log_date(logs: &[LogEntry]) -> Option<NaiveDate> {
    logs.iter().map(|log| log.date).min()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::storage::entities::LogEntry;

    use super::{assemble_series, earliest_log_date};

    fn day(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn log(date: NaiveDate, value: f64) -> LogEntry {
        LogEntry {
            habit_id: 1,
            date,
            value,
        }
    }

    #[test]
    fn no_logs_gives_single_default_point() {
        let series = assemble_series(2., &[], day(10));
        assert_eq!(series, vec![(day(10), 2.)]);
    }

    #[test]
    fn gaps_fall_back_to_default() {
        // Exercise: boolean, default 0, logged on the 1st and 3rd, viewed on the 4th.
        let series = assemble_series(0., &[log(day(1), 1.), log(day(3), 1.)], day(4));
        assert_eq!(
            series,
            vec![(day(1), 1.), (day(2), 0.), (day(3), 1.), (day(4), 0.)]
        );
    }

    #[test]
    fn logged_value_wins_over_default() {
        let series = assemble_series(5., &[log(day(2), 1.)], day(3));
        assert_eq!(series, vec![(day(2), 1.), (day(3), 5.)]);
    }

    #[test]
    fn series_is_gap_free_and_strictly_increasing() {
        let series = assemble_series(0., &[log(day(1), 1.), log(day(20), 1.)], day(25));
        assert_eq!(series.len(), 25);
        for pair in series.windows(2) {
            assert_eq!(pair[1].0, pair[0].0.succ_opt().unwrap());
        }
    }

    #[test]
    fn single_log_extends_to_today() {
        let series = assemble_series(0., &[log(day(1), 3.)], day(5));
        assert_eq!(series.len(), 5);
        assert_eq!(series[0], (day(1), 3.));
        assert_eq!(series[4], (day(5), 0.));
    }

    #[test]
    fn duplicate_dates_collapse_last_wins() {
        let series = assemble_series(0., &[log(day(1), 1.), log(day(1), 4.)], day(1));
        assert_eq!(series, vec![(day(1), 4.)]);
    }

    #[test]
    fn earliest_date_across_unordered_logs() {
        assert_eq!(earliest_log_date(&[]), None);
        assert_eq!(
            earliest_log_date(&[log(day(7), 1.), log(day(2), 1.), log(day(9), 1.)]),
            Some(day(2))
        );
    }
}
