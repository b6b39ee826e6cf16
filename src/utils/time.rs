use chrono::{Duration, NaiveDate};

/// This is the standard way of converting a date to a string in habitwall. It matches the
/// format log rows are stored under.
pub fn date_to_day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Returns an iterator over every calendar day between start and end, both inclusive.
/// Empty when end is before start.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let first = (start <= end).then_some(start);
    std::iter::successors(first, move |&day| {
        let next = day + Duration::days(1);
        (next <= end).then_some(next)
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{date_range, date_to_day_key};

    #[test]
    fn day_key_is_iso() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert_eq!(date_to_day_key(date), "2024-01-03");
    }

    #[test]
    fn range_is_inclusive() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        let days: Vec<_> = date_range(start, end).collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[0], start);
        assert_eq!(days[3], end);
    }

    #[test]
    fn single_day_range() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(date_range(day, day).count(), 1);
    }

    #[test]
    fn inverted_range_is_empty() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(date_range(start, end).count(), 0);
    }
}
