use chrono::{DateTime, Local, NaiveDate};

/// Represents an entity responsible for providing dates across application. This can allow it to
/// be used for testing
pub trait Clock: Sync + Send + 'static {
    /// Current moment in the local timezone. `today` derives from the same timezone, so a file
    /// stamped from `time` always carries the date the chart ends on.
    fn time(&self) -> DateTime<Local>;

    /// Current calendar date in the local timezone. Series assembly and logging both key on this.
    fn today(&self) -> NaiveDate;
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Local> {
        Local::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to midnight of a fixed date, for tests.
#[cfg(test)]
pub struct FixedClock(pub NaiveDate);

#[cfg(test)]
impl Clock for FixedClock {
    fn time(&self) -> DateTime<Local> {
        use chrono::NaiveTime;
        self.0
            .and_time(NaiveTime::MIN)
            .and_local_timezone(Local)
            .earliest()
            .expect("midnight should exist")
    }

    fn today(&self) -> NaiveDate {
        self.0
    }
}
