//! Thin wrapper over the user's crontab. The application only ever creates, removes, or
//! inspects one entry: the periodic wallpaper refresh. Cron itself owns running it.
//! The entry is tagged with a trailing comment marker so it can be found and replaced without
//! touching anything else in the crontab.

use std::fmt::Display;

use anyhow::{bail, Context, Result};
use tracing::info;

const JOB_MARKER: &str = "# habitwall wallpaper refresh";

/// How often cron regenerates the wallpaper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RefreshInterval {
    /// Every minute.
    Minute,
    /// Every hour at minute 0.
    Hour,
    /// Every 12 hours.
    #[value(name = "12h")]
    TwelveHours,
    /// Every day at midnight.
    #[value(name = "24h")]
    Day,
}

impl RefreshInterval {
    pub fn cron_expression(&self) -> &'static str {
        match self {
            RefreshInterval::Minute => "* * * * *",
            RefreshInterval::Hour => "0 * * * *",
            RefreshInterval::TwelveHours => "0 */12 * * *",
            RefreshInterval::Day => "0 0 * * *",
        }
    }

    fn from_cron_expression(expression: &str) -> Option<Self> {
        [
            RefreshInterval::Minute,
            RefreshInterval::Hour,
            RefreshInterval::TwelveHours,
            RefreshInterval::Day,
        ]
        .into_iter()
        .find(|interval| interval.cron_expression() == expression)
    }
}

impl Display for RefreshInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshInterval::Minute => write!(f, "every minute"),
            RefreshInterval::Hour => write!(f, "every hour"),
            RefreshInterval::TwelveHours => write!(f, "every 12 hours"),
            RefreshInterval::Day => write!(f, "every 24 hours"),
        }
    }
}

pub struct CronScheduler {
    /// Full command cron runs, normally the absolute path to the refresh binary.
    command: String,
}

impl CronScheduler {
    pub fn new(command: String) -> Self {
        Self { command }
    }

    /// Installs the refresh entry, replacing a previous one if present.
    pub fn set(&self, interval: RefreshInterval) -> Result<()> {
        let current = read_crontab()?;
        let line = job_line(interval, &self.command);
        let updated = upsert_job(&current, &line);
        write_crontab(&updated)?;
        info!("Scheduled wallpaper refresh: {interval}");
        Ok(())
    }

    /// Removes the refresh entry. Removing an absent entry is fine.
    pub fn remove(&self) -> Result<()> {
        let current = read_crontab()?;
        let updated = strip_job(&current);
        if updated != current {
            write_crontab(&updated)?;
            info!("Removed wallpaper refresh schedule");
        }
        Ok(())
    }

    /// Reports the installed refresh frequency, `None` when no entry exists or its expression
    /// isn't one of ours.
    pub fn current(&self) -> Result<Option<RefreshInterval>> {
        let current = read_crontab()?;
        Ok(find_job(&current).and_then(parse_interval))
    }
}

fn job_line(interval: RefreshInterval, command: &str) -> String {
    format!("{} {command} {JOB_MARKER}", interval.cron_expression())
}

/// Replaces any marked line with `line`, keeping the rest of the crontab untouched.
fn upsert_job(crontab: &str, line: &str) -> String {
    let mut lines: Vec<&str> = crontab
        .lines()
        .filter(|l| !l.ends_with(JOB_MARKER))
        .collect();
    lines.push(line);
    let mut result = lines.join("\n");
    result.push('\n');
    result
}

fn strip_job(crontab: &str) -> String {
    let lines: Vec<&str> = crontab
        .lines()
        .filter(|l| !l.ends_with(JOB_MARKER))
        .collect();
    if lines.is_empty() {
        return String::new();
    }
    let mut result = lines.join("\n");
    result.push('\n');
    result
}

fn find_job(crontab: &str) -> Option<&str> {
    crontab.lines().find(|l| l.ends_with(JOB_MARKER))
}

/// Pulls the five schedule fields off a marked line and maps them back to an interval.
fn parse_interval(line: &str) -> Option<RefreshInterval> {
    let fields: Vec<&str> = line.split_whitespace().take(5).collect();
    if fields.len() < 5 {
        return None;
    }
    RefreshInterval::from_cron_expression(&fields.join(" "))
}

#[cfg(unix)]
fn read_crontab() -> Result<String> {
    let output = std::process::Command::new("crontab")
        .arg("-l")
        .output()
        .context("Failed to run crontab -l")?;
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        // `crontab -l` fails when the user simply has no crontab yet.
        Ok(String::new())
    }
}

#[cfg(unix)]
fn write_crontab(content: &str) -> Result<()> {
    use std::io::Write;
    use std::process::Stdio;

    let mut child = std::process::Command::new("crontab")
        .arg("-")
        .stdin(Stdio::piped())
        .spawn()
        .context("Failed to run crontab -")?;
    child
        .stdin
        .take()
        .expect("stdin was requested")
        .write_all(content.as_bytes())?;
    let status = child.wait()?;
    if !status.success() {
        bail!("crontab - exited with {status}");
    }
    Ok(())
}

#[cfg(not(unix))]
fn read_crontab() -> Result<String> {
    bail!("Wallpaper scheduling is only supported through cron on unix systems")
}

#[cfg(not(unix))]
fn write_crontab(_content: &str) -> Result<()> {
    bail!("Wallpaper scheduling is only supported through cron on unix systems")
}

#[cfg(test)]
mod tests {
    use super::{
        find_job, job_line, parse_interval, strip_job, upsert_job, RefreshInterval, JOB_MARKER,
    };

    #[test]
    fn expressions_round_trip() {
        for interval in [
            RefreshInterval::Minute,
            RefreshInterval::Hour,
            RefreshInterval::TwelveHours,
            RefreshInterval::Day,
        ] {
            assert_eq!(
                RefreshInterval::from_cron_expression(interval.cron_expression()),
                Some(interval)
            );
        }
        assert_eq!(RefreshInterval::from_cron_expression("0 1 * * *"), None);
    }

    #[test]
    fn upsert_replaces_marked_line_only() {
        let existing = format!(
            "0 5 * * * /usr/bin/backup\n* * * * * /old/refresh {JOB_MARKER}\n"
        );
        let updated = upsert_job(
            &existing,
            &job_line(RefreshInterval::Hour, "/new/habitwall-refresh"),
        );
        assert!(updated.contains("0 5 * * * /usr/bin/backup"));
        assert!(!updated.contains("/old/refresh"));
        assert!(updated.contains(&format!(
            "0 * * * * /new/habitwall-refresh {JOB_MARKER}"
        )));
    }

    #[test]
    fn strip_leaves_other_entries() {
        let existing = format!(
            "0 5 * * * /usr/bin/backup\n0 0 * * * /refresh {JOB_MARKER}\n"
        );
        assert_eq!(strip_job(&existing), "0 5 * * * /usr/bin/backup\n");
        assert_eq!(strip_job("0 0 * * * unrelated\n"), "0 0 * * * unrelated\n");
        assert_eq!(strip_job(&format!("0 0 * * * /refresh {JOB_MARKER}\n")), "");
    }

    #[test]
    fn current_frequency_parses_back() {
        let line = job_line(RefreshInterval::TwelveHours, "/refresh");
        let crontab = format!("# a comment\n{line}\n");
        let found = find_job(&crontab).unwrap();
        assert_eq!(parse_interval(found), Some(RefreshInterval::TwelveHours));
    }

    #[test]
    fn foreign_expression_reports_none() {
        let crontab = format!("15 3 * * * /refresh {JOB_MARKER}\n");
        let found = find_job(&crontab).unwrap();
        assert_eq!(parse_interval(found), None);
    }
}
