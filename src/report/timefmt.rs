use thiserror::Error;

/// Per-row validation failure. A row that fails validation is skipped and
/// counted by the caller; it never aborts the surrounding load.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("run_time {0} is not a valid HHMMSS time of day")]
    TimeOutOfRange(i64),
    #[error("run_duration {0} is negative")]
    NegativeDuration(i64),
}

/// Time of day in the compact `HHMMSS` numeric form the history table
/// stores, e.g. `93005` for `09:30:05`. Ordering the raw value orders
/// rows chronologically once validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunTime(u32);

impl RunTime {
    /// Parse the compact numeric form, treating missing leading zeros as
    /// zero-padding. Rejects negatives, values wider than six digits, and
    /// digit pairs that do not form a real time of day.
    pub fn from_raw(raw: i64) -> Result<Self, RowError> {
        if !(0..=235959).contains(&raw) {
            return Err(RowError::TimeOutOfRange(raw));
        }
        let value = raw as u32;
        let (_, minute, second) = split_hms(value);
        if minute > 59 || second > 59 {
            return Err(RowError::TimeOutOfRange(raw));
        }
        Ok(Self(value))
    }
}

impl std::fmt::Display for RunTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (hour, minute, second) = split_hms(self.0);
        write!(f, "{hour:02}:{minute:02}:{second:02}")
    }
}

fn split_hms(value: u32) -> (u32, u32, u32) {
    (value / 10000, value / 100 % 100, value % 100)
}

/// Render an elapsed-seconds duration as `HH:MM:SS`. The hours field is
/// not bounded to a day; long runs keep counting past 23.
pub fn format_duration(secs: i64) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, secs % 3600 / 60, secs % 60)
}
