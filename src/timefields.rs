//! Calendar fields derived from the acquisition time of a detection.

use chrono::{Datelike, NaiveDateTime, Timelike};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// The names of the derived columns, in the order they are appended to a saved table.
pub const DERIVED_COLUMNS: [&str; 7] = [
    "year",
    "month",
    "day",
    "hour",
    "minute",
    "month_name",
    "datetime",
];

/// Year, month, day, hour and minute of a detection, broken out so they can be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeFields {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub datetime: NaiveDateTime,
}

impl TimeFields {
    pub fn derive(datetime: NaiveDateTime) -> Self {
        TimeFields {
            year: datetime.year(),
            month: datetime.month(),
            day: datetime.day(),
            hour: datetime.hour(),
            minute: datetime.minute(),
            datetime,
        }
    }

    /// Three letter English abbreviation of the month, e.g. "Aug".
    pub fn month_name(&self) -> &'static str {
        MONTH_ABBREVIATIONS[(self.month as usize - 1) % 12]
    }

    /// Values of [DERIVED_COLUMNS] formatted for a CSV file.
    pub fn as_strings(&self) -> [String; 7] {
        [
            self.year.to_string(),
            self.month.to_string(),
            self.day.to_string(),
            self.hour.to_string(),
            self.minute.to_string(),
            self.month_name().to_owned(),
            self.datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]
    }
}
