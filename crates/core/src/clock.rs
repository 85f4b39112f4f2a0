use std::fmt::Display;

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike};

use crate::HUMAN_TIMESTAMP_FORMAT;

/// Calendar fields of an hour boundary, as stored on raw samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: String,
    pub unix_time: i64,
}

/// Latest hour boundary at or before `t`, kept in the timezone of `t`.
pub fn round_down_to_hour<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    let into_hour = Duration::seconds(i64::from(t.minute() * 60 + t.second()))
        + Duration::nanoseconds(i64::from(t.nanosecond()));
    t.clone() - into_hour
}

pub fn decompose<Tz>(t: &DateTime<Tz>) -> HourParts
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    HourParts {
        year: t.year(),
        month: t.month(),
        day: t.day(),
        hour: t.format("%H:%M:%S").to_string(),
        unix_time: t.timestamp(),
    }
}

pub fn human_timestamp<Tz>(t: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    t.format(HUMAN_TIMESTAMP_FORMAT).to_string()
}
