use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cmg_core::round_down_to_hour;

use crate::error::{AppError, Result};

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|err| AppError::InvalidInput(format!("invalid timezone {name}: {err}")))
}

/// Start of the hour containing `now`, in `tz`.
pub fn current_hour(tz: Tz, now: DateTime<Utc>) -> DateTime<Tz> {
    round_down_to_hour(&now.with_timezone(&tz))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike};

    use super::*;

    #[test]
    fn parses_iana_names() {
        assert!(parse_timezone("America/Santiago").is_ok());
        assert!(matches!(
            parse_timezone("Mars/Olympus"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn current_hour_is_local() {
        let tz = parse_timezone("America/Santiago").expect("tz");
        let now = Utc.with_ymd_and_hms(2026, 7, 1, 15, 42, 10).unwrap();
        let hour = current_hour(tz, now);
        assert_eq!(hour.minute(), 0);
        assert_eq!(hour.second(), 0);
        assert_eq!(hour.hour(), 11);
    }
}
