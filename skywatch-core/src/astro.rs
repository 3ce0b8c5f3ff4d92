//! Day/night resolution from provider sunrise/sunset strings.
//!
//! The provider reports sunrise and sunset as bare times of day. They are
//! anchored to the calendar date of `now` in the station's zone; the daytime
//! test runs against that same-day window, and each reported instant is then
//! advanced one calendar day if it has already passed, so the caller always
//! sees the *next* sunrise and sunset.

use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;

use crate::error::ParseError;

const TIME_OF_DAY_FORMAT: &str = "%I:%M %p";

/// A wall-clock time with no date attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), TIME_OF_DAY_FORMAT)
            .map(TimeOfDay)
            .map_err(|_| ParseError::new(s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayPhase {
    /// Next sunrise at or after `now`.
    pub sunrise: DateTime<Tz>,
    /// Next sunset at or after `now`.
    pub sunset: DateTime<Tz>,
    pub is_daytime: bool,
}

/// Resolve sunrise/sunset against `now`.
///
/// An inverted window (sunrise later than sunset on the same date) is night.
pub fn resolve(now: DateTime<Tz>, sunrise: TimeOfDay, sunset: TimeOfDay) -> DayPhase {
    let tz = now.timezone();
    let today = now.date_naive();

    let sunrise_today = localize(&tz, today, sunrise);
    let sunset_today = localize(&tz, today, sunset);

    let is_daytime = sunrise_today <= sunset_today && sunrise_today <= now && now <= sunset_today;

    DayPhase {
        sunrise: roll_if_passed(&now, today, sunrise, sunrise_today),
        sunset: roll_if_passed(&now, today, sunset, sunset_today),
        is_daytime,
    }
}

/// Parse both strings and resolve. Fails on the first malformed string.
pub fn resolve_str(
    now: DateTime<Tz>,
    sunrise: &str,
    sunset: &str,
) -> Result<DayPhase, ParseError> {
    Ok(resolve(now, sunrise.parse()?, sunset.parse()?))
}

fn roll_if_passed(
    now: &DateTime<Tz>,
    today: NaiveDate,
    time: TimeOfDay,
    candidate: DateTime<Tz>,
) -> DateTime<Tz> {
    if candidate >= *now {
        return candidate;
    }

    match today.succ_opt() {
        Some(tomorrow) => localize(&now.timezone(), tomorrow, time),
        None => candidate,
    }
}

/// Anchor a time of day to a date in `tz`.
///
/// Ambiguous local times take the earlier instant; times inside a DST gap are
/// pushed forward by an hour.
fn localize(tz: &Tz, date: NaiveDate, time: TimeOfDay) -> DateTime<Tz> {
    let naive = date.and_time(time.0);
    let shifted = naive + Duration::hours(1);

    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&shifted).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}
