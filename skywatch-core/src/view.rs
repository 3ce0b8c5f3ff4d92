use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use crate::{
    astro,
    config::StationSettings,
    error::ParseError,
    evaluate::{AirQuality, LaunchSafety},
    model::Observation,
    refresh::RefreshState,
};

/// Everything derived for one evaluation cycle. Rebuilt from scratch each time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedView {
    pub sunrise: DateTime<FixedOffset>,
    pub sunset: DateTime<FixedOffset>,
    pub is_daytime: bool,
    pub air_quality: AirQuality,
    pub launch_safety: LaunchSafety,
    pub seconds_until_next_refresh: u64,
    /// Station clock at evaluation time.
    pub station_time: DateTime<FixedOffset>,
    /// Last successful fetch, on the station clock.
    pub last_refresh: DateTime<FixedOffset>,
}

impl DerivedView {
    pub fn build(
        observation: &Observation,
        refresh: &RefreshState,
        now: DateTime<Utc>,
        settings: &StationSettings,
    ) -> Result<Self, ParseError> {
        let tz = settings.timezone;
        let local_now = now.with_timezone(&tz);

        let phase = astro::resolve_str(
            local_now,
            &observation.astro.sunrise,
            &observation.astro.sunset,
        )?;

        Ok(Self {
            sunrise: phase.sunrise.fixed_offset(),
            sunset: phase.sunset.fixed_offset(),
            is_daytime: phase.is_daytime,
            air_quality: AirQuality::from_index(observation.snapshot.air_quality_index),
            launch_safety: LaunchSafety::evaluate(&observation.snapshot),
            seconds_until_next_refresh: refresh
                .seconds_until_next_refresh(now, settings.refresh_interval),
            station_time: local_now.fixed_offset(),
            last_refresh: refresh.last_fetch().with_timezone(&tz).fixed_offset(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        evaluate::{Verdict, tests::calm_snapshot},
        model::AstroInfo,
    };
    use chrono::{Duration, TimeZone, Timelike};

    fn observation(sunrise: &str, sunset: &str) -> Observation {
        Observation {
            snapshot: calm_snapshot(),
            astro: AstroInfo {
                sunrise: sunrise.into(),
                sunset: sunset.into(),
            },
        }
    }

    fn settings() -> StationSettings {
        Config::default().station_settings().unwrap()
    }

    #[test]
    fn builds_full_view_at_midday() {
        // 17:00 UTC is 12:00 CDT.
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 17, 0, 0).unwrap();
        let refresh = RefreshState::new(now - Duration::seconds(20));

        let obs = observation("06:30 AM", "08:15 PM");

        let view = DerivedView::build(&obs, &refresh, now, &settings())
            .expect("valid astro strings");

        assert!(view.is_daytime);
        assert_eq!(view.air_quality, AirQuality::Good);
        assert_eq!(view.launch_safety.verdict, Verdict::Safe);
        assert_eq!(view.seconds_until_next_refresh, 40);
        assert_eq!(view.station_time.hour(), 12);
        assert_eq!(view.sunset.hour(), 20);
        assert_eq!(view.sunset.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(view.last_refresh, (now - Duration::seconds(20)).fixed_offset());
    }

    #[test]
    fn malformed_astro_string_fails_the_whole_view() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 17, 0, 0).unwrap();
        let refresh = RefreshState::new(now);

        let obs = observation("sunrise", "08:15 PM");

        let err = DerivedView::build(&obs, &refresh, now, &settings()).unwrap_err();

        assert_eq!(err.input, "sunrise");
    }

    #[test]
    fn night_in_station_zone_even_when_utc_date_differs() {
        // 03:30 UTC on the 16th is 22:30 CDT on the 15th.
        let now = Utc.with_ymd_and_hms(2025, 6, 16, 3, 30, 0).unwrap();
        let refresh = RefreshState::new(now);

        let obs = observation("06:30 AM", "08:15 PM");

        let view = DerivedView::build(&obs, &refresh, now, &settings()).unwrap();

        assert!(!view.is_daytime);
        assert_eq!(view.station_time.hour(), 22);
        assert_eq!(view.sunrise.hour(), 6);
        assert_eq!(view.seconds_until_next_refresh, 60);
    }
}
