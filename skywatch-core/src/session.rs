//! One evaluation session: the refresh state, the latest observation and the
//! provider that replaces it.
//!
//! A [`Session`] is owned by whoever drives the display loop. `cycle` takes
//! `&mut self`, so the read-decide-fetch-mark sequence cannot interleave; when
//! several viewers share a session, wrap it in a [`SharedSession`] so the lock
//! is held across the whole cycle.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::{
    config::StationSettings,
    error::Unavailability,
    model::Observation,
    provider::WeatherProvider,
    refresh::RefreshState,
    view::DerivedView,
};

pub type SharedSession = Arc<Mutex<Session>>;

/// Outcome of a single cycle. There is no partial result.
#[derive(Debug)]
pub enum CycleReport {
    Ready {
        observation: Observation,
        view: DerivedView,
    },
    Unavailable(Unavailability),
}

impl CycleReport {
    pub fn is_ready(&self) -> bool {
        matches!(self, CycleReport::Ready { .. })
    }
}

#[derive(Debug)]
pub struct Session {
    provider: Box<dyn WeatherProvider>,
    settings: StationSettings,
    refresh: RefreshState,
    latest: Option<Observation>,
}

impl Session {
    pub fn new(
        provider: Box<dyn WeatherProvider>,
        settings: StationSettings,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            provider,
            settings,
            refresh: RefreshState::new(now),
            latest: None,
        }
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    pub fn settings(&self) -> &StationSettings {
        &self.settings
    }

    pub fn refresh_state(&self) -> &RefreshState {
        &self.refresh
    }

    /// Run one cycle at `now`.
    ///
    /// Fetches when nothing has been fetched yet or a refresh is due. A failed
    /// fetch drops the previous observation and leaves the refresh state
    /// untouched, so the next cycle retries.
    pub async fn cycle(&mut self, now: DateTime<Utc>) -> CycleReport {
        let interval = self.settings.refresh_interval;
        let location = self.settings.coordinates;
        let needs_fetch = self.latest.is_none() || self.refresh.is_refresh_due(now, interval);

        if needs_fetch {
            log::debug!(
                "Fetching observation for {} (last fetch {})",
                self.settings.location_name,
                self.refresh.last_fetch()
            );

            match self.provider.fetch_observation(&location).await {
                Ok(observation) => {
                    self.refresh.mark_refreshed(now);
                    self.latest = Some(observation);
                    log::info!("Refreshed weather for {}", self.settings.location_name);
                }
                Err(err) => {
                    log::warn!("Weather fetch failed, retrying next cycle: {err}");
                    self.latest = None;
                    return CycleReport::Unavailable(err.into());
                }
            }
        }

        let Some(observation) = self.latest.as_ref() else {
            return CycleReport::Unavailable(Unavailability::Waiting);
        };

        match DerivedView::build(observation, &self.refresh, now, &self.settings) {
            Ok(view) => CycleReport::Ready {
                observation: observation.clone(),
                view,
            },
            Err(err) => {
                log::warn!("Skipping cycle, astronomy data unreadable: {err}");
                CycleReport::Unavailable(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        error::FetchError,
        evaluate::tests::calm_snapshot,
        model::{AstroInfo, Coordinates},
    };
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::{
        collections::VecDeque,
        sync::{
            Mutex as StdMutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    #[derive(Debug)]
    enum Scripted {
        Ok(&'static str),
        Fail,
    }

    /// Replays scripted outcomes; once exhausted, keeps succeeding.
    #[derive(Debug)]
    struct FakeProvider {
        script: StdMutex<VecDeque<Scripted>>,
        calls: Arc<AtomicUsize>,
    }

    impl FakeProvider {
        fn new(script: Vec<Scripted>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let provider = Self {
                script: StdMutex::new(script.into()),
                calls: Arc::clone(&calls),
            };
            (provider, calls)
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn fetch_observation(
            &self,
            _location: &Coordinates,
        ) -> Result<Observation, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Scripted::Ok("08:15 PM"));

            match next {
                Scripted::Ok(sunset) => Ok(Observation {
                    snapshot: calm_snapshot(),
                    astro: AstroInfo {
                        sunrise: "06:30 AM".into(),
                        sunset: sunset.into(),
                    },
                }),
                Scripted::Fail => Err(FetchError::Upstream {
                    endpoint: "current",
                    status: 503,
                    body: "unavailable".into(),
                }),
            }
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 17, 0, 0).unwrap()
    }

    fn session(script: Vec<Scripted>) -> (Session, Arc<AtomicUsize>) {
        let (provider, calls) = FakeProvider::new(script);
        let settings = Config::default().station_settings().unwrap();
        (Session::new(Box::new(provider), settings, t0()), calls)
    }

    #[tokio::test]
    async fn first_cycle_fetches_unconditionally() {
        let (mut session, calls) = session(vec![]);

        let report = session.cycle(t0()).await;

        assert!(report.is_ready());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetches_again_only_when_due() {
        let (mut session, calls) = session(vec![]);

        session.cycle(t0()).await;
        session.cycle(t0() + Duration::seconds(30)).await;
        session.cycle(t0() + Duration::seconds(59)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let report = session.cycle(t0() + Duration::seconds(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            session.refresh_state().last_fetch(),
            t0() + Duration::seconds(60)
        );

        match report {
            CycleReport::Ready { view, .. } => assert_eq!(view.seconds_until_next_refresh, 60),
            other => panic!("expected ready, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_fetch_keeps_refresh_state_and_retries_next_cycle() {
        let (mut session, calls) = session(vec![Scripted::Ok("08:15 PM"), Scripted::Fail]);

        session.cycle(t0()).await;
        let due = t0() + Duration::seconds(75);
        let retry_at = due + Duration::seconds(1);
        let interval = session.settings().refresh_interval;

        match session.cycle(due).await {
            CycleReport::Unavailable(Unavailability::Fetch(err)) => {
                assert!(matches!(err, FetchError::Upstream { status: 503, .. }));
            }
            other => panic!("expected fetch failure, got {other:?}"),
        }
        assert_eq!(session.refresh_state().last_fetch(), t0());
        assert!(session.refresh_state().is_refresh_due(retry_at, interval));

        let report = session.cycle(retry_at).await;
        assert!(report.is_ready());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(session.refresh_state().last_fetch(), retry_at);
    }

    #[tokio::test]
    async fn failed_first_fetch_retries_immediately() {
        let (mut session, calls) = session(vec![Scripted::Fail]);

        assert!(!session.cycle(t0()).await.is_ready());
        assert!(session.cycle(t0() + Duration::seconds(1)).await.is_ready());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unreadable_astronomy_reports_parse_failure() {
        let (mut session, _calls) = session(vec![Scripted::Ok("half past eight")]);

        let report = session.cycle(t0()).await;

        match report {
            CycleReport::Unavailable(Unavailability::Parse(err)) => {
                assert_eq!(err.input, "half past eight");
            }
            other => panic!("expected parse failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn shared_session_does_not_duplicate_fetches() {
        let (session, calls) = session(vec![]);
        let shared = session.into_shared();

        let a = {
            let shared = Arc::clone(&shared);
            tokio::spawn(async move { shared.lock().await.cycle(t0()).await.is_ready() })
        };
        let b = {
            let shared = Arc::clone(&shared);
            tokio::spawn(async move { shared.lock().await.cycle(t0()).await.is_ready() })
        };

        assert!(a.await.unwrap());
        assert!(b.await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
