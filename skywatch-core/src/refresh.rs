use chrono::{DateTime, Duration, Utc};

/// Tracks when data was last fetched successfully.
///
/// Construction stamps `now`, so a fresh state reports "not due" for a full
/// interval. Callers must perform their first fetch unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshState {
    last_fetch: DateTime<Utc>,
}

impl RefreshState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { last_fetch: now }
    }

    pub fn last_fetch(&self) -> DateTime<Utc> {
        self.last_fetch
    }

    pub fn is_refresh_due(&self, now: DateTime<Utc>, interval: Duration) -> bool {
        now - self.last_fetch >= interval
    }

    /// Record a successful fetch. Never moves the timestamp backwards.
    pub fn mark_refreshed(&mut self, now: DateTime<Utc>) {
        if now > self.last_fetch {
            self.last_fetch = now;
        }
    }

    /// Whole seconds until the next refresh, within `[0, interval]`.
    pub fn seconds_until_next_refresh(&self, now: DateTime<Utc>, interval: Duration) -> u64 {
        let remaining = (interval - (now - self.last_fetch)).num_seconds();
        remaining.clamp(0, interval.num_seconds().max(0)) as u64
    }
}
