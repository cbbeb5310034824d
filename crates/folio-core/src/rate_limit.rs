use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Minimum gap between two accepted chat requests from one client.
pub const RATE_LIMIT_COOLDOWN: Duration = Duration::from_millis(2000);

/// Per-client cooldown gate.
///
/// Key: client identifier (usually the IP string). Value: instant of the last
/// *accepted* request. Rejected calls do not refresh the entry. Entries are
/// never evicted; the map lives as long as the process.
#[derive(Debug)]
pub struct RateLimiter {
    cooldown: Duration,
    last_accepted: Mutex<HashMap<String, Instant>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RATE_LIMIT_COOLDOWN)
    }
}

impl RateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted: Mutex::new(HashMap::new()),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Returns `true` if `client_id` must wait; otherwise records now and returns `false`.
    pub fn is_rate_limited(&self, client_id: &str) -> bool {
        self.is_rate_limited_at(client_id, Instant::now())
    }

    /// Same as [`Self::is_rate_limited`] with an explicit clock reading.
    pub fn is_rate_limited_at(&self, client_id: &str, now: Instant) -> bool {
        let mut map = self
            .last_accepted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(last) = map.get(client_id) {
            if now.saturating_duration_since(*last) < self.cooldown {
                return true;
            }
        }
        map.insert(client_id.to_string(), now);
        false
    }

    /// Number of clients ever accepted.
    pub fn tracked_clients(&self) -> usize {
        self.last_accepted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}
