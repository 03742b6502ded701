// src/alert_log.rs
//
// Single entry point for user-facing alerts. Every (kind, message) pair
// becomes exactly one Alert record: no filtering, no deduplication, no
// rate limiting. The log holds the 5 most recent alerts, newest first.

use crate::types::{Alert, AlertKind};
use chrono::Utc;
use std::collections::VecDeque;
use tracing::debug;

/// Maximum alerts retained; insertion evicts the oldest past this.
pub const ALERT_LOG_CAP: usize = 5;

pub struct AlertLog {
    entries: VecDeque<Alert>,
    last_id: u64,
}

impl AlertLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(ALERT_LOG_CAP),
            last_id: 0,
        }
    }

    /// Create an alert and prepend it to the log, evicting the oldest
    /// entry when the cap is exceeded.
    pub fn add_alert(&mut self, kind: AlertKind, message: impl Into<String>) -> u64 {
        let id = self.next_id();
        let alert = Alert {
            id,
            kind,
            message: message.into(),
            created_at: Utc::now(),
        };
        debug!(id, kind = kind.as_str(), "alert: {}", alert.message);

        self.entries.push_front(alert);
        self.entries.truncate(ALERT_LOG_CAP);
        id
    }

    /// Time-derived id, forced strictly monotonic so two alerts raised
    /// within the same clock tick can never collide.
    fn next_id(&mut self) -> u64 {
        let now = Utc::now().timestamp_micros().max(0) as u64;
        let id = now.max(self.last_id + 1);
        self.last_id = id;
        id
    }

    /// Alerts newest-first.
    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.entries.iter()
    }

    pub fn newest(&self) -> Option<&Alert> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_is_min_of_cap_and_calls() {
        let mut log = AlertLog::new();
        for i in 0..8 {
            log.add_alert(AlertKind::Info, format!("alert {}", i));
            assert_eq!(log.len(), (i + 1).min(ALERT_LOG_CAP));
        }
    }

    #[test]
    fn test_newest_first_and_oldest_evicted() {
        let mut log = AlertLog::new();
        for i in 0..7 {
            log.add_alert(AlertKind::Warning, format!("alert {}", i));
        }
        let messages: Vec<&str> = log.iter().map(|a| a.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["alert 6", "alert 5", "alert 4", "alert 3", "alert 2"]
        );
    }

    #[test]
    fn test_ids_are_strictly_monotonic() {
        // Adding alerts back-to-back lands inside the same microsecond on
        // fast machines; ids must still never repeat.
        let mut log = AlertLog::new();
        let ids: Vec<u64> = (0..100)
            .map(|_| log.add_alert(AlertKind::Info, "tick"))
            .collect();
        for pair in ids.windows(2) {
            assert!(pair[1] > pair[0], "ids must increase: {:?}", pair);
        }
    }

    #[test]
    fn test_every_call_produces_one_entry() {
        let mut log = AlertLog::new();
        log.add_alert(AlertKind::Danger, "same message");
        log.add_alert(AlertKind::Danger, "same message");
        assert_eq!(log.len(), 2);
    }
}
