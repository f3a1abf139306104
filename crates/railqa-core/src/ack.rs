//! Transient "copied" acknowledgment.

use std::time::Duration;

use tokio::time::Instant;

/// How long a copy acknowledgment stays visible.
pub const COPY_ACK_HOLD: Duration = Duration::from_secs(2);

/// A flag that remembers which item was last copied and expires on its own.
///
/// Expiry is evaluated lazily against the tokio clock, so no timer task is
/// needed and paused-clock tests can step through it.
#[derive(Debug, Clone)]
pub struct CopyAck<K> {
    active: Option<(K, Instant)>,
    hold: Duration,
}

impl<K: Clone> Default for CopyAck<K> {
    fn default() -> Self {
        Self::new(COPY_ACK_HOLD)
    }
}

impl<K: Clone> CopyAck<K> {
    pub fn new(hold: Duration) -> Self {
        Self { active: None, hold }
    }

    /// Acknowledge a copy of `key`, replacing any earlier acknowledgment.
    pub fn mark(&mut self, key: K) {
        self.active = Some((key, Instant::now() + self.hold));
    }

    /// The acknowledged key, if its hold period has not elapsed.
    pub fn current(&self) -> Option<K> {
        match &self.active {
            Some((key, until)) if Instant::now() < *until => Some(key.clone()),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}
