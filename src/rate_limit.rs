use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

pub const LOGIN_WINDOW: Duration = Duration::from_secs(15 * 60);
pub const LOGIN_MAX_FAILURES: u32 = 5;

/// Wrong codes accepted per email and code kind before the code is voided.
pub const CODE_MAX_FAILURES: u32 = 5;
pub const CODE_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Counts failed attempts per key inside a fixed window.
///
/// Used per email for logins and per (kind, email) for verification and reset codes.
pub struct FailureLimiter {
    /// key -> (failed_count, window_start)
    entries: DashMap<String, (u32, Instant)>,
    max_failures: u32,
    window: Duration,
}

impl FailureLimiter {
    pub fn new(max_failures: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_failures,
            window,
        }
    }

    pub fn for_login() -> Self {
        Self::new(LOGIN_MAX_FAILURES, LOGIN_WINDOW)
    }

    pub fn for_codes() -> Self {
        Self::new(CODE_MAX_FAILURES, CODE_WINDOW)
    }

    /// Check if another attempt is allowed. Returns Err with the seconds left when locked.
    /// Does NOT increment the counter, call `record_failure()` on a wrong secret.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        let now = Instant::now();

        let Some(entry) = self.entries.get(&key.to_lowercase()) else {
            return Ok(());
        };

        let (count, start) = entry.value();
        let elapsed = now.duration_since(*start);

        if elapsed > self.window || *count < self.max_failures {
            return Ok(());
        }

        Err(self.window.saturating_sub(elapsed).as_secs().max(1))
    }

    /// Record a failed attempt. Returns true when this failure locked the key.
    pub fn record_failure(&self, key: &str) -> bool {
        let now = Instant::now();

        let mut entry = self.entries.entry(key.to_lowercase()).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > self.window {
            *count = 1;
            *start = now;
        } else {
            *count += 1;
        }

        *count >= self.max_failures
    }

    /// Forget failures after a success.
    pub fn reset(&self, key: &str) {
        self.entries.remove(&key.to_lowercase());
    }

    pub fn cleanup(&self) {
        let now = Instant::now();
        let window = self.window;
        self.entries.retain(|_, (_, start)| now.duration_since(*start) < window);
    }
}

/// Minimum spacing between two verification-code emails for the same address.
pub struct ResendCooldown {
    /// email -> last send
    entries: DashMap<String, Instant>,
    cooldown: Duration,
}

impl ResendCooldown {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            cooldown,
        }
    }

    /// Claims a send slot. Returns Err with the seconds left when still cooling down.
    pub fn try_acquire(&self, email: &str) -> Result<(), u64> {
        let now = Instant::now();

        match self.entries.entry(email.to_lowercase()) {
            Entry::Occupied(mut entry) => {
                let elapsed = now.duration_since(*entry.get());
                if elapsed < self.cooldown {
                    return Err((self.cooldown - elapsed).as_secs().max(1));
                }
                entry.insert(now);
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
            }
        }

        Ok(())
    }

    /// Drop a claimed slot, e.g. when the email could not be sent.
    pub fn release(&self, email: &str) {
        self.entries.remove(&email.to_lowercase());
    }

    pub fn cleanup(&self) {
        let now = Instant::now();
        let cooldown = self.cooldown;
        self.entries.retain(|_, last| now.duration_since(*last) < cooldown);
    }
}
