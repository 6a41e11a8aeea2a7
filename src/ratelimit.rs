use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use log::debug;

/// Counter for the current fixed window
#[derive(Debug, Clone, Copy)]
struct RateWindow {
    start: Instant,
    count: u32,
}

impl RateWindow {
    fn new(now: Instant) -> Self {
        Self { start: now, count: 0 }
    }

    /// Reset if `now` is past the window, count the call, and report the
    /// remaining wait when the ceiling has been exceeded.
    fn admit(&mut self, now: Instant, max: u32, window: Duration) -> Result<(), Duration> {
        if now.saturating_duration_since(self.start) > window {
            *self = RateWindow::new(now);
        }
        self.count = self.count.saturating_add(1);

        if self.count > max {
            Err(window.saturating_sub(now.saturating_duration_since(self.start)))
        } else {
            Ok(())
        }
    }
}

/// Process-wide limiter: at most `max` admissions per `window`
#[derive(Debug)]
pub struct RateLimiter {
    max: u32,
    window: Duration,
    state: Mutex<Option<RateWindow>>,
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            state: Mutex::new(None),
        }
    }

    /// Count a call; `Err` carries how long until the window resets.
    pub fn check(&self) -> Result<(), Duration> {
        self.check_at(Instant::now())
    }

    pub fn check_at(&self, now: Instant) -> Result<(), Duration> {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // The first window opens with the first call.
        let current = state.get_or_insert_with(|| RateWindow::new(now));
        let result = current.admit(now, self.max, self.window);
        if result.is_err() {
            debug!("Rate limit exceeded: {} calls in current window", current.count);
        }
        result
    }
}

/// Per-caller variant, keyed by e.g. client network address
#[derive(Debug)]
pub struct KeyedRateLimiter<K> {
    max: u32,
    window: Duration,
    windows: Mutex<HashMap<K, RateWindow>>,
}

impl<K: Eq + Hash> KeyedRateLimiter<K> {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn check(&self, key: K) -> Result<(), Duration> {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: K, now: Instant) -> Result<(), Duration> {
        let mut windows = self.windows.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        windows.retain(|_, w| now.saturating_duration_since(w.start) <= self.window);
        windows
            .entry(key)
            .or_insert_with(|| RateWindow::new(now))
            .admit(now, self.max, self.window)
    }

    pub fn tracked(&self) -> usize {
        self.windows.lock().map(|w| w.len()).unwrap_or_default()
    }
}
