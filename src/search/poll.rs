//! Bounded polling loops around a match attempt.
//!
//! The deadline is checked only after each attempt returns, so a loop may
//! overrun its timeout by at most one attempt. Pacing sleeps never cross the
//! deadline.

use crate::geometry::Location;
use crate::util::FinderResult;
use std::time::{Duration, Instant};
use tracing::debug;

/// Result of waiting for a pattern to disappear.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VanishOutcome {
    /// An attempt matched nothing before the deadline.
    Vanished,
    /// Every attempt until the deadline still matched.
    StillPresent,
    /// The pattern cannot fit the region, so the loop never ran.
    NotApplicable,
}

impl VanishOutcome {
    pub fn is_vanished(&self) -> bool {
        matches!(self, Self::Vanished)
    }
}

struct Deadline {
    end: Option<Instant>,
    interval: Option<Duration>,
}

impl Deadline {
    fn new(start: Instant, timeout: Duration, interval: Option<Duration>) -> Self {
        Self {
            end: start.checked_add(timeout),
            interval,
        }
    }

    fn expired(&self, now: Instant) -> bool {
        self.end.is_some_and(|end| now >= end)
    }

    /// Sleeps until the next iteration may start, capped at the deadline.
    fn pace(&self, iteration_start: Instant, now: Instant) {
        let Some(interval) = self.interval else {
            return;
        };
        let Some(mut wake) = iteration_start.checked_add(interval) else {
            return;
        };
        if let Some(end) = self.end {
            wake = wake.min(end);
        }
        if wake > now {
            std::thread::sleep(wake - now);
        }
    }
}

/// Runs `attempt` until it reports exactly one location or `timeout` elapses.
///
/// Returns `Ok(None)` on timeout; attempt errors end the loop immediately.
pub fn wait_until_found<F>(
    timeout: Duration,
    interval: Option<Duration>,
    mut attempt: F,
) -> FinderResult<Option<Location>>
where
    F: FnMut() -> FinderResult<Vec<Location>>,
{
    let start = Instant::now();
    let deadline = Deadline::new(start, timeout, interval);
    let mut attempts = 0usize;
    loop {
        let iteration_start = Instant::now();
        let found = attempt()?;
        attempts += 1;
        if let [location] = found.as_slice() {
            debug!(attempts, %location, "pattern appeared");
            return Ok(Some(*location));
        }
        let now = Instant::now();
        if deadline.expired(now) {
            debug!(attempts, elapsed_ms = (now - start).as_millis() as u64, "wait timed out");
            return Ok(None);
        }
        deadline.pace(iteration_start, now);
    }
}

/// Runs `attempt` until it reports no locations or `timeout` elapses.
pub fn wait_until_vanished<F>(
    timeout: Duration,
    interval: Option<Duration>,
    mut attempt: F,
) -> FinderResult<VanishOutcome>
where
    F: FnMut() -> FinderResult<Vec<Location>>,
{
    let start = Instant::now();
    let deadline = Deadline::new(start, timeout, interval);
    let mut attempts = 0usize;
    loop {
        let iteration_start = Instant::now();
        let found = attempt()?;
        attempts += 1;
        if found.is_empty() {
            debug!(attempts, "pattern vanished");
            return Ok(VanishOutcome::Vanished);
        }
        let now = Instant::now();
        if deadline.expired(now) {
            debug!(attempts, "pattern still present at deadline");
            return Ok(VanishOutcome::StillPresent);
        }
        deadline.pace(iteration_start, now);
    }
}
