use crate::domain::Result;
use std::time::{Duration, Instant};

/// Coalesces mutations into one save per debounce window.
///
/// Every [`schedule`](Self::schedule) call pushes the deadline out to
/// `now + delay`, so a burst of mutations produces a single save once the
/// burst goes quiet.
///
/// # Failure Latch
///
/// The first failed save produces a notification; subsequent failures stay
/// silent until a successful save resets the latch, so a sustained outage
/// raises one notice rather than one per attempt.
///
/// # Retry
///
/// A failed save leaves the catalog dirty: a retry is scheduled after a
/// back-off that doubles with each consecutive failure, capped at
/// [`MAX_RETRY_DELAY`]. A new mutation restarts the normal debounce window.
///
/// # Examples
///
/// ```
/// use quickdock::persistence::SaveScheduler;
/// use std::time::{Duration, Instant};
///
/// let mut saves = SaveScheduler::new(Duration::from_millis(400));
/// let t0 = Instant::now();
/// saves.schedule(t0);
/// saves.schedule(t0 + Duration::from_millis(300));
/// assert!(!saves.take_due(t0 + Duration::from_millis(500)));
/// assert!(saves.take_due(t0 + Duration::from_millis(700)));
/// assert!(!saves.is_pending());
/// ```
#[derive(Debug, Clone)]
pub struct SaveScheduler {
    delay: Duration,
    deadline: Option<Instant>,
    failure_reported: bool,
    consecutive_failures: u32,
}

/// Upper bound on the retry back-off after failed saves.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

impl SaveScheduler {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
            failure_reported: false,
            consecutive_failures: 0,
        }
    }

    /// Marks the catalog dirty, restarting the debounce window.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
        tracing::trace!(delay = ?self.delay, "save scheduled");
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Clears and reports a due save.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Clears a pending save regardless of its deadline (teardown flush).
    pub fn take_pending(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Delay before retrying after the current run of failures.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        let factor = 1u32 << self.consecutive_failures.min(16);
        self.delay.saturating_mul(factor).min(MAX_RETRY_DELAY)
    }

    /// Records a save outcome. Returns the message to surface, if any.
    ///
    /// A failure schedules a retry unless a newer mutation already has a
    /// save pending.
    pub fn record_result(&mut self, result: &Result<()>, now: Instant) -> Option<String> {
        if result.is_err() {
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            if self.deadline.is_none() {
                let retry = self.retry_delay();
                tracing::debug!(retry = ?retry, failures = self.consecutive_failures, "save retry scheduled");
                self.deadline = Some(now + retry);
            }
        }

        match result {
            Ok(()) => {
                if self.failure_reported {
                    tracing::info!("catalog save recovered");
                }
                self.failure_reported = false;
                self.consecutive_failures = 0;
                None
            }
            Err(e) if self.failure_reported => {
                tracing::warn!(error = %e, "catalog save failed again, already reported");
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "catalog save failed");
                self.failure_reported = true;
                Some(format!("Failed to save: {e}"))
            }
        }
    }
}
