use std::time::Duration;
use std::time::Instant;

/// Decides when the next generation is due.
///
/// The ticker holds no board and never steps anything itself. The caller asks it on every pass of
/// its loop, handing in whether the simulation is running, and steps only when told to. A paused
/// simulation never fires, and resuming fires straight away before settling into the interval.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,

    /// When the next step is due, or `None` while paused
    next: Option<Instant>,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: None,
        }
    }

    /// Returns `true` if a step should happen at `now`, and if so schedules the following one.
    pub fn poll(&mut self, now: Instant, running: bool) -> bool {
        if !running {
            self.next = None;
            return false;
        }

        match self.next {
            Some(due) if now < due => false,
            _ => {
                self.next = Some(now + self.interval);
                true
            }
        }
    }

    /// How long until the next step is due. `None` while paused.
    pub fn time_left(&self, now: Instant) -> Option<Duration> {
        self.next.map(|due| due.saturating_duration_since(now))
    }
}
