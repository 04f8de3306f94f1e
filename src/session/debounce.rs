use std::fmt;
use std::time::{Duration, Instant};

/// Default quiet period before an auto-triggered run fires.
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// Handle for one scheduled run. A newer trigger replaces the pending ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RunTicket(pub u64);

impl fmt::Display for RunTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run#{}", self.0)
    }
}

/// Single-slot debounced run trigger.
///
/// Every `schedule` replaces the pending ticket and restarts the quiet period; `tick` hands out
/// the ticket once the period has elapsed. Nothing fires on its own, the owner polls.
#[derive(Clone, Debug)]
pub struct DebouncedTrigger {
    delay: Duration,
    pending: Option<(RunTicket, Instant)>,
    next_ticket: u64,
}

impl Default for DebouncedTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

impl DebouncedTrigger {
    /// Trigger with a quiet period of `delay_ms`.
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            pending: None,
            next_ticket: 1,
        }
    }

    /// Quiet period.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Change the quiet period; an already pending deadline is kept.
    pub fn set_delay(&mut self, delay_ms: u64) {
        self.delay = Duration::from_millis(delay_ms);
    }

    /// Schedule a run one quiet period from now.
    pub fn schedule(&mut self) -> RunTicket {
        self.schedule_at(Instant::now())
    }

    /// Schedule a run one quiet period after `now`, superseding any pending ticket.
    pub fn schedule_at(&mut self, now: Instant) -> RunTicket {
        let ticket = RunTicket(self.next_ticket);
        self.next_ticket += 1;
        if let Some((old, _)) = self.pending {
            tracing::trace!(superseded = %old, "debounced run superseded");
        }
        self.pending = Some((ticket, now + self.delay));
        tracing::trace!(%ticket, delay_ms = self.delay.as_millis() as u64, "run scheduled");
        ticket
    }

    /// Put `ticket` back as pending, due at `now`. Used when a due run could not start.
    pub fn rearm(&mut self, ticket: RunTicket, now: Instant) {
        if self.pending.is_none() {
            self.pending = Some((ticket, now));
        }
    }

    /// Drop the pending ticket, if any.
    pub fn cancel(&mut self) {
        if let Some((ticket, _)) = self.pending.take() {
            tracing::trace!(%ticket, "pending run cancelled");
        }
    }

    /// Take the pending ticket if its quiet period has elapsed.
    pub fn tick(&mut self) -> Option<RunTicket> {
        self.tick_at(Instant::now())
    }

    /// [`Self::tick`] against an explicit clock reading.
    pub fn tick_at(&mut self, now: Instant) -> Option<RunTicket> {
        let (ticket, due) = self.pending?;
        if now < due {
            return None;
        }
        self.pending = None;
        tracing::trace!(%ticket, "debounced run due");
        Some(ticket)
    }

    /// `true` while a ticket waits.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The waiting ticket.
    pub fn pending_ticket(&self) -> Option<RunTicket> {
        self.pending.map(|(t, _)| t)
    }

    /// When the waiting ticket becomes due.
    pub fn due_at(&self) -> Option<Instant> {
        self.pending.map(|(_, due)| due)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/debounce.rs"]
mod tests;
