//! Per-session timeout watchers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::time::{self, Instant, MissedTickBehavior};

use crate::actor::{Actor, ActorId};
use crate::guard;
use crate::handler::Shared;
use crate::session::SessionId;

/// What a watcher found on one wake-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tick {
    /// Countdown decremented, keep watching.
    Pending,
    /// Countdown ran out; session removed.
    Expired,
    /// The actor's registered session is no longer this one.
    Stale,
    Disposed,
}

/// Converts poll wake-ups into whole game ticks, carrying the fraction.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TickClock {
    per_poll: i64,
    carry: i64,
}

impl TickClock {
    pub(crate) fn new(milliticks_per_poll: i64) -> Self {
        Self {
            per_poll: milliticks_per_poll,
            carry: 0,
        }
    }

    /// Whole ticks elapsed since the previous wake-up.
    pub(crate) fn advance(&mut self) -> i64 {
        self.carry = self.carry.saturating_add(self.per_poll);
        let whole = self.carry / 1000;
        self.carry %= 1000;
        whole
    }
}

/// Spawn the watcher for session `id` of `actor`.
///
/// The task holds only a weak reference to the handler state and exits on
/// the first wake-up after cancellation, supersession, or disposal.
pub(crate) fn spawn<A: Actor>(
    shared: &Arc<Shared<A>>,
    actor: ActorId,
    id: SessionId,
    cancelled: Arc<AtomicBool>,
) {
    let weak = Arc::downgrade(shared);
    let period = shared.config.poll_interval;
    let per_poll = shared.config.milliticks_per_poll();
    // Anchored at start time, not at whenever the task first gets polled.
    let start = Instant::now() + period;

    shared.runtime.spawn(async move {
        let mut ticker = time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut clock = TickClock::new(per_poll);
        loop {
            ticker.tick().await;
            let step = clock.advance();
            if cancelled.load(Ordering::Acquire) {
                tracing::trace!(actor = %actor, session = %id, "Watcher cancelled");
                return;
            }
            let Some(shared) = weak.upgrade() else {
                return;
            };
            match tick(&shared, actor, id, step) {
                Tick::Pending => {}
                outcome => {
                    tracing::trace!(actor = %actor, session = %id, ?outcome, "Watcher finished");
                    return;
                }
            }
        }
    });
}

/// Advance the countdown of session `id` by `step` ticks.
pub(crate) fn tick<A: Actor>(shared: &Shared<A>, actor: ActorId, id: SessionId, step: i64) -> Tick {
    if shared.is_disposed() {
        return Tick::Disposed;
    }
    let mut sessions = shared.registry.lock();
    if shared.is_disposed() {
        return Tick::Disposed;
    }

    let Some(session) = sessions.get_mut(&actor).filter(|s| s.id == id) else {
        tracing::debug!(actor = %actor, session = %id, "Watcher outlived its session");
        return Tick::Stale;
    };
    session.remaining_ticks -= step;
    if session.remaining_ticks > 0 {
        return Tick::Pending;
    }

    let Some(mut session) = sessions.remove(&actor) else {
        return Tick::Stale;
    };
    if let Some(on_expire) = session.on_expire.take() {
        let target = Arc::clone(&session.actor);
        if !target.is_connected() {
            tracing::debug!(actor = %actor, session = %id, "Actor disconnected, skipping expiry callback");
        } else if let Err(e) = guard::invoke(shared.owner_key(), || on_expire(&target)) {
            tracing::error!(
                actor = %actor,
                name = target.name(),
                session = %id,
                error = %e,
                "Expiry callback failed"
            );
        }
    }
    tracing::debug!(actor = %actor, session = %id, "Interaction expired");
    Tick::Expired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HandlerConfig;
    use interplay_common::InteractionConfig;

    fn polls_until_expired(poll_interval_ms: u64) -> i64 {
        let config = HandlerConfig::from_config(&InteractionConfig {
            poll_interval_ms,
            ..Default::default()
        });
        let mut clock = TickClock::new(config.milliticks_per_poll());
        let mut remaining = config.timeout_ticks;
        let mut polls = 0;
        while remaining > 0 {
            remaining -= clock.advance();
            polls += 1;
        }
        polls
    }

    #[test]
    fn whole_ticks_per_poll() {
        let mut clock = TickClock::new(6_000);
        assert_eq!(clock.advance(), 6);
        assert_eq!(clock.advance(), 6);
    }

    #[test]
    fn fractional_ticks_carry_over() {
        // 60 tps at 25 ms is one and a half ticks per poll.
        let mut clock = TickClock::new(1_500);
        let steps: Vec<i64> = (0..4).map(|_| clock.advance()).collect();
        assert_eq!(steps, vec![1, 2, 1, 2]);
    }

    #[test]
    fn countdown_matches_configured_timeout() {
        assert_eq!(polls_until_expired(100) * 100, 20_000);
        assert_eq!(polls_until_expired(25) * 25, 20_000);
        assert_eq!(polls_until_expired(250) * 250, 20_000);

        let polls = polls_until_expired(30);
        assert_eq!(polls, 667);
    }
}
