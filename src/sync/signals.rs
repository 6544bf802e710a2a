//! Named Counting Signals
//!
//! The fixed signal table of the formation protocol. Each signal is a bare
//! counting semaphore with two verbs: `notify` (non-blocking increment) and
//! `wait` (block until a matching notify). No payloads travel on these
//! channels; all data moves through the shared [`MatchState`] under its
//! mutex, and correctness rests on the notify/wait counts balancing.
//!
//! Sender/receiver counts per signal:
//!
//! | signal             | direction                 | count per team/run                |
//! |--------------------|---------------------------|-----------------------------------|
//! | `team_ready`       | captain → referee         | 1 per fully formed team           |
//! | `registration_ack` | teammate → captain        | 1 per recruited teammate          |
//! | `match_start`      | referee → bound actors    | 1 per bound actor                 |
//! | `match_end`        | referee → bound actors    | 1 per bound actor                 |
//! | `playing`          | bound actor → referee     | 1 per actor entering play         |
//! | `player_slot_open` | captain → waiting player  | player quota (minus captain)      |
//! | `goalie_slot_open` | captain → waiting goalie  | goalie quota (minus captain)      |
//! | `formation_token`  | captain → next captain    | binary, starts at 1               |
//!
//! [`MatchState`]: crate::game::state::MatchState

use thiserror::Error;
use tokio::sync::Semaphore;

use crate::game::state::Role;

/// Fatal fault of the underlying primitive set.
///
/// A half-consumed signal cannot be safely unwound, so these are never
/// retried: they propagate up and terminate the run with a non-zero status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The signal set was torn down while a wait was pending.
    #[error("signal channel '{signal}' closed while waiting")]
    ChannelClosed {
        /// Name of the signal the wait was parked on.
        signal: &'static str,
    },
}

/// A named counting signal.
#[derive(Debug)]
pub struct Signal {
    name: &'static str,
    sem: Semaphore,
}

impl Signal {
    fn new(name: &'static str, permits: usize) -> Self {
        Self {
            name,
            sem: Semaphore::new(permits),
        }
    }

    /// Signal name, used in logs and fault diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Issue one wake-up. Never blocks.
    pub fn notify(&self) {
        self.sem.add_permits(1);
    }

    /// Issue `n` wake-ups at once (broadcast realized as n notifies).
    pub fn notify_many(&self, n: usize) {
        self.sem.add_permits(n);
    }

    /// Block until a matching notify has been issued, consuming it.
    ///
    /// Fails only when the signal set has been torn down, which is the
    /// non-recoverable environment fault of the protocol.
    pub async fn wait(&self) -> Result<(), SyncError> {
        match self.sem.acquire().await {
            Ok(permit) => {
                permit.forget();
                Ok(())
            }
            Err(_) => Err(SyncError::ChannelClosed { signal: self.name }),
        }
    }

    /// Notifies issued but not yet consumed.
    pub fn pending(&self) -> usize {
        self.sem.available_permits()
    }

    fn close(&self) {
        self.sem.close();
    }
}

/// The complete, fixed signal table of a run.
#[derive(Debug)]
pub struct SignalSet {
    /// Captain → referee: one team is fully formed.
    pub team_ready: Signal,
    /// Recruited teammate → captain: registration done.
    pub registration_ack: Signal,
    /// Referee → bound actors: the match starts.
    pub match_start: Signal,
    /// Referee → bound actors: the match is over.
    pub match_end: Signal,
    /// Bound actor → referee: one actor has entered play.
    pub playing: Signal,
    /// Captain → waiting player: a team slot opened for you.
    pub player_slot_open: Signal,
    /// Captain → waiting goalie: a team slot opened for you.
    pub goalie_slot_open: Signal,
    /// Rendezvous serializer: held by a captain from its first slot-open
    /// to team finalization, so at most one formation is ever in flight.
    pub formation_token: Signal,
}

impl SignalSet {
    /// Build the signal table for a fresh run. All counters start at zero
    /// except the formation token, which starts available.
    pub fn new() -> Self {
        Self {
            team_ready: Signal::new("team_ready", 0),
            registration_ack: Signal::new("registration_ack", 0),
            match_start: Signal::new("match_start", 0),
            match_end: Signal::new("match_end", 0),
            playing: Signal::new("playing", 0),
            player_slot_open: Signal::new("player_slot_open", 0),
            goalie_slot_open: Signal::new("goalie_slot_open", 0),
            formation_token: Signal::new("formation_token", 1),
        }
    }

    /// The slot-open signal a waiting actor of `role` parks on.
    pub fn slot_open(&self, role: Role) -> &Signal {
        match role {
            Role::Player => &self.player_slot_open,
            Role::Goalie => &self.goalie_slot_open,
        }
    }

    /// Tear the whole set down. Every pending and future `wait` fails with
    /// [`SyncError::ChannelClosed`], which unwedges blocked actors after a
    /// fatal fault elsewhere so the run can terminate instead of hanging.
    pub fn tear_down(&self) {
        self.team_ready.close();
        self.registration_ack.close();
        self.match_start.close();
        self.match_end.close();
        self.playing.close();
        self.player_slot_open.close();
        self.goalie_slot_open.close();
        self.formation_token.close();
    }
}

impl Default for SignalSet {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_notify_then_wait() {
        let signal = Signal::new("test", 0);

        signal.notify();
        assert_eq!(signal.pending(), 1);

        signal.wait().await.unwrap();
        assert_eq!(signal.pending(), 0);
    }

    #[tokio::test]
    async fn test_notify_many_counts() {
        let signal = Signal::new("test", 0);

        signal.notify_many(12);
        for _ in 0..12 {
            signal.wait().await.unwrap();
        }
        assert_eq!(signal.pending(), 0);
    }

    #[tokio::test]
    async fn test_wait_blocks_until_notified() {
        let signal = Arc::new(Signal::new("test", 0));

        let waiter = {
            let signal = Arc::clone(&signal);
            tokio::spawn(async move { signal.wait().await })
        };

        // Give the waiter a chance to park, then confirm it hasn't finished
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        signal.notify();
        waiter.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_wait_fails_after_tear_down() {
        let set = Arc::new(SignalSet::new());

        let waiter = {
            let set = Arc::clone(&set);
            tokio::spawn(async move { set.match_start.wait().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        set.tear_down();

        let err = waiter.await.unwrap().unwrap_err();
        assert_eq!(err, SyncError::ChannelClosed { signal: "match_start" });

        // Future waits fail too
        assert!(set.playing.wait().await.is_err());
    }

    #[tokio::test]
    async fn test_formation_token_starts_available() {
        let set = SignalSet::new();

        assert_eq!(set.formation_token.pending(), 1);
        set.formation_token.wait().await.unwrap();
        assert_eq!(set.formation_token.pending(), 0);

        // Handed back after a formation completes
        set.formation_token.notify();
        assert_eq!(set.formation_token.pending(), 1);
    }

    #[tokio::test]
    async fn test_slot_open_routing() {
        let set = SignalSet::new();

        set.slot_open(Role::Player).notify();
        assert_eq!(set.player_slot_open.pending(), 1);
        assert_eq!(set.goalie_slot_open.pending(), 0);

        set.slot_open(Role::Goalie).notify();
        assert_eq!(set.goalie_slot_open.pending(), 1);
    }
}
