//! Shared Field Handle
//!
//! The single shared record of a run: the match state behind its mutex,
//! the signal table, and the journal. This is the in-process analog of a
//! shared-memory segment - actors "attach" by cloning the `Arc` handle and
//! "detach" by dropping it.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::game::state::MatchState;
use crate::journal::{Journal, StateSnapshot};
use crate::sync::SignalSet;

/// Shared coordination surface handed to every actor and the referee.
#[derive(Debug)]
pub struct Field {
    state: Mutex<MatchState>,
    signals: SignalSet,
    journal: Journal,
}

impl Field {
    /// Build the field for a fresh run.
    pub fn attach(journal: Journal) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MatchState::new()),
            signals: SignalSet::new(),
            journal,
        })
    }

    /// Acquire the state lock.
    ///
    /// Critical sections are kept short: the lock is never held across a
    /// signal wait, a sleep, or any I/O.
    pub async fn lock(&self) -> MutexGuard<'_, MatchState> {
        self.state.lock().await
    }

    /// The run's signal table.
    pub fn signals(&self) -> &SignalSet {
        &self.signals
    }

    /// The run's journal handle.
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Persist the current state to the journal.
    ///
    /// Called after every mutation while the lock is still held, so
    /// snapshot order equals mutation order. Handing off to the journal
    /// channel never blocks.
    pub fn persist(&self, state: &MatchState) {
        self.journal.record_state(StateSnapshot::of(state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::Role;
    use crate::journal::JournalEntry;

    #[tokio::test]
    async fn test_attach_starts_clean() {
        let field = Field::attach(Journal::null());
        let state = field.lock().await;

        assert_eq!(state.players_arrived, 0);
        assert_eq!(state.goalies_arrived, 0);
        assert_eq!(state.next_team_id, 1);
        assert_eq!(field.signals().team_ready.pending(), 0);
    }

    #[tokio::test]
    async fn test_persist_snapshots_in_mutation_order() {
        let (journal, mut rx) = Journal::capture();
        let field = Field::attach(journal);

        {
            let mut state = field.lock().await;
            state.register_arrival(Role::Player);
            field.persist(&state);
            state.register_arrival(Role::Player);
            field.persist(&state);
        }

        for expected_arrived in 1..=2u32 {
            let record = rx.recv().await.unwrap();
            match record.entry {
                JournalEntry::State(snap) => {
                    assert_eq!(snap.players_arrived, expected_arrived)
                }
                other => panic!("expected state record, got {:?}", other),
            }
        }
    }
}
