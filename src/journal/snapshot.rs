//! Journal Records
//!
//! Serializable records of run progression: one metadata header plus one
//! state snapshot per shared-state mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::state::{ActorId, ActorStatus, MatchState, TeamId};

/// Current journal format version.
pub const JOURNAL_VERSION: u8 = 1;

/// Run metadata, recorded once when the field is attached.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// Base RNG seed the per-actor jitter streams derive from.
    pub base_seed: u64,
    /// Players spawned for this run.
    pub players: u32,
    /// Goalies spawned for this run.
    pub goalies: u32,
    /// Wall-clock start of the run.
    pub started_at: DateTime<Utc>,
}

/// Point-in-time copy of the shared match state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Wall-clock capture time.
    pub captured_at: DateTime<Utc>,
    /// Players processed so far.
    pub players_arrived: u32,
    /// Players available for team assignment.
    pub players_free: u32,
    /// Goalies processed so far.
    pub goalies_arrived: u32,
    /// Goalies available for team assignment.
    pub goalies_free: u32,
    /// Next team id to hand out.
    pub next_team_id: TeamId,
    /// Full status table at capture time, in id order.
    pub statuses: Vec<(ActorId, ActorStatus)>,
}

impl StateSnapshot {
    /// Capture the current state.
    pub fn of(state: &MatchState) -> Self {
        Self {
            captured_at: Utc::now(),
            players_arrived: state.players_arrived,
            players_free: state.players_free,
            goalies_arrived: state.goalies_arrived,
            goalies_free: state.goalies_free,
            next_team_id: state.next_team_id,
            statuses: state.statuses.iter().map(|(id, st)| (*id, *st)).collect(),
        }
    }
}

/// One journal line.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JournalRecord {
    /// Format version for forward compatibility.
    pub version: u8,
    /// Sequence number, totally ordered by mutation order.
    pub seq: u64,
    /// Record payload.
    pub entry: JournalEntry,
}

/// Journal record payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JournalEntry {
    /// Run header.
    Meta(RunMetadata),
    /// State after one mutation.
    State(StateSnapshot),
}
