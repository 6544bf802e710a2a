//! Match State Definitions
//!
//! The single shared record every actor coordinates through.
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{MATCH_TEAMS, TEAM_GOALIES, TEAM_PLAYERS};

/// Team identifier handed to every bound actor (1-based, monotonic).
pub type TeamId = u32;

// =============================================================================
// ROLE
// =============================================================================

/// The two worker roles contributing to a team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Role {
    /// Field player - a team needs `TEAM_PLAYERS` of these.
    Player = 0,
    /// Goalie - a team needs `TEAM_GOALIES` of these.
    Goalie = 1,
}

impl Role {
    /// Per-team quota for this role.
    #[inline]
    pub fn quota(self) -> u32 {
        match self {
            Role::Player => TEAM_PLAYERS,
            Role::Goalie => TEAM_GOALIES,
        }
    }

    /// Arrival cap for this role: beyond it, arrivals are LATE.
    #[inline]
    pub fn cap(self) -> u32 {
        MATCH_TEAMS * self.quota()
    }

    /// The complementary role.
    #[inline]
    pub fn other(self) -> Role {
        match self {
            Role::Player => Role::Goalie,
            Role::Goalie => Role::Player,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Player => write!(f, "player"),
            Role::Goalie => write!(f, "goalie"),
        }
    }
}

// =============================================================================
// ACTOR ID
// =============================================================================

/// Unique actor identifier: role plus per-role index.
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId {
    /// Actor role.
    pub role: Role,
    /// Index within the role (0-based).
    pub index: u32,
}

impl ActorId {
    /// Create a player id.
    pub const fn player(index: u32) -> Self {
        Self { role: Role::Player, index }
    }

    /// Create a goalie id.
    pub const fn goalie(index: u32) -> Self {
        Self { role: Role::Goalie, index }
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.role, self.index)
    }
}

// =============================================================================
// ACTOR STATUS
// =============================================================================

/// Lifecycle status of a single actor, as recorded in shared state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorStatus {
    /// Actor has entered the ground and is taking its time to arrive.
    Arriving,
    /// Actor's arrival completed a team; it is driving the rendezvous.
    FormingTeam,
    /// Actor is parked until a captain claims it for a team.
    WaitingTeam,
    /// Actor arrived after its role's cap; takes no further part.
    Late,
    /// Actor is bound to a team and waits for the referee's whistle.
    WaitingStart(TeamId),
    /// Actor is on the pitch until the referee ends the match.
    Playing(TeamId),
}

impl ActorStatus {
    /// Team this status is bound to, if any.
    pub fn team(self) -> Option<TeamId> {
        match self {
            ActorStatus::WaitingStart(team) | ActorStatus::Playing(team) => Some(team),
            _ => None,
        }
    }
}

// =============================================================================
// MATCH STATE
// =============================================================================

/// Complete shared state of a match-day run.
///
/// One instance exists per run; every actor holds a non-owning handle and
/// mutates it only under the field mutex. The counter arithmetic lives here
/// as small pure methods so the invariants of formation can be unit-tested
/// without any concurrency. Serialization goes through
/// [`StateSnapshot`](crate::journal::StateSnapshot), not this live record.
#[derive(Clone, Debug)]
pub struct MatchState {
    /// Players processed so far (monotonic, includes LATE arrivals).
    pub players_arrived: u32,
    /// Players available for team assignment.
    pub players_free: u32,
    /// Goalies processed so far (monotonic, includes LATE arrivals).
    pub goalies_arrived: u32,
    /// Goalies available for team assignment.
    pub goalies_free: u32,
    /// Next team id to hand out (1-based, monotonic, never reused).
    pub next_team_id: TeamId,
    /// Per-actor status table (BTreeMap for deterministic iteration).
    pub statuses: BTreeMap<ActorId, ActorStatus>,
}

impl MatchState {
    /// Create the state for a fresh run.
    pub fn new() -> Self {
        Self {
            players_arrived: 0,
            players_free: 0,
            goalies_arrived: 0,
            goalies_free: 0,
            next_team_id: 1,
            statuses: BTreeMap::new(),
        }
    }

    /// Arrivals processed so far for a role.
    #[inline]
    pub fn arrived(&self, role: Role) -> u32 {
        match role {
            Role::Player => self.players_arrived,
            Role::Goalie => self.goalies_arrived,
        }
    }

    /// Actors of a role currently available for team assignment.
    #[inline]
    pub fn free(&self, role: Role) -> u32 {
        match role {
            Role::Player => self.players_free,
            Role::Goalie => self.goalies_free,
        }
    }

    /// Count one arrival for a role: bumps both the arrived and the free
    /// counter. Returns the new arrival count.
    pub fn register_arrival(&mut self, role: Role) -> u32 {
        match role {
            Role::Player => {
                self.players_arrived += 1;
                self.players_free += 1;
                self.players_arrived
            }
            Role::Goalie => {
                self.goalies_arrived += 1;
                self.goalies_free += 1;
                self.goalies_arrived
            }
        }
    }

    /// Whether the latest arrival of this role fell beyond the cap.
    #[inline]
    pub fn past_cap(&self, role: Role) -> bool {
        self.arrived(role) > role.cap()
    }

    /// Mark an actor LATE and withdraw it from the free pool, compensating
    /// for the increment its registration made. LATE actors stay counted in
    /// `arrived` but never contribute to a team.
    pub fn mark_late(&mut self, id: ActorId) {
        debug_assert!(self.free(id.role) > 0);
        match id.role {
            Role::Player => self.players_free -= 1,
            Role::Goalie => self.goalies_free -= 1,
        }
        self.statuses.insert(id, ActorStatus::Late);
    }

    /// Whether a full team can be formed from the free pools right now.
    #[inline]
    pub fn quotas_satisfiable(&self) -> bool {
        self.players_free >= TEAM_PLAYERS && self.goalies_free >= TEAM_GOALIES
    }

    /// Reserve one full team out of the free pools.
    ///
    /// Must only be called when `quotas_satisfiable()`; the election
    /// critical section does both in one breath so no later arrival can be
    /// elected off counters that still include this cohort.
    pub fn reserve_team(&mut self) {
        debug_assert!(self.quotas_satisfiable());
        self.players_free -= TEAM_PLAYERS;
        self.goalies_free -= TEAM_GOALIES;
    }

    /// Hand out the current team id and advance to the next.
    pub fn consume_team_id(&mut self) -> TeamId {
        let id = self.next_team_id;
        self.next_team_id += 1;
        id
    }

    /// Record an actor's status.
    pub fn set_status(&mut self, id: ActorId, status: ActorStatus) {
        self.statuses.insert(id, status);
    }

    /// Look up an actor's status.
    pub fn status_of(&self, id: ActorId) -> Option<ActorStatus> {
        self.statuses.get(&id).copied()
    }

    /// Count actors currently recorded with a given status.
    pub fn count_status(&self, status: ActorStatus) -> usize {
        self.statuses.values().filter(|s| **s == status).count()
    }

    /// Count actors playing for a given team.
    pub fn playing_for(&self, team: TeamId) -> usize {
        self.count_status(ActorStatus::Playing(team))
    }

    /// The core counter invariant: free never exceeds arrived.
    /// (Non-negativity is structural - the counters are unsigned.)
    pub fn counters_consistent(&self) -> bool {
        self.players_free <= self.players_arrived && self.goalies_free <= self.goalies_arrived
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================
