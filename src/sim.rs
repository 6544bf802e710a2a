//! Simulation Orchestrator
//!
//! Builds the shared field, spawns every actor task plus the referee,
//! joins them all, and reports how the teams came together. On the first
//! fatal fault the signal set is torn down so parked tasks fail fast
//! instead of hanging the run.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{error, info};
use uuid::Uuid;

use crate::core::rng::DeterministicRng;
use crate::game::field::Field;
use crate::game::lifecycle::{Actor, ActorOutcome, JitterMs};
use crate::game::referee::Referee;
use crate::game::state::{ActorId, TeamId};
use crate::journal::{Journal, RunMetadata, StateSnapshot};
use crate::sync::SyncError;
use crate::{SQUAD_GOALIES, SQUAD_PLAYERS, TEAM_SIZE};

/// Configuration for a simulation run.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Players to spawn.
    pub players: u32,
    /// Goalies to spawn.
    pub goalies: u32,
    /// Arrival jitter bounds in milliseconds, inclusive.
    pub jitter_ms: JitterMs,
    /// Match playing time.
    pub match_len: Duration,
    /// Base RNG seed; `None` draws one from system entropy.
    pub seed: Option<u64>,
    /// JSON-lines journal path; `None` disables journaling.
    pub journal_path: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            players: SQUAD_PLAYERS,
            goalies: SQUAD_GOALIES,
            jitter_ms: (5, 40),
            match_len: Duration::from_millis(250),
            seed: None,
            journal_path: None,
        }
    }
}

/// Simulation errors.
#[derive(Debug, Error)]
pub enum SimError {
    /// Too few actors to ever complete both teams: the run would park
    /// waiters forever (the protocol has no timeouts by design).
    #[error(
        "under-provisioned run: need at least {} players and {} goalies, got {players} and {goalies}",
        SQUAD_PLAYERS, SQUAD_GOALIES
    )]
    UnderProvisioned {
        /// Configured player count.
        players: u32,
        /// Configured goalie count.
        goalies: u32,
    },

    /// Fatal primitive fault (never retried).
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Could not open the journal sink.
    #[error("failed to open journal: {0}")]
    Journal(#[from] std::io::Error),

    /// An actor, referee, or writer task died.
    #[error("task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Conservation violated: a team ended with the wrong member count.
    #[error("team {team} bound {members} actors, expected {expected}")]
    Conservation {
        /// Offending team id.
        team: TeamId,
        /// Actors that reported this team.
        members: usize,
        /// Expected team size.
        expected: usize,
    },

    /// Team ids were not handed out contiguously from 1.
    #[error("{formed} teams formed but highest team id is {highest}")]
    NonContiguousTeams {
        /// Highest team id seen in outcomes.
        highest: TeamId,
        /// Number of distinct teams formed.
        formed: usize,
    },
}

/// Outcome summary of a completed run.
#[derive(Clone, Debug)]
pub struct SimReport {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// Base seed the run's jitter derived from.
    pub base_seed: u64,
    /// Per-actor outcomes, in join order.
    pub outcomes: Vec<ActorOutcome>,
    /// Actors bound per team.
    pub teams: BTreeMap<TeamId, usize>,
    /// Actors that arrived past their role's cap.
    pub late: usize,
    /// Final shared state.
    pub final_state: StateSnapshot,
}

impl SimReport {
    /// Build the report and verify the conservation property: every team
    /// ever assigned bound exactly `TEAM_SIZE` actors, with ids handed out
    /// contiguously from 1.
    fn build(
        run_id: Uuid,
        base_seed: u64,
        outcomes: Vec<ActorOutcome>,
        final_state: StateSnapshot,
    ) -> Result<Self, SimError> {
        let mut teams: BTreeMap<TeamId, usize> = BTreeMap::new();
        let mut late = 0;
        for outcome in &outcomes {
            match outcome.team {
                Some(team) => *teams.entry(team).or_default() += 1,
                None => late += 1,
            }
        }

        for (team, members) in &teams {
            if *members != TEAM_SIZE as usize {
                return Err(SimError::Conservation {
                    team: *team,
                    members: *members,
                    expected: TEAM_SIZE as usize,
                });
            }
        }

        // Ids are monotonic from 1, so n teams must occupy exactly 1..=n
        if let Some(max) = teams.keys().max() {
            if *max as usize != teams.len() {
                return Err(SimError::NonContiguousTeams {
                    highest: *max,
                    formed: teams.len(),
                });
            }
        }

        Ok(Self {
            run_id,
            base_seed,
            outcomes,
            teams,
            late,
            final_state,
        })
    }
}

/// A full match-day run.
pub struct Simulation {
    config: SimConfig,
}

impl Simulation {
    /// Create a simulation from its configuration.
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    /// Run to completion and report.
    pub async fn run(self) -> Result<SimReport, SimError> {
        let cfg = &self.config;

        // Completion needs both teams to fill; with fewer actors than the
        // caps, waiters would park forever (no timeouts by design).
        if cfg.players < SQUAD_PLAYERS || cfg.goalies < SQUAD_GOALIES {
            return Err(SimError::UnderProvisioned {
                players: cfg.players,
                goalies: cfg.goalies,
            });
        }

        let base_seed = cfg.seed.unwrap_or_else(entropy_seed);
        let run_id = Uuid::new_v4();

        let (journal, writer) = match &cfg.journal_path {
            Some(path) => {
                let (journal, writer) = Journal::to_file(path).await?;
                (journal, Some(writer))
            }
            None => (Journal::null(), None),
        };
        journal.record_meta(RunMetadata {
            run_id,
            base_seed,
            players: cfg.players,
            goalies: cfg.goalies,
            started_at: Utc::now(),
        });

        let field = Field::attach(journal);

        info!(
            "Run {}: {} players, {} goalies, seed {}",
            run_id, cfg.players, cfg.goalies, base_seed
        );

        // Launch in shuffled order for extra interleaving variety on top
        // of the per-actor arrival jitter.
        let mut ids: Vec<ActorId> = (0..cfg.players).map(ActorId::player).collect();
        ids.extend((0..cfg.goalies).map(ActorId::goalie));
        DeterministicRng::new(base_seed).shuffle(&mut ids);

        // Referee and actors share one join set; the referee yields no
        // actor outcome.
        let mut tasks: JoinSet<Result<Option<ActorOutcome>, SyncError>> = JoinSet::new();
        {
            let field = Arc::clone(&field);
            let match_len = cfg.match_len;
            tasks.spawn(async move { Referee::new(field, match_len).run().await.map(|()| None) });
        }
        for id in ids {
            let rng = DeterministicRng::for_actor(base_seed, id.role, id.index);
            let actor = Actor::new(id, Arc::clone(&field), rng, cfg.jitter_ms);
            tasks.spawn(async move { actor.run().await.map(Some) });
        }

        let mut outcomes = Vec::new();
        let mut fault: Option<SimError> = None;
        while let Some(joined) = tasks.join_next().await {
            let failed: SimError = match joined {
                Ok(Ok(Some(outcome))) => {
                    outcomes.push(outcome);
                    continue;
                }
                Ok(Ok(None)) => continue,
                Ok(Err(sync_err)) => sync_err.into(),
                Err(join_err) => join_err.into(),
            };
            if fault.is_none() {
                error!("Fatal fault, tearing the run down: {}", failed);
                field.signals().tear_down();
                fault = Some(failed);
            }
        }

        let final_state = {
            let state = field.lock().await;
            StateSnapshot::of(&state)
        };

        // Every task has joined: dropping the field releases the last
        // journal handle so the writer can flush and exit.
        drop(field);
        if let Some(writer) = writer {
            writer.await?;
        }

        if let Some(fault) = fault {
            return Err(fault);
        }

        let report = SimReport::build(run_id, base_seed, outcomes, final_state)?;
        info!(
            "Run {} complete: {} teams formed, {} late",
            run_id,
            report.teams.len(),
            report.late
        );
        Ok(report)
    }
}

/// Entropy fallback for unseeded runs.
fn entropy_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    nanos ^ u64::from(std::process::id()).rotate_left(32)
}

// =============================================================================
// TESTS
// =============================================================================
