//! Actor Lifecycle
//!
//! The per-actor state machine: arrive → constitute-team → wait-for-referee
//! → play-until-end. Players and goalies run the identical sequence; only
//! their team-size contribution differs, and that lives in [`Role`].
//!
//! A LATE actor stops after constitute-team and never parks on the
//! match-start/end signals.
//!
//! [`Role`]: crate::game::state::Role

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::core::rng::DeterministicRng;
use crate::game::field::Field;
use crate::game::formation;
use crate::game::state::{ActorId, ActorStatus, TeamId};
use crate::sync::SyncError;

/// Arrival jitter bounds in milliseconds, inclusive.
pub type JitterMs = (u64, u64);

/// What became of an actor once its lifecycle finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActorOutcome {
    /// The actor.
    pub id: ActorId,
    /// Team the actor played for, or `None` if it arrived LATE.
    pub team: Option<TeamId>,
}

/// One concurrent participant (player or goalie).
pub struct Actor {
    id: ActorId,
    field: Arc<Field>,
    rng: DeterministicRng,
    jitter_ms: JitterMs,
}

impl Actor {
    /// Create an actor attached to a field.
    pub fn new(id: ActorId, field: Arc<Field>, rng: DeterministicRng, jitter_ms: JitterMs) -> Self {
        Self {
            id,
            field,
            rng,
            jitter_ms,
        }
    }

    /// Drive the full lifecycle to completion.
    pub async fn run(mut self) -> Result<ActorOutcome, SyncError> {
        self.arrive().await;

        let Some(team) = formation::constitute_team(&self.field, self.id).await? else {
            // LATE: no team, no match to wait for
            return Ok(ActorOutcome {
                id: self.id,
                team: None,
            });
        };

        self.wait_for_referee(team).await?;
        self.play_until_end(team).await?;

        Ok(ActorOutcome {
            id: self.id,
            team: Some(team),
        })
    }

    /// Enter the ground and take some time to arrive.
    ///
    /// The jitter is slept with no shared state held; it is what makes
    /// every run's interleaving different (unless seeded).
    async fn arrive(&mut self) {
        {
            let mut state = self.field.lock().await;
            state.set_status(self.id, ActorStatus::Arriving);
            self.field.persist(&state);
        }

        let (min, max) = self.jitter_ms;
        let delay = self.rng.jitter_ms(min, max);
        debug!("{} arriving, {}ms on the way", self.id, delay);
        sleep(Duration::from_millis(delay)).await;
    }

    /// Wait for the referee's starting whistle.
    async fn wait_for_referee(&self, team: TeamId) -> Result<(), SyncError> {
        {
            let mut state = self.field.lock().await;
            state.set_status(self.id, ActorStatus::WaitingStart(team));
            self.field.persist(&state);
        }

        self.field.signals().match_start.wait().await
    }

    /// Enter play and stay on the pitch until the final whistle.
    async fn play_until_end(&self, team: TeamId) -> Result<(), SyncError> {
        {
            let mut state = self.field.lock().await;
            state.set_status(self.id, ActorStatus::Playing(team));
            self.field.signals().playing.notify();
            self.field.persist(&state);
        }

        info!("{} playing for team {}", self.id, team);
        self.field.signals().match_end.wait().await
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::Role;
    use crate::journal::Journal;
    use crate::{TEAM_PLAYERS, TEAM_SIZE};
    use std::time::Duration;
    use tokio::task::JoinSet;
    use tokio::time::timeout;

    const TEST_WAIT: Duration = Duration::from_secs(10);
    const NO_JITTER: JitterMs = (0, 1);

    fn actor(field: &Arc<Field>, id: ActorId) -> Actor {
        Actor::new(
            id,
            Arc::clone(field),
            DeterministicRng::for_actor(1, id.role, id.index),
            NO_JITTER,
        )
    }

    #[tokio::test]
    async fn test_late_actor_exits_without_blocking() {
        let field = Field::attach(Journal::null());

        {
            let mut state = field.lock().await;
            for _ in 0..Role::Goalie.cap() {
                state.register_arrival(Role::Goalie);
            }
        }

        let outcome = timeout(TEST_WAIT, actor(&field, ActorId::goalie(2)).run())
            .await
            .expect("a LATE actor must never park on match signals")
            .unwrap();

        assert_eq!(outcome.team, None);
        let state = field.lock().await;
        assert_eq!(state.status_of(ActorId::goalie(2)), Some(ActorStatus::Late));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_full_lifecycle_with_manual_referee() {
        let field = Field::attach(Journal::null());

        let mut ids: Vec<ActorId> = (0..TEAM_PLAYERS).map(ActorId::player).collect();
        ids.push(ActorId::goalie(0));

        let mut tasks = JoinSet::new();
        for id in ids {
            tasks.spawn(actor(&field, id).run());
        }

        let signals = field.signals();
        let squad = TEAM_SIZE as usize;

        // Play referee by hand: one team expected, then start, then end
        timeout(TEST_WAIT, signals.team_ready.wait())
            .await
            .unwrap()
            .unwrap();
        signals.match_start.notify_many(squad);
        for _ in 0..squad {
            timeout(TEST_WAIT, signals.playing.wait())
                .await
                .unwrap()
                .unwrap();
        }
        signals.match_end.notify_many(squad);

        while let Some(joined) = timeout(TEST_WAIT, tasks.join_next()).await.unwrap() {
            let outcome = joined.unwrap().unwrap();
            assert_eq!(outcome.team, Some(1));
        }

        let state = field.lock().await;
        assert_eq!(state.playing_for(1), squad);
        assert!(state.counters_consistent());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_bound_actors_park_until_match_start() {
        let field = Field::attach(Journal::null());

        let mut ids: Vec<ActorId> = (0..TEAM_PLAYERS).map(ActorId::player).collect();
        ids.push(ActorId::goalie(0));

        let mut tasks = JoinSet::new();
        for id in ids {
            tasks.spawn(actor(&field, id).run());
        }

        // Team forms, but the referee never whistles: nobody finishes
        timeout(TEST_WAIT, field.signals().team_ready.wait())
            .await
            .unwrap()
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(tasks.try_join_next().is_none());

        // Unwedge so the test ends cleanly
        field.signals().tear_down();
        while let Some(joined) = timeout(TEST_WAIT, tasks.join_next()).await.unwrap() {
            assert!(joined.unwrap().is_err());
        }
    }
}
