//! Team Formation
//!
//! The captain-election / multi-party rendezvous at the heart of the run.
//! The first actor whose arrival makes both role quotas satisfiable becomes
//! captain, reserves the whole cohort, wakes one parked actor per open
//! slot, and finalizes the team once every recruit has acknowledged.
//!
//! All hand-offs ride on bare counting signals; which particular waiting
//! actors end up in a given team is deliberately unspecified. The protocol
//! guarantees only that exactly the required counts are pulled and that
//! every cohort member learns the same team id.

use tracing::{debug, info};

use crate::game::field::Field;
use crate::game::state::{ActorId, ActorStatus, TeamId};
use crate::sync::SyncError;

/// Try to bind this actor into a team.
///
/// Returns `None` when the actor arrived past its role's cap (LATE) and
/// takes no further part, or `Some(team)` once the actor is bound.
pub async fn constitute_team(field: &Field, id: ActorId) -> Result<Option<TeamId>, SyncError> {
    let elected;
    {
        let mut state = field.lock().await;
        state.register_arrival(id.role);

        if state.past_cap(id.role) {
            state.mark_late(id);
            field.persist(&state);
            info!("{} arrived past the cap, sitting out", id);
            return Ok(None);
        }

        if state.quotas_satisfiable() {
            // This arrival completed a team. Become captain and reserve the
            // whole cohort in the same critical section, so no later
            // arrival can be elected off counters that still include it.
            state.set_status(id, ActorStatus::FormingTeam);
            state.reserve_team();
            field.persist(&state);
            elected = true;
        } else {
            state.set_status(id, ActorStatus::WaitingTeam);
            field.persist(&state);
            elected = false;
        }
    }

    let team = if elected {
        drive_rendezvous(field, id).await?
    } else {
        join_team(field, id).await?
    };

    Ok(Some(team))
}

/// Captain path: recruit every teammate, then finalize the team.
async fn drive_rendezvous(field: &Field, captain: ActorId) -> Result<TeamId, SyncError> {
    let signals = field.signals();

    // At most one rendezvous in flight: waiters learn their team by reading
    // `next_team_id`, so a second captain must not consume it while this
    // cohort is still registering.
    signals.formation_token.wait().await?;

    debug!("{} elected captain, recruiting", captain);

    let own = captain.role;
    let other = own.other();

    // One slot per teammate of our own role, minus ourselves,
    // then the full quota of the other role.
    for _ in 1..own.quota() {
        signals.slot_open(own).notify();
        signals.registration_ack.wait().await?;
    }
    for _ in 0..other.quota() {
        signals.slot_open(other).notify();
        signals.registration_ack.wait().await?;
    }

    // Every recruit has read the id and acknowledged: consume it.
    let team = {
        let mut state = field.lock().await;
        let team = state.consume_team_id();
        field.persist(&state);
        team
    };

    signals.formation_token.notify();
    signals.team_ready.notify();

    info!("{} formed team {}", captain, team);
    Ok(team)
}

/// Waiter path: park until a captain claims us, then register.
async fn join_team(field: &Field, id: ActorId) -> Result<TeamId, SyncError> {
    let signals = field.signals();

    signals.slot_open(id.role).wait().await?;

    // The captain that woke us finalizes only after our acknowledgment,
    // so the id read here is exactly the one it will consume.
    let team = {
        let state = field.lock().await;
        state.next_team_id
    };

    signals.registration_ack.notify();

    debug!("{} registered with team {}", id, team);
    Ok(team)
}

// =============================================================================
// TESTS
// =============================================================================
