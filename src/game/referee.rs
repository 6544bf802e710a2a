//! Referee Driver
//!
//! Minimal referee: collects team-ready notifications, releases every bound
//! actor for match start, counts them onto the pitch, lets the match run
//! for a fixed length, then releases everyone for match end. The referee
//! consumes and produces signals only - it never mutates the match state.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::info;

use crate::game::field::Field;
use crate::sync::SyncError;
use crate::{MATCH_TEAMS, TEAM_SIZE};

/// The match official.
pub struct Referee {
    field: Arc<Field>,
    match_len: Duration,
}

impl Referee {
    /// Create the referee for a run.
    pub fn new(field: Arc<Field>, match_len: Duration) -> Self {
        Self { field, match_len }
    }

    /// Drive a full match: collect teams, start, monitor, end.
    pub async fn run(self) -> Result<(), SyncError> {
        let signals = self.field.signals();
        let squad = (MATCH_TEAMS * TEAM_SIZE) as usize;

        for ready in 1..=MATCH_TEAMS {
            signals.team_ready.wait().await?;
            info!("Referee: {}/{} teams ready", ready, MATCH_TEAMS);
        }

        // Both teams complete: one start release per bound actor
        signals.match_start.notify_many(squad);
        info!("Referee: match started");

        for _ in 0..squad {
            signals.playing.wait().await?;
        }
        info!("Referee: all {} actors playing", squad);

        sleep(self.match_len).await;

        signals.match_end.notify_many(squad);
        info!("Referee: match ended after {:?}", self.match_len);

        Ok(())
    }
}
