//! Match Day Logic
//!
//! The formation/synchronization protocol and everything it coordinates.
//!
//! ## Module Structure
//!
//! - `state`: the shared match record and its counter arithmetic
//! - `field`: the shared handle (state + signals + journal)
//! - `formation`: captain election and the team rendezvous
//! - `lifecycle`: the per-actor state machine
//! - `referee`: the match start/end driver

pub mod field;
pub mod formation;
pub mod lifecycle;
pub mod referee;
pub mod state;

// Re-export key types
pub use field::Field;
pub use formation::constitute_team;
pub use lifecycle::{Actor, ActorOutcome, JitterMs};
pub use referee::Referee;
pub use state::{ActorId, ActorStatus, MatchState, Role, TeamId};
