//! # Matchday Simulation
//!
//! Concurrent match-day simulation: independent players and goalies
//! self-organize into two fixed-size teams through shared counters and
//! counting signals, then barrier-synchronize with the referee on match
//! start and end.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       MATCHDAY SIM                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  └── rng.rs      - Xorshift128+ PRNG, per-actor seeds        │
//! │                                                              │
//! │  sync/           - Synchronization primitive set             │
//! │  └── signals.rs  - Named counting signals, fatal faults      │
//! │                                                              │
//! │  journal/        - Run journal                               │
//! │  └── snapshot.rs - Metadata + state snapshot records         │
//! │                                                              │
//! │  game/           - The protocol                              │
//! │  ├── state.rs    - Shared match state and counters           │
//! │  ├── field.rs    - Shared handle (state + signals + journal) │
//! │  ├── formation.rs- Captain election and team rendezvous      │
//! │  ├── lifecycle.rs- Per-actor state machine                   │
//! │  └── referee.rs  - Match start/end driver                    │
//! │                                                              │
//! │  sim.rs          - Orchestrator: spawn, join, report         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Coordination Guarantee
//!
//! Actors never message each other directly. All interaction goes through
//! the shared [`MatchState`] under one mutex and through blocking waits on
//! named counting signals, with the notify/wait arithmetic balanced by
//! construction:
//!
//! - Free counters never exceed arrived counters
//! - Team ids are unique, monotonic, and handed to exactly
//!   [`TEAM_SIZE`] actors each
//! - Arrivals past a role's cap go LATE and never park on match signals
//!
//! Any primitive failure is a non-recoverable environment fault that
//! terminates the run with a non-zero status.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod journal;
pub mod sim;
pub mod sync;

// Re-export commonly used types
pub use self::core::rng::DeterministicRng;
pub use game::field::Field;
pub use game::lifecycle::{Actor, ActorOutcome};
pub use game::referee::Referee;
pub use game::state::{ActorId, ActorStatus, MatchState, Role, TeamId};
pub use journal::Journal;
pub use sim::{SimConfig, SimReport, Simulation};
pub use sync::{SignalSet, SyncError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Players required per team
pub const TEAM_PLAYERS: u32 = 5;

/// Goalies required per team
pub const TEAM_GOALIES: u32 = 1;

/// Teams per match
pub const MATCH_TEAMS: u32 = 2;

/// Actors bound to one team
pub const TEAM_SIZE: u32 = TEAM_PLAYERS + TEAM_GOALIES;

/// Players accepted across the whole match (the arrival cap)
pub const SQUAD_PLAYERS: u32 = MATCH_TEAMS * TEAM_PLAYERS;

/// Goalies accepted across the whole match (the arrival cap)
pub const SQUAD_GOALIES: u32 = MATCH_TEAMS * TEAM_GOALIES;
