//! Core deterministic primitives.
//!
//! Seeded randomness for arrival jitter and spawn-order shuffling.
//! Everything here is reproducible from a single base seed.

pub mod rng;

// Re-export core types
pub use rng::{derive_actor_seed, DeterministicRng};
