//! Synchronization Primitive Set
//!
//! Counting signals for the formation/match protocol. The only other
//! primitive the protocol uses is the single state mutex owned by
//! [`Field`](crate::game::field::Field).

pub mod signals;

pub use signals::{Signal, SignalSet, SyncError};
