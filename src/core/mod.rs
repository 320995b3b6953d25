//! Core deterministic primitives.
//!
//! Integer tile-unit geometry and the seeded PRNG everything else
//! builds on.

pub mod geometry;
pub mod rng;

// Re-export core types
pub use geometry::{Unit, UNIT_SIZE, Direction, Bounds};
pub use rng::{DeterministicRng, derive_map_seed};
