//! # Overworld
//!
//! Deterministic tile-overworld simulation core: collision, grid
//! walking, follower chains, warps, and lazy area streaming.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        OVERWORLD                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── geometry.rs - Integer units, directions, rectangles     │
//! │  └── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │                                                              │
//! │  game/           - Simulation (deterministic)                │
//! │  ├── thing.rs    - Entities and the kind catalog             │
//! │  ├── map.rs      - Map data, macros, streaming markers       │
//! │  ├── world.rs    - World context and transitions             │
//! │  ├── scheduler.rs- Tick-keyed deferred callbacks             │
//! │  ├── bordering.rs- Directional contact resolution            │
//! │  ├── movement.rs - Walking state machine, input surface      │
//! │  ├── following.rs- Follower chains                           │
//! │  ├── transporter.rs - Two-phase warps                        │
//! │  ├── spawner.rs  - Window detectors, area streaming          │
//! │  ├── tick.rs     - Per-tick pipeline                         │
//! │  └── events.rs   - Hooks for embedders                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The simulation is **100% deterministic**:
//! - Integer-only geometry; no floating point
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time in simulation logic
//! - All randomness from seeded Xorshift128+, reseeded per map
//!
//! Given identical map data and inputs, a run produces **identical
//! results** on any platform.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use core::geometry::{Bounds, Direction, Unit, UNIT_SIZE};
pub use core::rng::DeterministicRng;
pub use game::thing::{Thing, ThingCatalog, ThingId};
pub use game::world::{World, WorldError};
pub use game::tick::{tick, TickResult};
pub use game::events::HookEvent;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;
