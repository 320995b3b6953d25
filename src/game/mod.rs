//! Game Logic Module
//!
//! All overworld simulation code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `thing`: Entities, templates, and the kind catalog
//! - `map`: Declarative map data, macros, and streaming markers
//! - `world`: The mutable world context and transitions
//! - `scheduler`: Tick-keyed deferred callbacks
//! - `bordering`: Directional contact resolution
//! - `movement`: Walking state machine and input surface
//! - `following`: Follower chains
//! - `transporter`: Two-phase warp protocol
//! - `spawner`: Window detectors and area streaming
//! - `tick`: The per-tick simulation pipeline
//! - `events`: Hooks fired for external collaborators

pub mod thing;
pub mod map;
pub mod world;
pub mod scheduler;
pub mod bordering;
pub mod movement;
pub mod following;
pub mod transporter;
pub mod spawner;
pub mod tick;
pub mod events;

// Re-export key types
pub use thing::{Thing, ThingCatalog, ThingId, GroupKind};
pub use map::{AreaKey, MapDefinition, MapLibrary, SpawnMarker};
pub use world::{World, WorldError, Scrollability};
pub use tick::{tick, TickResult};
pub use events::HookEvent;
