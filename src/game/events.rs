//! Hook Events
//!
//! Events fired at lifecycle and transition points for external
//! collaborators (rendering, audio, dialog, mods). The world queues
//! them during a tick; the embedder drains them afterwards.

use serde::{Serialize, Deserialize};

use crate::core::geometry::Direction;
use crate::game::thing::ThingId;

/// A hook fired by the simulation core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HookEvent {
    /// The game started (first map set).
    GameStart,

    /// About to switch to a map.
    PreSetMap { map: String },

    /// A map was switched to (RNG reseeded, input history cleared).
    SetMap { map: String },

    /// About to enter a location.
    PreSetLocation { map: String, location: String },

    /// A location was entered and the scheduler resumed.
    SetLocation { map: String, location: String },

    /// The active area's background changed.
    BackgroundSet { background: String },

    /// All playing audio should be cleared.
    AudioClear,

    /// The spatial index should be rebuilt from scratch.
    QuadrantsReset,

    /// The player Thing was created.
    AddPlayer { thing: ThingId },

    /// A Thing was placed from a creation command.
    AddPreThing { thing: ThingId, title: String },

    /// A Thing was killed.
    Kill { thing: ThingId, title: String },

    /// A directional key went down.
    KeyDown { direction: Direction },

    /// A directional key went up.
    KeyUp { direction: Direction },

    /// The interaction button was pressed.
    KeyA,

    /// The pause button was pressed.
    KeyPause,

    /// The simulation was paused.
    Pause,

    /// The simulation resumed from a pause.
    Resume,

    /// The dialog system should present text from a bordered Thing.
    ///
    /// The embedder must call `movement::dialog_finish` on `player`
    /// when the menu closes.
    DialogRequest {
        /// Who is reading
        player: ThingId,
        /// Who is talked to
        speaker: ThingId,
        /// The dialog text
        dialog: String,
    },

    /// An adjacent area was streamed in.
    AreaSpawned { map: String, area: String },
}
