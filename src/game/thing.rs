//! Things
//!
//! Every placed entity ("Thing") in the world: terrain tiles, solids,
//! characters, the player. Things live in a table keyed by handle;
//! cross-references (bordering, follow links) are handles, never owned
//! pointers, so the relation graph can't form ownership cycles.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::geometry::{Bounds, Direction, Unit, UNIT_SIZE};
use crate::game::map::AreaKey;
use crate::game::scheduler::EventId;
use crate::game::transporter::Transport;

/// Handle into the world's Thing table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ThingId(pub u32);

/// Rendering/upkeep group a Thing belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupKind {
    /// Walkable ground tiles
    Terrain,
    /// Decorative, non-colliding
    Scenery,
    /// Impassable obstacles and triggers
    Solid,
    /// Mobile entities
    Character,
    /// Floating text
    Text,
}

/// Mutually exclusive facing pose class.
///
/// Right has no class of its own: it reuses `Left` mirrored by the
/// horizontal flip flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoseClass {
    /// Facing up
    Up,
    /// Facing left (or right, flipped)
    Left,
    /// Facing down
    Down,
}

/// Custom collide behavior consulted before normal resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollideKind {
    /// Two-phase warp activation (doors, cave mouths).
    Transporter,
}

/// Bound activation fired by detectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivateKind {
    /// Stream the adjacent area declared on the guarded border.
    SpawnAdjacentArea,
}

/// A placed entity.
///
/// Character-only fields are carried flat with inert defaults for
/// non-characters, mirroring how upkeep passes probe for them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Thing {
    /// Handle of this Thing in the world table
    pub id: ThingId,

    /// Kind name from the catalog
    pub title: String,

    /// Group membership
    pub group: GroupKind,

    /// Screen-relative bounds in engine units
    pub bounds: Bounds,

    /// Horizontal velocity (engine units per tick)
    pub xvel: Unit,

    /// Vertical velocity (engine units per tick)
    pub yvel: Unit,

    /// Live flag; cleared by kill
    pub alive: bool,

    /// Set by kill; removal from the group array happens on the next
    /// upkeep pass over that group
    pub dead: bool,

    /// Not drawn
    pub hidden: bool,

    /// Disables all collision regardless of geometry
    pub nocollide: bool,

    /// Facing, when the Thing has one
    pub direction: Option<Direction>,

    /// Per-direction contact recorded by the bordering resolver;
    /// transient per-tick derived state
    pub bordering: [Option<ThingId>; 4],

    /// Horizontal mirror flag (set when facing Right)
    pub flip_horiz: bool,

    /// Current facing pose class
    pub pose_class: Option<PoseClass>,

    /// Walking visual sub-state (toggled by the class cycle)
    pub walking_class: bool,

    /// Custom collide behavior, if any
    pub collide: Option<CollideKind>,

    /// Bound activation, if any
    pub activate: Option<ActivateKind>,

    /// Transporter destination data
    pub transport: Option<Transport>,

    /// Facing the approaching entity must hold for transport to fire
    pub require_direction: Option<Direction>,

    /// First contact phase of the transporter protocol has happened
    pub activated: bool,

    /// Dialog shown when the player interacts while bordering
    pub dialog: Option<String>,

    /// Area whose creation listing placed this Thing
    pub area: Option<AreaKey>,

    /// The Thing has intersected the viewport at least once; boundary
    /// detectors fire on the visible-to-hidden transition
    pub was_on_screen: bool,

    // Character state

    /// Currently in a walking burst
    pub is_walking: bool,

    /// Player may start a new key-driven walk
    pub can_key_walking: bool,

    /// Engine units moved per tick while walking
    pub speed: Unit,

    /// Speed saved when a follow relation replaced it
    pub saved_speed: Option<Unit>,

    /// Length of the current walking burst
    pub distance: Unit,

    /// Edge coordinate that ends the current burst
    pub destination: Unit,

    /// Leader this Thing follows
    pub following: Option<ThingId>,

    /// Follower trailing this Thing
    pub follower: Option<ThingId>,

    /// Intent to start walking at the next tick boundary
    pub wants_to_walk: bool,

    /// Direction for the pending walk intent
    pub next_direction: Option<Direction>,

    /// Token of the recurring flip-switch interval while walking
    pub walking_flip_event: Option<EventId>,

    /// Token of the walking/standing class cycle
    pub walking_cycle_event: Option<EventId>,

    /// Token of the recurring end-of-burst callback
    pub walking_stop_event: Option<EventId>,

    /// Per-direction held-key intent flags (player only)
    pub keys: [bool; 4],

    /// This Thing is the player
    pub is_player: bool,
}

impl Thing {
    /// Clear all recorded contacts.
    pub fn clear_bordering(&mut self) {
        self.bordering = [None; 4];
    }

    /// Contact recorded on `direction`, if any.
    #[inline]
    pub fn bordering_at(&self, direction: Direction) -> Option<ThingId> {
        self.bordering[direction.index()]
    }

}

/// Template a catalog stamps Things from.
///
/// Sizes are in map grid units and scaled by [`UNIT_SIZE`] at
/// creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThingTemplate {
    /// Group for instances
    pub group: GroupKind,
    /// Width in map units
    pub width: Unit,
    /// Height in map units
    pub height: Unit,
    /// Walking speed for characters (engine units per tick)
    #[serde(default)]
    pub speed: Unit,
    /// Collision disabled
    #[serde(default)]
    pub nocollide: bool,
    /// Custom collide behavior
    #[serde(default)]
    pub collide: Option<CollideKind>,
    /// Bound activation
    #[serde(default)]
    pub activate: Option<ActivateKind>,
    /// Default facing
    #[serde(default)]
    pub direction: Option<Direction>,
}

impl ThingTemplate {
    fn new(group: GroupKind, width: Unit, height: Unit) -> Self {
        Self {
            group,
            width,
            height,
            speed: 0,
            nocollide: false,
            collide: None,
            activate: None,
            direction: None,
        }
    }

    fn speed(mut self, speed: Unit) -> Self {
        self.speed = speed;
        self
    }

    fn nocollide(mut self) -> Self {
        self.nocollide = true;
        self
    }

    fn collide(mut self, kind: CollideKind) -> Self {
        self.collide = Some(kind);
        self
    }

    fn activate(mut self, kind: ActivateKind) -> Self {
        self.activate = Some(kind);
        self
    }
}

/// Kind-name to template lookup; the entity factory seam.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ThingCatalog {
    templates: BTreeMap<String, ThingTemplate>,
}

impl ThingCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the built-in kinds the map macros and demo maps
    /// place.
    pub fn builtin() -> Self {
        use GroupKind::*;

        let mut catalog = Self::new();

        // Characters
        catalog.insert("Player", ThingTemplate::new(Character, 8, 8).speed(2));
        catalog.insert("Lady", ThingTemplate::new(Character, 8, 8).speed(1));
        catalog.insert("Fatty", ThingTemplate::new(Character, 8, 8).speed(1));

        // Terrain
        catalog.insert("Grass", ThingTemplate::new(Terrain, 8, 8).nocollide());
        catalog.insert("DirtLight", ThingTemplate::new(Terrain, 8, 8).nocollide());
        catalog.insert("DirtMedium", ThingTemplate::new(Terrain, 8, 8).nocollide());

        // Solids
        catalog.insert("Tree", ThingTemplate::new(Solid, 8, 8));
        catalog.insert("Fence", ThingTemplate::new(Solid, 8, 8));
        catalog.insert("Water", ThingTemplate::new(Solid, 8, 8));
        catalog.insert("WaterEdgeTop", ThingTemplate::new(Solid, 8, 4));
        catalog.insert("WaterEdgeRight", ThingTemplate::new(Solid, 4, 8));
        catalog.insert("WaterEdgeBottom", ThingTemplate::new(Solid, 8, 4));
        catalog.insert("WaterEdgeLeft", ThingTemplate::new(Solid, 4, 8));
        catalog.insert("Ledge", ThingTemplate::new(Solid, 8, 4).nocollide());
        catalog.insert(
            "Door",
            ThingTemplate::new(Solid, 8, 8).collide(CollideKind::Transporter),
        );

        // House pieces
        catalog.insert("HouseTop", ThingTemplate::new(Solid, 32, 16));
        catalog.insert("HouseCenterLeft", ThingTemplate::new(Solid, 16, 8));
        catalog.insert("HouseCenterRight", ThingTemplate::new(Solid, 16, 8));
        catalog.insert("HouseLargeTopLeft", ThingTemplate::new(Solid, 8, 20));
        catalog.insert("HouseLargeTopMiddle", ThingTemplate::new(Solid, 32, 20));
        catalog.insert("HouseLargeTopRight", ThingTemplate::new(Solid, 8, 20));
        catalog.insert("HouseLargeCenter", ThingTemplate::new(Solid, 48, 16));
        catalog.insert("HouseLargeCenterLeft", ThingTemplate::new(Solid, 16, 16));
        catalog.insert("HouseLargeCenterMiddle", ThingTemplate::new(Solid, 8, 4));
        catalog.insert("HouseLargeCenterRight", ThingTemplate::new(Solid, 24, 16));
        catalog.insert("HouseWallWhitewash", ThingTemplate::new(Scenery, 8, 8).nocollide());

        // Streaming triggers
        catalog.insert(
            "AreaSpawner",
            ThingTemplate::new(Scenery, 8, 8)
                .nocollide()
                .activate(ActivateKind::SpawnAdjacentArea),
        );

        catalog
    }

    /// Add or replace a template.
    pub fn insert(&mut self, title: &str, template: ThingTemplate) {
        self.templates.insert(title.to_string(), template);
    }

    /// Look up a template by kind name.
    pub fn get(&self, title: &str) -> Option<&ThingTemplate> {
        self.templates.get(title)
    }

    /// Stamp a new Thing from a template.
    ///
    /// Bounds are placed at the origin; the world positions the Thing
    /// when it is added. Returns `None` for unknown kinds.
    pub fn make(&self, id: ThingId, title: &str) -> Option<Thing> {
        let template = self.templates.get(title)?;

        Some(Thing {
            id,
            title: title.to_string(),
            group: template.group,
            bounds: Bounds::from_position(
                0,
                0,
                template.width * UNIT_SIZE,
                template.height * UNIT_SIZE,
            ),
            xvel: 0,
            yvel: 0,
            alive: true,
            dead: false,
            hidden: false,
            nocollide: template.nocollide,
            direction: template.direction,
            bordering: [None; 4],
            flip_horiz: false,
            pose_class: None,
            walking_class: false,
            collide: template.collide,
            activate: template.activate,
            transport: None,
            require_direction: None,
            activated: false,
            dialog: None,
            area: None,
            was_on_screen: false,
            is_walking: false,
            can_key_walking: true,
            speed: template.speed,
            saved_speed: None,
            distance: 0,
            destination: 0,
            following: None,
            follower: None,
            wants_to_walk: false,
            next_direction: None,
            walking_flip_event: None,
            walking_cycle_event: None,
            walking_stop_event: None,
            keys: [false; 4],
            is_player: false,
        })
    }
}
