//! World State
//!
//! The single mutable context everything operates on: the Thing table
//! and group rosters, the screen window, the scheduler, the map
//! library, and the transition operations (setMap/setLocation) that
//! tear one scene down and build the next.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::geometry::{Bounds, Direction, Unit, UNIT_SIZE};
use crate::core::rng::{DeterministicRng, derive_map_seed};
use crate::game::events::HookEvent;
use crate::game::map::{
    AreaKey, AreaRuntime, EntryKind, MapLibrary, SpawnMarker, ThingCommand,
};
use crate::game::movement;
use crate::game::scheduler::Scheduler;
use crate::game::spawner;
use crate::game::thing::{ActivateKind, GroupKind, Thing, ThingCatalog, ThingId};

/// Errors from world operations.
///
/// Most name a piece of map data that failed to resolve; transitions
/// surface these instead of panicking on authoring mistakes.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("unknown map {0:?}")]
    UnknownMap(String),

    #[error("unknown location {location:?} in map {map:?}")]
    UnknownLocation { map: String, location: String },

    #[error("unknown area {area:?} in map {map:?}")]
    UnknownArea { map: String, area: String },

    #[error("unknown thing kind {0:?}")]
    UnknownThingKind(String),

    #[error("unknown map macro {0:?}")]
    UnknownMacro(String),

    #[error("transporter {title:?} has no transport destination")]
    MissingTransport { title: String },

    #[error("transporter {title:?} has a malformed transport destination")]
    MalformedTransport { title: String },

    #[error("things are not bordering, cannot start following")]
    TooFarToFollow,

    #[error("follow chain would form a cycle")]
    FollowCycle,

    #[error("no map is active")]
    NoActiveMap,
}

/// Whether the screen window may scroll with the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scrollability {
    /// Area fits the screen on both axes
    #[default]
    None,
    /// Area is wider than the screen
    Horizontal,
    /// Area is taller than the screen
    Vertical,
    /// Area exceeds the screen on both axes
    Both,
}

/// The visible window over the world.
///
/// `left`/`top` are the window's offset into absolute map space;
/// Thing bounds are screen-relative, so scrolling shifts every Thing
/// the opposite way.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapScreen {
    /// Scroll offset, engine units
    pub left: Unit,
    /// Scroll offset, engine units
    pub top: Unit,
    /// Window width, engine units
    pub width: Unit,
    /// Window height, engine units
    pub height: Unit,
    /// Union of spawned area rects, absolute engine units
    pub boundaries: Bounds,
    pub scrollability: Scrollability,
    /// Player facing remembered across transitions
    pub player_direction: Direction,
}

impl MapScreen {
    pub fn new(width: Unit, height: Unit) -> Self {
        Self {
            left: 0,
            top: 0,
            width,
            height,
            boundaries: Bounds::new(0, 0, 0, 0),
            scrollability: Scrollability::None,
            player_direction: Direction::Bottom,
        }
    }

    /// Screen-relative horizontal midpoint.
    pub fn middle_x(&self) -> Unit {
        self.width / 2
    }

    /// Screen-relative vertical midpoint.
    pub fn middle_y(&self) -> Unit {
        self.height / 2
    }

    /// Screen-relative visible rect.
    pub fn viewport(&self) -> Bounds {
        Bounds::from_position(0, 0, self.width, self.height)
    }

    fn clear(&mut self) {
        self.left = 0;
        self.top = 0;
    }
}

/// Per-group rosters, in upkeep order.
///
/// The rosters hold handles; the Thing table owns the data. Removal
/// from a roster is deferred to the group's own upkeep pass.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Groups {
    pub terrain: Vec<ThingId>,
    pub scenery: Vec<ThingId>,
    pub solids: Vec<ThingId>,
    pub characters: Vec<ThingId>,
    pub text: Vec<ThingId>,
}

impl Groups {
    pub fn get(&self, kind: GroupKind) -> &Vec<ThingId> {
        match kind {
            GroupKind::Terrain => &self.terrain,
            GroupKind::Scenery => &self.scenery,
            GroupKind::Solid => &self.solids,
            GroupKind::Character => &self.characters,
            GroupKind::Text => &self.text,
        }
    }

    pub fn get_mut(&mut self, kind: GroupKind) -> &mut Vec<ThingId> {
        match kind {
            GroupKind::Terrain => &mut self.terrain,
            GroupKind::Scenery => &mut self.scenery,
            GroupKind::Solid => &mut self.solids,
            GroupKind::Character => &mut self.characters,
            GroupKind::Text => &mut self.text,
        }
    }

    fn clear_all(&mut self) {
        self.terrain.clear();
        self.scenery.clear();
        self.solids.clear();
        self.characters.clear();
        self.text.clear();
    }
}

/// The whole mutable game state.
#[derive(Clone, Debug)]
pub struct World {
    /// Current tick count
    pub tick: u64,
    /// Simulation is live; set by a completed location entry
    pub running: bool,
    pub library: MapLibrary,
    pub catalog: ThingCatalog,
    pub rng: DeterministicRng,
    pub screen: MapScreen,
    /// Thing table, by handle
    pub things: BTreeMap<ThingId, Thing>,
    next_thing_id: u32,
    pub groups: Groups,
    pub player: Option<ThingId>,
    pub scheduler: Scheduler,
    pending_hooks: Vec<HookEvent>,
    pub current_map: Option<String>,
    pub current_location: Option<String>,
    pub current_area: Option<String>,
    /// Per-area streaming state
    pub area_runtime: BTreeMap<AreaKey, AreaRuntime>,
    /// Bumped by every completed location entry; upkeep passes snapshot
    /// it to notice a mid-pass transition
    pub transition_serial: u64,
    /// Raw input log for the active map, cleared on map change
    input_history: Vec<(u64, HookEvent)>,
}

impl World {
    pub fn new(library: MapLibrary, catalog: ThingCatalog, width: Unit, height: Unit) -> Self {
        Self {
            tick: 0,
            running: false,
            library,
            catalog,
            rng: DeterministicRng::default(),
            screen: MapScreen::new(width, height),
            things: BTreeMap::new(),
            next_thing_id: 0,
            groups: Groups::default(),
            player: None,
            scheduler: Scheduler::new(),
            pending_hooks: Vec::new(),
            current_map: None,
            current_location: None,
            current_area: None,
            area_runtime: BTreeMap::new(),
            transition_serial: 0,
            input_history: Vec::new(),
        }
    }

    /// Enter the named map's default location and start the game.
    pub fn game_start(&mut self, map: &str) -> Result<(), WorldError> {
        info!(map, "game start");
        self.fire_hook(HookEvent::GameStart);
        self.set_map(map, None)
    }

    /// Freeze the simulation. Scheduled events keep their fire ticks;
    /// the tick counter simply stops advancing.
    ///
    /// A no-op while already paused or mid-transition.
    pub fn pause(&mut self) {
        if !self.running {
            return;
        }
        info!("paused");
        self.running = false;
        self.fire_hook(HookEvent::Pause);
    }

    /// Resume a paused simulation. Nothing to resume before the first
    /// location entry.
    pub fn resume(&mut self) {
        if self.running || self.current_location.is_none() {
            return;
        }
        info!("resumed");
        self.running = true;
        self.fire_hook(HookEvent::Resume);
    }

    // =========================================================================
    // Hooks
    // =========================================================================

    /// Queue a hook for the embedder.
    pub fn fire_hook(&mut self, event: HookEvent) {
        self.pending_hooks.push(event);
    }

    /// Drain all queued hooks, in fire order.
    pub fn take_hooks(&mut self) -> Vec<HookEvent> {
        std::mem::take(&mut self.pending_hooks)
    }

    /// Log a raw input for the active map.
    pub fn record_input(&mut self, event: HookEvent) {
        let tick = self.tick;
        self.input_history.push((tick, event));
    }

    /// Inputs recorded since the active map was entered, tagged with
    /// the tick each arrived on. Replaying them against a fresh world
    /// reproduces the run, since the map seed pins everything else.
    pub fn input_history(&self) -> &[(u64, HookEvent)] {
        &self.input_history
    }

    // =========================================================================
    // Thing lifecycle
    // =========================================================================

    pub fn thing(&self, id: ThingId) -> Option<&Thing> {
        self.things.get(&id)
    }

    pub fn thing_mut(&mut self, id: ThingId) -> Option<&mut Thing> {
        self.things.get_mut(&id)
    }

    /// Stamp a new Thing from the catalog. Not yet placed or grouped.
    pub fn make(&mut self, title: &str) -> Result<ThingId, WorldError> {
        let id = ThingId(self.next_thing_id);
        let thing = self
            .catalog
            .make(id, title)
            .ok_or_else(|| WorldError::UnknownThingKind(title.to_string()))?;
        self.next_thing_id += 1;
        self.things.insert(id, thing);
        Ok(id)
    }

    /// Place a made Thing at screen-relative coordinates and enroll it
    /// in its group.
    ///
    /// Post-construction processing happens here: bordering state is
    /// initialized and a declared facing is applied.
    pub fn add_thing(&mut self, id: ThingId, left: Unit, top: Unit) {
        let Some(thing) = self.things.get_mut(&id) else {
            return;
        };

        let width = thing.bounds.width();
        let height = thing.bounds.height();
        thing.bounds = Bounds::from_position(left, top, width, height);
        thing.clear_bordering();

        let group = thing.group;
        let direction = thing.direction;
        self.groups.get_mut(group).push(id);

        if let Some(direction) = direction {
            movement::set_direction(self, id, direction);
        }
    }

    /// Place a Thing from a map creation command.
    ///
    /// Command coordinates are map grid units in absolute map space;
    /// placement is relative to the current scroll offset.
    pub fn add_pre_thing(
        &mut self,
        command: &ThingCommand,
        area: &AreaKey,
    ) -> Result<ThingId, WorldError> {
        let id = self.make(&command.thing)?;
        let mut activate = None;

        if let Some(thing) = self.things.get_mut(&id) {
            let mut width = thing.bounds.width();
            let mut height = thing.bounds.height();
            if let Some(w) = command.width {
                width = w * UNIT_SIZE;
            }
            if let Some(h) = command.height {
                height = h * UNIT_SIZE;
            }
            thing.bounds = Bounds::from_position(0, 0, width, height);

            if command.transport.is_some() {
                thing.transport = command.transport.clone();
            }
            if command.require_direction.is_some() {
                thing.require_direction = command.require_direction;
            }
            if command.dialog.is_some() {
                thing.dialog = command.dialog.clone();
            }
            thing.area = Some(area.clone());
            activate = thing.activate;
        }

        self.add_thing(
            id,
            command.x * UNIT_SIZE - self.screen.left,
            command.y * UNIT_SIZE - self.screen.top,
        );

        self.fire_hook(HookEvent::AddPreThing { thing: id, title: command.thing.clone() });

        if activate == Some(ActivateKind::SpawnAdjacentArea) {
            spawner::spawn_window_detector(self, id);
        }

        Ok(id)
    }

    /// Create and place the player.
    pub fn add_player(&mut self, left: Unit, top: Unit) -> Result<ThingId, WorldError> {
        let id = self.make("Player")?;
        if let Some(thing) = self.things.get_mut(&id) {
            thing.is_player = true;
        }
        self.add_thing(id, left, top);
        self.player = Some(id);
        self.fire_hook(HookEvent::AddPlayer { thing: id });
        Ok(id)
    }

    /// Kill a Thing: mark it dead, zero its motion, revoke its pending
    /// events. Roster removal happens on the group's next upkeep pass.
    pub fn kill_thing(&mut self, id: ThingId) {
        let Some(thing) = self.things.get_mut(&id) else {
            return;
        };
        if thing.dead {
            return;
        }

        thing.alive = false;
        thing.dead = true;
        thing.hidden = true;
        thing.nocollide = true;
        thing.xvel = 0;
        thing.yvel = 0;
        let title = thing.title.clone();

        debug!(title = %title, ?id, "killed");
        self.scheduler.cancel_events_for(id);
        self.fire_hook(HookEvent::Kill { thing: id, title });
    }

    // =========================================================================
    // Scrolling
    // =========================================================================

    /// Scroll the window by (dx, dy), shifting every Thing the
    /// opposite way so screen-relative bounds stay consistent.
    pub fn scroll_window(&mut self, dx: Unit, dy: Unit) {
        if dx == 0 && dy == 0 {
            return;
        }

        self.screen.left += dx;
        self.screen.top += dy;

        for thing in self.things.values_mut() {
            thing.bounds.shift(-dx, -dy);
        }
    }

    /// Center the window after a location entry, per scrollability.
    pub fn center_map_screen(&mut self) {
        match self.screen.scrollability {
            Scrollability::None => {
                self.center_horizontally();
                self.center_vertically();
            }
            Scrollability::Vertical => {
                self.center_horizontally();
                self.center_vertically_on_player();
            }
            Scrollability::Horizontal => {
                self.center_horizontally_on_player();
                self.center_vertically();
            }
            Scrollability::Both => {
                self.center_horizontally_on_player();
                self.center_vertically_on_player();
            }
        }
    }

    fn center_horizontally(&mut self) {
        let difference = self.screen.width - self.screen.boundaries.width();
        if difference > 0 {
            self.scroll_window(-difference / 2, 0);
        }
    }

    fn center_vertically(&mut self) {
        let difference = self.screen.height - self.screen.boundaries.height();
        self.scroll_window(0, -difference / 2);
    }

    fn center_horizontally_on_player(&mut self) {
        let Some(mid) = self.player.and_then(|id| self.things.get(&id)).map(|p| p.bounds.mid_x())
        else {
            return;
        };
        let difference = mid - self.screen.middle_x();
        if difference != 0 {
            self.scroll_window(difference, 0);
        }
    }

    fn center_vertically_on_player(&mut self) {
        let Some(mid) = self.player.and_then(|id| self.things.get(&id)).map(|p| p.bounds.mid_y())
        else {
            return;
        };
        let difference = mid - self.screen.middle_y();
        if difference != 0 {
            self.scroll_window(0, difference);
        }
    }

    /// Recompute scrollability from boundaries vs the window size.
    pub fn recompute_scrollability(&mut self) {
        let wider = self.screen.boundaries.width() > self.screen.width;
        let taller = self.screen.boundaries.height() > self.screen.height;

        self.screen.scrollability = match (wider, taller) {
            (true, true) => Scrollability::Both,
            (true, false) => Scrollability::Horizontal,
            (false, true) => Scrollability::Vertical,
            (false, false) => Scrollability::None,
        };
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Switch to a map and enter one of its locations.
    ///
    /// Reseeds the RNG from the map's seed (explicit or name-derived)
    /// and clears the input log, then delegates to
    /// [`World::set_location`] with the named or default location.
    pub fn set_map(&mut self, name: &str, location: Option<&str>) -> Result<(), WorldError> {
        let map = self.library.get(name)?;
        let seed = map.seed.unwrap_or_else(|| derive_map_seed(&map.name));
        let target = location.unwrap_or(&map.location_default).to_string();
        let map_name = map.name.clone();

        info!(map = %map_name, location = %target, "set map");
        self.fire_hook(HookEvent::PreSetMap { map: map_name.clone() });

        self.current_map = Some(map_name.clone());
        self.rng.reseed(seed);
        self.input_history.clear();

        self.fire_hook(HookEvent::SetMap { map: map_name });

        self.set_location(&target)
    }

    /// Tear down the current scene and enter a location of the current
    /// map.
    ///
    /// Everything transient dies here: Things, rosters, scroll offset,
    /// and all scheduled events. A fresh traversal marker is stamped on
    /// the entered area so streaming can de-duplicate.
    pub fn set_location(&mut self, name: &str) -> Result<(), WorldError> {
        let map_name = self.current_map.clone().ok_or(WorldError::NoActiveMap)?;
        let location = self.library.get_location(&map_name, name)?.clone();
        let area = self.library.get_area(&map_name, &location.area)?.clone();

        info!(map = %map_name, location = name, area = %location.area, "set location");

        // Teardown
        self.running = false;
        self.screen.clear();
        self.things.clear();
        self.groups.clear_all();
        self.player = None;
        self.scheduler.cancel_all();

        self.current_location = Some(name.to_string());
        self.current_area = Some(location.area.clone());

        // Nothing from the previous scene survives the teardown.
        for runtime in self.area_runtime.values_mut() {
            runtime.spawned = false;
        }

        self.screen.boundaries =
            Bounds::from_position(0, 0, area.width * UNIT_SIZE, area.height * UNIT_SIZE);
        self.recompute_scrollability();

        self.fire_hook(HookEvent::PreSetLocation {
            map: map_name.clone(),
            location: name.to_string(),
        });
        self.fire_hook(HookEvent::BackgroundSet { background: area.background.clone() });
        self.fire_hook(HookEvent::AudioClear);
        self.fire_hook(HookEvent::QuadrantsReset);

        // Stamp the entered area with a fresh traversal before its
        // content (and border detectors) go in.
        let key = AreaKey::new(&map_name, &location.area);
        let marker = SpawnMarker::begin(name);
        self.area_runtime.entry(key.clone()).or_default().spawned_by = Some(marker);

        spawner::spawn_area(self, &key, 0, 0)?;

        match location.entry {
            EntryKind::Normal => {
                let player =
                    self.add_player(location.xloc * UNIT_SIZE, location.yloc * UNIT_SIZE)?;
                let facing = location.direction.unwrap_or(self.screen.player_direction);
                movement::set_direction(self, player, facing);
                self.center_map_screen();
            }
        }

        self.fire_hook(HookEvent::SetLocation {
            map: map_name,
            location: name.to_string(),
        });

        self.running = true;
        self.transition_serial += 1;
        Ok(())
    }

    /// Traversal marker of the current area, if stamped.
    pub fn current_marker(&self) -> Option<&SpawnMarker> {
        let map = self.current_map.as_deref()?;
        let area = self.current_area.as_deref()?;
        self.area_runtime
            .get(&AreaKey::new(map, area))?
            .spawned_by
            .as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::map::{
        AreaDefinition, Borders, CreationCommand, LocationDefinition, MapDefinition,
    };

    fn tiny_library() -> MapLibrary {
        let mut areas = BTreeMap::new();
        areas.insert(
            "Main".to_string(),
            AreaDefinition {
                background: "Grass".into(),
                width: 40,
                height: 40,
                borders: Borders::default(),
                creation: vec![CreationCommand::Thing(ThingCommand::new("Tree", 16, 16))],
            },
        );

        let mut locations = BTreeMap::new();
        locations.insert(
            "Start".to_string(),
            LocationDefinition {
                area: "Main".into(),
                xloc: 8,
                yloc: 8,
                direction: None,
                entry: EntryKind::Normal,
            },
        );

        let mut library = MapLibrary::new();
        library.insert(MapDefinition {
            name: "Hometown".into(),
            seed: None,
            location_default: "Start".into(),
            areas,
            locations,
        });
        library
    }

    fn tiny_world() -> World {
        World::new(tiny_library(), ThingCatalog::builtin(), 320, 288)
    }

    #[test]
    fn test_set_map_enters_default_location() {
        let mut world = tiny_world();
        world.set_map("Hometown", None).unwrap();

        assert!(world.running);
        assert_eq!(world.current_map.as_deref(), Some("Hometown"));
        assert_eq!(world.current_location.as_deref(), Some("Start"));
        assert!(world.player.is_some());
        assert_eq!(world.groups.solids.len(), 1);
    }

    #[test]
    fn test_unknown_map_is_error() {
        let mut world = tiny_world();
        assert!(matches!(
            world.set_map("Atlantis", None),
            Err(WorldError::UnknownMap(_))
        ));
    }

    #[test]
    fn test_set_map_reseeds_deterministically() {
        let mut world_a = tiny_world();
        let mut world_b = tiny_world();
        world_a.rng.reseed(111);
        world_b.rng.reseed(222);

        world_a.set_map("Hometown", None).unwrap();
        world_b.set_map("Hometown", None).unwrap();

        assert_eq!(world_a.rng.next_u64(), world_b.rng.next_u64());
    }

    #[test]
    fn test_transition_fires_hooks_in_order() {
        let mut world = tiny_world();
        world.set_map("Hometown", None).unwrap();

        let hooks = world.take_hooks();
        let pre_map = hooks
            .iter()
            .position(|h| matches!(h, HookEvent::PreSetMap { .. }))
            .unwrap();
        let set_map = hooks
            .iter()
            .position(|h| matches!(h, HookEvent::SetMap { .. }))
            .unwrap();
        let pre_location = hooks
            .iter()
            .position(|h| matches!(h, HookEvent::PreSetLocation { .. }))
            .unwrap();
        let set_location = hooks
            .iter()
            .position(|h| matches!(h, HookEvent::SetLocation { .. }))
            .unwrap();
        let add_player = hooks
            .iter()
            .position(|h| matches!(h, HookEvent::AddPlayer { .. }))
            .unwrap();

        assert!(pre_map < set_map);
        assert!(set_map < pre_location);
        assert!(pre_location < add_player);
        assert!(add_player < set_location);
    }

    #[test]
    fn test_set_location_cancels_scheduled_events() {
        let mut world = tiny_world();
        world.set_map("Hometown", None).unwrap();

        use crate::game::scheduler::EventAction;
        let player = world.player.unwrap();
        world
            .scheduler
            .add_event(EventAction::WalkingStop(player), world.tick, 5);
        assert!(!world.scheduler.is_empty());

        let serial = world.transition_serial;
        world.set_location("Start").unwrap();

        assert!(world.scheduler.is_empty());
        assert_eq!(world.transition_serial, serial + 1);
    }

    #[test]
    fn test_scroll_window_shifts_things_opposite() {
        let mut world = tiny_world();
        world.set_map("Hometown", None).unwrap();

        let player = world.player.unwrap();
        let before = world.thing(player).unwrap().bounds.left;

        world.scroll_window(12, -4);

        let after = world.thing(player).unwrap().bounds;
        assert_eq!(after.left, before - 12);
        assert_eq!(world.screen.left, 12);
        assert_eq!(world.screen.top, -4);
    }

    #[test]
    fn test_small_area_is_centered_not_scrollable() {
        let mut world = tiny_world();
        world.set_map("Hometown", None).unwrap();

        // 40 map units = 160 engine units, smaller than 320x288.
        assert_eq!(world.screen.scrollability, Scrollability::None);
        assert_eq!(world.screen.left, -(320 - 160) / 2);
    }

    #[test]
    fn test_input_history_records_until_map_change() {
        let mut world = tiny_world();
        world.set_map("Hometown", None).unwrap();

        world.record_input(HookEvent::KeyA);
        world.record_input(HookEvent::KeyDown { direction: Direction::Left });

        let history = world.input_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], (world.tick, HookEvent::KeyA));

        // A map change starts a fresh log; a location change within the
        // map keeps it.
        world.set_location("Start").unwrap();
        assert_eq!(world.input_history().len(), 2);
        world.set_map("Hometown", None).unwrap();
        assert!(world.input_history().is_empty());
    }

    #[test]
    fn test_pause_freezes_without_dropping_events() {
        let mut world = tiny_world();
        world.set_map("Hometown", None).unwrap();
        world.take_hooks();

        use crate::game::scheduler::EventAction;
        let player = world.player.unwrap();
        world
            .scheduler
            .add_event(EventAction::WalkingStop(player), world.tick, 5);

        world.pause();
        assert!(!world.running);
        assert_eq!(world.scheduler.len(), 1);
        assert!(world
            .take_hooks()
            .iter()
            .any(|h| matches!(h, HookEvent::Pause)));

        // Double pause stays quiet; resume fires once.
        world.pause();
        assert!(world.take_hooks().is_empty());
        world.resume();
        assert!(world.running);
        assert!(world
            .take_hooks()
            .iter()
            .any(|h| matches!(h, HookEvent::Resume)));
    }

    #[test]
    fn test_kill_marks_dead_and_revokes_events() {
        let mut world = tiny_world();
        world.set_map("Hometown", None).unwrap();
        world.take_hooks();

        use crate::game::scheduler::EventAction;
        let player = world.player.unwrap();
        world
            .scheduler
            .add_event(EventAction::WalkingStop(player), world.tick, 5);

        world.kill_thing(player);

        let thing = world.thing(player).unwrap();
        assert!(!thing.alive);
        assert!(thing.dead);
        assert!(thing.nocollide);
        assert!(world.scheduler.is_empty());
        assert!(world
            .take_hooks()
            .iter()
            .any(|h| matches!(h, HookEvent::Kill { .. })));

        // A second kill is a no-op.
        world.kill_thing(player);
        assert!(world.take_hooks().is_empty());
    }
}
