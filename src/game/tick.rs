//! Tick Pipeline
//!
//! One deterministic simulation step, in fixed phase order:
//!
//! 1. Prune dead solids
//! 2. Maintain characters: move, start pending walks, prune dead,
//!    resolve collisions
//! 3. Maintain player: scroll the window with the player's motion
//! 4. Dispatch due scheduled events
//!
//! A transition fired mid-phase (a transporter during collision
//! resolution) ends the pass over the old scene immediately.

use crate::core::geometry::Unit;
use crate::game::bordering;
use crate::game::events::HookEvent;
use crate::game::movement;
use crate::game::scheduler::EventAction;
use crate::game::spawner;
use crate::game::thing::ThingId;
use crate::game::world::{Scrollability, World, WorldError};

/// Ticks between a walk intent and the walk starting.
const WALK_START_DELAY: u64 = 3;

/// What one tick produced.
#[derive(Clone, Debug)]
pub struct TickResult {
    /// Hooks fired during the tick, in order
    pub hooks: Vec<HookEvent>,
}

/// Advance the world by one tick.
pub fn tick(world: &mut World) -> Result<TickResult, WorldError> {
    if !world.running {
        return Ok(TickResult { hooks: world.take_hooks() });
    }

    world.tick += 1;

    maintain_solids(world);
    maintain_characters(world)?;
    maintain_player(world);
    handle_events(world)?;

    Ok(TickResult { hooks: world.take_hooks() })
}

/// Drop killed solids from the roster and the table.
fn maintain_solids(world: &mut World) {
    let mut i = 0;
    while i < world.groups.solids.len() {
        let id = world.groups.solids[i];
        let alive = world.thing(id).map(|t| t.alive).unwrap_or(false);
        if !alive {
            world.groups.solids.remove(i);
            world.things.remove(&id);
            continue;
        }
        i += 1;
    }
}

/// Move every character, launch pending walk intents, prune the dead,
/// and resolve collisions.
///
/// Roster removal adjusts the index in place so the neighbor after a
/// removed character is still processed this pass. A transition during
/// collision resolution abandons the rest of the pass.
fn maintain_characters(world: &mut World) -> Result<(), WorldError> {
    let serial = world.transition_serial;

    let mut i = 0;
    while i < world.groups.characters.len() {
        let id = world.groups.characters[i];

        movement::shift_character(world, id);

        let (alive, moving, wants, direction) = match world.thing(id) {
            Some(thing) => (
                thing.alive,
                thing.xvel != 0 || thing.yvel != 0,
                thing.wants_to_walk,
                thing.next_direction.or(thing.direction),
            ),
            None => (false, false, false, None),
        };

        if alive && !moving && wants {
            if let Some(direction) = direction {
                let now = world.tick;
                world.scheduler.add_event(
                    EventAction::StartWalking(id, direction),
                    now,
                    WALK_START_DELAY,
                );
            }
            if let Some(thing) = world.thing_mut(id) {
                thing.wants_to_walk = false;
            }
        }

        if !alive {
            world.groups.characters.remove(i);
            world.things.remove(&id);
            continue;
        }

        bordering::check_hits_for(world, id)?;
        if world.transition_serial != serial {
            return Ok(());
        }

        i += 1;
    }

    Ok(())
}

/// Scroll the window with the player on scrollable areas. Motion into
/// a recorded contact does not scroll.
fn maintain_player(world: &mut World) {
    let Some(player) = world.player else { return };
    let alive = world.thing(player).map(|t| t.alive).unwrap_or(false);
    if !alive {
        return;
    }

    match world.screen.scrollability {
        Scrollability::None => {}
        Scrollability::Horizontal => {
            let dx = horizontal_scroll_amount(world, player);
            world.scroll_window(dx, 0);
        }
        Scrollability::Vertical => {
            let dy = vertical_scroll_amount(world, player);
            world.scroll_window(0, dy);
        }
        Scrollability::Both => {
            let dx = horizontal_scroll_amount(world, player);
            let dy = vertical_scroll_amount(world, player);
            world.scroll_window(dx, dy);
        }
    }
}

fn horizontal_scroll_amount(world: &World, player: ThingId) -> Unit {
    use crate::core::geometry::Direction;

    let Some(thing) = world.thing(player) else { return 0 };
    if thing.xvel == 0 {
        return 0;
    }
    let blocked = if thing.xvel > 0 {
        thing.bordering_at(Direction::Right).is_some()
    } else {
        thing.bordering_at(Direction::Left).is_some()
    };
    if blocked { 0 } else { thing.xvel }
}

fn vertical_scroll_amount(world: &World, player: ThingId) -> Unit {
    use crate::core::geometry::Direction;

    let Some(thing) = world.thing(player) else { return 0 };
    if thing.yvel == 0 {
        return 0;
    }
    let blocked = if thing.yvel > 0 {
        thing.bordering_at(Direction::Bottom).is_some()
    } else {
        thing.bordering_at(Direction::Top).is_some()
    };
    if blocked { 0 } else { thing.yvel }
}

/// Dispatch every event due this tick, in registration order.
///
/// Events revoked by an earlier handler in the same batch are skipped;
/// recurring callbacks end themselves by reporting completion.
fn handle_events(world: &mut World) -> Result<(), WorldError> {
    let due = world.scheduler.take_due(world.tick);

    for event in due {
        if world.scheduler.is_revoked(event.id) {
            continue;
        }

        match event.action {
            EventAction::StartWalking(id, direction) => {
                let (alive, is_player) = match world.thing(id) {
                    Some(thing) => (thing.alive, thing.is_player),
                    None => continue,
                };
                if !alive {
                    continue;
                }
                if is_player {
                    movement::player_start_walking(world, id, direction);
                } else {
                    movement::start_walking(world, id, direction);
                }
            }
            EventAction::WalkingStop(id) => {
                let is_player = world.thing(id).map(|t| t.is_player).unwrap_or(false);
                let stopped = if is_player {
                    movement::player_stop_walking(world, id)
                } else {
                    movement::character_stop_walking(world, id)
                };
                if stopped {
                    world.scheduler.cancel_event(event.id);
                }
            }
            EventAction::WalkingClassCycle(id) => {
                movement::walking_class_cycle(world, id);
            }
            EventAction::SwitchFlip(id) => {
                movement::switch_flip_on_direction(world, id);
            }
            EventAction::CheckWindowDetector(id) => {
                if spawner::check_window_detector(world, id)? {
                    world.scheduler.cancel_event(event.id);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use crate::core::geometry::{Direction, UNIT_SIZE};
    use crate::game::map::{
        AreaDefinition, Borders, CreationCommand, EntryKind, LocationDefinition, MapDefinition,
        MapLibrary, ThingCommand,
    };
    use crate::game::thing::ThingCatalog;
    use crate::game::transporter::Transport;

    fn town_library() -> MapLibrary {
        let mut door = ThingCommand::new("Door", 48, 56);
        door.transport = Some(Transport::Location("Inside".into()));

        // A second door, east of the start, warping across maps.
        let mut ferry = ThingCommand::new("Door", 80, 32);
        ferry.transport = Some(Transport::MapLocation {
            map: "Elsewhere".into(),
            location: Some("Arrive".into()),
        });

        let mut areas = BTreeMap::new();
        areas.insert(
            "Outside".to_string(),
            AreaDefinition {
                background: "Grass".into(),
                width: 120,
                height: 120,
                borders: Borders::default(),
                creation: vec![
                    CreationCommand::Thing(ThingCommand::new("Tree", 48, 16)),
                    CreationCommand::Thing(door),
                    CreationCommand::Thing(ferry),
                ],
            },
        );
        areas.insert(
            "Room".to_string(),
            AreaDefinition {
                background: "Floor".into(),
                width: 40,
                height: 40,
                borders: Borders::default(),
                creation: Vec::new(),
            },
        );

        let mut locations = BTreeMap::new();
        locations.insert(
            "Start".to_string(),
            LocationDefinition {
                area: "Outside".into(),
                xloc: 48,
                yloc: 32,
                direction: None,
                entry: EntryKind::Normal,
            },
        );
        locations.insert(
            "Inside".to_string(),
            LocationDefinition {
                area: "Room".into(),
                xloc: 16,
                yloc: 16,
                direction: Some(Direction::Top),
                entry: EntryKind::Normal,
            },
        );

        let mut library = MapLibrary::new();
        library.insert(MapDefinition {
            name: "Town".into(),
            seed: Some(99),
            location_default: "Start".into(),
            areas,
            locations,
        });

        let mut far_areas = BTreeMap::new();
        far_areas.insert(
            "Dock".to_string(),
            AreaDefinition {
                background: "Dirt".into(),
                width: 60,
                height: 60,
                borders: Borders::default(),
                creation: Vec::new(),
            },
        );
        let mut far_locations = BTreeMap::new();
        far_locations.insert(
            "Arrive".to_string(),
            LocationDefinition {
                area: "Dock".into(),
                xloc: 24,
                yloc: 24,
                direction: None,
                entry: EntryKind::Normal,
            },
        );
        library.insert(MapDefinition {
            name: "Elsewhere".into(),
            seed: Some(7),
            location_default: "Arrive".into(),
            areas: far_areas,
            locations: far_locations,
        });
        library
    }

    fn town_world() -> World {
        let mut world = World::new(town_library(), ThingCatalog::builtin(), 320, 288);
        world.set_map("Town", None).unwrap();
        world.take_hooks();
        world
    }

    fn run_ticks(world: &mut World, count: usize) -> Vec<HookEvent> {
        let mut hooks = Vec::new();
        for _ in 0..count {
            hooks.extend(tick(world).unwrap().hooks);
        }
        hooks
    }

    #[test]
    fn test_paused_world_does_not_advance() {
        let mut world = town_world();
        world.running = false;
        let before = world.tick;

        tick(&mut world).unwrap();
        assert_eq!(world.tick, before);
    }

    #[test]
    fn test_key_walk_moves_exactly_one_tile() {
        let mut world = town_world();
        let player = world.player.unwrap();
        let start = world.thing(player).unwrap().bounds.left + world.screen.left;

        movement::key_down(&mut world, Direction::Right);
        run_ticks(&mut world, 2);
        movement::key_up(&mut world, Direction::Right);
        run_ticks(&mut world, 40);

        let thing = world.thing(player).unwrap();
        let end = thing.bounds.left + world.screen.left;
        assert_eq!(end - start, 8 * UNIT_SIZE);
        assert_eq!((thing.xvel, thing.yvel), (0, 0));
        assert!(!thing.is_walking);
        assert!(thing.can_key_walking);
    }

    #[test]
    fn test_held_key_chains_bursts() {
        let mut world = town_world();
        let player = world.player.unwrap();
        let start = world.thing(player).unwrap().bounds.left + world.screen.left;

        movement::key_down(&mut world, Direction::Right);
        // Long enough for two full bursts (start delay + 2 x 16 steps).
        run_ticks(&mut world, 38);
        movement::key_up(&mut world, Direction::Right);
        run_ticks(&mut world, 40);

        let end = world.thing(player).unwrap().bounds.left + world.screen.left;
        assert!(end - start >= 2 * 8 * UNIT_SIZE);
        assert_eq!(world.thing(player).unwrap().xvel, 0);
    }

    #[test]
    fn test_walk_into_solid_records_contact_and_snaps() {
        let mut world = town_world();
        let player = world.player.unwrap();

        // Tree is two tiles directly above the start position.
        movement::key_down(&mut world, Direction::Top);
        run_ticks(&mut world, 60);

        let thing = world.thing(player).unwrap();
        let contact = thing.bordering_at(Direction::Top).expect("contact recorded");
        let tree = world.thing(contact).unwrap();
        assert_eq!(tree.title, "Tree");
        assert_eq!(thing.bounds.top, tree.bounds.bottom);
    }

    #[test]
    fn test_walking_classes_cycle() {
        let mut world = town_world();
        let player = world.player.unwrap();

        movement::key_down(&mut world, Direction::Right);
        run_ticks(&mut world, 12);

        // One cycle period in, the walking class has toggled on.
        assert!(world.thing(player).unwrap().walking_class);
    }

    #[test]
    fn test_door_transports_player() {
        let mut world = town_world();

        // The door is three tiles below the start position; hold down.
        movement::key_down(&mut world, Direction::Bottom);
        let hooks = run_ticks(&mut world, 120);

        assert_eq!(world.current_location.as_deref(), Some("Inside"));
        assert_eq!(world.current_area.as_deref(), Some("Room"));
        assert!(hooks
            .iter()
            .any(|h| matches!(h, HookEvent::SetLocation { location, .. } if location == "Inside")));
        // Entry direction override applied.
        let player = world.player.unwrap();
        assert_eq!(world.thing(player).unwrap().direction, Some(Direction::Top));
        assert!(world.running);
    }

    #[test]
    fn test_cross_map_door_switches_map_and_location() {
        let mut world = town_world();

        // The east door carries a map destination; hold right.
        movement::key_down(&mut world, Direction::Right);
        let hooks = run_ticks(&mut world, 120);

        assert_eq!(world.current_map.as_deref(), Some("Elsewhere"));
        assert_eq!(world.current_location.as_deref(), Some("Arrive"));
        assert_eq!(world.current_area.as_deref(), Some("Dock"));
        // The full map transition ran: reseed-and-enter, not a bare
        // location jump.
        assert!(hooks
            .iter()
            .any(|h| matches!(h, HookEvent::SetMap { map } if map == "Elsewhere")));
        assert!(hooks
            .iter()
            .any(|h| matches!(h, HookEvent::SetLocation { location, .. } if location == "Arrive")));
        assert!(world.running);
        assert!(world.player.is_some());
    }

    #[test]
    fn test_killed_character_pruned_once_neighbors_still_processed() {
        let mut world = town_world();

        let first = world.make("Lady").unwrap();
        world.add_thing(first, 8, 8);
        let second = world.make("Fatty").unwrap();
        world.add_thing(second, 200, 200);
        let roster = world.groups.characters.len();

        world.kill_thing(first);
        {
            // The survivor carries a pending walk intent; the pass must
            // still reach it after the removal shifts the roster.
            let thing = world.thing_mut(second).unwrap();
            thing.wants_to_walk = true;
            thing.next_direction = Some(Direction::Left);
        }

        tick(&mut world).unwrap();

        assert_eq!(world.groups.characters.len(), roster - 1);
        assert!(world.thing(first).is_none());
        assert!(!world.thing(second).unwrap().wants_to_walk);
        assert!(!world.scheduler.is_empty());

        // A second tick has nothing left to prune.
        tick(&mut world).unwrap();
        assert_eq!(world.groups.characters.len(), roster - 1);
    }

    #[test]
    fn test_dead_solid_pruned() {
        let mut world = town_world();
        let tree = world
            .things
            .values()
            .find(|t| t.title == "Tree")
            .map(|t| t.id)
            .unwrap();
        let roster = world.groups.solids.len();

        world.kill_thing(tree);
        tick(&mut world).unwrap();

        assert_eq!(world.groups.solids.len(), roster - 1);
        assert!(world.thing(tree).is_none());
    }

    #[test]
    fn test_follower_chain_advances_through_ticks() {
        let mut world = town_world();
        let player = world.player.unwrap();

        let bounds = world.thing(player).unwrap().bounds;
        let npc = world.make("Lady").unwrap();
        world.add_thing(npc, bounds.left, bounds.bottom);
        crate::game::following::start_following(&mut world, npc, player).unwrap();

        let npc_start = world.thing(npc).unwrap().bounds.left + world.screen.left;

        movement::key_down(&mut world, Direction::Right);
        run_ticks(&mut world, 60);
        movement::key_up(&mut world, Direction::Right);
        run_ticks(&mut world, 60);

        // Compare absolute positions; the window scrolled meanwhile.
        let npc_end = world.thing(npc).unwrap().bounds.left + world.screen.left;
        assert!(npc_end > npc_start);
        assert_eq!(world.thing(npc).unwrap().xvel, 0);
    }
}
