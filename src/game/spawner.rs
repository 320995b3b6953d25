//! Area Streaming
//!
//! Lazy world streaming: each spawned area rings itself with window
//! detector strips along edges that declare a neighbor. A detector
//! arms once it has been on screen and fires the moment it leaves the
//! viewport, spawning the neighboring area flush against the guarded
//! edge and consuming itself. Traversal markers copied from area to
//! area stop a chain from re-spawning where it came from.

use tracing::{debug, info};

use crate::core::geometry::{Bounds, Direction, Unit, UNIT_SIZE};
use crate::game::events::HookEvent;
use crate::game::map::{expand_macro, AreaKey, CreationCommand, ThingCommand};
use crate::game::scheduler::EventAction;
use crate::game::thing::{ActivateKind, ThingId};
use crate::game::world::{World, WorldError};

/// Ticks between viewport polls for a detector.
const DETECTOR_POLL_PERIOD: u64 = 7;

/// Boundary strip thickness in map units.
const DETECTOR_THICKNESS: Unit = 8;

/// Begin polling a placed window detector.
///
/// Visibility at placement is recorded immediately so a detector the
/// player starts next to can arm without waiting for the first poll.
pub fn spawn_window_detector(world: &mut World, id: ThingId) {
    let viewport = world.screen.viewport();
    if let Some(thing) = world.thing_mut(id) {
        if thing.bounds.intersects(&viewport) {
            thing.was_on_screen = true;
        }
    }

    let now = world.tick;
    world
        .scheduler
        .add_event_interval(EventAction::CheckWindowDetector(id), now, DETECTOR_POLL_PERIOD);
}

/// One viewport poll for a detector.
///
/// Inert while visible (arming on first sight); fires its activation
/// and dies on the visible-to-hidden transition. Returns `true` when
/// the poll cycle should end.
pub fn check_window_detector(world: &mut World, id: ThingId) -> Result<bool, WorldError> {
    let viewport = world.screen.viewport();
    let (intersecting, armed, alive) = match world.thing(id) {
        Some(thing) => (thing.bounds.intersects(&viewport), thing.was_on_screen, thing.alive),
        None => return Ok(true),
    };

    if !alive {
        return Ok(true);
    }

    if intersecting {
        if !armed {
            if let Some(thing) = world.thing_mut(id) {
                thing.was_on_screen = true;
            }
        }
        return Ok(false);
    }

    if !armed {
        return Ok(false);
    }

    let activate = world.thing(id).and_then(|t| t.activate);
    if activate == Some(ActivateKind::SpawnAdjacentArea) {
        activate_area_spawner(world, id)?;
    }
    world.kill_thing(id);
    Ok(true)
}

/// Fire a detector: resolve the neighbor declared on the guarded edge
/// and spawn it flush against this detector's strip.
///
/// Silently does nothing when no neighbor is declared or when the
/// neighbor already carries this traversal's marker.
pub fn activate_area_spawner(world: &mut World, id: ThingId) -> Result<(), WorldError> {
    let (direction, home, bounds) = match world.thing(id) {
        Some(thing) => match (thing.direction, thing.area.clone()) {
            (Some(direction), Some(home)) => (direction, home, thing.bounds),
            _ => return Ok(()),
        },
        None => return Ok(()),
    };

    let home_def = world.library.get_area(&home.map, &home.area)?;
    let Some(border) = home_def.borders.get(direction).cloned() else {
        return Ok(());
    };

    let target_map = border.map.unwrap_or_else(|| home.map.clone());
    let target = AreaKey::new(&target_map, &border.area);
    let target_def = world.library.get_area(&target.map, &target.area)?.clone();

    // An area spawned earlier in this traversal must not be spawned
    // again by a detector pointing back at it.
    let home_marker = world.area_runtime.get(&home).and_then(|r| r.spawned_by.clone());
    let target_marker = world.area_runtime.get(&target).and_then(|r| r.spawned_by.clone());
    if home_marker.is_some() && home_marker == target_marker {
        debug!(map = %target.map, area = %target.area, "neighbor already in traversal");
        return Ok(());
    }
    world.area_runtime.entry(target.clone()).or_default().spawned_by = home_marker;

    // Absolute placement: the new area's near edge lines up with the
    // detector strip; Top and Left need the far corner pulled back by
    // the area's span.
    let mut x = bounds.left + world.screen.left;
    let mut y = bounds.top + world.screen.top;
    match direction {
        Direction::Top => y -= target_def.height * UNIT_SIZE - bounds.height(),
        Direction::Left => x -= target_def.width * UNIT_SIZE - bounds.width(),
        Direction::Right | Direction::Bottom => {}
    }

    info!(map = %target.map, area = %target.area, %direction, "streaming neighbor area");

    spawn_area(world, &target, x, y)?;
    world.fire_hook(HookEvent::AreaSpawned { map: target.map, area: target.area });
    Ok(())
}

/// Place an area's content with its top-left at absolute engine
/// coordinates `(left, top)`.
///
/// Creation commands are offset into place, entrances are stripped
/// (the scene's locations are already set), the screen boundaries are
/// stretched over the new rect, and the area's own border detectors go
/// in so the chain can continue.
pub fn spawn_area(
    world: &mut World,
    key: &AreaKey,
    left: Unit,
    top: Unit,
) -> Result<(), WorldError> {
    let area = world.library.get_area(&key.map, &key.area)?.clone();
    let x = left / UNIT_SIZE;
    let y = top / UNIT_SIZE;

    let mut commands: Vec<ThingCommand> = Vec::new();
    for command in &area.creation {
        match command {
            CreationCommand::Thing(command) => commands.push(command.clone()),
            CreationCommand::Macro(reference) => commands.extend(expand_macro(reference)?),
        }
    }

    for mut command in commands {
        command.x += x;
        command.y += y;
        command.entrance = None;
        world.add_pre_thing(&command, key)?;
    }

    let rect = Bounds::from_position(
        left,
        top,
        area.width * UNIT_SIZE,
        area.height * UNIT_SIZE,
    );
    world.screen.boundaries.stretch_to(&rect);
    world.area_runtime.entry(key.clone()).or_default().spawned = true;
    world.recompute_scrollability();

    map_add_after(world, key, &rect)?;
    Ok(())
}

/// Ring an area rect with detector strips along its bordered edges.
///
/// Strips sit just outside the rect, spanning the full edge at a
/// fixed thickness, facing outward toward the neighbor they guard.
pub fn map_add_after(world: &mut World, key: &AreaKey, rect: &Bounds) -> Result<(), WorldError> {
    let borders = world.library.get_area(&key.map, &key.area)?.borders.clone();

    let left = rect.left / UNIT_SIZE;
    let right = rect.right / UNIT_SIZE;
    let top = rect.top / UNIT_SIZE;
    let bottom = rect.bottom / UNIT_SIZE;

    for direction in Direction::IN_PRIORITY_ORDER {
        if borders.get(direction).is_none() {
            continue;
        }

        let mut command = ThingCommand::new("AreaSpawner", 0, 0);
        match direction {
            Direction::Top => {
                command.x = left;
                command.y = top - DETECTOR_THICKNESS;
                command.width = Some(right - left);
            }
            Direction::Right => {
                command.x = right;
                command.y = top;
                command.height = Some(bottom - top);
            }
            Direction::Bottom => {
                command.x = left;
                command.y = bottom;
                command.width = Some(right - left);
            }
            Direction::Left => {
                command.x = left - DETECTOR_THICKNESS;
                command.y = top;
                command.height = Some(bottom - top);
            }
        }

        let id = world.add_pre_thing(&command, key)?;
        if let Some(thing) = world.thing_mut(id) {
            thing.direction = Some(direction);
        }
    }

    Ok(())
}
