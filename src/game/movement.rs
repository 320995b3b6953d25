//! Character Movement
//!
//! The walking state machine. Characters move in fixed-length bursts
//! of one grid tile: starting a walk sets a constant velocity and a
//! destination edge, and a recurring end-of-burst callback either
//! chains into the next burst (key still held, or follow intent) or
//! stops flush on the grid.

use tracing::trace;

use crate::core::geometry::{Direction, Unit, UNIT_SIZE};
use crate::game::events::HookEvent;
use crate::game::following;
use crate::game::scheduler::EventAction;
use crate::game::thing::ThingId;
use crate::game::world::World;

/// Grid tile edge length in map units; one walking burst covers it.
const WALK_TILE: Unit = 8;

/// Ticks between walking/standing visual class toggles.
const WALK_CYCLE_PERIOD: u64 = 7;

/// Ticks between horizontal flips while walking vertically.
const WALK_FLIP_PERIOD: u64 = 14;

/// Face a Thing in a direction.
///
/// Right reuses the left-facing pose mirrored, so the horizontal flip
/// flag is set exactly when facing Right.
pub fn set_direction(world: &mut World, id: ThingId, direction: Direction) {
    use crate::game::thing::PoseClass;

    let Some(thing) = world.thing_mut(id) else { return };

    thing.direction = Some(direction);
    thing.flip_horiz = direction == Direction::Right;
    thing.pose_class = Some(match direction {
        Direction::Top => PoseClass::Up,
        Direction::Right | Direction::Left => PoseClass::Left,
        Direction::Bottom => PoseClass::Down,
    });
}

/// Arm a Thing's velocity and destination for a burst of `distance`
/// engine units in its current facing.
pub fn set_distance_velocity(world: &mut World, id: ThingId, distance: Unit) {
    let Some(thing) = world.thing_mut(id) else { return };
    let Some(direction) = thing.direction else { return };

    thing.distance = distance;
    match direction {
        Direction::Top => {
            thing.xvel = 0;
            thing.yvel = -thing.speed;
            thing.destination = thing.bounds.top - distance;
        }
        Direction::Right => {
            thing.xvel = thing.speed;
            thing.yvel = 0;
            thing.destination = thing.bounds.right + distance;
        }
        Direction::Bottom => {
            thing.xvel = 0;
            thing.yvel = thing.speed;
            thing.destination = thing.bounds.bottom + distance;
        }
        Direction::Left => {
            thing.xvel = -thing.speed;
            thing.yvel = 0;
            thing.destination = thing.bounds.left - distance;
        }
    }
}

/// Start a walking burst in `direction`.
///
/// The burst length is the largest whole-step multiple of the Thing's
/// speed covering one grid tile, so the final step lands exactly on
/// the destination edge. Animation cycles and the end-of-burst
/// callback are armed once and persist across chained bursts.
pub fn start_walking(world: &mut World, id: ThingId, direction: Direction) {
    let (speed, follower) = match world.thing(id) {
        Some(thing) if thing.alive && thing.speed > 0 => (thing.speed, thing.follower),
        _ => return,
    };

    let repeats = (WALK_TILE * UNIT_SIZE / speed) as u64;
    let distance = repeats as Unit * speed;

    trace!(?id, %direction, repeats, "start walking");

    set_direction(world, id, direction);
    set_distance_velocity(world, id, distance);

    let now = world.tick;
    let (has_cycle, has_flip, has_stop) = match world.thing(id) {
        Some(thing) => (
            thing.walking_cycle_event.is_some(),
            thing.walking_flip_event.is_some(),
            thing.walking_stop_event.is_some(),
        ),
        None => return,
    };

    if !has_cycle {
        let event = world.scheduler.add_event_interval(
            EventAction::WalkingClassCycle(id),
            now,
            WALK_CYCLE_PERIOD,
        );
        if let Some(thing) = world.thing_mut(id) {
            thing.walking_cycle_event = Some(event);
        }
    }

    if !has_flip {
        let event = world.scheduler.add_event_interval(
            EventAction::SwitchFlip(id),
            now,
            WALK_FLIP_PERIOD,
        );
        if let Some(thing) = world.thing_mut(id) {
            thing.walking_flip_event = Some(event);
        }
    }

    if !has_stop {
        let event =
            world.scheduler.add_event_interval(EventAction::WalkingStop(id), now, repeats);
        if let Some(thing) = world.thing_mut(id) {
            thing.walking_stop_event = Some(event);
        }
    }

    if let Some(thing) = world.thing_mut(id) {
        thing.is_walking = true;
    }

    if let Some(follower) = follower {
        following::continue_following(world, follower, direction);
    }
}

/// Player variant: locks out further key-driven starts for the burst.
pub fn player_start_walking(world: &mut World, id: ThingId, direction: Direction) {
    if let Some(thing) = world.thing_mut(id) {
        thing.can_key_walking = false;
    }
    start_walking(world, id, direction);
}

/// Stop a walking burst dead: zero velocity, drop the walking visual
/// state, revoke the animation cycles, and pause any follower.
///
/// Always reports the stop as final.
pub fn stop_walking(world: &mut World, id: ThingId) -> bool {
    let Some(thing) = world.thing_mut(id) else { return true };

    thing.is_walking = false;
    thing.xvel = 0;
    thing.yvel = 0;
    thing.walking_class = false;

    let cycle = thing.walking_cycle_event.take();
    let flip = thing.walking_flip_event.take();
    let stop = thing.walking_stop_event.take();
    let follower = thing.follower;

    for event in [cycle, flip, stop].into_iter().flatten() {
        world.scheduler.cancel_event(event);
    }

    if let Some(follower) = follower {
        following::pause_following(world, follower);
    }

    true
}

/// End-of-burst callback for non-player characters.
///
/// A pending walk intent (set by a leader's propagation) chains into
/// the next burst and reports the walk as continuing.
pub fn character_stop_walking(world: &mut World, id: ThingId) -> bool {
    let (wants, next, current) = match world.thing(id) {
        Some(thing) => (thing.wants_to_walk, thing.next_direction, thing.direction),
        None => return true,
    };

    if wants {
        if let Some(thing) = world.thing_mut(id) {
            thing.wants_to_walk = false;
        }
        if let Some(direction) = next.or(current) {
            set_direction(world, id, direction);
            let distance = world.thing(id).map(|t| t.distance).unwrap_or(0);
            set_distance_velocity(world, id, distance);
            if let Some(follower) = world.thing(id).and_then(|t| t.follower) {
                following::continue_following(world, follower, direction);
            }
        }
        return false;
    }

    stop_walking(world, id)
}

/// End-of-burst callback for the player.
///
/// A still-held direction key chains straight into the next burst;
/// otherwise the key lockout lifts and the walk ends.
pub fn player_stop_walking(world: &mut World, id: ThingId) -> bool {
    let (held, direction, distance, follower) = match world.thing(id) {
        Some(thing) => {
            let held = thing
                .direction
                .map(|d| thing.keys[d.index()])
                .unwrap_or(false);
            (held, thing.direction, thing.distance, thing.follower)
        }
        None => return true,
    };

    if held {
        set_distance_velocity(world, id, distance);
        if let (Some(follower), Some(direction)) = (follower, direction) {
            following::continue_following(world, follower, direction);
        }
        return false;
    }

    if let Some(thing) = world.thing_mut(id) {
        thing.can_key_walking = true;
    }
    stop_walking(world, id)
}

/// Alternate the horizontal flip while walking vertically, faking a
/// left/right step animation from a single side pose.
pub fn switch_flip_on_direction(world: &mut World, id: ThingId) {
    let Some(thing) = world.thing_mut(id) else { return };
    let Some(direction) = thing.direction else { return };

    if direction.is_vertical() {
        thing.flip_horiz = !thing.flip_horiz;
    }
}

/// Toggle the walking/standing visual class.
pub fn walking_class_cycle(world: &mut World, id: ThingId) {
    if let Some(thing) = world.thing_mut(id) {
        if thing.is_walking {
            thing.walking_class = !thing.walking_class;
        }
    }
}

/// Move a character by its velocity, clearing the contacts
/// perpendicular to the motion axis. Stationary characters keep their
/// recorded contacts.
pub fn shift_character(world: &mut World, id: ThingId) {
    let Some(thing) = world.thing_mut(id) else { return };

    if thing.xvel != 0 {
        thing.bordering[Direction::Right.index()] = None;
        thing.bordering[Direction::Left.index()] = None;
    } else if thing.yvel != 0 {
        thing.bordering[Direction::Top.index()] = None;
        thing.bordering[Direction::Bottom.index()] = None;
    } else {
        return;
    }

    let (xvel, yvel) = (thing.xvel, thing.yvel);
    thing.bounds.shift(xvel, yvel);
}

/// Register a player turn/walk intent: face the direction, remember it
/// across transitions, and flag the walk to start at the next tick
/// boundary.
pub fn set_player_direction(world: &mut World, id: ThingId, direction: Direction) {
    world.screen.player_direction = direction;

    let Some(thing) = world.thing_mut(id) else { return };
    thing.direction = Some(direction);
    thing.wants_to_walk = true;
    thing.next_direction = Some(direction);
    thing.keys[direction.index()] = true;
}

// =============================================================================
// Input surface
// =============================================================================

/// A directional key went down.
pub fn key_down(world: &mut World, direction: Direction) {
    world.record_input(HookEvent::KeyDown { direction });
    world.fire_hook(HookEvent::KeyDown { direction });

    let Some(player) = world.player else { return };
    let can_walk = world.thing(player).map(|t| t.can_key_walking).unwrap_or(false);
    if can_walk {
        set_player_direction(world, player, direction);
    }
}

/// A directional key went up.
pub fn key_up(world: &mut World, direction: Direction) {
    world.record_input(HookEvent::KeyUp { direction });
    world.fire_hook(HookEvent::KeyUp { direction });

    let Some(player) = world.player else { return };
    if let Some(thing) = world.thing_mut(player) {
        thing.keys[direction.index()] = false;
    }
}

/// The interaction button: read dialog off whatever the player is
/// facing and bordering. Walking is locked until the dialog closes.
pub fn key_a(world: &mut World) {
    world.record_input(HookEvent::KeyA);
    world.fire_hook(HookEvent::KeyA);

    let Some(player) = world.player else { return };
    let speaker = world.thing(player).and_then(|thing| {
        let direction = thing.direction?;
        thing.bordering_at(direction)
    });
    let Some(speaker) = speaker else { return };

    let Some(dialog) = world.thing(speaker).and_then(|other| other.dialog.clone()) else {
        return;
    };

    if let Some(thing) = world.thing_mut(player) {
        thing.can_key_walking = false;
    }
    world.fire_hook(HookEvent::DialogRequest { player, speaker, dialog });
}

/// The pause button: freeze a live simulation, thaw a paused one.
pub fn key_pause(world: &mut World) {
    world.record_input(HookEvent::KeyPause);
    world.fire_hook(HookEvent::KeyPause);

    if world.running {
        world.pause();
    } else {
        world.resume();
    }
}

/// Dialog closed; lift the key lockout.
pub fn dialog_finish(world: &mut World, id: ThingId) {
    if let Some(thing) = world.thing_mut(id) {
        thing.can_key_walking = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use crate::game::map::{
        AreaDefinition, Borders, EntryKind, LocationDefinition, MapDefinition, MapLibrary,
    };
    use crate::game::thing::ThingCatalog;

    fn open_field_world() -> World {
        let mut areas = BTreeMap::new();
        areas.insert(
            "Field".to_string(),
            AreaDefinition {
                background: "Grass".into(),
                width: 200,
                height: 200,
                borders: Borders::default(),
                creation: Vec::new(),
            },
        );
        let mut locations = BTreeMap::new();
        locations.insert(
            "Start".to_string(),
            LocationDefinition {
                area: "Field".into(),
                xloc: 80,
                yloc: 80,
                direction: None,
                entry: EntryKind::Normal,
            },
        );
        let mut library = MapLibrary::new();
        library.insert(MapDefinition {
            name: "Field".into(),
            seed: Some(7),
            location_default: "Start".into(),
            areas,
            locations,
        });

        let mut world = World::new(library, ThingCatalog::builtin(), 320, 288);
        world.set_map("Field", None).unwrap();
        world.take_hooks();
        world
    }

    #[test]
    fn test_set_direction_flips_only_right() {
        use crate::game::thing::PoseClass;
        let mut world = open_field_world();
        let player = world.player.unwrap();

        set_direction(&mut world, player, Direction::Right);
        let thing = world.thing(player).unwrap();
        assert!(thing.flip_horiz);
        assert_eq!(thing.pose_class, Some(PoseClass::Left));

        set_direction(&mut world, player, Direction::Left);
        let thing = world.thing(player).unwrap();
        assert!(!thing.flip_horiz);
        assert_eq!(thing.pose_class, Some(PoseClass::Left));

        set_direction(&mut world, player, Direction::Top);
        assert_eq!(world.thing(player).unwrap().pose_class, Some(PoseClass::Up));
    }

    #[test]
    fn test_walk_burst_covers_exactly_one_tile() {
        let mut world = open_field_world();
        let player = world.player.unwrap();
        let start_top = world.thing(player).unwrap().bounds.top;

        start_walking(&mut world, player, Direction::Bottom);

        let thing = world.thing(player).unwrap();
        let speed = thing.speed;
        let repeats = (WALK_TILE * UNIT_SIZE / speed) as usize;
        assert_eq!(thing.yvel, speed);
        assert_eq!(thing.xvel, 0);
        assert_eq!(thing.distance, repeats as Unit * speed);
        assert!(thing.is_walking);

        for _ in 0..repeats {
            shift_character(&mut world, player);
        }
        stop_walking(&mut world, player);

        let thing = world.thing(player).unwrap();
        // Net displacement is exactly the burst distance, velocity gone.
        assert_eq!(thing.bounds.top - start_top, WALK_TILE * UNIT_SIZE);
        assert_eq!((thing.xvel, thing.yvel), (0, 0));
        assert!(!thing.is_walking);
        assert!(world.scheduler.is_empty());
    }

    #[test]
    fn test_player_stop_rearms_while_key_held() {
        let mut world = open_field_world();
        let player = world.player.unwrap();

        key_down(&mut world, Direction::Right);
        player_start_walking(&mut world, player, Direction::Right);

        assert!(!player_stop_walking(&mut world, player));
        let thing = world.thing(player).unwrap();
        assert_eq!(thing.xvel, thing.speed);
        assert!(!thing.can_key_walking);

        key_up(&mut world, Direction::Right);
        assert!(player_stop_walking(&mut world, player));
        let thing = world.thing(player).unwrap();
        assert_eq!(thing.xvel, 0);
        assert!(thing.can_key_walking);
    }

    #[test]
    fn test_key_down_ignored_while_walking() {
        let mut world = open_field_world();
        let player = world.player.unwrap();

        key_down(&mut world, Direction::Bottom);
        player_start_walking(&mut world, player, Direction::Bottom);

        // Lockout holds: a second key can't turn the player mid-burst.
        key_down(&mut world, Direction::Left);
        let thing = world.thing(player).unwrap();
        assert_eq!(thing.direction, Some(Direction::Bottom));
        assert!(!thing.keys[Direction::Left.index()]);
    }

    #[test]
    fn test_switch_flip_only_vertical() {
        let mut world = open_field_world();
        let player = world.player.unwrap();

        set_direction(&mut world, player, Direction::Top);
        switch_flip_on_direction(&mut world, player);
        assert!(world.thing(player).unwrap().flip_horiz);
        switch_flip_on_direction(&mut world, player);
        assert!(!world.thing(player).unwrap().flip_horiz);

        set_direction(&mut world, player, Direction::Left);
        switch_flip_on_direction(&mut world, player);
        assert!(!world.thing(player).unwrap().flip_horiz);
    }

    #[test]
    fn test_shift_clears_perpendicular_contacts_only() {
        let mut world = open_field_world();
        let player = world.player.unwrap();
        let ghost = ThingId(9999);

        {
            let thing = world.thing_mut(player).unwrap();
            thing.bordering = [Some(ghost); 4];
            thing.xvel = 2;
        }
        shift_character(&mut world, player);

        let thing = world.thing(player).unwrap();
        assert_eq!(thing.bordering_at(Direction::Right), None);
        assert_eq!(thing.bordering_at(Direction::Left), None);
        assert_eq!(thing.bordering_at(Direction::Top), Some(ghost));
        assert_eq!(thing.bordering_at(Direction::Bottom), Some(ghost));

        // Stationary: contacts stay.
        {
            let thing = world.thing_mut(player).unwrap();
            thing.xvel = 0;
            thing.bordering = [Some(ghost); 4];
        }
        shift_character(&mut world, player);
        assert_eq!(world.thing(player).unwrap().bordering_at(Direction::Right), Some(ghost));
    }

    #[test]
    fn test_dialog_locks_walking_until_finish() {
        let mut world = open_field_world();
        let player = world.player.unwrap();

        let npc = world.make("Lady").unwrap();
        world.thing_mut(npc).unwrap().dialog = Some("Hello!".into());
        let player_bounds = world.thing(player).unwrap().bounds;
        world.add_thing(npc, player_bounds.left, player_bounds.bottom);

        set_direction(&mut world, player, Direction::Bottom);
        world.thing_mut(player).unwrap().bordering[Direction::Bottom.index()] = Some(npc);
        world.take_hooks();

        key_a(&mut world);

        assert!(!world.thing(player).unwrap().can_key_walking);
        assert!(world
            .take_hooks()
            .iter()
            .any(|h| matches!(h, HookEvent::DialogRequest { .. })));

        dialog_finish(&mut world, player);
        assert!(world.thing(player).unwrap().can_key_walking);
    }

    #[test]
    fn test_key_pause_toggles_and_fires_hooks() {
        let mut world = open_field_world();

        key_pause(&mut world);
        assert!(!world.running);
        let hooks = world.take_hooks();
        assert!(hooks.iter().any(|h| matches!(h, HookEvent::KeyPause)));
        assert!(hooks.iter().any(|h| matches!(h, HookEvent::Pause)));

        // A paused world ignores a walk intent entirely.
        let before = world.tick;
        key_down(&mut world, Direction::Right);
        crate::game::tick::tick(&mut world).unwrap();
        assert_eq!(world.tick, before);

        key_pause(&mut world);
        assert!(world.running);
        assert!(world
            .take_hooks()
            .iter()
            .any(|h| matches!(h, HookEvent::Resume)));
    }

    #[test]
    fn test_key_a_without_dialog_is_inert() {
        let mut world = open_field_world();
        let player = world.player.unwrap();
        set_direction(&mut world, player, Direction::Top);
        world.take_hooks();

        key_a(&mut world);

        assert!(world.thing(player).unwrap().can_key_walking);
        assert!(!world
            .take_hooks()
            .iter()
            .any(|h| matches!(h, HookEvent::DialogRequest { .. })));
    }
}
