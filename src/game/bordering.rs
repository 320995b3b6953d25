//! Bordering Resolver
//!
//! Directional contact classification between Things. When a character
//! hits something, the touched side is resolved to a single direction
//! (ties broken by a fixed Top, Right, Bottom, Left priority), the
//! contact is recorded in the character's bordering array, and the
//! character is snapped flush against the touched edge.

use crate::core::geometry::{Bounds, Direction, UNIT_SIZE};
use crate::game::thing::{CollideKind, Thing, ThingId};
use crate::game::transporter::collide_transporter;
use crate::game::world::{World, WorldError};

/// Which side of `a` touches `b`, within one engine grid unit.
///
/// Checked in fixed priority order; the first matching side wins even
/// when a corner contact satisfies two.
pub fn direction_bordering(a: &Bounds, b: &Bounds) -> Option<Direction> {
    for direction in Direction::IN_PRIORITY_ORDER {
        let gap = match direction {
            Direction::Top => a.top - b.bottom,
            Direction::Right => a.right - b.left,
            Direction::Bottom => a.bottom - b.top,
            Direction::Left => a.left - b.right,
        };
        if gap.abs() < UNIT_SIZE {
            return Some(direction);
        }
    }
    None
}

/// Broad-phase contact test: both collidable and rectangles touch
/// (edge contact counts).
pub fn things_touching(a: &Thing, b: &Thing) -> bool {
    !a.nocollide && !b.nocollide && a.bounds.intersects(&b.bounds)
}

/// Whether `thing` is aligned with `other` on its movement axis,
/// within one engine grid unit on both edge pairs.
///
/// Vertical movers compare top and bottom edges, horizontal movers
/// left and right. Things with no facing never overlap.
pub fn is_thing_overlapping(thing: &Thing, other: &Thing) -> bool {
    let Some(direction) = thing.direction else {
        return false;
    };

    if direction.is_vertical() {
        (thing.bounds.top - other.bounds.top).abs() < UNIT_SIZE
            && (thing.bounds.bottom - other.bounds.bottom).abs() < UNIT_SIZE
    } else {
        (thing.bounds.left - other.bounds.left).abs() < UNIT_SIZE
            && (thing.bounds.right - other.bounds.right).abs() < UNIT_SIZE
    }
}

/// Resolve one character-vs-thing hit.
///
/// The player always takes the `thing` role. Custom collide behavior
/// on the other party runs first and may swallow the hit entirely.
/// Corner grazes are filtered by requiring genuine overlap on the
/// perpendicular axis before a contact is recorded and snapped.
pub fn hit_character_thing(
    world: &mut World,
    thing_id: ThingId,
    other_id: ThingId,
) -> Result<(), WorldError> {
    let (mut thing_id, mut other_id) = (thing_id, other_id);

    {
        let Some(thing) = world.thing(thing_id) else { return Ok(()) };
        let Some(other) = world.thing(other_id) else { return Ok(()) };
        if other.is_player && !thing.is_player {
            std::mem::swap(&mut thing_id, &mut other_id);
        }
    }

    let other_collide = world.thing(other_id).and_then(|other| other.collide);
    if other_collide == Some(CollideKind::Transporter)
        && collide_transporter(world, thing_id, other_id)?
    {
        return Ok(());
    }

    // The transporter may have torn the scene down.
    let (Some(thing), Some(other)) = (world.thing(thing_id), world.thing(other_id)) else {
        return Ok(());
    };

    let Some(direction) = direction_bordering(&thing.bounds, &other.bounds) else {
        return Ok(());
    };

    let genuine = if direction.is_vertical() {
        thing.bounds.left != other.bounds.right && other.bounds.left != thing.bounds.right
    } else {
        thing.bounds.top != other.bounds.bottom && thing.bounds.bottom != other.bounds.top
    };
    if !genuine {
        return Ok(());
    }

    let snap = other.bounds.edge(direction.opposite());
    if let Some(thing) = world.thing_mut(thing_id) {
        thing.bordering[direction.index()] = Some(other_id);
        thing.bounds.snap_edge(direction, snap);
    }

    Ok(())
}

/// Run collision checks for one character against the solid and
/// character rosters.
///
/// Candidate order is solids first, then characters, each in roster
/// order; dead parties are skipped.
pub fn check_hits_for(world: &mut World, thing_id: ThingId) -> Result<(), WorldError> {
    let alive = world.thing(thing_id).map(|t| t.alive).unwrap_or(false);
    if !alive {
        return Ok(());
    }

    let mut candidates: Vec<ThingId> = world.groups.solids.clone();
    candidates.extend(world.groups.characters.iter().copied());

    for other_id in candidates {
        if other_id == thing_id {
            continue;
        }

        let touching = match (world.thing(thing_id), world.thing(other_id)) {
            (Some(thing), Some(other)) => {
                thing.alive && other.alive && things_touching(thing, other)
            }
            _ => false,
        };

        if touching {
            hit_character_thing(world, thing_id, other_id)?;
        }
    }

    Ok(())
}
