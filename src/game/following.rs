//! Follower Chains
//!
//! Characters trailing a leader one tile behind. A follow relation is
//! a pair of handles (leader's `follower`, follower's `following`);
//! the leader's walking code propagates each step as a walk intent on
//! the follower, so the chain advances with a one-burst lag.

use tracing::debug;

use crate::core::geometry::Direction;
use crate::game::bordering::direction_bordering;
use crate::game::movement;
use crate::game::thing::ThingId;
use crate::game::world::{World, WorldError};

/// Link `follow` behind `lead`.
///
/// The pair must already be bordering; the follower snaps flush
/// against the touched side, adopts the leader's speed (its own is
/// saved for restore), and faces the leader. Linking a character to
/// itself or into its own chain is refused.
pub fn start_following(
    world: &mut World,
    follow: ThingId,
    lead: ThingId,
) -> Result<(), WorldError> {
    if follow == lead || would_cycle(world, follow, lead) {
        return Err(WorldError::FollowCycle);
    }

    let (follow_bounds, lead_bounds, lead_speed) =
        match (world.thing(follow), world.thing(lead)) {
            (Some(f), Some(l)) => (f.bounds, l.bounds, l.speed),
            _ => return Err(WorldError::TooFarToFollow),
        };

    let direction =
        direction_bordering(&follow_bounds, &lead_bounds).ok_or(WorldError::TooFarToFollow)?;

    debug!(?follow, ?lead, %direction, "start following");

    if let Some(leader) = world.thing_mut(lead) {
        leader.follower = Some(follow);
    }

    let snap = lead_bounds.edge(direction.opposite());
    if let Some(follower) = world.thing_mut(follow) {
        follower.following = Some(lead);
        if follower.saved_speed.is_none() {
            follower.saved_speed = Some(follower.speed);
        }
        follower.speed = lead_speed;
        follower.bounds.snap_edge(direction, snap);
    }

    movement::set_direction(world, follow, direction);

    Ok(())
}

/// Whether linking `follow` behind `lead` would close a loop in the
/// chain.
fn would_cycle(world: &World, follow: ThingId, lead: ThingId) -> bool {
    let mut current = Some(lead);
    while let Some(id) = current {
        if id == follow {
            return true;
        }
        current = world.thing(id).and_then(|t| t.following);
    }
    false
}

/// Leader stepped: queue the follower's next burst in `direction`.
pub fn continue_following(world: &mut World, follow: ThingId, direction: Direction) {
    if let Some(thing) = world.thing_mut(follow) {
        thing.wants_to_walk = true;
        thing.next_direction = Some(direction);
    }
}

/// Leader stopped: drop the follower's pending walk intent. The
/// follower finishes its current burst and halts on the grid.
pub fn pause_following(world: &mut World, follow: ThingId) {
    if let Some(thing) = world.thing_mut(follow) {
        thing.wants_to_walk = false;
    }
}

/// Sever the relation, clearing both links.
///
/// The adopted speed and `saved_speed` are left in place; whoever
/// severs the chain decides when (and whether) to restore them.
pub fn stop_following(world: &mut World, follow: ThingId, lead: ThingId) {
    if let Some(leader) = world.thing_mut(lead) {
        if leader.follower == Some(follow) {
            leader.follower = None;
        }
    }

    if let Some(follower) = world.thing_mut(follow) {
        if follower.following == Some(lead) {
            follower.following = None;
        }
    }
}
