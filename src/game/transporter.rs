//! Transporters
//!
//! Warp Things (doors, cave mouths, stair tiles) using a two-phase
//! activation protocol: first contact while moving toward the Thing
//! arms it, and full overlap on the movement axis fires the warp.
//! The two phases keep a character that merely brushes a door edge
//! from being teleported.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::game::bordering::{direction_bordering, is_thing_overlapping};
use crate::game::thing::ThingId;
use crate::game::world::{World, WorldError};

/// Warp destination carried by a transporter Thing.
///
/// Map data writes destinations in three shapes: a bare location name,
/// a map (with optional location), or an explicit location field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Transport {
    /// Bare location name in the current map
    Location(String),
    /// Another map, optionally at a named location
    MapLocation {
        map: String,
        #[serde(default)]
        location: Option<String>,
    },
    /// Explicit location field, current map
    LocationOnly { location: String },
}

/// Custom collide hook for transporter Things.
///
/// Returns `Ok(true)` when the collision is fully handled here and
/// normal solid resolution must be skipped for this pair.
pub fn collide_transporter(
    world: &mut World,
    thing_id: ThingId,
    other_id: ThingId,
) -> Result<bool, WorldError> {
    let (thing, other) = match (world.things.get(&thing_id), world.things.get(&other_id)) {
        (Some(thing), Some(other)) => (thing, other),
        _ => return Ok(false),
    };

    if other.activated {
        if is_thing_overlapping(thing, other) {
            // An armed door with a required facing only fires while
            // that direction key is held.
            if let Some(required) = other.require_direction {
                if !thing.keys[required.index()] {
                    return Ok(true);
                }
            }
            activate_transporter(world, thing_id, other_id)?;
        }
        return Ok(true);
    }

    // First contact: arm only when the approach direction matches the
    // side being touched.
    let direction_movement = thing.direction;
    let direction_actual = direction_bordering(&thing.bounds, &other.bounds);

    if direction_movement.is_some() && direction_movement == direction_actual {
        if let Some(other) = world.things.get_mut(&other_id) {
            debug!(title = %other.title, "transporter armed");
            other.activated = true;
        }
        return Ok(true);
    }

    Ok(false)
}

/// Fire a transporter's warp for `thing_id`.
///
/// Non-player characters pass through without transporting. A
/// transporter with no destination is a map-data error.
pub fn activate_transporter(
    world: &mut World,
    thing_id: ThingId,
    other_id: ThingId,
) -> Result<(), WorldError> {
    let Some(thing) = world.things.get(&thing_id) else {
        return Ok(());
    };
    if !thing.is_player {
        return Ok(());
    }

    let Some(other) = world.things.get(&other_id) else {
        return Ok(());
    };
    let title = other.title.clone();
    let transport = other
        .transport
        .clone()
        .ok_or_else(|| WorldError::MissingTransport { title: title.clone() })?;

    debug!(title = %title, ?transport, "transporter fired");

    match transport {
        Transport::Location(location) | Transport::LocationOnly { location } => {
            if location.is_empty() {
                return Err(WorldError::MalformedTransport { title });
            }
            world.set_location(&location)
        }
        Transport::MapLocation { map, location } => {
            if map.is_empty() {
                return Err(WorldError::MalformedTransport { title });
            }
            world.set_map(&map, location.as_deref())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_shapes_deserialize() {
        let bare: Transport = serde_json::from_str("\"HomeInterior\"").unwrap();
        assert_eq!(bare, Transport::Location("HomeInterior".into()));

        let cross: Transport =
            serde_json::from_str(r#"{"map": "Northfield", "location": "South"}"#).unwrap();
        assert_eq!(
            cross,
            Transport::MapLocation { map: "Northfield".into(), location: Some("South".into()) }
        );

        let map_only: Transport = serde_json::from_str(r#"{"map": "Northfield"}"#).unwrap();
        assert_eq!(
            map_only,
            Transport::MapLocation { map: "Northfield".into(), location: None }
        );

        let field: Transport = serde_json::from_str(r#"{"location": "South"}"#).unwrap();
        assert_eq!(field, Transport::LocationOnly { location: "South".into() });
    }
}
