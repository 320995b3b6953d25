//! Map Data
//!
//! Static world content: maps, their areas, locations, border wiring,
//! and the creation commands (including expandable macros) that
//! describe each area's Things. Everything here is declarative data;
//! the world transition and streaming layers consume it.

use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::core::geometry::{Direction, Unit};
use crate::game::transporter::Transport;
use crate::game::world::WorldError;

/// Reference from one area's border to another area.
///
/// `map` defaults to the referencing area's own map when absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaRef {
    /// Target map; `None` means same map
    #[serde(default)]
    pub map: Option<String>,
    /// Target area name
    pub area: String,
}

impl AreaRef {
    /// Same-map border reference.
    pub fn area(name: &str) -> Self {
        Self { map: None, area: name.to_string() }
    }

    /// Cross-map border reference.
    pub fn map_area(map: &str, area: &str) -> Self {
        Self { map: Some(map.to_string()), area: area.to_string() }
    }
}

/// Declared neighbors of an area, one slot per edge.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borders {
    #[serde(default)]
    pub top: Option<AreaRef>,
    #[serde(default)]
    pub right: Option<AreaRef>,
    #[serde(default)]
    pub bottom: Option<AreaRef>,
    #[serde(default)]
    pub left: Option<AreaRef>,
}

impl Borders {
    /// Neighbor declared on `direction`, if any.
    pub fn get(&self, direction: Direction) -> Option<&AreaRef> {
        match direction {
            Direction::Top => self.top.as_ref(),
            Direction::Right => self.right.as_ref(),
            Direction::Bottom => self.bottom.as_ref(),
            Direction::Left => self.left.as_ref(),
        }
    }

    /// True when any edge declares a neighbor.
    pub fn any(&self) -> bool {
        self.top.is_some() || self.right.is_some() || self.bottom.is_some() || self.left.is_some()
    }
}

/// Direct Thing placement, in map grid units.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ThingCommand {
    /// Catalog kind name
    pub thing: String,
    /// Left edge in map units
    #[serde(default)]
    pub x: Unit,
    /// Top edge in map units
    #[serde(default)]
    pub y: Unit,
    /// Width override in map units
    #[serde(default)]
    pub width: Option<Unit>,
    /// Height override in map units
    #[serde(default)]
    pub height: Option<Unit>,
    /// Warp destination for transporters
    #[serde(default)]
    pub transport: Option<Transport>,
    /// Facing the approaching entity must hold for transport
    #[serde(default)]
    pub require_direction: Option<Direction>,
    /// Location entrance this Thing marks
    #[serde(default)]
    pub entrance: Option<String>,
    /// Dialog text for interactable characters
    #[serde(default)]
    pub dialog: Option<String>,
}

impl ThingCommand {
    /// Minimal placement command.
    pub fn new(thing: &str, x: Unit, y: Unit) -> Self {
        Self { thing: thing.to_string(), x, y, ..Default::default() }
    }
}

/// Band of a large house wall to render whitewashed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WhiteBand {
    pub start: Unit,
    pub end: Unit,
}

/// Parameters for an expandable macro command.
///
/// Fields are a union across all macros; each macro reads the subset
/// it understands and defaults the rest.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroReference {
    /// Macro name ("Checkered", "Water", "House", "HouseLarge")
    pub name: String,
    #[serde(default)]
    pub x: Unit,
    #[serde(default)]
    pub y: Unit,
    /// Checkered: columns
    #[serde(default)]
    pub xnum: Unit,
    /// Checkered: rows
    #[serde(default)]
    pub ynum: Unit,
    /// Checkered: cell width
    #[serde(default)]
    pub xwidth: Unit,
    /// Checkered: cell height
    #[serde(default)]
    pub yheight: Unit,
    /// Checkered: pattern phase shift
    #[serde(default)]
    pub offset: Unit,
    /// Checkered: kind names cycled through; "" leaves a gap
    #[serde(default)]
    pub things: Vec<String>,
    /// Water/House: overall width
    #[serde(default)]
    pub width: Option<Unit>,
    /// Water: overall height
    #[serde(default)]
    pub height: Option<Unit>,
    /// Water: per-edge openness [top, right, bottom, left]
    #[serde(default)]
    pub open: Option<[bool; 4]>,
    /// House: floor count
    #[serde(default)]
    pub stories: Option<Unit>,
    /// House: skip the door
    #[serde(default)]
    pub no_door: bool,
    /// House: entrance name for the door
    #[serde(default)]
    pub entrance: Option<String>,
    /// House: warp destination for the door
    #[serde(default)]
    pub transport: Option<Transport>,
    /// HouseLarge: whitewashed wall band
    #[serde(default)]
    pub white: Option<WhiteBand>,
}

/// One entry in an area's creation listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CreationCommand {
    /// Place a single Thing
    Thing(ThingCommand),
    /// Expand a macro into Thing placements
    Macro(MacroReference),
}

/// Expand a macro reference into direct placement commands.
///
/// Unknown macro names are an error so map data typos fail loudly at
/// spawn time instead of silently producing an empty area.
pub fn expand_macro(reference: &MacroReference) -> Result<Vec<ThingCommand>, WorldError> {
    match reference.name.as_str() {
        "Checkered" => Ok(macro_checkered(reference)),
        "Water" => Ok(macro_water(reference)),
        "House" => Ok(macro_house(reference)),
        "HouseLarge" => Ok(macro_house_large(reference)),
        other => Err(WorldError::UnknownMacro(other.to_string())),
    }
}

/// Alternating grid of kinds, row-major with a phase shift per row.
fn macro_checkered(reference: &MacroReference) -> Vec<ThingCommand> {
    let xnum = reference.xnum.max(1);
    let ynum = reference.ynum.max(1);
    let xwidth = if reference.xwidth > 0 { reference.xwidth } else { 8 };
    let yheight = if reference.yheight > 0 { reference.yheight } else { 8 };
    let modulus = reference.things.len() as Unit;
    let mut output = Vec::new();

    if modulus == 0 {
        return output;
    }

    let mut y = reference.y;
    for i in 0..ynum {
        let mut x = reference.x;
        for j in 0..xnum {
            let index = ((i + j + reference.offset) % modulus) as usize;
            let thing = &reference.things[index];
            if !thing.is_empty() {
                output.push(ThingCommand::new(thing, x, y));
            }
            x += xwidth;
        }
        y += yheight;
    }

    output
}

/// Water body with closed edges drawn as shoreline strips.
fn macro_water(reference: &MacroReference) -> Vec<ThingCommand> {
    let x = reference.x;
    let y = reference.y;
    let width = reference.width.unwrap_or(8);
    let height = reference.height.unwrap_or(8);

    let mut body = ThingCommand::new("Water", x, y);
    body.width = Some(width);
    body.height = Some(height);
    let mut output = vec![body];

    let Some(open) = reference.open else {
        return output;
    };

    if !open[0] {
        let mut edge = ThingCommand::new("WaterEdgeTop", x, y);
        edge.width = Some(width);
        output.push(edge);
    }

    if !open[1] {
        let mut edge = ThingCommand::new(
            "WaterEdgeRight",
            x + width - 4,
            if open[0] { y } else { y + 4 },
        );
        edge.height = Some(if open[0] { height } else { height - 4 });
        output.push(edge);
    }

    if !open[2] {
        let mut edge = ThingCommand::new("WaterEdgeBottom", x, y + height - 4);
        edge.width = Some(width);
        output.push(edge);
    }

    if !open[3] {
        let mut edge = ThingCommand::new("WaterEdgeLeft", x, y);
        edge.height = Some(height);
        output.push(edge);
    }

    output
}

/// Small house: roof, stacked center stories, optional door.
fn macro_house(reference: &MacroReference) -> Vec<ThingCommand> {
    let x = reference.x;
    let mut y = reference.y;
    let width = reference.width.unwrap_or(32);
    let stories = reference.stories.unwrap_or(1);

    let mut roof = ThingCommand::new("HouseTop", x, y);
    roof.width = Some(width);
    let mut output = vec![roof];

    y += 16;
    for _ in 2..stories.max(1) {
        output.push(ThingCommand::new("HouseCenterLeft", x, y));
        let mut right = ThingCommand::new("HouseCenterRight", x + 16, y);
        right.width = Some(width - 16);
        output.push(right);
        y += 8;
    }

    output.push(ThingCommand::new("HouseCenterLeft", x, y));
    let mut right = ThingCommand::new("HouseCenterRight", x + 16, y);
    right.width = Some(width - 16);
    output.push(right);
    y += 8;

    if !reference.no_door {
        let mut door = ThingCommand::new("Door", x + 8, y - 8);
        door.require_direction = Some(Direction::Top);
        door.entrance = reference.entrance.clone();
        door.transport = reference.transport.clone();
        output.push(door);
    }

    output
}

/// Large house: three-piece roof, wide stories, recessed door.
fn macro_house_large(reference: &MacroReference) -> Vec<ThingCommand> {
    let x = reference.x;
    let mut y = reference.y;
    let width = reference.width.unwrap_or(48);
    let stories = reference.stories.unwrap_or(1);

    let mut output = vec![ThingCommand::new("HouseLargeTopLeft", x, y)];
    let mut middle = ThingCommand::new("HouseLargeTopMiddle", x + 8, y);
    middle.width = Some(width - 16);
    output.push(middle);
    output.push(ThingCommand::new("HouseLargeTopRight", x + width - 8, y));

    y += 20;
    for _ in 2..stories.max(2) {
        let mut center = ThingCommand::new("HouseLargeCenter", x, y);
        center.width = Some(width);
        output.push(center);

        if let Some(white) = &reference.white {
            let mut wash = ThingCommand::new("HouseWallWhitewash", white.start, y);
            wash.width = Some(white.end - white.start);
            output.push(wash);
        }

        y += 16;
    }

    if !reference.no_door {
        let mut left = ThingCommand::new("HouseLargeCenterLeft", x, y);
        left.width = Some(16);
        output.push(left);
        let mut gap = ThingCommand::new("HouseLargeCenterMiddle", x + 16, y);
        gap.width = Some(8);
        gap.height = Some(4);
        output.push(gap);
        let mut right = ThingCommand::new("HouseLargeCenterRight", x + 24, y);
        right.width = Some(width - 24);
        output.push(right);

        if let Some(white) = &reference.white {
            let mut wash = ThingCommand::new("HouseWallWhitewash", white.start, y);
            wash.width = Some(white.end - white.start);
            output.push(wash);
        }

        y += 16;

        let mut door = ThingCommand::new("Door", x + 16, y - 12);
        door.require_direction = Some(Direction::Top);
        door.entrance = reference.entrance.clone();
        door.transport = reference.transport.clone();
        output.push(door);
    }

    output
}

/// One contiguous region of a map.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AreaDefinition {
    /// Background fill name, reported to the renderer on entry
    #[serde(default)]
    pub background: String,
    /// Width in map grid units
    pub width: Unit,
    /// Height in map grid units
    pub height: Unit,
    /// Declared neighbors by edge
    #[serde(default)]
    pub borders: Borders,
    /// Thing content
    #[serde(default)]
    pub creation: Vec<CreationCommand>,
}

/// How the player enters a location.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Place the player at the location's coordinates
    #[default]
    Normal,
}

/// A named entry point into an area.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocationDefinition {
    /// Containing area
    pub area: String,
    /// Player spawn left edge in map units
    #[serde(default)]
    pub xloc: Unit,
    /// Player spawn top edge in map units
    #[serde(default)]
    pub yloc: Unit,
    /// Facing on entry; overrides the remembered one
    #[serde(default)]
    pub direction: Option<Direction>,
    /// Entry behavior
    #[serde(default)]
    pub entry: EntryKind,
}

/// A named map: areas plus locations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapDefinition {
    pub name: String,
    /// Explicit RNG seed; derived from the name when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Location entered when none is named
    pub location_default: String,
    pub areas: BTreeMap<String, AreaDefinition>,
    pub locations: BTreeMap<String, LocationDefinition>,
}

/// All known maps, by name.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MapLibrary {
    maps: BTreeMap<String, MapDefinition>,
}

impl MapLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, map: MapDefinition) {
        self.maps.insert(map.name.clone(), map);
    }

    pub fn get(&self, name: &str) -> Result<&MapDefinition, WorldError> {
        self.maps
            .get(name)
            .ok_or_else(|| WorldError::UnknownMap(name.to_string()))
    }

    pub fn get_area<'a>(
        &'a self,
        map: &str,
        area: &str,
    ) -> Result<&'a AreaDefinition, WorldError> {
        self.get(map)?.areas.get(area).ok_or_else(|| WorldError::UnknownArea {
            map: map.to_string(),
            area: area.to_string(),
        })
    }

    pub fn get_location<'a>(
        &'a self,
        map: &str,
        location: &str,
    ) -> Result<&'a LocationDefinition, WorldError> {
        self.get(map)?
            .locations
            .get(location)
            .ok_or_else(|| WorldError::UnknownLocation {
                map: map.to_string(),
                location: location.to_string(),
            })
    }
}

/// Identity of an area across maps; ordered for deterministic
/// iteration of the runtime table.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AreaKey {
    pub map: String,
    pub area: String,
}

impl AreaKey {
    pub fn new(map: &str, area: &str) -> Self {
        Self { map: map.to_string(), area: area.to_string() }
    }
}

/// Provenance stamp recording which traversal spawned an area.
///
/// Equality considers only the traversal id: the location name and
/// timestamp are diagnostics, and two stamps from the same traversal
/// must compare equal regardless of when they were copied.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpawnMarker {
    /// Traversal this spawn belongs to
    pub traversal: Uuid,
    /// Location the traversal started from
    pub location: String,
    /// When the traversal started
    pub timestamp: DateTime<Utc>,
}

impl SpawnMarker {
    /// Fresh marker for a traversal starting at `location`.
    pub fn begin(location: &str) -> Self {
        Self {
            traversal: Uuid::new_v4(),
            location: location.to_string(),
            timestamp: Utc::now(),
        }
    }
}

impl PartialEq for SpawnMarker {
    fn eq(&self, other: &Self) -> bool {
        self.traversal == other.traversal
    }
}

impl Eq for SpawnMarker {}

/// Per-area runtime streaming state.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AreaRuntime {
    /// The area's Things are currently placed in the world
    pub spawned: bool,
    /// Traversal that last spawned this area
    pub spawned_by: Option<SpawnMarker>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkered_alternates_with_row_phase() {
        let reference = MacroReference {
            name: "Checkered".into(),
            xnum: 2,
            ynum: 2,
            xwidth: 8,
            yheight: 8,
            things: vec!["DirtLight".into(), "DirtMedium".into()],
            ..Default::default()
        };

        let output = macro_checkered(&reference);
        assert_eq!(output.len(), 4);
        // Row 0: light, medium; row 1 shifts phase: medium, light.
        assert_eq!(output[0].thing, "DirtLight");
        assert_eq!(output[1].thing, "DirtMedium");
        assert_eq!(output[2].thing, "DirtMedium");
        assert_eq!(output[3].thing, "DirtLight");
        assert_eq!(output[3].x, 8);
        assert_eq!(output[3].y, 8);
    }

    #[test]
    fn test_checkered_empty_name_leaves_gap() {
        let reference = MacroReference {
            name: "Checkered".into(),
            xnum: 3,
            ynum: 1,
            xwidth: 8,
            yheight: 8,
            things: vec!["Grass".into(), "".into()],
            ..Default::default()
        };

        let output = macro_checkered(&reference);
        assert_eq!(output.len(), 2);
        assert_eq!(output[0].x, 0);
        assert_eq!(output[1].x, 16);
    }

    #[test]
    fn test_water_closed_edges_get_strips() {
        let reference = MacroReference {
            name: "Water".into(),
            x: 8,
            y: 8,
            width: Some(24),
            height: Some(16),
            open: Some([true, false, false, true]),
            ..Default::default()
        };

        let output = macro_water(&reference);
        let names: Vec<&str> = output.iter().map(|c| c.thing.as_str()).collect();
        assert_eq!(names, ["Water", "WaterEdgeRight", "WaterEdgeBottom"]);

        // Open top means the right strip starts flush with the body.
        assert_eq!(output[1].y, 8);
        assert_eq!(output[1].height, Some(16));
        assert_eq!(output[2].y, 8 + 16 - 4);
    }

    #[test]
    fn test_house_places_door_with_required_facing() {
        let reference = MacroReference {
            name: "House".into(),
            x: 16,
            y: 0,
            transport: Some(Transport::Location("HomeInterior".into())),
            ..Default::default()
        };

        let output = macro_house(&reference);
        let door = output.last().unwrap();
        assert_eq!(door.thing, "Door");
        assert_eq!(door.x, 24);
        assert_eq!(door.require_direction, Some(Direction::Top));
        assert!(door.transport.is_some());
    }

    #[test]
    fn test_house_no_door() {
        let reference = MacroReference {
            name: "House".into(),
            no_door: true,
            ..Default::default()
        };

        let output = macro_house(&reference);
        assert!(output.iter().all(|c| c.thing != "Door"));
    }

    #[test]
    fn test_house_large_door_row() {
        let reference = MacroReference {
            name: "HouseLarge".into(),
            stories: Some(2),
            ..Default::default()
        };

        let output = macro_house_large(&reference);
        let door = output.last().unwrap();
        assert_eq!(door.thing, "Door");
        assert_eq!(door.x, 16);
        // Roof is 20 tall, doored story 16: door sits 12 above the base.
        assert_eq!(door.y, 20 + 16 - 12);
    }

    #[test]
    fn test_unknown_macro_is_error() {
        let reference = MacroReference { name: "Castle".into(), ..Default::default() };
        assert!(matches!(
            expand_macro(&reference),
            Err(WorldError::UnknownMacro(_))
        ));
    }

    #[test]
    fn test_spawn_marker_equality_is_traversal_only() {
        let marker = SpawnMarker::begin("StartGame");
        let mut copy = marker.clone();
        copy.timestamp = Utc::now();
        copy.location = "Elsewhere".into();

        assert_eq!(marker, copy);
        assert_ne!(marker, SpawnMarker::begin("StartGame"));
    }
}
