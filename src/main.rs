//! Overworld Demo
//!
//! Builds a small two-area world with a house, walks the player
//! across the area seam and through the door, and logs every hook the
//! simulation fires.

use std::collections::BTreeMap;
use anyhow::Context;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use overworld::{TICK_RATE, VERSION};
use overworld::core::geometry::Direction;
use overworld::game::map::{
    AreaDefinition, AreaRef, Borders, CreationCommand, EntryKind, LocationDefinition,
    MacroReference, MapDefinition, MapLibrary, ThingCommand,
};
use overworld::game::movement;
use overworld::game::thing::ThingCatalog;
use overworld::game::tick::tick;
use overworld::game::transporter::Transport;
use overworld::game::world::World;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Overworld v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let mut world = World::new(demo_library(), ThingCatalog::builtin(), 320, 288);
    world.game_start("Hometown")?;
    drain_hooks(&mut world);

    // Walk south across the seam into the meadow.
    info!("=== Walking south across the area seam ===");
    movement::key_down(&mut world, Direction::Bottom);
    run(&mut world, 320)?;
    movement::key_up(&mut world, Direction::Bottom);
    run(&mut world, 40)?;

    info!(
        location = world.current_location.as_deref().unwrap_or("?"),
        area = world.current_area.as_deref().unwrap_or("?"),
        things = world.things.len(),
        "after the walk south"
    );

    // Head back into town and through the house door.
    info!("=== Entering the house ===");
    movement::key_down(&mut world, Direction::Top);
    run(&mut world, 800)?;
    movement::key_up(&mut world, Direction::Top);
    run(&mut world, 40)?;

    info!(
        location = world.current_location.as_deref().unwrap_or("?"),
        area = world.current_area.as_deref().unwrap_or("?"),
        "demo finished"
    );

    Ok(())
}

/// Run ticks, logging hooks as they fire.
fn run(world: &mut World, ticks: usize) -> anyhow::Result<()> {
    for _ in 0..ticks {
        let result = tick(world)?;
        for hook in result.hooks {
            info!(tick = world.tick, ?hook, "hook");
        }
    }
    Ok(())
}

fn drain_hooks(world: &mut World) {
    for hook in world.take_hooks() {
        info!(tick = world.tick, ?hook, "hook");
    }
}

/// Two outdoor areas stacked vertically, plus a one-room interior
/// reached through the house door.
fn demo_library() -> MapLibrary {
    let mut town_creation = vec![
        CreationCommand::Macro(MacroReference {
            name: "Checkered".into(),
            xnum: 15,
            ynum: 15,
            xwidth: 8,
            yheight: 8,
            things: vec!["DirtLight".into(), "DirtMedium".into()],
            ..Default::default()
        }),
        CreationCommand::Macro(MacroReference {
            name: "House".into(),
            x: 40,
            y: 8,
            no_door: true,
            ..Default::default()
        }),
        CreationCommand::Thing(ThingCommand::new("Tree", 8, 8)),
        CreationCommand::Thing(ThingCommand::new("Tree", 104, 8)),
    ];
    // Freestanding door at the house front; the column below is clear.
    let mut door = ThingCommand::new("Door", 48, 40);
    door.transport = Some(Transport::Location("Inside".into()));
    town_creation.push(CreationCommand::Thing(door));
    let mut lady = ThingCommand::new("Lady", 72, 72);
    lady.dialog = Some("Lovely weather today!".into());
    town_creation.push(CreationCommand::Thing(lady));

    let meadow_creation = vec![
        CreationCommand::Macro(MacroReference {
            name: "Checkered".into(),
            xnum: 15,
            ynum: 15,
            xwidth: 8,
            yheight: 8,
            things: vec!["Grass".into(), "DirtLight".into()],
            ..Default::default()
        }),
        CreationCommand::Macro(MacroReference {
            name: "Water".into(),
            x: 16,
            y: 80,
            width: Some(32),
            height: Some(24),
            open: Some([false, false, false, false]),
            ..Default::default()
        }),
        CreationCommand::Thing(ThingCommand::new("Fence", 64, 64)),
    ];

    let mut areas = BTreeMap::new();
    areas.insert(
        "Town".to_string(),
        AreaDefinition {
            background: "DirtLight".into(),
            width: 120,
            height: 120,
            borders: Borders {
                bottom: Some(AreaRef::area("Meadow")),
                ..Borders::default()
            },
            creation: town_creation,
        },
    );
    areas.insert(
        "Meadow".to_string(),
        AreaDefinition {
            background: "Grass".into(),
            width: 120,
            height: 120,
            borders: Borders {
                top: Some(AreaRef::area("Town")),
                ..Borders::default()
            },
            creation: meadow_creation,
        },
    );
    areas.insert(
        "HouseRoom".to_string(),
        AreaDefinition {
            background: "Floor".into(),
            width: 40,
            height: 40,
            borders: Borders::default(),
            creation: vec![CreationCommand::Thing(ThingCommand::new("Fence", 16, 8))],
        },
    );

    let mut locations = BTreeMap::new();
    locations.insert(
        "Start".to_string(),
        LocationDefinition {
            area: "Town".into(),
            xloc: 48,
            yloc: 56,
            direction: None,
            entry: EntryKind::Normal,
        },
    );
    locations.insert(
        "Inside".to_string(),
        LocationDefinition {
            area: "HouseRoom".into(),
            xloc: 16,
            yloc: 24,
            direction: Some(Direction::Top),
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
