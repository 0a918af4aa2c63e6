use overworld_core::{
    CellCoord, Command, Direction, EntityId, Event, Gates, MoverClass, TerrainGrid, TerrainKind,
    MAP_HEIGHT, MAP_WIDTH,
};
use overworld_rendering::{nearest_trainer, trainer_list, Frame};
use overworld_world::{self as world, World};

fn spawn(world: &mut World, class: MoverClass, cell: CellCoord) -> EntityId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnTrainer {
            class,
            cell,
            facing: Direction::North,
        },
        &mut events,
    );
    match events.as_slice() {
        [Event::TrainerSpawned { entity, .. }] => *entity,
        other => panic!("unexpected spawn events: {other:?}"),
    }
}

fn meadow() -> TerrainGrid {
    let mut terrain = TerrainGrid::filled(TerrainKind::Clearing);
    terrain.set(CellCoord::new(3, 3), TerrainKind::PokeMart);
    terrain.set(CellCoord::new(4, 3), TerrainKind::Water);
    terrain
}

#[test]
fn frame_draws_terrain_then_entities() {
    let mut world =
        World::from_terrain(meadow(), Gates::default(), CellCoord::new(10, 10)).expect("world");
    let _ = spawn(&mut world, MoverClass::Swimmer, CellCoord::new(4, 3));

    let frame = Frame::capture(&world);

    assert_eq!(frame.rows.len(), MAP_HEIGHT as usize);
    assert!(frame
        .rows
        .iter()
        .all(|row| row.chars().count() == MAP_WIDTH as usize));
    assert_eq!(frame.rows[3].chars().nth(3), Some('M'));
    assert_eq!(frame.rows[3].chars().nth(4), Some('m'));
    assert_eq!(frame.rows[10].chars().nth(10), Some('@'));
    assert_eq!(frame.status.len(), 2);
    assert!(frame.status[0].starts_with("map (0, 0)"));
    assert!(frame.to_string().contains("nearest: m, 7 north and 6 west"));
}

#[test]
fn trainer_list_reports_bearings_and_defeats() {
    let mut world =
        World::from_terrain(meadow(), Gates::default(), CellCoord::new(10, 10)).expect("world");
    let hiker = spawn(&mut world, MoverClass::Hiker, CellCoord::new(13, 5));
    let _ = spawn(&mut world, MoverClass::Rival, CellCoord::new(8, 12));
    let mut events = Vec::new();
    world::apply(&mut world, Command::Withdraw { entity: hiker }, &mut events);

    assert_eq!(
        trainer_list(&world),
        vec![
            String::from("h, 5 north and 3 east (defeated)"),
            String::from("r, 2 south and 2 west"),
        ]
    );
}

#[test]
fn nearest_trainer_prefers_the_shorter_walk() {
    let mut terrain = TerrainGrid::filled(TerrainKind::Clearing);
    for row in 0..MAP_HEIGHT {
        terrain.set(CellCoord::new(12, row), TerrainKind::Tree);
    }
    let mut world =
        World::from_terrain(terrain, Gates::default(), CellCoord::new(10, 10)).expect("world");
    let _walled_off = spawn(&mut world, MoverClass::Sentry, CellCoord::new(14, 10));
    let reachable = spawn(&mut world, MoverClass::Pacer, CellCoord::new(4, 10));

    let nearest = nearest_trainer(&world).expect("a trainer");

    assert_eq!(nearest.id, reachable);
}
