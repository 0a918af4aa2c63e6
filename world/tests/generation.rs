use std::collections::{HashSet, VecDeque};

use overworld_core::{
    CellCoord, Direction, GateSpec, Side, TerrainGrid, TerrainKind, MAP_HEIGHT, MAP_WIDTH,
};
use overworld_world::{GeneratedMap, MapGenerator, MapRequest};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const SEEDS: u64 = 64;

fn generate(request: MapRequest, seed: u64) -> GeneratedMap {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    MapGenerator.generate(&request, &mut rng)
}

fn requested(request: &MapRequest, side: Side) -> GateSpec {
    match side {
        Side::North => request.north,
        Side::South => request.south,
        Side::West => request.west,
        Side::East => request.east,
    }
}

fn border_cells() -> impl Iterator<Item = CellCoord> {
    (0..MAP_WIDTH)
        .flat_map(|column| [CellCoord::new(column, 0), CellCoord::new(column, MAP_HEIGHT - 1)])
        .chain(
            (1..MAP_HEIGHT - 1)
                .flat_map(|row| [CellCoord::new(0, row), CellCoord::new(MAP_WIDTH - 1, row)]),
        )
}

fn reachable(terrain: &TerrainGrid, start: CellCoord) -> HashSet<CellCoord> {
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(cell) = queue.pop_front() {
        for direction in Direction::CARDINALS {
            let Some(next) = cell.step(direction) else {
                continue;
            };
            if terrain.get(next).map_or(false, TerrainKind::is_road) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    seen
}

#[test]
fn border_is_edge_except_one_gate_per_open_side() {
    let requests = [
        MapRequest::open(3),
        MapRequest {
            north: GateSpec::Sealed,
            west: GateSpec::Sealed,
            ..MapRequest::open(400)
        },
        MapRequest {
            south: GateSpec::Sealed,
            ..MapRequest::open(200)
        },
    ];

    for (index, request) in requests.into_iter().enumerate() {
        for seed in 0..SEEDS {
            let map = generate(request, seed);
            let gates: Vec<CellCoord> = border_cells()
                .filter(|cell| map.terrain.get(*cell) != Some(TerrainKind::Edge))
                .collect();

            for cell in &gates {
                assert_eq!(
                    map.terrain.get(*cell),
                    Some(TerrainKind::Gate),
                    "request {index} seed {seed}: {cell:?}"
                );
            }

            for side in Side::ALL {
                let on_side = gates
                    .iter()
                    .filter(|cell| cell.border_side() == Some(side))
                    .count();
                let expected = usize::from(requested(&request, side) != GateSpec::Sealed);
                assert_eq!(on_side, expected, "request {index} seed {seed}: {side:?}");
            }
        }
    }
}

#[test]
fn interior_maps_connect_opposite_gates_by_road() {
    for seed in 0..SEEDS {
        let map = generate(MapRequest::open(seed as u32), seed);
        let north = map.gates.cell(Side::North).expect("north gate");
        let south = map.gates.cell(Side::South).expect("south gate");
        let west = map.gates.cell(Side::West).expect("west gate");
        let east = map.gates.cell(Side::East).expect("east gate");

        let from_north = reachable(&map.terrain, north);
        assert!(from_north.contains(&south), "seed {seed}: north/south split");
        let from_west = reachable(&map.terrain, west);
        assert!(from_west.contains(&east), "seed {seed}: west/east split");
    }
}

#[test]
fn aligned_gates_produce_straight_roads() {
    let request = MapRequest {
        north: GateSpec::Fixed(40),
        south: GateSpec::Fixed(40),
        west: GateSpec::Fixed(10),
        east: GateSpec::Fixed(10),
        manhattan_distance: 400,
    };

    for seed in 0..SEEDS {
        let map = generate(request, seed);
        for row in 1..=MAP_HEIGHT - 2 {
            let kind = map.terrain.get(CellCoord::new(40, row));
            assert!(
                matches!(kind, Some(TerrainKind::Road | TerrainKind::Bridge)),
                "seed {seed}: column 40 row {row} is {kind:?}"
            );
        }
        for column in 1..=MAP_WIDTH - 2 {
            let kind = map.terrain.get(CellCoord::new(column, 10));
            assert!(
                matches!(kind, Some(TerrainKind::Road | TerrainKind::Bridge)),
                "seed {seed}: row 10 column {column} is {kind:?}"
            );
        }
        assert_eq!(map.terrain.count(TerrainKind::PokeMart), 0);
        assert_eq!(map.terrain.count(TerrainKind::PokeCenter), 0);
    }
}

#[test]
fn origin_map_always_has_both_buildings() {
    for seed in 0..SEEDS {
        let map = generate(MapRequest::open(0), seed);
        assert_eq!(map.terrain.count(TerrainKind::PokeMart), 4, "seed {seed}");
        assert_eq!(map.terrain.count(TerrainKind::PokeCenter), 4, "seed {seed}");
    }
}

#[test]
fn buildings_are_reachable_from_the_gates() {
    for seed in 0..SEEDS {
        let map = generate(MapRequest::open(0), seed);
        let north = map.gates.cell(Side::North).expect("north gate");
        let network = reachable(&map.terrain, north);

        for (cell, kind) in map.terrain.iter() {
            if !kind.is_building() {
                continue;
            }
            let touches_network = Direction::CARDINALS
                .iter()
                .filter_map(|direction| cell.step(*direction))
                .any(|next| network.contains(&next));
            assert!(touches_network, "seed {seed}: {kind:?} at {cell:?} is cut off");
        }
    }
}

#[test]
fn bridges_only_appear_beside_water() {
    for seed in 0..SEEDS {
        let map = generate(MapRequest::open(7), seed);
        for (cell, kind) in map.terrain.iter() {
            if kind != TerrainKind::Bridge {
                continue;
            }
            let wet = Direction::CARDINALS.iter().any(|direction| {
                cell.step(*direction).and_then(|next| map.terrain.get(next))
                    == Some(TerrainKind::Water)
            });
            assert!(wet, "seed {seed}: dry bridge at {cell:?}");
        }
    }
}

#[test]
fn identical_seeds_generate_identical_maps() {
    let request = MapRequest::open(12);
    assert_eq!(generate(request, 99), generate(request, 99));
}
