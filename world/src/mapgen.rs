//! Procedural generator that lays out the terrain of a single overworld map.
//!
//! Generation runs in a fixed order: the border ring and its gates, regional
//! terrain scatter, the road network, the two buildings, and finally bridge
//! promotion wherever a road touches water. Every write is confined to the
//! map's interior so the border ring only ever holds `Edge` and `Gate` cells.

mod roads;

use overworld_core::{
    CellCoord, Direction, GateSpec, Gates, Side, TerrainGrid, TerrainKind, MAP_HEIGHT, MAP_WIDTH,
};
use rand::Rng;

const REGION_KINDS: [TerrainKind; 5] = [
    TerrainKind::Boulder,
    TerrainKind::Tree,
    TerrainKind::Water,
    TerrainKind::Grass,
    TerrainKind::Grass,
];

/// Column ranges of the two halves that receive regional scatter.
const HALVES: [(u32, u32); 2] = [(1, MAP_WIDTH / 2 - 1), (MAP_WIDTH / 2 - 1, MAP_WIDTH - 1)];

const NOISE_CELLS: usize = 20;

/// Gate requests and distance used to generate one map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapRequest {
    /// Gate on the top edge.
    pub north: GateSpec,
    /// Gate on the bottom edge.
    pub south: GateSpec,
    /// Gate on the left edge.
    pub west: GateSpec,
    /// Gate on the right edge.
    pub east: GateSpec,
    /// Manhattan distance of the map from the world origin.
    pub manhattan_distance: u32,
}

impl MapRequest {
    /// Request with every gate chosen at random.
    #[must_use]
    pub const fn open(manhattan_distance: u32) -> Self {
        Self {
            north: GateSpec::Random,
            south: GateSpec::Random,
            west: GateSpec::Random,
            east: GateSpec::Random,
            manhattan_distance,
        }
    }
}

/// Terrain and resolved gates of a freshly generated map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedMap {
    /// Terrain layer of the map.
    pub terrain: TerrainGrid,
    /// Gate positions actually used.
    pub gates: Gates,
}

/// Builds map terrain from a [`MapRequest`].
#[derive(Debug, Default)]
pub struct MapGenerator;

impl MapGenerator {
    /// Generates one map, drawing all randomness from `rng`.
    pub fn generate<R>(&self, request: &MapRequest, rng: &mut R) -> GeneratedMap
    where
        R: Rng + ?Sized,
    {
        let gates = Gates {
            north: resolve_gate(request.north, Side::North, rng),
            south: resolve_gate(request.south, Side::South, rng),
            west: resolve_gate(request.west, Side::West, rng),
            east: resolve_gate(request.east, Side::East, rng),
        };

        let mut terrain = TerrainGrid::filled(TerrainKind::Clearing);
        construct_border(&mut terrain, &gates);
        scatter_regions(&mut terrain, rng);
        roads::pave(&mut terrain, &gates);
        let buildings =
            roads::place_buildings(&mut terrain, &gates, request.manhattan_distance, rng);
        build_bridges(&mut terrain);

        log::debug!(
            "generated map with gates {gates:?}, {buildings} building(s) at distance {}",
            request.manhattan_distance
        );

        GeneratedMap { terrain, gates }
    }
}

fn resolve_gate<R>(spec: GateSpec, side: Side, rng: &mut R) -> Option<u32>
where
    R: Rng + ?Sized,
{
    let last = match side {
        Side::North | Side::South => MAP_WIDTH - 2,
        Side::West | Side::East => MAP_HEIGHT - 2,
    };

    match spec {
        GateSpec::Sealed => None,
        GateSpec::Random => Some(rng.gen_range(1..=last)),
        GateSpec::Fixed(position) => {
            let clamped = position.clamp(1, last);
            if clamped != position {
                log::debug!("clamped {side:?} gate from {position} to {clamped}");
            }
            Some(clamped)
        }
    }
}

fn construct_border(terrain: &mut TerrainGrid, gates: &Gates) {
    for column in 0..MAP_WIDTH {
        terrain.set(CellCoord::new(column, 0), TerrainKind::Edge);
        terrain.set(CellCoord::new(column, MAP_HEIGHT - 1), TerrainKind::Edge);
    }
    for row in 0..MAP_HEIGHT {
        terrain.set(CellCoord::new(0, row), TerrainKind::Edge);
        terrain.set(CellCoord::new(MAP_WIDTH - 1, row), TerrainKind::Edge);
    }

    for side in Side::ALL {
        if let Some(cell) = gates.cell(side) {
            terrain.set(cell, TerrainKind::Gate);
        }
    }
}

fn scatter_regions<R>(terrain: &mut TerrainGrid, rng: &mut R)
where
    R: Rng + ?Sized,
{
    for (west, east) in HALVES {
        for kind in REGION_KINDS {
            let column = rng.gen_range(west..east);
            let row = rng.gen_range(2..MAP_HEIGHT - 1);
            let width = rng.gen_range(10..40);
            let height = rng.gen_range(5..11);
            stamp_region(terrain, CellCoord::new(column, row), width, height, kind);
        }
    }

    for _ in 0..NOISE_CELLS {
        let rock = random_interior(rng);
        terrain.set(rock, TerrainKind::Edge);
        let tree = random_interior(rng);
        terrain.set(tree, TerrainKind::Tree);
    }
}

/// Stamps a rectangle anchored at `origin`; rows and columns that would reach
/// the border are reflected back across the anchor instead of being clipped.
fn stamp_region(
    terrain: &mut TerrainGrid,
    origin: CellCoord,
    width: u32,
    height: u32,
    kind: TerrainKind,
) {
    for dy in 0..height {
        let Some(row) = reflect(origin.row(), dy, MAP_HEIGHT - 1) else {
            continue;
        };
        for dx in 0..width {
            let Some(column) = reflect(origin.column(), dx, MAP_WIDTH - 1) else {
                continue;
            };
            let cell = CellCoord::new(column, row);
            if cell.is_interior() {
                terrain.set(cell, kind);
            }
        }
    }
}

fn reflect(origin: u32, offset: u32, limit: u32) -> Option<u32> {
    let forward = origin + offset;
    if forward < limit {
        Some(forward)
    } else {
        origin.checked_sub(offset)
    }
}

fn random_interior<R>(rng: &mut R) -> CellCoord
where
    R: Rng + ?Sized,
{
    CellCoord::new(
        rng.gen_range(1..=MAP_WIDTH - 2),
        rng.gen_range(1..=MAP_HEIGHT - 2),
    )
}

fn build_bridges(terrain: &mut TerrainGrid) {
    let crossings: Vec<CellCoord> = terrain
        .iter()
        .filter(|(cell, kind)| *kind == TerrainKind::Road && cell.is_interior())
        .filter(|(cell, _)| {
            Direction::CARDINALS.iter().any(|direction| {
                cell.step(*direction).and_then(|next| terrain.get(next))
                    == Some(TerrainKind::Water)
            })
        })
        .map(|(cell, _)| cell)
        .collect();

    for cell in crossings {
        terrain.set(cell, TerrainKind::Bridge);
    }
}
