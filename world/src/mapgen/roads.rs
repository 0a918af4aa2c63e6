//! Road network, buildings, and the walks that tie buildings to the roads.

use std::ops::RangeInclusive;

use overworld_core::{CellCoord, Direction, Gates, TerrainGrid, TerrainKind, MAP_HEIGHT, MAP_WIDTH};
use rand::{seq::SliceRandom, Rng};

const LAST_COLUMN: u32 = MAP_WIDTH - 2;
const LAST_ROW: u32 = MAP_HEIGHT - 2;

/// Row on which the north-south route jogs between gate columns.
const JOG_ROW: u32 = (MAP_HEIGHT - 2) / 2;

/// Column on which the west-east route jogs between gate rows.
const JOG_COLUMN: u32 = (MAP_WIDTH - 2) / 2;

const WEST_ANCHORS: RangeInclusive<u32> = 2..=JOG_COLUMN - 2;
const EAST_ANCHORS: RangeInclusive<u32> = JOG_COLUMN + 2..=LAST_COLUMN - 2;
const ANCHOR_ROWS: RangeInclusive<u32> = 2..=LAST_ROW - 2;

/// Lays down roads between the gates that exist.
pub(crate) fn pave(terrain: &mut TerrainGrid, gates: &Gates) {
    let vertical = gates.north.zip(gates.south);
    let horizontal = gates.west.zip(gates.east);

    if let Some((north, south)) = vertical {
        pave_north_south(terrain, north, south);
    }
    if let Some((west, east)) = horizontal {
        pave_west_east(terrain, west, east);
    }

    if vertical.is_none() && horizontal.is_none() {
        if let (Some(column), Some(row)) = (gates.north.or(gates.south), gates.west.or(gates.east))
        {
            pave_corner(terrain, gates, column, row);
            return;
        }
    }

    let lone = [
        (gates.north.filter(|_| gates.south.is_none()), Direction::South),
        (gates.south.filter(|_| gates.north.is_none()), Direction::North),
        (gates.west.filter(|_| gates.east.is_none()), Direction::East),
        (gates.east.filter(|_| gates.west.is_none()), Direction::West),
    ];
    for (position, inward) in lone {
        if let Some(position) = position {
            spur(terrain, entry_cell(position, inward), inward);
        }
    }
}

fn pave_north_south(terrain: &mut TerrainGrid, north: u32, south: u32) {
    for row in 1..JOG_ROW {
        road(terrain, north, row);
    }
    for column in north.min(south)..=north.max(south) {
        road(terrain, column, JOG_ROW);
    }
    for row in JOG_ROW..=LAST_ROW {
        road(terrain, south, row);
    }
}

fn pave_west_east(terrain: &mut TerrainGrid, west: u32, east: u32) {
    for column in 1..JOG_COLUMN {
        road(terrain, column, west);
    }
    for row in west.min(east)..=west.max(east) {
        road(terrain, JOG_COLUMN, row);
    }
    for column in JOG_COLUMN..=LAST_COLUMN {
        road(terrain, column, east);
    }
}

/// Joins one vertical gate and one horizontal gate with a single bend.
fn pave_corner(terrain: &mut TerrainGrid, gates: &Gates, column: u32, row: u32) {
    let rows = if gates.north.is_some() {
        1..=row
    } else {
        row..=LAST_ROW
    };
    for current in rows {
        road(terrain, column, current);
    }

    let columns = if gates.west.is_some() {
        1..=column
    } else {
        column..=LAST_COLUMN
    };
    for current in columns {
        road(terrain, current, row);
    }
}

/// First interior cell behind a gate whose inward direction is `inward`.
fn entry_cell(position: u32, inward: Direction) -> CellCoord {
    match inward {
        Direction::South => CellCoord::new(position, 1),
        Direction::North => CellCoord::new(position, LAST_ROW),
        Direction::East => CellCoord::new(1, position),
        _ => CellCoord::new(LAST_COLUMN, position),
    }
}

/// Extends a road from `start` until it meets existing road or the far edge.
fn spur(terrain: &mut TerrainGrid, start: CellCoord, inward: Direction) {
    let mut current = Some(start);
    while let Some(cell) = current.filter(CellCoord::is_interior) {
        if terrain.get(cell) == Some(TerrainKind::Road) {
            return;
        }
        terrain.set(cell, TerrainKind::Road);
        current = cell.step(inward);
    }
}

fn road(terrain: &mut TerrainGrid, column: u32, row: u32) {
    let cell = CellCoord::new(column, row);
    if cell.is_interior() {
        terrain.set(cell, TerrainKind::Road);
    }
}

/// Places the mart and the center, one per half of the map.
///
/// Returns the number of buildings that were placed.
pub(crate) fn place_buildings<R>(
    terrain: &mut TerrainGrid,
    gates: &Gates,
    manhattan_distance: u32,
    rng: &mut R,
) -> usize
where
    R: Rng + ?Sized,
{
    let (west_kind, east_kind) = if rng.gen_bool(0.5) {
        (TerrainKind::PokeMart, TerrainKind::PokeCenter)
    } else {
        (TerrainKind::PokeCenter, TerrainKind::PokeMart)
    };

    let mut placed = 0;
    for (kind, columns, gate_row) in [
        (west_kind, WEST_ANCHORS, gates.west),
        (east_kind, EAST_ANCHORS, gates.east),
    ] {
        if !rolls_building(manhattan_distance, rng) {
            continue;
        }

        let Some(anchor) = choose_anchor(terrain, columns, rng) else {
            log::warn!("no free footprint for {kind:?}");
            continue;
        };

        raise_building(terrain, anchor, kind);
        connect_building(terrain, gates, anchor, gate_row.unwrap_or(0));
        placed += 1;
    }
    placed
}

/// Chance of a building decays with distance; the origin always gets both.
fn rolls_building<R>(manhattan_distance: u32, rng: &mut R) -> bool
where
    R: Rng + ?Sized,
{
    if manhattan_distance == 0 {
        return true;
    }

    let percent = (50 - (45 * i64::from(manhattan_distance)) / 200).clamp(0, 100);
    rng.gen_range(0..100) < percent
}

/// Picks an upper-left corner whose 2x2 footprint avoids roads and buildings.
fn choose_anchor<R>(
    terrain: &TerrainGrid,
    columns: RangeInclusive<u32>,
    rng: &mut R,
) -> Option<CellCoord>
where
    R: Rng + ?Sized,
{
    let candidates: Vec<CellCoord> = columns
        .flat_map(|column| ANCHOR_ROWS.map(move |row| CellCoord::new(column, row)))
        .filter(|anchor| {
            footprint(*anchor).all(|cell| {
                terrain
                    .get(cell)
                    .map_or(false, |kind| !kind.is_road() && !kind.is_building())
            })
        })
        .collect();

    candidates.choose(rng).copied()
}

fn footprint(anchor: CellCoord) -> impl Iterator<Item = CellCoord> {
    let (column, row) = (anchor.column(), anchor.row());
    [(0, 0), (1, 0), (0, 1), (1, 1)]
        .into_iter()
        .map(move |(dx, dy)| CellCoord::new(column + dx, row + dy))
}

fn raise_building(terrain: &mut TerrainGrid, anchor: CellCoord, kind: TerrainKind) {
    let (column, row) = (anchor.column(), anchor.row());
    for ring_row in row - 1..=row + 2 {
        for ring_column in column - 1..=column + 2 {
            road(terrain, ring_column, ring_row);
        }
    }
    for cell in footprint(anchor) {
        terrain.set(cell, kind);
    }
}

/// Walks road from a building's access ring until it reaches the network.
///
/// The first attempt runs vertically toward the gate row on the building's
/// side of the map. Failing that, the walk heads horizontally toward the
/// nearer edge that has a gate and then vertically along that edge.
fn connect_building(terrain: &mut TerrainGrid, gates: &Gates, anchor: CellCoord, gate_row: u32) {
    let (column, row) = (anchor.column(), anchor.row());
    let ring = |cell: CellCoord| {
        (column - 1..=column + 2).contains(&cell.column())
            && (row - 1..=row + 2).contains(&cell.row())
    };

    let vertical = if row > gate_row + 1 && row > 3 {
        Some((CellCoord::new(column, row - 1), Direction::North))
    } else if row + 2 < gate_row && row < MAP_HEIGHT - 4 {
        Some((CellCoord::new(column, row + 2), Direction::South))
    } else {
        None
    };

    if let Some((from, direction)) = vertical {
        let mut path = Vec::new();
        if walk(terrain, from, direction, &ring, &mut path).is_ok() {
            commit(terrain, &path);
            return;
        }
    }

    let heading = horizontal_heading(gates, column);
    let from = if heading == Direction::West {
        CellCoord::new(column - 1, row)
    } else {
        CellCoord::new(column + 2, row)
    };

    let mut path = Vec::new();
    let last = match walk(terrain, from, heading, &ring, &mut path) {
        Ok(()) => {
            commit(terrain, &path);
            return;
        }
        Err(last) => last,
    };

    let edge_gate = if heading == Direction::West {
        gates.west
    } else {
        gates.east
    };
    let climb = match edge_gate {
        Some(gate) if gate > last.row() => Direction::South,
        Some(_) => Direction::North,
        None if gates.north.is_some() => Direction::North,
        None => Direction::South,
    };

    if walk(terrain, last, climb, &ring, &mut path).is_ok() {
        commit(terrain, &path);
    } else {
        log::warn!("building at {anchor:?} could not reach the road network");
    }
}

fn horizontal_heading(gates: &Gates, column: u32) -> Direction {
    match (gates.west, gates.east) {
        (Some(_), None) => Direction::West,
        (None, Some(_)) => Direction::East,
        _ if column < JOG_COLUMN => Direction::West,
        _ => Direction::East,
    }
}

/// Steps from `from` in `direction`, recording cells until a road outside the
/// building's own ring is found. Returns the last interior cell on failure.
fn walk<F>(
    terrain: &TerrainGrid,
    from: CellCoord,
    direction: Direction,
    ring: &F,
    path: &mut Vec<CellCoord>,
) -> Result<(), CellCoord>
where
    F: Fn(CellCoord) -> bool,
{
    let mut current = from;
    loop {
        let next = match current.step(direction) {
            Some(next) if next.is_interior() => next,
            _ => return Err(current),
        };

        if !ring(next) && terrain.get(next).map_or(false, TerrainKind::is_road) {
            return Ok(());
        }

        path.push(next);
        current = next;
    }
}

fn commit(terrain: &mut TerrainGrid, path: &[CellCoord]) {
    for cell in path {
        if !terrain.get(*cell).map_or(false, TerrainKind::is_building) {
            terrain.set(*cell, TerrainKind::Road);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> TerrainGrid {
        TerrainGrid::filled(TerrainKind::Clearing)
    }

    #[test]
    fn corner_maps_get_a_single_bend() {
        let mut terrain = blank();
        let gates = Gates {
            north: None,
            south: Some(30),
            west: None,
            east: Some(6),
        };
        pave(&mut terrain, &gates);

        for row in 6..=LAST_ROW {
            assert_eq!(terrain.get(CellCoord::new(30, row)), Some(TerrainKind::Road));
        }
        for column in 30..=LAST_COLUMN {
            assert_eq!(terrain.get(CellCoord::new(column, 6)), Some(TerrainKind::Road));
        }
        assert_eq!(terrain.get(CellCoord::new(30, 5)), Some(TerrainKind::Clearing));
    }

    #[test]
    fn lone_gate_spurs_stop_at_the_first_road() {
        let mut terrain = blank();
        let gates = Gates {
            north: None,
            south: Some(12),
            west: Some(4),
            east: Some(15),
        };
        pave(&mut terrain, &gates);

        assert_eq!(terrain.get(CellCoord::new(12, 4)), Some(TerrainKind::Road));
        assert_eq!(terrain.get(CellCoord::new(12, 3)), Some(TerrainKind::Clearing));
        for row in 5..=LAST_ROW {
            assert_eq!(terrain.get(CellCoord::new(12, row)), Some(TerrainKind::Road));
        }
    }

    #[test]
    fn buildings_connect_to_roads_in_an_open_field() {
        let gates = Gates {
            north: Some(20),
            south: Some(60),
            west: Some(15),
            east: Some(3),
        };
        let mut terrain = blank();
        pave(&mut terrain, &gates);

        let anchor = CellCoord::new(10, 3);
        raise_building(&mut terrain, anchor, TerrainKind::PokeMart);
        connect_building(&mut terrain, &gates, anchor, 15);

        for row in 5..15 {
            assert_eq!(terrain.get(CellCoord::new(10, row)), Some(TerrainKind::Road));
        }
        assert_eq!(terrain.count(TerrainKind::PokeMart), 4);
    }

    #[test]
    fn origin_always_rolls_buildings() {
        let mut rng = rand::rngs::mock::StepRng::new(0, 0);
        assert!(rolls_building(0, &mut rng));
        assert!(!rolls_building(400, &mut rng));
    }
}
