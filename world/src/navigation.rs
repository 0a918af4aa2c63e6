//! Dijkstra cost field used by pursuing movers.

use overworld_core::{
    queue::{MinQueue, QueueHandle},
    terrain_cost, CellCoord, Direction, MoverClass, OccupancyView, TerrainGrid, TerrainKind,
    MAP_HEIGHT, MAP_WIDTH,
};

const CELL_COUNT: usize = (MAP_WIDTH * MAP_HEIGHT) as usize;
const UNREACHABLE: u32 = u32::MAX;

/// Dense grid of the cheapest accumulated terrain cost from each cell to the
/// player, specific to one mover class.
///
/// The player's cell is the single source with cost zero. Cells the class
/// cannot traverse, gates for anyone but the player, and cells held by any
/// other entity are never entered, so they stay unreachable along with
/// anything walled off behind them.
#[derive(Clone, Debug)]
pub struct CostField {
    costs: Vec<u32>,
}

/// Per-cell relaxation state held in the queue.
#[derive(Clone, Copy, Debug)]
struct CostCell {
    cell: CellCoord,
    step_cost: u32,
    cost: u32,
}

impl CostField {
    /// Relaxes the whole map outward from `source` for `class`.
    #[must_use]
    pub fn compute(
        terrain: &TerrainGrid,
        occupancy: OccupancyView<'_>,
        source: CellCoord,
        class: MoverClass,
    ) -> Self {
        let mut costs = vec![UNREACHABLE; CELL_COUNT];
        let mut handles: Vec<Option<QueueHandle>> = vec![None; CELL_COUNT];
        let mut queue = MinQueue::with_capacity(CELL_COUNT, by_cost);

        for (cell, kind) in terrain.iter() {
            let step_cost = terrain_cost(kind, class);
            if cell == source {
                costs[index(cell)] = 0;
                handles[index(cell)] = Some(queue.insert(CostCell {
                    cell,
                    step_cost: step_cost.unwrap_or(0),
                    cost: 0,
                }));
                continue;
            }

            let Some(step_cost) = step_cost else {
                continue;
            };
            if kind == TerrainKind::Gate && class != MoverClass::Player {
                continue;
            }
            if occupancy.occupant(cell).is_some() {
                continue;
            }

            handles[index(cell)] = Some(queue.insert(CostCell {
                cell,
                step_cost,
                cost: UNREACHABLE,
            }));
        }

        while let Some(settled) = queue.remove_min() {
            if settled.cost == UNREACHABLE {
                break;
            }
            handles[index(settled.cell)] = None;

            for direction in Direction::ALL {
                let Some(next) = settled.cell.step(direction) else {
                    continue;
                };
                let slot = index(next);
                let Some(handle) = handles[slot] else {
                    continue;
                };
                let Some(pending) = queue.get(handle) else {
                    continue;
                };

                let candidate = settled.cost.saturating_add(pending.step_cost);
                if candidate > 0 && candidate < costs[slot] {
                    costs[slot] = candidate;
                    let lowered = queue.decrease_key(handle, |cell| cell.cost = candidate);
                    debug_assert!(lowered, "queued cell lost its handle");
                }
            }
        }

        log::trace!("cost field for {class:?} toward {source:?} computed");

        Self { costs }
    }

    /// Accumulated cost at `cell`, or `None` when it is unreachable.
    #[must_use]
    pub fn distance(&self, cell: CellCoord) -> Option<u32> {
        if cell.column() >= MAP_WIDTH || cell.row() >= MAP_HEIGHT {
            return None;
        }
        self.costs
            .get(index(cell))
            .copied()
            .filter(|cost| *cost != UNREACHABLE)
    }

    /// Cheapest neighbour of `cell` in evaluation order.
    ///
    /// Ties keep the earliest direction in [`Direction::ALL`].
    #[must_use]
    pub fn cheapest_neighbor(&self, cell: CellCoord) -> Option<(Direction, u32)> {
        let mut best: Option<(Direction, u32)> = None;
        for direction in Direction::ALL {
            let Some(cost) = cell.step(direction).and_then(|next| self.distance(next)) else {
                continue;
            };
            if best.map_or(true, |(_, lowest)| cost < lowest) {
                best = Some((direction, cost));
            }
        }
        best
    }
}

fn by_cost(left: &CostCell, right: &CostCell) -> std::cmp::Ordering {
    left.cost
        .cmp(&right.cost)
        .then_with(|| left.cell.cmp(&right.cell))
}

fn index(cell: CellCoord) -> usize {
    (cell.row() * MAP_WIDTH + cell.column()) as usize
}

#[cfg(test)]
mod tests {
    use overworld_core::EntityId;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::mapgen::{MapGenerator, MapRequest};

    fn empty_occupancy() -> Vec<Option<EntityId>> {
        vec![None; CELL_COUNT]
    }

    fn open_field() -> TerrainGrid {
        let mut terrain = TerrainGrid::filled(TerrainKind::Clearing);
        for column in 0..MAP_WIDTH {
            terrain.set(CellCoord::new(column, 0), TerrainKind::Edge);
            terrain.set(CellCoord::new(column, MAP_HEIGHT - 1), TerrainKind::Edge);
        }
        for row in 0..MAP_HEIGHT {
            terrain.set(CellCoord::new(0, row), TerrainKind::Edge);
            terrain.set(CellCoord::new(MAP_WIDTH - 1, row), TerrainKind::Edge);
        }
        terrain
    }

    #[test]
    fn source_is_zero_and_rings_grow_by_terrain_cost() {
        let occupancy = empty_occupancy();
        let source = CellCoord::new(10, 10);
        let field = CostField::compute(
            &open_field(),
            OccupancyView::new(&occupancy),
            source,
            MoverClass::Rival,
        );

        assert_eq!(field.distance(source), Some(0));
        assert_eq!(field.distance(CellCoord::new(11, 11)), Some(10));
        assert_eq!(field.distance(CellCoord::new(10, 8)), Some(20));
        assert_eq!(field.distance(CellCoord::new(13, 9)), Some(30));
        assert_eq!(field.distance(CellCoord::new(0, 10)), None);
    }

    #[test]
    fn occupied_cells_are_obstacles() {
        let mut occupancy = empty_occupancy();
        let blocker = CellCoord::new(5, 5);
        occupancy[index(blocker)] = Some(EntityId::new(3));

        let field = CostField::compute(
            &open_field(),
            OccupancyView::new(&occupancy),
            CellCoord::new(5, 6),
            MoverClass::Hiker,
        );

        assert_eq!(field.distance(blocker), None);
        assert_eq!(field.distance(CellCoord::new(5, 4)), Some(20));
    }

    #[test]
    fn walled_off_cells_stay_unreachable() {
        let mut terrain = open_field();
        for row in 1..MAP_HEIGHT - 1 {
            terrain.set(CellCoord::new(40, row), TerrainKind::Tree);
        }
        let occupancy = empty_occupancy();

        let rival = CostField::compute(
            &terrain,
            OccupancyView::new(&occupancy),
            CellCoord::new(20, 10),
            MoverClass::Rival,
        );
        assert_eq!(rival.distance(CellCoord::new(60, 10)), None);

        let hiker = CostField::compute(
            &terrain,
            OccupancyView::new(&occupancy),
            CellCoord::new(20, 10),
            MoverClass::Hiker,
        );
        assert!(hiker.distance(CellCoord::new(60, 10)).is_some());
    }

    #[test]
    fn generated_maps_satisfy_the_relaxation_fixed_point() {
        let occupancy = empty_occupancy();
        for seed in 0..16 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let map = MapGenerator.generate(&MapRequest::open(1), &mut rng);
            let source = map
                .terrain
                .iter()
                .find(|(_, kind)| *kind == TerrainKind::Road)
                .map(|(cell, _)| cell)
                .expect("road present");

            for class in [MoverClass::Hiker, MoverClass::Rival, MoverClass::Swimmer] {
                let field =
                    CostField::compute(&map.terrain, OccupancyView::new(&occupancy), source, class);
                assert_eq!(field.distance(source), Some(0));

                for (cell, kind) in map.terrain.iter() {
                    if cell == source {
                        continue;
                    }
                    let Some(cost) = field.distance(cell) else {
                        continue;
                    };
                    let step = terrain_cost(kind, class).expect("reachable cells are passable");
                    let best = Direction::ALL
                        .iter()
                        .filter_map(|direction| cell.step(*direction))
                        .filter_map(|next| field.distance(next))
                        .min()
                        .expect("reachable cells have a reachable neighbour");
                    assert_eq!(cost, best + step, "seed {seed} {class:?} at {cell:?}");
                }
            }
        }
    }

    #[test]
    fn cheapest_neighbor_prefers_cardinals_on_ties() {
        let occupancy = empty_occupancy();
        let field = CostField::compute(
            &open_field(),
            OccupancyView::new(&occupancy),
            CellCoord::new(10, 12),
            MoverClass::Hiker,
        );

        assert_eq!(
            field.cheapest_neighbor(CellCoord::new(10, 10)),
            Some((Direction::South, 10))
        );
    }

    #[test]
    fn gates_only_carry_a_cost_for_the_player() {
        let mut terrain = open_field();
        let gate = CellCoord::new(10, 0);
        terrain.set(gate, TerrainKind::Gate);
        let occupancy = empty_occupancy();
        let source = CellCoord::new(9, 1);

        for class in [MoverClass::Hiker, MoverClass::Rival] {
            let field = CostField::compute(&terrain, OccupancyView::new(&occupancy), source, class);
            assert_eq!(field.distance(gate), None, "{class:?}");
            assert_eq!(
                field.cheapest_neighbor(CellCoord::new(11, 1)),
                Some((Direction::West, 10)),
                "{class:?}"
            );
        }

        let player = CostField::compute(
            &terrain,
            OccupancyView::new(&occupancy),
            source,
            MoverClass::Player,
        );
        assert_eq!(player.distance(gate), Some(10));
    }
}
