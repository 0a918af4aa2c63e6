#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the overworld simulation.
//!
//! The world owns the map the player currently stands on, every other map
//! generated so far, and the player entity itself. Systems never mutate it
//! directly: they emit [`Command`] values that [`apply`] executes, and the
//! resulting [`Event`] values describe what changed.

mod grid;
mod mapgen;
mod navigation;

use overworld_core::{
    terrain_cost, CellCoord, Command, Direction, EntityId, EntitySnapshot, Event, Gates,
    MoverClass, OccupancyView, PlacementError, Side, TerrainGrid, TerrainKind, WorldCoord,
    MAP_HEIGHT, MAP_WIDTH, WITHDRAWN,
};
use rand::{seq::SliceRandom, Rng};
use thiserror::Error;

pub use grid::WorldGrid;
pub use mapgen::{GeneratedMap, MapGenerator, MapRequest};
pub use navigation::CostField;

/// Time charged for holding position on terrain the entity could not enter.
const HOLD_FALLBACK_COST: u64 = 10;

/// Reasons a map transition may fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TravelError {
    /// The requested side lies on the boundary of the world.
    #[error("no map lies beyond the {side:?} edge of the world")]
    WorldBoundary {
        /// Side the player tried to leave through.
        side: Side,
    },
    /// The current map has no gate on the requested side.
    #[error("the current map has no {side:?} gate")]
    NoGate {
        /// Side the player tried to leave through.
        side: Side,
    },
    /// Every suitable arrival cell on the destination map is taken.
    #[error("no free cell to arrive on at map {location:?}")]
    NoArrivalCell {
        /// Destination map.
        location: WorldCoord,
    },
}

/// Authoritative overworld state.
#[derive(Debug)]
pub struct World {
    grid: WorldGrid,
    map: Box<Map>,
    location: WorldCoord,
    player: Entity,
    next_entity_id: u32,
}

impl World {
    /// Generates the origin map and places the player on a random road cell.
    pub fn new<R>(rng: &mut R) -> Result<Self, TravelError>
    where
        R: Rng + ?Sized,
    {
        let location = WorldCoord::ORIGIN;
        let mut grid = WorldGrid::new();
        let (mut map, _) = grid
            .checkout(location, None, rng)
            .ok_or(TravelError::NoArrivalCell { location })?;
        let cell =
            arrival_cell(&map, Arrival::AnyRoad, rng).ok_or(TravelError::NoArrivalCell { location })?;
        map.occupancy.occupy(EntityId::PLAYER, cell);

        Ok(Self {
            grid,
            map,
            location,
            player: Entity::player(cell),
            next_entity_id: 1,
        })
    }

    /// Creates a world whose origin map uses the provided terrain.
    ///
    /// Neighbouring maps are still generated on demand and will match `gates`.
    pub fn from_terrain(
        terrain: TerrainGrid,
        gates: Gates,
        player_cell: CellCoord,
    ) -> Result<Self, PlacementError> {
        let kind = terrain
            .get(player_cell)
            .ok_or(PlacementError::OutOfBounds)?;
        if terrain_cost(kind, MoverClass::Player).is_none() {
            return Err(PlacementError::Impassable);
        }

        let mut map = Box::new(Map::from_generated(GeneratedMap { terrain, gates }));
        map.occupancy.occupy(EntityId::PLAYER, player_cell);

        Ok(Self {
            grid: WorldGrid::new(),
            map,
            location: WorldCoord::ORIGIN,
            player: Entity::player(player_cell),
            next_entity_id: 1,
        })
    }

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        if id == self.player.id {
            Some(&mut self.player)
        } else {
            self.map.entities.iter_mut().find(|entity| entity.id == id)
        }
    }

    fn entity(&self, id: EntityId) -> Option<&Entity> {
        if id == self.player.id {
            Some(&self.player)
        } else {
            self.map.entities.iter().find(|entity| entity.id == id)
        }
    }

    fn is_active(&self, id: EntityId) -> bool {
        self.entity(id).map_or(false, |entity| !entity.is_withdrawn())
    }

    fn spawn_trainer(
        &mut self,
        class: MoverClass,
        cell: CellCoord,
        facing: Direction,
        out_events: &mut Vec<Event>,
    ) {
        let placement = match self.map.terrain.get(cell) {
            None => Err(PlacementError::OutOfBounds),
            Some(_) if !self.map.occupancy.can_enter(cell) => Err(PlacementError::Occupied),
            Some(kind) if terrain_cost(kind, class).is_none() => Err(PlacementError::Impassable),
            Some(_) => Ok(()),
        };

        if let Err(reason) = placement {
            log::debug!("rejected {class:?} at {cell:?}: {reason}");
            out_events.push(Event::SpawnRejected { cell, reason });
            return;
        }

        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id += 1;
        self.map.occupancy.occupy(id, cell);
        self.map.entities.push(Entity {
            id,
            class,
            cell,
            facing,
            next_action_time: self.player.next_action_time,
        });
        out_events.push(Event::TrainerSpawned {
            entity: id,
            class,
            cell,
        });
    }

    fn step(&mut self, id: EntityId, direction: Direction, out_events: &mut Vec<Event>) {
        let World { map, player, .. } = self;
        let Map {
            terrain,
            occupancy,
            entities,
            ..
        } = &mut **map;

        let entity = if id == player.id {
            player
        } else {
            match entities.iter_mut().find(|entity| entity.id == id) {
                Some(entity) => entity,
                None => return,
            }
        };
        if entity.is_withdrawn() {
            return;
        }

        let from = entity.cell;
        let destination = from
            .step(direction)
            .filter(|cell| occupancy.can_enter(*cell))
            .and_then(|cell| terrain.get(cell).map(|kind| (cell, kind)))
            .filter(|(_, kind)| *kind != TerrainKind::Gate || entity.class == MoverClass::Player)
            .and_then(|(cell, kind)| terrain_cost(kind, entity.class).map(|cost| (cell, kind, cost)));

        let Some((to, kind, cost)) = destination else {
            out_events.push(Event::StepBlocked {
                entity: id,
                direction,
            });
            let underfoot = standing_cost(terrain, entity);
            entity.charge(underfoot, out_events);
            return;
        };

        occupancy.vacate(from);
        occupancy.occupy(id, to);
        entity.cell = to;
        entity.facing = direction;
        out_events.push(Event::EntityMoved {
            entity: id,
            from,
            to,
        });
        entity.charge(u64::from(cost), out_events);

        if kind == TerrainKind::Gate {
            if let Some(side) = to.border_side() {
                out_events.push(Event::GateReached { side });
            }
        }
    }

    fn hold(&mut self, id: EntityId, out_events: &mut Vec<Event>) {
        let World { map, player, .. } = self;
        let Map {
            terrain, entities, ..
        } = &mut **map;
        let entity = if id == player.id {
            player
        } else {
            match entities.iter_mut().find(|entity| entity.id == id) {
                Some(entity) => entity,
                None => return,
            }
        };
        let underfoot = standing_cost(terrain, entity);
        entity.charge(underfoot, out_events);
    }

    fn enter<R>(
        &mut self,
        destination: WorldCoord,
        arrival: Arrival,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) -> Result<(), TravelError>
    where
        R: Rng + ?Sized,
    {
        let departure = self.player.cell;

        if destination == self.location {
            self.map.occupancy.vacate(departure);
            let Some(cell) = arrival_cell(&self.map, arrival, rng) else {
                self.map.occupancy.occupy(EntityId::PLAYER, departure);
                return Err(TravelError::NoArrivalCell {
                    location: destination,
                });
            };
            self.map.occupancy.occupy(EntityId::PLAYER, cell);
            self.player.cell = cell;
            out_events.push(Event::MapEntered {
                location: destination,
                cell,
                fresh: false,
            });
            return Ok(());
        }

        let resident = Some((self.location, self.map.gates));
        let (mut arriving, fresh) = self
            .grid
            .checkout(destination, resident, rng)
            .ok_or(TravelError::NoArrivalCell {
                location: destination,
            })?;

        let Some(cell) = arrival_cell(&arriving, arrival, rng) else {
            self.grid.park(destination, arriving);
            return Err(TravelError::NoArrivalCell {
                location: destination,
            });
        };

        let now = self.player.next_action_time;
        if let Some(paused_at) = arriving.paused_at.take() {
            arriving.resume(now.saturating_sub(paused_at));
        }
        arriving.occupancy.occupy(EntityId::PLAYER, cell);

        let mut departing = std::mem::replace(&mut self.map, arriving);
        departing.occupancy.vacate(departure);
        departing.paused_at = Some(now);
        self.grid.park(self.location, departing);

        log::info!(
            "entered map {:?} at {cell:?}{}",
            destination.relative(),
            if fresh { " (new)" } else { "" }
        );
        self.location = destination;
        self.player.cell = cell;
        out_events.push(Event::MapEntered {
            location: destination,
            cell,
            fresh,
        });
        Ok(())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    log::trace!("applying {command:?}");
    match command {
        Command::SpawnTrainer {
            class,
            cell,
            facing,
        } => world.spawn_trainer(class, cell, facing, out_events),
        Command::Face { entity, direction } => {
            if let Some(entity) = world.entity_mut(entity) {
                entity.facing = direction;
            }
        }
        Command::Step { entity, direction } => world.step(entity, direction, out_events),
        Command::Hold { entity } => world.hold(entity, out_events),
        Command::Rest { entity, duration } => {
            if let Some(entity) = world.entity_mut(entity) {
                entity.charge(duration, out_events);
            }
        }
        Command::Challenge {
            challenger,
            opponent,
        } => {
            if challenger != opponent && world.is_active(challenger) && world.is_active(opponent) {
                out_events.push(Event::BattleRequested {
                    challenger,
                    opponent,
                });
            }
        }
        Command::Withdraw { entity } => {
            if let Some(entity) = world.entity_mut(entity) {
                if !entity.is_withdrawn() {
                    entity.next_action_time = WITHDRAWN;
                    out_events.push(Event::EntityWithdrawn { entity: entity.id });
                }
            }
        }
    }
}

/// Moves the player through the gate on `side` into the neighbouring map.
///
/// The player arrives one cell inside the matching gate of the destination,
/// or on the nearest free cell when that one is taken.
pub fn travel<R>(
    world: &mut World,
    side: Side,
    rng: &mut R,
    out_events: &mut Vec<Event>,
) -> Result<(), TravelError>
where
    R: Rng + ?Sized,
{
    let destination = world
        .location
        .neighbor(side)
        .ok_or(TravelError::WorldBoundary { side })?;
    if world.map.gates.get(side).is_none() {
        return Err(TravelError::NoGate { side });
    }

    let exit = world.player.cell;
    let target = match side {
        Side::North => CellCoord::new(exit.column(), MAP_HEIGHT - 2),
        Side::South => CellCoord::new(exit.column(), 1),
        Side::West => CellCoord::new(MAP_WIDTH - 2, exit.row()),
        Side::East => CellCoord::new(1, exit.row()),
    };
    world.enter(destination, Arrival::Near(target), rng, out_events)
}

/// Moves the player to a random road cell of the map at `destination`.
pub fn fly<R>(
    world: &mut World,
    destination: WorldCoord,
    rng: &mut R,
    out_events: &mut Vec<Event>,
) -> Result<(), TravelError>
where
    R: Rng + ?Sized,
{
    world.enter(destination, Arrival::AnyRoad, rng, out_events)
}

/// One generated map together with the entities living on it.
#[derive(Debug)]
pub struct Map {
    terrain: TerrainGrid,
    gates: Gates,
    occupancy: OccupancyGrid,
    entities: Vec<Entity>,
    paused_at: Option<u64>,
}

impl Map {
    fn from_generated(generated: GeneratedMap) -> Self {
        Self {
            terrain: generated.terrain,
            gates: generated.gates,
            occupancy: OccupancyGrid::new(),
            entities: Vec::new(),
            paused_at: None,
        }
    }

    /// Terrain layer of the map.
    #[must_use]
    pub fn terrain(&self) -> &TerrainGrid {
        &self.terrain
    }

    /// Gate positions of the map.
    #[must_use]
    pub fn gates(&self) -> Gates {
        self.gates
    }

    /// Read-only view of the occupancy layer.
    #[must_use]
    pub fn occupancy_view(&self) -> OccupancyView<'_> {
        OccupancyView::new(self.occupancy.cells())
    }

    /// Snapshots of every trainer living on the map, including defeated ones.
    #[must_use]
    pub fn trainers(&self) -> Vec<EntitySnapshot> {
        let mut snapshots: Vec<EntitySnapshot> =
            self.entities.iter().map(Entity::snapshot).collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    fn resume(&mut self, elapsed: u64) {
        for entity in self.entities.iter_mut().filter(|entity| !entity.is_withdrawn()) {
            entity.next_action_time = entity
                .next_action_time
                .saturating_add(elapsed)
                .min(WITHDRAWN - 1);
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Arrival {
    Near(CellCoord),
    AnyRoad,
}

fn arrival_cell<R>(map: &Map, arrival: Arrival, rng: &mut R) -> Option<CellCoord>
where
    R: Rng + ?Sized,
{
    let accepts = |cell: CellCoord| {
        cell.is_interior()
            && map.occupancy.can_enter(cell)
            && map
                .terrain
                .get(cell)
                .and_then(|kind| terrain_cost(kind, MoverClass::Player))
                .is_some()
    };

    if let Arrival::Near(target) = arrival {
        let nearby = std::iter::once(Some(target))
            .chain(Direction::ALL.iter().map(|direction| target.step(*direction)))
            .flatten()
            .find(|cell| accepts(*cell));
        if nearby.is_some() {
            return nearby;
        }
    }

    let roads: Vec<CellCoord> = map
        .terrain
        .iter()
        .filter(|(cell, kind)| {
            matches!(kind, TerrainKind::Road | TerrainKind::Bridge) && accepts(*cell)
        })
        .map(|(cell, _)| cell)
        .collect();
    if let Some(cell) = roads.choose(rng) {
        return Some(*cell);
    }

    let open: Vec<CellCoord> = map
        .terrain
        .iter()
        .map(|(cell, _)| cell)
        .filter(|cell| accepts(*cell))
        .collect();
    open.choose(rng).copied()
}

fn standing_cost(terrain: &TerrainGrid, entity: &Entity) -> u64 {
    terrain
        .get(entity.cell)
        .and_then(|kind| terrain_cost(kind, entity.class))
        .map_or(HOLD_FALLBACK_COST, u64::from)
}

#[derive(Clone, Debug)]
struct Entity {
    id: EntityId,
    class: MoverClass,
    cell: CellCoord,
    facing: Direction,
    next_action_time: u64,
}

impl Entity {
    fn player(cell: CellCoord) -> Self {
        Self {
            id: EntityId::PLAYER,
            class: MoverClass::Player,
            cell,
            facing: Direction::South,
            next_action_time: 0,
        }
    }

    fn is_withdrawn(&self) -> bool {
        self.next_action_time == WITHDRAWN
    }

    fn charge(&mut self, delta: u64, out_events: &mut Vec<Event>) {
        if self.is_withdrawn() {
            return;
        }
        self.next_action_time = self
            .next_action_time
            .saturating_add(delta)
            .min(WITHDRAWN - 1);
        out_events.push(Event::ClockAdvanced {
            entity: self.id,
            next_action_time: self.next_action_time,
        });
    }

    fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            class: self.class,
            cell: self.cell,
            facing: self.facing,
            next_action_time: self.next_action_time,
            sequence: self.class.sequence(),
        }
    }
}

#[derive(Clone, Debug)]
struct OccupancyGrid {
    cells: Vec<Option<EntityId>>,
}

impl OccupancyGrid {
    fn new() -> Self {
        Self {
            cells: vec![None; (MAP_WIDTH * MAP_HEIGHT) as usize],
        }
    }

    fn can_enter(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.cells.get(index))
            .map_or(false, Option::is_none)
    }

    fn occupy(&mut self, entity: EntityId, cell: CellCoord) {
        if let Some(slot) = self.index(cell).and_then(|index| self.cells.get_mut(index)) {
            *slot = Some(entity);
        }
    }

    fn vacate(&mut self, cell: CellCoord) {
        if let Some(slot) = self.index(cell).and_then(|index| self.cells.get_mut(index)) {
            *slot = None;
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < MAP_WIDTH && cell.row() < MAP_HEIGHT {
            Some((cell.row() * MAP_WIDTH + cell.column()) as usize)
        } else {
            None
        }
    }

    fn cells(&self) -> &[Option<EntityId>] {
        &self.cells
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use overworld_core::{
        EntityId, EntitySnapshot, Gates, MoverClass, OccupancyView, TerrainGrid, WorldCoord,
    };

    use super::{CostField, Map, World};

    /// World coordinate of the map the player stands on.
    #[must_use]
    pub fn location(world: &World) -> WorldCoord {
        world.location
    }

    /// Terrain of the current map.
    #[must_use]
    pub fn terrain(world: &World) -> &TerrainGrid {
        &world.map.terrain
    }

    /// Gate positions of the current map.
    #[must_use]
    pub fn gates(world: &World) -> Gates {
        world.map.gates
    }

    /// Exposes a read-only view of the current map's occupancy layer.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        world.map.occupancy_view()
    }

    /// Snapshot of the player.
    #[must_use]
    pub fn player(world: &World) -> EntitySnapshot {
        world.player.snapshot()
    }

    /// Snapshot of the entity with `id` on the current map.
    #[must_use]
    pub fn entity(world: &World, id: EntityId) -> Option<EntitySnapshot> {
        world.entity(id).map(super::Entity::snapshot)
    }

    /// Snapshots of the trainers on the current map in identifier order.
    #[must_use]
    pub fn trainers(world: &World) -> Vec<EntitySnapshot> {
        world.map.trainers()
    }

    /// Snapshots of the player followed by every trainer on the current map.
    #[must_use]
    pub fn entities(world: &World) -> Vec<EntitySnapshot> {
        let mut snapshots = vec![world.player.snapshot()];
        snapshots.extend(world.map.trainers());
        snapshots
    }

    /// Map generated at `at`, including the current one.
    #[must_use]
    pub fn map_at(world: &World, at: WorldCoord) -> Option<&Map> {
        if at == world.location {
            Some(&world.map)
        } else {
            world.grid.get(at)
        }
    }

    /// Number of maps generated so far.
    #[must_use]
    pub fn generated_maps(world: &World) -> usize {
        world.grid.generated()
    }

    /// Cost field toward the player for `class` on the current map.
    #[must_use]
    pub fn cost_field(world: &World, class: MoverClass) -> CostField {
        CostField::compute(
            &world.map.terrain,
            world.map.occupancy_view(),
            world.player.cell,
            class,
        )
    }
}
