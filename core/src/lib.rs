#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the overworld engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems inspect immutable views of
//! the world and respond with [`Command`] values describing desired
//! mutations, the world executes those commands via its `apply` entry point,
//! and then reports [`Event`] values describing what actually happened.

pub mod queue;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of columns in a single map.
pub const MAP_WIDTH: u32 = 80;

/// Number of rows in a single map.
pub const MAP_HEIGHT: u32 = 21;

/// Number of maps along each axis of the world.
pub const WORLD_SIZE: u32 = 401;

/// Index of the origin map along both world axes.
pub const WORLD_CENTER: u32 = 200;

/// Sentinel `next_action_time` marking an entity as withdrawn from scheduling.
pub const WITHDRAWN: u64 = u64::MAX;

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Places a new trainer on the current map.
    SpawnTrainer {
        /// Behavioural class assigned to the trainer.
        class: MoverClass,
        /// Cell the trainer should occupy.
        cell: CellCoord,
        /// Initial facing of the trainer.
        facing: Direction,
    },
    /// Turns an entity without moving it.
    Face {
        /// Entity being turned.
        entity: EntityId,
        /// Direction the entity should face.
        direction: Direction,
    },
    /// Moves an entity one cell and charges the destination's terrain cost.
    Step {
        /// Entity attempting to move.
        entity: EntityId,
        /// Direction of travel.
        direction: Direction,
    },
    /// Keeps an entity in place, charging the terrain cost underfoot.
    Hold {
        /// Entity forfeiting its move.
        entity: EntityId,
    },
    /// Keeps an entity in place for a fixed amount of time.
    Rest {
        /// Entity resting.
        entity: EntityId,
        /// Time units consumed by the rest.
        duration: u64,
    },
    /// Requests a battle between two entities.
    Challenge {
        /// Entity initiating the battle.
        challenger: EntityId,
        /// Entity being challenged.
        opponent: EntityId,
    },
    /// Removes an entity from scheduling without freeing its cell.
    Withdraw {
        /// Entity leaving the turn order.
        entity: EntityId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Confirms that a trainer was placed on the current map.
    TrainerSpawned {
        /// Identifier allocated to the trainer.
        entity: EntityId,
        /// Behavioural class of the trainer.
        class: MoverClass,
        /// Cell the trainer occupies.
        cell: CellCoord,
    },
    /// Reports that a spawn request could not be honoured.
    SpawnRejected {
        /// Cell named in the request.
        cell: CellCoord,
        /// Reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that an entity moved between two cells.
    EntityMoved {
        /// Entity that moved.
        entity: EntityId,
        /// Cell the entity left.
        from: CellCoord,
        /// Cell the entity entered.
        to: CellCoord,
    },
    /// Reports that a requested step could not be taken.
    StepBlocked {
        /// Entity whose step was refused.
        entity: EntityId,
        /// Direction of the refused step.
        direction: Direction,
    },
    /// Reports the new scheduling time of an entity after it was charged.
    ClockAdvanced {
        /// Entity whose clock advanced.
        entity: EntityId,
        /// Time of the entity's next action.
        next_action_time: u64,
    },
    /// Announces that a battle must be resolved.
    BattleRequested {
        /// Entity that initiated the battle.
        challenger: EntityId,
        /// Entity that was challenged.
        opponent: EntityId,
    },
    /// Confirms that an entity left the turn order.
    EntityWithdrawn {
        /// Entity that was withdrawn.
        entity: EntityId,
    },
    /// Reports that the player stepped onto a gate of the current map.
    GateReached {
        /// Side of the map the gate sits on.
        side: Side,
    },
    /// Confirms that the player entered a map.
    MapEntered {
        /// World coordinate of the entered map.
        location: WorldCoord,
        /// Cell the player arrived on.
        cell: CellCoord,
        /// Whether the map was generated by this transition.
        fresh: bool,
    },
}

/// Commands produced by the input collaborator on the player's turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerCommand {
    /// Step one cell in the given direction.
    Move(Direction),
    /// Stay in place for a turn.
    Wait,
    /// Enter the building the player stands on.
    Interact,
    /// Show the trainers on the current map.
    ListTrainers,
    /// Travel to the map at the given coordinates relative to the origin.
    Fly {
        /// Columns east of the origin map.
        x: i32,
        /// Rows north of the origin map.
        y: i32,
    },
    /// End the session.
    Quit,
}

/// Result reported by the battle collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleOutcome {
    /// The trainer lost and leaves the turn order.
    TrainerDefeated,
    /// The player lost and the session ends.
    PlayerDefeated,
    /// Neither side was withdrawn.
    Undecided,
}

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The requested cell lies outside the map.
    #[error("cell lies outside the map")]
    OutOfBounds,
    /// The requested cell already hosts an entity.
    #[error("cell is already occupied")]
    Occupied,
    /// The terrain at the requested cell cannot be entered by the mover.
    #[error("terrain is impassable for this mover")]
    Impassable,
}

/// Terrain occupying a single map cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    /// Open ground.
    Clearing,
    /// Tall grass.
    Grass,
    /// Rock formations.
    Boulder,
    /// Impassable border wall.
    Edge,
    /// Forest.
    Tree,
    /// Open water.
    Water,
    /// Paved path.
    Road,
    /// Road crossing water.
    Bridge,
    /// Exit toward a neighbouring map.
    Gate,
    /// Shop building.
    PokeMart,
    /// Healing building.
    PokeCenter,
}

impl TerrainKind {
    /// Reports whether the terrain belongs to the road network.
    #[must_use]
    pub const fn is_road(self) -> bool {
        matches!(self, Self::Road | Self::Bridge | Self::Gate)
    }

    /// Reports whether the terrain is one of the two buildings.
    #[must_use]
    pub const fn is_building(self) -> bool {
        matches!(self, Self::PokeMart | Self::PokeCenter)
    }
}

/// Behavioural category of an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MoverClass {
    /// The player character.
    Player,
    /// Pursues the player and climbs boulders and trees.
    Hiker,
    /// Pursues the player.
    Rival,
    /// Walks back and forth along a line.
    Pacer,
    /// Roams within a single terrain type.
    Wanderer,
    /// Stands still.
    Sentry,
    /// Roams over any passable terrain.
    Explorer,
    /// Patrols water and pursues the player near it.
    Swimmer,
}

impl MoverClass {
    /// Every class except the player, in sequence order.
    pub const TRAINERS: [MoverClass; 7] = [
        MoverClass::Hiker,
        MoverClass::Rival,
        MoverClass::Pacer,
        MoverClass::Wanderer,
        MoverClass::Sentry,
        MoverClass::Explorer,
        MoverClass::Swimmer,
    ];

    /// Fixed tie-break rank used when two entities act at the same time.
    #[must_use]
    pub const fn sequence(self) -> u32 {
        match self {
            Self::Player => 0,
            Self::Hiker => 1,
            Self::Rival => 2,
            Self::Pacer => 3,
            Self::Wanderer => 4,
            Self::Sentry => 5,
            Self::Explorer => 6,
            Self::Swimmer => 7,
        }
    }
}

/// Cost for `class` to enter a cell of `terrain`, or `None` when impassable.
///
/// The same table decides movement legality and supplies edge weights for
/// cost-field relaxation.
#[must_use]
pub const fn terrain_cost(terrain: TerrainKind, class: MoverClass) -> Option<u32> {
    use MoverClass::{Hiker, Player, Swimmer};
    use TerrainKind::*;

    match (terrain, class) {
        (Water, Swimmer) | (Bridge, Swimmer) => Some(7),
        (_, Swimmer) => None,
        (Road, _) | (Gate, _) | (Bridge, _) | (Clearing, _) => Some(10),
        (Grass, Hiker) => Some(15),
        (Grass, _) => Some(20),
        (Boulder, Hiker) | (Tree, Hiker) => Some(15),
        (PokeMart, Player) | (PokeCenter, Player) => Some(10),
        (PokeMart, _) | (PokeCenter, _) => Some(50),
        (Boulder, _) | (Tree, _) | (Water, _) | (Edge, _) => None,
    }
}

/// Eight-way movement directions on the map grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// North and east.
    NorthEast,
    /// Toward increasing column indices.
    East,
    /// South and east.
    SouthEast,
    /// Toward increasing row indices.
    South,
    /// South and west.
    SouthWest,
    /// Toward decreasing column indices.
    West,
    /// North and west.
    NorthWest,
}

impl Direction {
    /// All directions in neighbour evaluation order, cardinals first.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthWest,
    ];

    /// The four axis-aligned directions.
    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Column and row offsets applied by a step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::NorthEast => (1, -1),
            Self::East => (1, 0),
            Self::SouthEast => (1, 1),
            Self::South => (0, 1),
            Self::SouthWest => (-1, 1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, -1),
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::NorthEast => Self::SouthWest,
            Self::East => Self::West,
            Self::SouthEast => Self::NorthWest,
            Self::South => Self::North,
            Self::SouthWest => Self::NorthEast,
            Self::West => Self::East,
            Self::NorthWest => Self::SouthEast,
        }
    }
}

/// Side of a map, used for gates and world neighbours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Top edge (row 0).
    North,
    /// Bottom edge.
    South,
    /// Left edge (column 0).
    West,
    /// Right edge.
    East,
}

impl Side {
    /// All four sides.
    pub const ALL: [Side; 4] = [Side::North, Side::South, Side::West, Side::East];

    /// Side facing this one across a map seam.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::East => Self::West,
        }
    }
}

/// Unique identifier assigned to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Identifier reserved for the player.
    pub const PLAYER: EntityId = EntityId(0);

    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single map cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Neighbouring cell in `direction`, if it lies on the map.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        let (dx, dy) = direction.delta();
        let column = self.column.checked_add_signed(dx)?;
        let row = self.row.checked_add_signed(dy)?;
        (column < MAP_WIDTH && row < MAP_HEIGHT).then_some(CellCoord::new(column, row))
    }

    /// Reports whether the cell lies inside the map's border ring.
    #[must_use]
    pub const fn is_interior(&self) -> bool {
        self.column >= 1
            && self.column <= MAP_WIDTH - 2
            && self.row >= 1
            && self.row <= MAP_HEIGHT - 2
    }

    /// Side of the map whose border contains the cell, if any.
    #[must_use]
    pub const fn border_side(&self) -> Option<Side> {
        if self.row == 0 {
            Some(Side::North)
        } else if self.row == MAP_HEIGHT - 1 {
            Some(Side::South)
        } else if self.column == 0 {
            Some(Side::West)
        } else if self.column == MAP_WIDTH - 1 {
            Some(Side::East)
        } else {
            None
        }
    }
}

/// Location of a map within the world grid.
///
/// Rows grow southward, so the map north of `(x, y)` is `(x, y - 1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldCoord {
    x: u32,
    y: u32,
}

impl WorldCoord {
    /// The origin map at the centre of the world.
    pub const ORIGIN: WorldCoord = WorldCoord {
        x: WORLD_CENTER,
        y: WORLD_CENTER,
    };

    /// Creates a world coordinate, rejecting values outside the world.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Option<Self> {
        if x < WORLD_SIZE && y < WORLD_SIZE {
            Some(Self { x, y })
        } else {
            None
        }
    }

    /// Converts coordinates relative to the origin (north positive).
    #[must_use]
    pub fn from_relative(x: i32, y: i32) -> Option<Self> {
        let column = WORLD_CENTER.checked_add_signed(x)?;
        let row = WORLD_CENTER.checked_add_signed(y.checked_neg()?)?;
        Self::new(column, row)
    }

    /// Column of the map within the world.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Row of the map within the world.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Offset from the origin as `(east, north)`.
    #[must_use]
    pub fn relative(&self) -> (i32, i32) {
        let center = WORLD_CENTER as i32;
        (self.x as i32 - center, center - self.y as i32)
    }

    /// Manhattan distance from the origin map.
    #[must_use]
    pub fn manhattan_distance(&self) -> u32 {
        self.x.abs_diff(WORLD_CENTER) + self.y.abs_diff(WORLD_CENTER)
    }

    /// Neighbouring map across `side`, if it lies inside the world.
    #[must_use]
    pub fn neighbor(&self, side: Side) -> Option<WorldCoord> {
        match side {
            Side::North => Self::new(self.x, self.y.checked_sub(1)?),
            Side::South => Self::new(self.x, self.y + 1),
            Side::West => Self::new(self.x.checked_sub(1)?, self.y),
            Side::East => Self::new(self.x + 1, self.y),
        }
    }
}

/// Requested gate position for one side of a map being generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateSpec {
    /// Choose a position at random.
    Random,
    /// Use the provided column (north/south) or row (west/east).
    Fixed(u32),
    /// The side lies on the world boundary and stays closed.
    Sealed,
}

/// Gate positions of a generated map; `None` marks a sealed side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gates {
    /// Column of the gate on the top edge.
    pub north: Option<u32>,
    /// Column of the gate on the bottom edge.
    pub south: Option<u32>,
    /// Row of the gate on the left edge.
    pub west: Option<u32>,
    /// Row of the gate on the right edge.
    pub east: Option<u32>,
}

impl Gates {
    /// Gate position on `side`.
    #[must_use]
    pub const fn get(&self, side: Side) -> Option<u32> {
        match side {
            Side::North => self.north,
            Side::South => self.south,
            Side::West => self.west,
            Side::East => self.east,
        }
    }

    /// Border cell holding the gate on `side`.
    #[must_use]
    pub fn cell(&self, side: Side) -> Option<CellCoord> {
        let position = self.get(side)?;
        Some(match side {
            Side::North => CellCoord::new(position, 0),
            Side::South => CellCoord::new(position, MAP_HEIGHT - 1),
            Side::West => CellCoord::new(0, position),
            Side::East => CellCoord::new(MAP_WIDTH - 1, position),
        })
    }
}

/// Dense terrain layer of a single map stored in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainGrid {
    cells: Vec<TerrainKind>,
}

impl TerrainGrid {
    /// Creates a map-sized grid filled with `terrain`.
    #[must_use]
    pub fn filled(terrain: TerrainKind) -> Self {
        Self {
            cells: vec![terrain; (MAP_WIDTH * MAP_HEIGHT) as usize],
        }
    }

    /// Terrain at `cell`, or `None` outside the map.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<TerrainKind> {
        index(cell).and_then(|index| self.cells.get(index).copied())
    }

    /// Overwrites the terrain at `cell`. Writes outside the map are ignored.
    pub fn set(&mut self, cell: CellCoord, terrain: TerrainKind) {
        if let Some(slot) = index(cell).and_then(|index| self.cells.get_mut(index)) {
            *slot = terrain;
        }
    }

    /// Iterates over every cell with its terrain in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, TerrainKind)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(index, terrain)| (cell_at(index), *terrain))
    }

    /// Counts the cells holding `terrain`.
    #[must_use]
    pub fn count(&self, terrain: TerrainKind) -> usize {
        self.cells.iter().filter(|cell| **cell == terrain).count()
    }
}

/// Immutable representation of a single entity used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Unique identifier assigned to the entity.
    pub id: EntityId,
    /// Behavioural class of the entity.
    pub class: MoverClass,
    /// Cell currently occupied by the entity.
    pub cell: CellCoord,
    /// Direction the entity last faced.
    pub facing: Direction,
    /// Time at which the entity acts next, or [`WITHDRAWN`].
    pub next_action_time: u64,
    /// Tie-break rank derived from the class.
    pub sequence: u32,
}

impl EntitySnapshot {
    /// Reports whether the entity has left the turn order.
    #[must_use]
    pub const fn is_withdrawn(&self) -> bool {
        self.next_action_time == WITHDRAWN
    }
}

/// Read-only view into a map's occupancy layer.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    cells: &'a [Option<EntityId>],
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided row-major slice.
    #[must_use]
    pub fn new(cells: &'a [Option<EntityId>]) -> Self {
        Self { cells }
    }

    /// Returns the entity occupying the provided cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<EntityId> {
        index(cell).and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Reports whether the cell lies on the map and is unoccupied.
    #[must_use]
    pub fn is_free(&self, cell: CellCoord) -> bool {
        index(cell).map_or(false, |index| {
            self.cells.get(index).map_or(false, Option::is_none)
        })
    }
}

fn index(cell: CellCoord) -> Option<usize> {
    if cell.column() < MAP_WIDTH && cell.row() < MAP_HEIGHT {
        Some((cell.row() * MAP_WIDTH + cell.column()) as usize)
    } else {
        None
    }
}

fn cell_at(index: usize) -> CellCoord {
    let width = MAP_WIDTH as usize;
    CellCoord::new((index % width) as u32, (index / width) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swimmers_only_cross_water_and_bridges() {
        assert_eq!(terrain_cost(TerrainKind::Water, MoverClass::Swimmer), Some(7));
        assert_eq!(terrain_cost(TerrainKind::Bridge, MoverClass::Swimmer), Some(7));
        assert_eq!(terrain_cost(TerrainKind::Road, MoverClass::Swimmer), None);
        assert_eq!(terrain_cost(TerrainKind::Water, MoverClass::Player), None);
        assert_eq!(terrain_cost(TerrainKind::Bridge, MoverClass::Rival), Some(10));
    }

    #[test]
    fn hikers_climb_where_others_cannot() {
        for terrain in [TerrainKind::Boulder, TerrainKind::Tree] {
            assert_eq!(terrain_cost(terrain, MoverClass::Hiker), Some(15));
            assert_eq!(terrain_cost(terrain, MoverClass::Rival), None);
        }
        assert_eq!(terrain_cost(TerrainKind::Grass, MoverClass::Hiker), Some(15));
        assert_eq!(terrain_cost(TerrainKind::Grass, MoverClass::Wanderer), Some(20));
    }

    #[test]
    fn buildings_are_cheap_only_for_the_player() {
        assert_eq!(terrain_cost(TerrainKind::PokeMart, MoverClass::Player), Some(10));
        assert_eq!(terrain_cost(TerrainKind::PokeCenter, MoverClass::Sentry), Some(50));
        assert_eq!(terrain_cost(TerrainKind::Edge, MoverClass::Hiker), None);
    }

    #[test]
    fn steps_stop_at_the_map_boundary() {
        let corner = CellCoord::new(0, 0);
        assert_eq!(corner.step(Direction::North), None);
        assert_eq!(corner.step(Direction::West), None);
        assert_eq!(
            corner.step(Direction::SouthEast),
            Some(CellCoord::new(1, 1))
        );

        let far = CellCoord::new(MAP_WIDTH - 1, MAP_HEIGHT - 1);
        assert_eq!(far.step(Direction::East), None);
        assert_eq!(far.step(Direction::South), None);
    }

    #[test]
    fn relative_world_coordinates_put_north_up() {
        let north = WorldCoord::from_relative(3, 4).expect("inside world");
        assert_eq!((north.x(), north.y()), (203, 196));
        assert_eq!(north.relative(), (3, 4));
        assert_eq!(north.manhattan_distance(), 7);
        assert_eq!(WorldCoord::from_relative(201, 0), None);
        assert_eq!(WorldCoord::ORIGIN.neighbor(Side::North), WorldCoord::new(200, 199));

        let corner = WorldCoord::new(0, 0).expect("inside world");
        assert_eq!(corner.neighbor(Side::North), None);
        assert_eq!(corner.neighbor(Side::West), None);
    }

    #[test]
    fn terrain_grid_ignores_out_of_range_writes() {
        let mut grid = TerrainGrid::filled(TerrainKind::Clearing);
        grid.set(CellCoord::new(MAP_WIDTH, 3), TerrainKind::Water);
        grid.set(CellCoord::new(4, MAP_HEIGHT), TerrainKind::Water);
        assert_eq!(grid.count(TerrainKind::Water), 0);
        assert_eq!(grid.get(CellCoord::new(MAP_WIDTH, 0)), None);

        grid.set(CellCoord::new(79, 20), TerrainKind::Water);
        assert_eq!(grid.get(CellCoord::new(79, 20)), Some(TerrainKind::Water));
    }

    #[test]
    fn events_survive_binary_encoding() {
        let event = Event::MapEntered {
            location: WorldCoord::ORIGIN,
            cell: CellCoord::new(4, 5),
            fresh: true,
        };
        let bytes = bincode::serialize(&event).expect("serialize");
        let decoded: Event = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(decoded, event);
    }
}
