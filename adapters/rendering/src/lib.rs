#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for overworld adapters.
//!
//! A [`Frame`] is a character-per-cell picture of the current map plus a few
//! status lines. Backends only present frames; nothing flows back into the
//! simulation.

use std::fmt;

use anyhow::Result as AnyResult;
use overworld_core::{CellCoord, EntitySnapshot, MoverClass, TerrainKind, MAP_HEIGHT, MAP_WIDTH};
use overworld_world::{query, CostField, World};

/// Character drawn for a terrain cell.
#[must_use]
pub const fn terrain_symbol(terrain: TerrainKind) -> char {
    match terrain {
        TerrainKind::Clearing => '.',
        TerrainKind::Grass => ':',
        TerrainKind::Boulder | TerrainKind::Edge => '%',
        TerrainKind::Tree => '^',
        TerrainKind::Water => '~',
        TerrainKind::Road | TerrainKind::Bridge | TerrainKind::Gate => '#',
        TerrainKind::PokeMart => 'M',
        TerrainKind::PokeCenter => 'C',
    }
}

/// Character drawn for an entity of `class`.
#[must_use]
pub const fn mover_symbol(class: MoverClass) -> char {
    match class {
        MoverClass::Player => '@',
        MoverClass::Hiker => 'h',
        MoverClass::Rival => 'r',
        MoverClass::Pacer => 'p',
        MoverClass::Wanderer => 'w',
        MoverClass::Sentry => 's',
        MoverClass::Explorer => 'e',
        MoverClass::Swimmer => 'm',
    }
}

/// Offset of one cell from another, phrased as a compass bearing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bearing {
    /// Rows toward the north; negative values point south.
    pub north: i64,
    /// Columns toward the east; negative values point west.
    pub east: i64,
}

impl Bearing {
    /// Bearing of `to` as seen from `from`.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Self {
        Self {
            north: i64::from(from.row()) - i64::from(to.row()),
            east: i64::from(to.column()) - i64::from(from.column()),
        }
    }
}

impl fmt::Display for Bearing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vertical = if self.north >= 0 { "north" } else { "south" };
        let horizontal = if self.east >= 0 { "east" } else { "west" };
        write!(
            f,
            "{} {vertical} and {} {horizontal}",
            self.north.unsigned_abs(),
            self.east.unsigned_abs()
        )
    }
}

/// Rendered picture of the current map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// One string per map row, one character per cell.
    pub rows: Vec<String>,
    /// Status lines shown below the map.
    pub status: Vec<String>,
}

impl Frame {
    /// Draws the current map of `world` with its entities and status lines.
    #[must_use]
    pub fn capture(world: &World) -> Self {
        let terrain = query::terrain(world);
        let mut cells: Vec<Vec<char>> = (0..MAP_HEIGHT)
            .map(|_| vec![' '; MAP_WIDTH as usize])
            .collect();
        for (cell, kind) in terrain.iter() {
            cells[cell.row() as usize][cell.column() as usize] = terrain_symbol(kind);
        }
        for entity in query::entities(world) {
            if let Some(slot) = cells
                .get_mut(entity.cell.row() as usize)
                .and_then(|row| row.get_mut(entity.cell.column() as usize))
            {
                *slot = mover_symbol(entity.class);
            }
        }

        Self {
            rows: cells.into_iter().map(String::from_iter).collect(),
            status: status_lines(world),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.rows.iter().chain(&self.status) {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Rendering backend capable of presenting overworld frames.
pub trait RenderingBackend {
    /// Presents `frame`, replacing whatever was shown before.
    fn present(&mut self, frame: &Frame) -> AnyResult<()>;

    /// Presents a list of lines such as the trainer list or a message.
    fn present_lines(&mut self, lines: &[String]) -> AnyResult<()>;
}

/// One line per other entity on the current map, in identifier order.
#[must_use]
pub fn trainer_list(world: &World) -> Vec<String> {
    let player = query::player(world);
    query::trainers(world)
        .into_iter()
        .map(|trainer| {
            let defeated = if trainer.is_withdrawn() {
                " (defeated)"
            } else {
                ""
            };
            format!(
                "{}, {}{defeated}",
                mover_symbol(trainer.class),
                Bearing::between(player.cell, trainer.cell)
            )
        })
        .collect()
}

/// Active trainer closest to the player by rival walking cost.
///
/// Trainers the field cannot reach rank after reachable ones and are compared
/// by Manhattan distance.
#[must_use]
pub fn nearest_trainer(world: &World) -> Option<EntitySnapshot> {
    let player = query::player(world);
    let field = query::cost_field(world, MoverClass::Rival);
    query::trainers(world)
        .into_iter()
        .filter(|trainer| !trainer.is_withdrawn())
        .min_by_key(|trainer| {
            let walk = approach_cost(&field, trainer.cell);
            (
                walk.is_none(),
                walk.unwrap_or(0),
                trainer.cell.manhattan_distance(player.cell),
                trainer.id,
            )
        })
}

/// Cheapest field value next to `cell`; occupied cells never carry one.
fn approach_cost(field: &CostField, cell: CellCoord) -> Option<u32> {
    field.cheapest_neighbor(cell).map(|(_, cost)| cost)
}

fn status_lines(world: &World) -> Vec<String> {
    let player = query::player(world);
    let (east, north) = query::location(world).relative();
    let trainers = query::trainers(world);
    let active = trainers
        .iter()
        .filter(|trainer| !trainer.is_withdrawn())
        .count();

    let nearest = match nearest_trainer(world) {
        Some(trainer) => format!(
            "nearest: {}, {}",
            mover_symbol(trainer.class),
            Bearing::between(player.cell, trainer.cell)
        ),
        None => String::from("nearest: none"),
    };

    vec![
        format!(
            "map ({east}, {north})  cell ({}, {})  time {}",
            player.cell.column(),
            player.cell.row(),
            player.next_action_time
        ),
        format!(
            "trainers: {} known, {active} undefeated  {nearest}",
            trainers.len()
        ),
    ]
}
