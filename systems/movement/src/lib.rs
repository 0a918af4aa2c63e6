#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-class decision rules for every mover on the current map.
//!
//! The system never mutates the world. For each entity popped by the
//! scheduler it inspects read-only queries and emits the commands describing
//! that entity's action; the world then applies them and charges the time.

use overworld_core::{
    terrain_cost, CellCoord, Command, Direction, EntityId, EntitySnapshot, MoverClass,
    OccupancyView, TerrainGrid, TerrainKind,
};
use overworld_world::{query, World};
use rand::Rng;
use thiserror::Error;

/// Random directions tried before a wandering mover forfeits its turn.
pub const MAX_TURN_ATTEMPTS: usize = 20;

/// Time a sentry spends standing guard each turn.
pub const SENTRY_REST: u64 = 15;

/// Reasons a requested player move is refused without consuming time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MoveRejected {
    /// The destination lies outside the map.
    #[error("cannot walk off the map")]
    OffMap,
    /// The player cannot walk on the destination terrain.
    #[error("the way is blocked")]
    Impassable,
    /// A trainer the player already beat stands in the way.
    #[error("a defeated trainer is in the way")]
    DefeatedTrainer,
}

/// Pure system deciding what each mover does on its turn.
#[derive(Debug, Default)]
pub struct Movement;

impl Movement {
    /// Emits the commands for the turn of `entity`.
    ///
    /// Nothing is emitted for the player, whose actions come from input, or
    /// for entities that are unknown or withdrawn.
    pub fn handle<R>(&self, world: &World, entity: EntityId, rng: &mut R, out: &mut Vec<Command>)
    where
        R: Rng + ?Sized,
    {
        let Some(mover) = query::entity(world, entity) else {
            return;
        };
        if mover.is_withdrawn() {
            return;
        }

        match mover.class {
            MoverClass::Player => {}
            MoverClass::Hiker | MoverClass::Rival => pursue(world, &mover, out),
            MoverClass::Sentry => out.push(Command::Rest {
                entity,
                duration: SENTRY_REST,
            }),
            MoverClass::Pacer => pace(world, &mover, out),
            MoverClass::Wanderer => wander(world, &mover, Terrain::Same, rng, out),
            MoverClass::Explorer => wander(world, &mover, Terrain::Passable, rng, out),
            MoverClass::Swimmer => {
                if player_near_water(world) {
                    pursue(world, &mover, out);
                } else {
                    wander(world, &mover, Terrain::Water, rng, out);
                }
            }
        }
    }

    /// Validates a player move and emits the commands that carry it out.
    ///
    /// Walking into an active trainer starts a battle and keeps the player in
    /// place. Rejected moves emit nothing.
    pub fn player_step(
        &self,
        world: &World,
        direction: Direction,
        out: &mut Vec<Command>,
    ) -> Result<(), MoveRejected> {
        let player = query::player(world);
        let destination = player.cell.step(direction).ok_or(MoveRejected::OffMap)?;

        if let Some(occupant) = query::occupancy_view(world).occupant(destination) {
            let trainer = query::entity(world, occupant).ok_or(MoveRejected::Impassable)?;
            if trainer.is_withdrawn() {
                return Err(MoveRejected::DefeatedTrainer);
            }
            out.extend([
                Command::Face {
                    entity: player.id,
                    direction,
                },
                Command::Challenge {
                    challenger: player.id,
                    opponent: occupant,
                },
                Command::Hold { entity: player.id },
            ]);
            return Ok(());
        }

        let passable = query::terrain(world)
            .get(destination)
            .and_then(|kind| terrain_cost(kind, MoverClass::Player))
            .is_some();
        if !passable {
            return Err(MoveRejected::Impassable);
        }

        out.push(Command::Step {
            entity: player.id,
            direction,
        });
        Ok(())
    }
}

/// Terrain rule a wandering mover follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Terrain {
    /// Only terrain identical to the cell underfoot.
    Same,
    /// Any terrain the class can traverse.
    Passable,
    /// Water and bridges only.
    Water,
}

impl Terrain {
    fn accepts(self, class: MoverClass, underfoot: Option<TerrainKind>, next: TerrainKind) -> bool {
        if next == TerrainKind::Gate || terrain_cost(next, class).is_none() {
            return false;
        }
        match self {
            Self::Same => underfoot == Some(next),
            Self::Passable => true,
            Self::Water => matches!(next, TerrainKind::Water | TerrainKind::Bridge),
        }
    }
}

/// Whether `rule` lets `mover` onto the terrain toward `direction`, whoever
/// stands there.
fn terrain_allows(
    terrain: &TerrainGrid,
    mover: &EntitySnapshot,
    direction: Direction,
    rule: Terrain,
) -> bool {
    let underfoot = terrain.get(mover.cell);
    mover
        .cell
        .step(direction)
        .and_then(|next| terrain.get(next))
        .map_or(false, |next| rule.accepts(mover.class, underfoot, next))
}

/// Whether `mover` may walk from its cell toward `direction` under `rule`.
fn open_toward(
    terrain: &TerrainGrid,
    occupancy: OccupancyView<'_>,
    mover: &EntitySnapshot,
    direction: Direction,
    rule: Terrain,
) -> bool {
    mover
        .cell
        .step(direction)
        .map_or(false, |next| occupancy.is_free(next))
        && terrain_allows(terrain, mover, direction, rule)
}

fn player_ahead(occupancy: OccupancyView<'_>, mover: &EntitySnapshot, direction: Direction) -> bool {
    mover
        .cell
        .step(direction)
        .and_then(|next| occupancy.occupant(next))
        == Some(EntityId::PLAYER)
}

fn challenge(mover: &EntitySnapshot, direction: Direction, out: &mut Vec<Command>) {
    log::debug!("{:?} {:?} challenges the player", mover.class, mover.id);
    out.extend([
        Command::Face {
            entity: mover.id,
            direction,
        },
        Command::Challenge {
            challenger: mover.id,
            opponent: EntityId::PLAYER,
        },
        Command::Hold { entity: mover.id },
    ]);
}

fn walk(mover: &EntitySnapshot, direction: Direction, out: &mut Vec<Command>) {
    out.push(Command::Step {
        entity: mover.id,
        direction,
    });
}

/// Steps down the class cost field toward the player.
fn pursue(world: &World, mover: &EntitySnapshot, out: &mut Vec<Command>) {
    let field = query::cost_field(world, mover.class);
    match field.cheapest_neighbor(mover.cell) {
        None => out.push(Command::Hold { entity: mover.id }),
        Some((direction, 0)) => challenge(mover, direction, out),
        Some((direction, _)) => walk(mover, direction, out),
    }
}

/// Walks back and forth along the facing axis over identical terrain.
fn pace(world: &World, mover: &EntitySnapshot, out: &mut Vec<Command>) {
    let terrain = query::terrain(world);
    let occupancy = query::occupancy_view(world);

    for direction in [mover.facing, mover.facing.opposite()] {
        if !terrain_allows(terrain, mover, direction, Terrain::Same) {
            continue;
        }
        if player_ahead(occupancy, mover, direction) {
            challenge(mover, direction, out);
            return;
        }
        if open_toward(terrain, occupancy, mover, direction, Terrain::Same) {
            walk(mover, direction, out);
            return;
        }
    }

    out.push(Command::Face {
        entity: mover.id,
        direction: mover.facing.opposite(),
    });
    out.push(Command::Hold { entity: mover.id });
}

/// Keeps heading the same way while `rule` allows, otherwise turns at random.
fn wander<R>(
    world: &World,
    mover: &EntitySnapshot,
    rule: Terrain,
    rng: &mut R,
    out: &mut Vec<Command>,
) where
    R: Rng + ?Sized,
{
    let terrain = query::terrain(world);
    let occupancy = query::occupancy_view(world);

    if terrain_allows(terrain, mover, mover.facing, rule) {
        if player_ahead(occupancy, mover, mover.facing) {
            challenge(mover, mover.facing, out);
            return;
        }
        if open_toward(terrain, occupancy, mover, mover.facing, rule) {
            walk(mover, mover.facing, out);
            return;
        }
    }

    match random_turn(terrain, occupancy, mover, rule, rng) {
        Some(direction) => walk(mover, direction, out),
        None => {
            log::warn!(
                "{:?} {:?} found no way out of {:?}, forfeiting its turn",
                mover.class,
                mover.id,
                mover.cell
            );
            out.push(Command::Hold { entity: mover.id });
        }
    }
}

fn random_turn<R>(
    terrain: &TerrainGrid,
    occupancy: OccupancyView<'_>,
    mover: &EntitySnapshot,
    rule: Terrain,
    rng: &mut R,
) -> Option<Direction>
where
    R: Rng + ?Sized,
{
    (0..MAX_TURN_ATTEMPTS)
        .map(|_| Direction::CARDINALS[rng.gen_range(0..Direction::CARDINALS.len())])
        .find(|direction| open_toward(terrain, occupancy, mover, *direction, rule))
}

/// Whether the player stands on or next to water or a bridge.
fn player_near_water(world: &World) -> bool {
    let terrain = query::terrain(world);
    let cell = query::player(world).cell;
    let is_water = |cell: CellCoord| {
        matches!(
            terrain.get(cell),
            Some(TerrainKind::Water | TerrainKind::Bridge)
        )
    };

    is_water(cell)
        || Direction::ALL
            .iter()
            .filter_map(|direction| cell.step(*direction))
            .any(is_water)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_rules_never_accept_gates_or_hostile_ground() {
        for rule in [Terrain::Same, Terrain::Passable, Terrain::Water] {
            assert!(!rule.accepts(
                MoverClass::Swimmer,
                Some(TerrainKind::Gate),
                TerrainKind::Gate
            ));
        }
        assert!(!Terrain::Passable.accepts(
            MoverClass::Explorer,
            Some(TerrainKind::Clearing),
            TerrainKind::Tree
        ));
        assert!(Terrain::Passable.accepts(
            MoverClass::Explorer,
            Some(TerrainKind::Clearing),
            TerrainKind::Grass
        ));
    }

    #[test]
    fn same_terrain_rule_compares_with_the_cell_underfoot() {
        assert!(Terrain::Same.accepts(
            MoverClass::Wanderer,
            Some(TerrainKind::Grass),
            TerrainKind::Grass
        ));
        assert!(!Terrain::Same.accepts(
            MoverClass::Wanderer,
            Some(TerrainKind::Grass),
            TerrainKind::Clearing
        ));
    }

    #[test]
    fn water_rule_allows_bridges() {
        assert!(Terrain::Water.accepts(
            MoverClass::Swimmer,
            Some(TerrainKind::Water),
            TerrainKind::Bridge
        ));
        assert!(!Terrain::Water.accepts(
            MoverClass::Swimmer,
            Some(TerrainKind::Water),
            TerrainKind::Road
        ));
    }
}
