#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawning system responsible for populating freshly generated maps with trainers.

use std::collections::HashSet;

use overworld_core::{
    terrain_cost, CellCoord, Command, Direction, Event, MoverClass, OccupancyView, TerrainGrid,
    TerrainKind,
};
use rand::{seq::SliceRandom, Rng};

/// Classes every map receives once it holds at least seven trainers.
const FULL_ROSTER: [MoverClass; 5] = [
    MoverClass::Pacer,
    MoverClass::Wanderer,
    MoverClass::Sentry,
    MoverClass::Explorer,
    MoverClass::Swimmer,
];

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    trainers_per_map: usize,
}

impl Config {
    /// Creates a configuration placing `trainers_per_map` trainers on each new map.
    #[must_use]
    pub const fn new(trainers_per_map: usize) -> Self {
        Self { trainers_per_map }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(10)
    }
}

/// Pure system that emits spawn commands whenever a map is generated.
#[derive(Debug)]
pub struct Spawning {
    trainers_per_map: usize,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            trainers_per_map: config.trainers_per_map,
        }
    }

    /// Populates the current map when the events report it was just generated.
    pub fn handle<R>(
        &self,
        events: &[Event],
        terrain: &TerrainGrid,
        occupancy: OccupancyView<'_>,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
    {
        let fresh = events
            .iter()
            .any(|event| matches!(event, Event::MapEntered { fresh: true, .. }));
        if fresh {
            self.populate(terrain, occupancy, rng, out);
        }
    }

    /// Emits one spawn command per trainer in the roster.
    ///
    /// Each trainer starts on a uniformly chosen free cell it can stand on,
    /// away from roads and buildings. Trainers with no such cell are skipped.
    pub fn populate<R>(
        &self,
        terrain: &TerrainGrid,
        occupancy: OccupancyView<'_>,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
    {
        let mut reserved = HashSet::new();
        for class in self.roster(rng) {
            let candidates: Vec<CellCoord> = terrain
                .iter()
                .filter(|(cell, kind)| {
                    cell.is_interior()
                        && can_start_on(*kind, class)
                        && occupancy.is_free(*cell)
                        && !reserved.contains(cell)
                })
                .map(|(cell, _)| cell)
                .collect();

            let Some(cell) = candidates.choose(rng).copied() else {
                log::warn!("no room for a {class:?} on this map");
                continue;
            };
            let facing = Direction::CARDINALS[rng.gen_range(0..Direction::CARDINALS.len())];

            let _ = reserved.insert(cell);
            out.push(Command::SpawnTrainer {
                class,
                cell,
                facing,
            });
        }
        log::debug!("placing {} trainer(s)", reserved.len());
    }

    /// Classes of the trainers placed on one map.
    ///
    /// A single trainer is of a random class. Larger populations always
    /// include a hiker and a rival, from seven upward one of every class, and
    /// random classes fill the remainder.
    pub fn roster<R>(&self, rng: &mut R) -> Vec<MoverClass>
    where
        R: Rng + ?Sized,
    {
        let count = self.trainers_per_map;
        let mut roster = Vec::with_capacity(count);
        if count >= 2 {
            roster.extend([MoverClass::Hiker, MoverClass::Rival]);
        }
        if count >= 7 {
            roster.extend(FULL_ROSTER);
        }
        while roster.len() < count {
            let index = rng.gen_range(0..MoverClass::TRAINERS.len());
            roster.push(MoverClass::TRAINERS[index]);
        }
        roster
    }
}

fn can_start_on(kind: TerrainKind, class: MoverClass) -> bool {
    terrain_cost(kind, class).is_some() && !kind.is_road() && !kind.is_building()
}
