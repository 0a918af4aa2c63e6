//! Sparse cache of every map generated during the session.

use overworld_core::{GateSpec, Gates, Side, WorldCoord, WORLD_SIZE};
use rand::Rng;

use crate::{
    mapgen::{MapGenerator, MapRequest},
    Map,
};

/// Ownership slots for the 401x401 world; maps are generated on first visit
/// and kept until the process exits.
#[derive(Debug)]
pub struct WorldGrid {
    slots: Vec<Option<Box<Map>>>,
    generated: usize,
    generator: MapGenerator,
}

impl Default for WorldGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldGrid {
    /// Creates an empty world with no generated maps.
    #[must_use]
    pub fn new() -> Self {
        let mut slots = Vec::new();
        slots.resize_with((WORLD_SIZE * WORLD_SIZE) as usize, || None);
        Self {
            slots,
            generated: 0,
            generator: MapGenerator,
        }
    }

    /// Map stored at `at`, if it has been generated and is not checked out.
    #[must_use]
    pub fn get(&self, at: WorldCoord) -> Option<&Map> {
        self.slots.get(index(at)).and_then(Option::as_deref)
    }

    /// Number of maps generated so far.
    #[must_use]
    pub const fn generated(&self) -> usize {
        self.generated
    }

    /// Builds the generation request for `at`, matching every gate to the
    /// opposite gate of an already generated neighbour.
    ///
    /// `resident` describes a map that is currently checked out of the grid
    /// and must still be honoured as a neighbour.
    #[must_use]
    pub fn request_for(&self, at: WorldCoord, resident: Option<(WorldCoord, Gates)>) -> MapRequest {
        let gate = |side: Side| {
            let Some(neighbor) = at.neighbor(side) else {
                return GateSpec::Sealed;
            };
            let neighbor_gates = match resident {
                Some((location, gates)) if location == neighbor => Some(gates),
                _ => self.get(neighbor).map(Map::gates),
            };
            neighbor_gates
                .and_then(|gates| gates.get(side.opposite()))
                .map_or(GateSpec::Random, GateSpec::Fixed)
        };

        MapRequest {
            north: gate(Side::North),
            south: gate(Side::South),
            west: gate(Side::West),
            east: gate(Side::East),
            manhattan_distance: at.manhattan_distance(),
        }
    }

    /// Generates the map at `at` unless it already exists.
    ///
    /// Returns `true` when a new map was generated.
    pub fn ensure<R>(&mut self, at: WorldCoord, rng: &mut R) -> bool
    where
        R: Rng + ?Sized,
    {
        self.ensure_beside(at, None, rng)
    }

    pub(crate) fn ensure_beside<R>(
        &mut self,
        at: WorldCoord,
        resident: Option<(WorldCoord, Gates)>,
        rng: &mut R,
    ) -> bool
    where
        R: Rng + ?Sized,
    {
        if self.get(at).is_some() {
            return false;
        }

        let request = self.request_for(at, resident);
        log::info!(
            "generating map {:?} at distance {}",
            at.relative(),
            request.manhattan_distance
        );
        let generated = self.generator.generate(&request, rng);
        self.slots[index(at)] = Some(Box::new(Map::from_generated(generated)));
        self.generated += 1;
        true
    }

    /// Removes the map at `at` from the grid, generating it first if needed.
    pub(crate) fn checkout<R>(
        &mut self,
        at: WorldCoord,
        resident: Option<(WorldCoord, Gates)>,
        rng: &mut R,
    ) -> Option<(Box<Map>, bool)>
    where
        R: Rng + ?Sized,
    {
        let fresh = self.ensure_beside(at, resident, rng);
        self.slots[index(at)].take().map(|map| (map, fresh))
    }

    /// Returns a checked-out map to its slot.
    pub(crate) fn park(&mut self, at: WorldCoord, map: Box<Map>) {
        self.slots[index(at)] = Some(map);
    }
}

fn index(at: WorldCoord) -> usize {
    (at.y() * WORLD_SIZE + at.x()) as usize
}
