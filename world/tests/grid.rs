use overworld_core::{GateSpec, Side, WorldCoord, WORLD_SIZE};
use overworld_world::WorldGrid;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn coord(x: u32, y: u32) -> WorldCoord {
    WorldCoord::new(x, y).expect("inside world")
}

#[test]
fn neighbouring_maps_share_seam_gates() {
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let mut grid = WorldGrid::new();
    let mut visited = Vec::new();

    for _ in 0..120 {
        let at = coord(rng.gen_range(195..206), rng.gen_range(195..206));
        let _ = grid.ensure(at, &mut rng);
        visited.push(at);
    }

    for at in visited {
        let map = grid.get(at).expect("generated");
        if let Some(below) = at.neighbor(Side::South).and_then(|next| grid.get(next)) {
            assert_eq!(map.gates().south, below.gates().north, "{at:?} south seam");
        }
        if let Some(right) = at.neighbor(Side::East).and_then(|next| grid.get(next)) {
            assert_eq!(map.gates().east, right.gates().west, "{at:?} east seam");
        }
    }
}

#[test]
fn maps_are_generated_once_and_cached() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let mut grid = WorldGrid::new();

    assert!(grid.ensure(WorldCoord::ORIGIN, &mut rng));
    let first = grid.get(WorldCoord::ORIGIN).expect("origin").terrain().clone();
    assert!(!grid.ensure(WorldCoord::ORIGIN, &mut rng));

    assert_eq!(grid.get(WorldCoord::ORIGIN).expect("origin").terrain(), &first);
    assert_eq!(grid.generated(), 1);
}

#[test]
fn world_edges_are_sealed() {
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let mut grid = WorldGrid::new();
    let last = WORLD_SIZE - 1;

    let request = grid.request_for(coord(0, last), None);
    assert_eq!(request.west, GateSpec::Sealed);
    assert_eq!(request.south, GateSpec::Sealed);
    assert_eq!(request.north, GateSpec::Random);
    assert_eq!(request.manhattan_distance, 400);

    let _ = grid.ensure(coord(last, 0), &mut rng);
    let gates = grid.get(coord(last, 0)).expect("corner").gates();
    assert_eq!(gates.north, None);
    assert_eq!(gates.east, None);
    assert!(gates.south.is_some());
    assert!(gates.west.is_some());
}

#[test]
fn requests_follow_generated_neighbours() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let mut grid = WorldGrid::new();
    let _ = grid.ensure(WorldCoord::ORIGIN, &mut rng);
    let origin = grid.get(WorldCoord::ORIGIN).expect("origin").gates();

    let north = WorldCoord::ORIGIN.neighbor(Side::North).expect("north");
    let request = grid.request_for(north, None);
    assert_eq!(request.south, GateSpec::Fixed(origin.north.expect("north gate")));
    assert_eq!(request.north, GateSpec::Random);
    assert_eq!(request.manhattan_distance, 1);
}
