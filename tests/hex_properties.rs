//! Property tests for the axial hex metric and fog of war

use hexhold::map::{distance, FogOfWar, HexCoord, HexMap};
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = HexCoord> {
    (-50i32..50, -50i32..50).prop_map(|(q, r)| HexCoord::new(q, r))
}

proptest! {
    #[test]
    fn distance_is_symmetric(a in coord(), b in coord()) {
        prop_assert_eq!(distance(a, b), distance(b, a));
    }

    #[test]
    fn distance_to_self_is_zero(a in coord()) {
        prop_assert_eq!(distance(a, a), 0);
    }

    #[test]
    fn triangle_inequality(a in coord(), b in coord(), c in coord()) {
        prop_assert!(distance(a, c) <= distance(a, b) + distance(b, c));
    }

    #[test]
    fn neighbors_are_one_step(a in coord()) {
        for n in a.neighbors() {
            prop_assert_eq!(distance(a, n), 1);
        }
    }

    #[test]
    fn range_matches_hex_count(a in coord(), radius in 0u32..6) {
        let hexes = a.hexes_in_range(radius);
        let n = radius as usize;
        prop_assert_eq!(hexes.len(), 3 * n * (n + 1) + 1);
        prop_assert!(hexes.iter().all(|h| distance(a, *h) <= radius));
    }

    #[test]
    fn fog_never_shrinks(centers in prop::collection::vec((-4i32..4, -4i32..4), 1..10)) {
        let map = HexMap::new(4);
        let mut fog = FogOfWar::new();
        let mut last = 0;
        for (q, r) in centers {
            fog.reveal_around(&map, HexCoord::new(q, r), 2);
            let count = fog.revealed_count();
            prop_assert!(count >= last);
            prop_assert!(count <= map.len());
            last = count;
        }
    }
}
