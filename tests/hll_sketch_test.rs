use hll_sketch::{hash, Sketch};

fn add_n(sketch: &mut Sketch<'static>, n: u64) {
    for i in 0..n {
        sketch.add(&hash::hash_item(&i)).unwrap();
    }
}

/// Adds `n` items drawn from a random `u64` rather than a sequential
/// counter, for accuracy tests that should reflect an arbitrary key space
/// rather than one hashing function's behavior on a dense run of integers.
fn add_n_random(sketch: &mut Sketch<'static>, n: u64) {
    use rand::Rng;
    let mut rng = rand::rng();
    for _ in 0..n {
        let value: u64 = rng.random();
        sketch.add(&hash::hash_item(&value)).unwrap();
    }
}

mod construction {
    use super::*;

    #[test]
    fn new_sketch_is_empty() {
        let mut sketch = Sketch::new();
        assert_eq!(sketch.num_non_zero_registers(), 0);
        assert!(sketch.estimate().abs() < 1e-6);
    }

    #[test]
    fn default_matches_new() {
        let mut sketch = Sketch::default();
        assert_eq!(sketch.num_non_zero_registers(), 0);
        assert!(sketch.estimate().abs() < 1e-6);
    }

    #[test]
    fn empty_sketch_serializes_to_known_dense_layout() {
        let sketch = Sketch::new();
        let bytes = sketch.to_bytes();
        assert_eq!(bytes.len(), 1031);
        assert_eq!(bytes[0], 0x01);
        assert!(bytes[1..].iter().all(|&b| b == 0));
    }
}

mod basic_operations {
    use super::*;

    #[test]
    fn add_rejects_short_hashed_value() {
        let mut sketch = Sketch::new();
        let err = sketch.add(&[0u8; 9]).unwrap_err();
        assert!(matches!(err, hll_sketch::SketchError::InvalidArgument { .. }));
    }

    #[test]
    fn add_accepts_minimum_length() {
        let mut sketch = Sketch::new();
        assert!(sketch.add(&[0u8; 10]).is_ok());
    }

    #[test]
    fn repeated_add_of_same_item_does_not_inflate_count() {
        let mut sketch = Sketch::new();
        for _ in 0..100 {
            sketch.add(&hash::hash_bytes(b"same-item")).unwrap();
        }
        assert_eq!(sketch.num_non_zero_registers(), 1);
    }

    #[test]
    fn distinct_items_increase_register_occupancy() {
        let mut sketch = Sketch::new();
        add_n(&mut sketch, 50);
        assert!(sketch.num_non_zero_registers() > 0);
    }
}

mod accuracy {
    use super::*;

    fn relative_error(estimate: f64, actual: f64) -> f64 {
        (estimate - actual).abs() / actual
    }

    #[test]
    fn estimate_within_bound_at_1000() {
        let mut sketch = Sketch::new();
        add_n_random(&mut sketch, 1_000);
        let est = sketch.estimate();
        assert!(relative_error(est, 1_000.0) < 0.05, "got {est}");
    }

    #[test]
    fn estimate_within_bound_at_10_000() {
        let mut sketch = Sketch::new();
        add_n_random(&mut sketch, 10_000);
        let est = sketch.estimate();
        assert!(relative_error(est, 10_000.0) < 0.05, "got {est}");
    }

    #[test]
    fn estimate_within_bound_at_100_000() {
        let mut sketch = Sketch::new();
        add_n_random(&mut sketch, 100_000);
        let est = sketch.estimate();
        assert!(relative_error(est, 100_000.0) < 0.05, "got {est}");
    }
}

mod merge {
    use super::*;

    #[test]
    fn fold_with_empty_is_identity() {
        let mut sketch = Sketch::new();
        add_n(&mut sketch, 500);
        let before = sketch.estimate();
        let mut folded = sketch.fold(Sketch::new()).unwrap();
        assert_eq!(folded.estimate(), before);
    }

    #[test]
    fn fold_disjoint_sets_approaches_union() {
        let mut a = Sketch::new();
        add_n(&mut a, 5_000);
        let mut b = Sketch::new();
        for i in 5_000..10_000u64 {
            b.add(&hash::hash_item(&i)).unwrap();
        }
        let mut merged = a.fold(b).unwrap();
        let est = merged.estimate();
        assert!((est - 10_000.0).abs() / 10_000.0 < 0.05, "got {est}");
    }

    #[test]
    fn fold_idempotent_on_identical_sketches() {
        let mut a = Sketch::new();
        add_n(&mut a, 1_000);
        let b = a.clone();
        let before = a.clone().estimate();
        let mut merged = a.fold(b).unwrap();
        assert!((merged.estimate() - before).abs() < 1e-6);
    }

    #[test]
    fn fold_is_commutative_in_estimate() {
        let mut a = Sketch::new();
        add_n(&mut a, 1_000);
        let mut b = Sketch::new();
        for i in 1_000..2_000u64 {
            b.add(&hash::hash_item(&i)).unwrap();
        }
        let mut ab = a.clone().fold(b.clone()).unwrap();
        let mut ba = b.fold(a).unwrap();
        assert!((ab.estimate() - ba.estimate()).abs() < 1e-6);
    }
}

mod serialization {
    use super::*;

    #[test]
    fn sparse_then_dense_round_trip() {
        let mut sparse = Sketch::new();
        add_n(&mut sparse, 10);
        let sparse_bytes = sparse.to_bytes();
        assert!(sparse_bytes.len() < 1031);
        let mut parsed_sparse = Sketch::parse(&sparse_bytes).unwrap();
        assert_eq!(parsed_sparse.estimate(), sparse.clone().estimate());

        let mut dense = Sketch::new();
        add_n(&mut dense, 5_000);
        let dense_bytes = dense.to_bytes();
        assert_eq!(dense_bytes.len(), 1031);
        let mut parsed_dense = Sketch::parse(&dense_bytes).unwrap();
        assert_eq!(parsed_dense.estimate(), dense.clone().estimate());
    }

    #[test]
    fn parse_rejects_truncated_buffer() {
        assert!(Sketch::parse(&[0x01, 0x00]).is_err());
    }

    #[test]
    fn parse_rejects_unknown_version_byte() {
        let mut bytes = vec![0xFFu8];
        bytes.extend(std::iter::repeat(0u8).take(1024));
        assert!(Sketch::parse(&bytes).is_err());
    }
}

mod legacy_format {
    use super::*;

    #[test]
    fn parses_legacy_v0_dense_buffer() {
        let mut bytes = vec![0u8; 3 + 1024];
        bytes[0] = 0x00;
        bytes[1] = 0; // registerOffset
        bytes[3] = 0x30; // bucket 0 upper nibble = 3
        let mut parsed = Sketch::parse(&bytes).unwrap();
        assert_eq!(parsed.num_non_zero_registers(), 1);
        assert!(parsed.estimate() > 0.0);
    }

    #[test]
    fn legacy_sketch_reserializes_as_current_version() {
        let mut bytes = vec![0u8; 3 + 1024];
        bytes[0] = 0x00;
        let parsed = Sketch::parse(&bytes).unwrap();
        let reserialized = parsed.to_bytes();
        assert_eq!(reserialized[0], 0x01);
    }
}

mod edge_cases {
    use super::*;

    #[test]
    fn large_cardinality_estimate_within_bound() {
        let mut sketch = Sketch::new();
        add_n(&mut sketch, 200_000);
        let est = sketch.estimate();
        assert!((est - 200_000.0).abs() / 200_000.0 < 0.1, "got {est}");
    }

    #[test]
    fn byte_string_items_work() {
        let mut sketch = Sketch::new();
        for s in ["alpha", "beta", "gamma", "delta"] {
            sketch.add(&hash::hash_bytes(s.as_bytes())).unwrap();
        }
        assert_eq!(sketch.num_non_zero_registers(), 4);
    }

    #[test]
    fn overflow_register_contributes_to_estimate() {
        // A hashed value whose leading bytes are all zero drives
        // position_of_one to its maximum (64), which, after many adds to
        // the same bucket, will exceed any reasonable registerOffset and
        // land in the overflow slot.
        let mut sketch = Sketch::new();
        let mut hashed = [0u8; 10];
        hashed[8] = 0x00;
        hashed[9] = 0x01; // bucket 1
        sketch.add(&hashed).unwrap();
        assert!(sketch.estimate() > 0.0);
    }
}

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn estimate_is_never_negative(n in 0u64..2_000) {
            let mut sketch = Sketch::new();
            for i in 0..n {
                sketch.add(&hash::hash_item(&i)).unwrap();
            }
            prop_assert!(sketch.estimate() >= 0.0);
        }

        #[test]
        fn fold_with_empty_is_identity_prop(n in 0u64..2_000) {
            let mut sketch = Sketch::new();
            for i in 0..n {
                sketch.add(&hash::hash_item(&i)).unwrap();
            }
            let before = sketch.estimate();
            let mut folded = sketch.fold(Sketch::new()).unwrap();
            prop_assert!((folded.estimate() - before).abs() < 1e-9);
        }

        #[test]
        fn serialize_parse_round_trip_preserves_estimate(n in 0u64..2_000) {
            let mut sketch = Sketch::new();
            for i in 0..n {
                sketch.add(&hash::hash_item(&i)).unwrap();
            }
            let before = sketch.estimate();
            let bytes = sketch.to_bytes();
            let mut parsed = Sketch::parse(&bytes).unwrap();
            prop_assert!((parsed.estimate() - before).abs() < 1e-9);
        }
    }
}
