use super::*;
use crate::error::AlignmentError;

fn two_samples() -> (Sample, Sample) {
    let a = SampleBuilder::new(0, "a")
        .add_feature(1, 100.0, 5.0, 1000.0)
        .add_feature(2, 200.0, 8.0, 500.0)
        .build();
    let b = SampleBuilder::new(1, "b")
        .add_feature(1, 100.01, 5.1, 800.0)
        .build();
    (a, b)
}

#[test]
fn test_builder_assigns_keys() {
    let (a, b) = two_samples();
    assert_eq!(a.len(), 2);
    assert_eq!(a.feature(1).unwrap().key, FeatureKey { sample: SampleId(0), index: 1 });
    assert_eq!(b.feature(0).unwrap().sample(), SampleId(1));
    assert_eq!(a.label(), "a");
}

#[test]
fn test_label_from_path() {
    assert_eq!(Sample::label_from_path("runs/std_1.csv"), "std_1");
    assert_eq!(Sample::label_from_path("plain"), "plain");
    assert_eq!(Sample::label_from_path("/data/P1/000.features.txt"), "000.features");
}

#[test]
fn test_consensus_list_from_sample() {
    let (a, _) = two_samples();
    let list = ConsensusList::from_sample(&a);
    assert_eq!(list.len(), 2);
    assert_eq!(list.label(), "a");
    assert!(list.iter().all(|row| row.len() == 1));
    assert_eq!(list.feature_count(), 2);
}

#[test]
fn test_empty_sample_gives_empty_list() {
    let empty = SampleBuilder::new(0, "empty").build();
    assert!(empty.is_empty());
    assert!(ConsensusList::from_sample(&empty).is_empty());
}

#[test]
fn test_merge_rows() {
    let (a, b) = two_samples();
    let r1 = ConsensusRow::singleton(a.features()[0].clone());
    let r2 = ConsensusRow::singleton(b.features()[0].clone());
    let merged = ConsensusRow::merge(&r1, &r2, 0).unwrap();

    assert_eq!(merged.len(), 2);
    assert!((merged.mean_mass() - 100.005).abs() < 1e-9);
    assert!((merged.mean_rt() - 5.05).abs() < 1e-9);
    assert!(merged.contains_sample(SampleId(0)));
    assert!(merged.contains_sample(SampleId(1)));
    assert_eq!(merged.pairs().count(), 1);
}

#[test]
fn test_merge_same_sample_is_invariant_violation() {
    let (a, _) = two_samples();
    let r1 = ConsensusRow::singleton(a.features()[0].clone());
    let r2 = ConsensusRow::singleton(a.features()[1].clone());
    let err = ConsensusRow::merge(&r1, &r2, 7).unwrap_err();
    match err {
        AlignmentError::InvariantViolation { row, sample } => {
            assert_eq!(row, 7);
            assert_eq!(sample, SampleId(0));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_row_stats() {
    let (a, b) = two_samples();
    let r1 = ConsensusRow::singleton(a.features()[0].clone());
    let r2 = ConsensusRow::singleton(b.features()[0].clone());
    let tol = Tolerance::absolute(0.02, 0.2);

    let single = r1.stats(&tol);
    assert_eq!(single.pair_count, 0);
    assert_eq!(single.graph_score, None);

    let merged = ConsensusRow::merge(&r1, &r2, 0).unwrap();
    let stats = merged.stats(&tol);
    assert_eq!(stats.pair_count, 1);
    // intensities 1000 vs 800 -> relative error 0.2
    assert!((stats.intensity_score.unwrap() - 0.8).abs() < 1e-9);
    // distance sqrt(0.5^2 + 0.5^2)
    let expected = 1.0 / (1.0 + (0.5f64).hypot(0.5));
    assert!((stats.graph_score.unwrap() - expected).abs() < 1e-9);

    // cached value is reused, other tolerances are recomputed
    assert_eq!(merged.stats(&tol), stats);
    let wide = Tolerance::absolute(1.0, 1.0);
    assert_eq!(merged.stats(&wide).tolerance, wide);
}

#[test]
fn test_validate_detects_duplicate_sample() {
    let (a, _) = two_samples();
    let good = ConsensusList::from_sample(&a);
    assert!(good.validate().is_ok());

    let bad_row = ConsensusRow::from_features(vec![a.features()[0].clone(), a.features()[1].clone()]);
    let bad = ConsensusList::from_rows("bad", vec![ConsensusRow::singleton(a.features()[0].clone()), bad_row]);
    assert!(matches!(
        bad.validate(),
        Err(AlignmentError::InvariantViolation { row: 1, sample: SampleId(0) })
    ));
}

#[test]
fn test_tolerance_window() {
    let tol = Tolerance::absolute(0.02, 0.2);
    assert!(tol.in_range(100.0, 0.02, 0.2));
    assert!(!tol.in_range(100.0, 0.0201, 0.0));
    assert!(!tol.in_range(100.0, 0.0, -0.2001));

    let ppm = Tolerance {
        mass: MassTolerance::Ppm(10.0),
        rt: 1.0,
    };
    assert!((ppm.mass.window(500.0) - 0.005).abs() < 1e-12);
    assert!(ppm.in_range(500.0, 0.004, 0.5));
    assert!(!ppm.in_range(500.0, 0.006, 0.5));

    let degenerate = Tolerance::absolute(0.0, 1.0);
    assert!(!degenerate.in_range(100.0, 0.0, 0.0));
}

#[test]
fn test_feature_pair_intensity_error() {
    let (a, b) = two_samples();
    let pair = FeaturePair::new(&a.features()[0], &b.features()[0]);
    assert!((pair.relative_intensity_error() - 0.2).abs() < 1e-12);
}
