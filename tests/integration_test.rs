//! Integration tests for multialign
//!
//! These tests drive whole alignment runs through the public API.

use multialign::dendrogram::MergeNode;
use multialign::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

/// One shared feature in three samples plus an unrelated fourth sample
fn shared_feature_samples() -> Vec<Sample> {
    vec![
        SampleBuilder::new(0, "run_a")
            .add_feature(1, 100.0, 5.0, 1.0e4)
            .build(),
        SampleBuilder::new(1, "run_b")
            .add_feature(1, 100.01, 5.1, 1.1e4)
            .build(),
        SampleBuilder::new(2, "run_c")
            .add_feature(1, 99.99, 4.9, 0.9e4)
            .build(),
        SampleBuilder::new(3, "run_d")
            .add_feature(1, 150.0, 5.0, 1.0e4)
            .build(),
    ]
}

/// Six runs over the same twenty compounds; runs 0-2 and 3-5 share a drift
fn drifting_samples() -> Vec<Sample> {
    (0..6)
        .map(|s| {
            let drift = if s < 3 { 0.0 } else { 0.3 };
            let mut builder = SampleBuilder::new(s, format!("run_{s}"));
            for c in 0..20 {
                if (c + s) % 7 == 0 {
                    continue;
                }
                let mass = 150.0 + 37.5 * c as f64 + 0.001 * s as f64;
                let rt = 2.0 + 1.5 * c as f64 + drift + 0.01 * s as f64;
                builder = builder.add_feature(c as u32, mass, rt, 1.0e5 + 1.0e3 * s as f64);
            }
            builder.build()
        })
        .collect()
}

#[test]
fn test_shared_feature_scenario() {
    let config = AlignmentConfig::new(0.02, 0.2);
    let mut pipeline =
        AlignmentPipeline::from_config(&config, shared_feature_samples(), None).unwrap();
    let rows = pipeline.align().unwrap();

    assert_eq!(rows.len(), 2);
    let shared = rows.iter().find(|r| r.len() == 3).unwrap();
    let mut samples: Vec<SampleId> = shared.samples().collect();
    samples.sort();
    assert_eq!(samples, vec![SampleId(0), SampleId(1), SampleId(2)]);

    let singleton = rows.iter().find(|r| r.len() == 1).unwrap();
    assert!(singleton.contains_sample(SampleId(3)));
    assert_eq!(singleton.mean_mass(), 150.0);
}

#[test]
fn test_full_pipeline_is_deterministic() {
    let mut config = AlignmentConfig::new(0.01, 0.5);
    config.use_group_weight = true;
    config.alpha = 0.4;
    config.filters = vec![
        FilterSpec::new(FilterKind::Size, 2.0),
        FilterSpec::new(FilterKind::FeatureRandom, 0.1),
    ];

    let run = || {
        let mut pipeline =
            AlignmentPipeline::from_config(&config, drifting_samples(), None).unwrap();
        pipeline.align().unwrap();
        let list = pipeline.result_list().unwrap();
        let positions: Vec<(u64, u64)> = list
            .iter()
            .map(|r| (r.mean_mass().to_bits(), r.mean_rt().to_bits()))
            .collect();
        (list.membership(), positions)
    };

    let first = run();
    assert!(!first.0.is_empty());
    assert_eq!(first, run());
}

#[test]
fn test_parallel_and_sequential_runs_agree() {
    let mut config = AlignmentConfig::new(0.01, 0.5);
    let membership = |config: &AlignmentConfig| {
        let mut pipeline =
            AlignmentPipeline::from_config(config, drifting_samples(), None).unwrap();
        pipeline.align().unwrap();
        pipeline.result_list().unwrap().membership()
    };

    config.parallel = true;
    let parallel = membership(&config);
    config.parallel = false;
    assert_eq!(parallel, membership(&config));
}

#[test]
fn test_every_feature_lands_in_exactly_one_row() {
    let samples = drifting_samples();
    let total: usize = samples.iter().map(Sample::len).sum();

    for method in [MethodKind::Hierarchical, MethodKind::Sequential] {
        let mut config = AlignmentConfig::new(0.01, 0.5);
        config.method = method;
        let mut pipeline =
            AlignmentPipeline::from_config(&config, samples.clone(), None).unwrap();
        let list = {
            pipeline.align().unwrap();
            pipeline.result_list().unwrap()
        };
        assert_eq!(list.feature_count(), total);
        list.validate().unwrap();

        let mut keys: Vec<FeatureKey> = list.iter().flat_map(|r| r.keys()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);
    }
}

#[test]
fn test_drifting_runs_cluster_by_drift() {
    let samples = drifting_samples();
    let params = MatchParams::new(Tolerance::absolute(0.01, 0.5));
    let library = SimilarityLibrary::from_pairwise_matching(&samples, &params).unwrap();

    // same-drift pairs match more features, and more closely
    assert!(library.score(0, 1) > library.score(0, 3));
    assert!(library.score(3, 4) > library.score(2, 5));

    let tree = DendrogramBuilder::new(&library).build(&samples).unwrap();
    let root = tree.node(tree.root().unwrap()).unwrap();
    assert_eq!(root.children.len(), 2);

    let mut halves: Vec<Vec<usize>> = root
        .children
        .iter()
        .map(|&c| {
            let mut members = tree.leaf_samples(c);
            members.sort_unstable();
            members
        })
        .collect();
    halves.sort();
    assert_eq!(halves, vec![vec![0, 1, 2], vec![3, 4, 5]]);
}

#[test]
fn test_similar_pair_merges_before_outlier() {
    let samples: Vec<Sample> = ["A", "B", "C"]
        .iter()
        .enumerate()
        .map(|(i, name)| SampleBuilder::new(i, *name).add_feature(1, 200.0, 10.0, 1.0).build())
        .collect();
    let library = SimilarityLibrary::from_matrix(vec![
        vec![0.0, 0.95, 0.1],
        vec![0.95, 0.0, 0.15],
        vec![0.1, 0.15, 0.0],
    ])
    .unwrap();

    let tree = DendrogramBuilder::new(&library).build(&samples).unwrap();
    let merges: Vec<&MergeNode> = tree.merges().collect();
    assert_eq!(merges.len(), 2);

    let first: Vec<&str> = merges[0]
        .children
        .iter()
        .map(|&c| tree.node(c).unwrap().name.as_str())
        .collect();
    assert_eq!(first, vec!["A", "B"]);

    let root = tree.node(tree.root().unwrap()).unwrap();
    assert_eq!(root.id, merges[1].id);
    assert!(root.children.contains(&merges[0].id));
    assert!(root.children.contains(&tree.find("C").unwrap()));

    // the driver folds the internal child first
    assert_eq!(MergeDriver::merge_order(&tree, root.id)[0], merges[0].id);
}

#[test]
fn test_config_file_drives_pipeline() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
method = "sequential"
mass_tolerance = 0.02
rt_tolerance = 0.2
parallel = false

[[filters]]
kind = "size"
threshold = 3
"#
    )
    .unwrap();

    let config = AlignmentConfig::from_file(file.path()).unwrap();
    let mut pipeline =
        AlignmentPipeline::from_config(&config, shared_feature_samples(), None).unwrap();
    assert_eq!(pipeline.method().kind(), MethodKind::Sequential);
    assert_eq!(pipeline.filter_labels(), vec!["size filter (>= 3 features)"]);

    let rows = pipeline.align().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].len(), 3);
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "mass_tolerance = 0.02\nrt_tolerance = 0.2\nalpha = 1.5").unwrap();

    let config = AlignmentConfig::from_file(file.path()).unwrap();
    assert!(matches!(
        AlignmentPipeline::from_config(&config, shared_feature_samples(), None),
        Err(AlignmentError::Config(ConfigError::AlphaOutOfRange(_)))
    ));
}

#[test]
fn test_empty_sample_is_absorbed() {
    let mut samples = shared_feature_samples();
    samples.push(SampleBuilder::new(4, "blank").build());

    let config = AlignmentConfig::new(0.02, 0.2);
    let mut pipeline = AlignmentPipeline::from_config(&config, samples, None).unwrap();
    let rows = pipeline.align().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().any(|r| r.len() == 3));
}
