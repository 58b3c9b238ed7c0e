use super::*;
use crate::error::AlignmentError;
use crate::library::SimilarityLibrary;
use crate::matching::{FeatureMatcher, MatchParams};
use crate::model::{FeatureKey, Sample, SampleBuilder, SampleId, Tolerance};

fn samples(labels: &[&str]) -> Vec<Sample> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            SampleBuilder::new(i, *label)
                .add_feature(1, 100.0 + i as f64 * 0.001, 5.0, 1000.0)
                .build()
        })
        .collect()
}

/// A and B much more alike than either is to C.
fn abc_library() -> SimilarityLibrary {
    SimilarityLibrary::from_matrix(vec![
        vec![0.0, 0.9, 0.1],
        vec![0.9, 0.0, 0.2],
        vec![0.1, 0.2, 0.0],
    ])
    .unwrap()
}

fn driver() -> MergeDriver<'static> {
    MergeDriver::new(FeatureMatcher::new(MatchParams::new(Tolerance::absolute(0.02, 0.2))))
}

#[test]
fn test_distance_matrix_is_normalised() {
    let d = distance_matrix(&abc_library(), 3);
    assert_eq!(d[0][0], 0.0);
    assert_eq!(d[0][1], 0.0);
    assert!((d[0][2] - (1.0 - 0.1 / 0.9)).abs() < 1e-12);
    assert!((d[2][1] - (1.0 - 0.2 / 0.9)).abs() < 1e-12);
}

#[test]
fn test_distance_matrix_without_scores() {
    let d = distance_matrix(&SimilarityLibrary::new(2), 2);
    assert_eq!(d, vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
}

#[test]
fn test_similar_pair_merges_first() {
    let samples = samples(&["A", "B", "C"]);
    let tree = DendrogramBuilder::new(&abc_library()).build(&samples).unwrap();

    let merges: Vec<&MergeNode> = tree.merges().collect();
    assert_eq!(merges.len(), 2);
    assert_eq!(merges[0].name, "cluster#1");
    assert_eq!(tree.leaf_samples(merges[0].id), vec![0, 1]);

    let root = tree.node(tree.root().unwrap()).unwrap();
    assert_eq!(root.name, "cluster#2");
    assert_eq!(tree.leaf_samples(root.id).len(), 3);
    assert_eq!(tree.node(merges[0].id).unwrap().parent, Some(root.id));
    // complete linkage: the farther of A and B decides
    assert!((root.distance.unwrap() - (1.0 - 0.1 / 0.9)).abs() < 1e-12);
    assert_eq!(tree.height(root.id), 2);
}

#[test]
fn test_complete_linkage_uses_worst_member() {
    // D is close to B but far from A; single linkage would join D next
    let library = SimilarityLibrary::from_matrix(vec![
        vec![0.0, 1.0, 0.5, 0.0],
        vec![1.0, 0.0, 0.5, 0.9],
        vec![0.5, 0.5, 0.0, 0.1],
        vec![0.0, 0.9, 0.1, 0.0],
    ])
    .unwrap();
    let samples = samples(&["A", "B", "C", "D"]);
    let tree = DendrogramBuilder::new(&library).build(&samples).unwrap();

    let merges: Vec<&MergeNode> = tree.merges().collect();
    assert_eq!(tree.leaf_samples(merges[0].id), vec![0, 1]);
    let mut second = tree.leaf_samples(merges[1].id);
    second.sort_unstable();
    assert_eq!(second, vec![0, 1, 2]);
}

#[test]
fn test_render() {
    let samples = samples(&["A", "B", "C"]);
    let tree = DendrogramBuilder::new(&abc_library()).build(&samples).unwrap();
    assert_eq!(
        tree.render(),
        "cluster#2 distance: 0.889\n  C (leaf)\n  cluster#1 distance: 0.000\n    A (leaf)\n    B (leaf)\n"
    );
}

#[test]
fn test_single_sample_is_a_leaf() {
    let samples = samples(&["only"]);
    let library = SimilarityLibrary::new(1);
    let tree = DendrogramBuilder::new(&library).build(&samples).unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.merges().count(), 0);
    assert_eq!(tree.render(), "only (leaf)\n");

    let list = driver().run(&tree, &samples).unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list.label(), "only");
}

#[test]
fn test_library_must_cover_samples() {
    let samples = samples(&["A", "B"]);
    let library = SimilarityLibrary::new(3);
    assert!(matches!(
        DendrogramBuilder::new(&library).build(&samples),
        Err(AlignmentError::LibraryMismatch { expected: 2, found: 3 })
    ));
}

#[test]
fn test_empty_input() {
    let library = SimilarityLibrary::new(0);
    let tree = DendrogramBuilder::new(&library).build(&[]).unwrap();
    assert!(tree.is_empty());
    assert!(tree.root().is_none());
    assert!(driver().run(&tree, &[]).unwrap().is_empty());
}

#[test]
fn test_driver_aligns_all_samples() {
    let samples = samples(&["A", "B", "C"]);
    let tree = DendrogramBuilder::new(&abc_library()).build(&samples).unwrap();

    for parallel in [false, true] {
        let list = driver().with_parallel(parallel).run(&tree, &samples).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.rows()[0].len(), 3);
        assert_eq!(list.label(), "cluster#2");
        assert!(list.validate().is_ok());
    }
}

#[test]
fn test_internal_children_merge_before_leaves() {
    let a = SampleBuilder::new(0, "A").add_feature(1, 100.0, 5.0, 1.0).build();
    let b = SampleBuilder::new(1, "B").add_feature(1, 100.0, 5.0, 1.0).build();
    let c = SampleBuilder::new(2, "C")
        .add_feature(1, 300.0, 5.0, 1.0)
        .add_feature(2, 100.0, 5.0, 1.0)
        .build();
    let samples = vec![a, b, c];

    let mut tree = MergeTree::new();
    let la = tree.add_leaf("A", 0);
    let lb = tree.add_leaf("B", 1);
    let lc = tree.add_leaf("C", 2);
    let ab = tree.add_internal("ab", 0.1, &[la, lb]);
    let root = tree.add_internal("root", 0.5, &[lc, ab]);
    tree.set_root(root);

    assert_eq!(MergeDriver::merge_order(&tree, root), vec![ab, lc]);

    let list = driver().run(&tree, &samples).unwrap();
    let key = |sample, index| FeatureKey {
        sample: SampleId(sample),
        index,
    };
    assert_eq!(
        list.membership(),
        vec![vec![key(0, 0), key(1, 0), key(2, 1)], vec![key(2, 0)]]
    );
}

#[test]
fn test_empty_sample_yields_empty_leaf() {
    let a = SampleBuilder::new(0, "A").add_feature(1, 100.0, 5.0, 1.0).build();
    let empty = SampleBuilder::new(1, "empty").build();
    let samples = vec![a, empty];
    let tree = DendrogramBuilder::new(&SimilarityLibrary::new(2))
        .build(&samples)
        .unwrap();

    let list = driver().run(&tree, &samples).unwrap();
    assert_eq!(list.len(), 1);
}

#[test]
fn test_unknown_leaf() {
    let samples = samples(&["A"]);
    let mut tree = MergeTree::new();
    let leaf = tree.add_leaf("ghost", 4);
    tree.set_root(leaf);
    assert!(matches!(
        driver().run(&tree, &samples),
        Err(AlignmentError::UnknownLeaf(name)) if name == "ghost"
    ));
}

#[test]
fn test_unknown_child_is_a_malformed_tree() {
    let samples = samples(&["A"]);
    let mut tree = MergeTree::new();
    let a = tree.add_leaf("A", 0);
    let root = tree.add_internal("root", 0.1, &[a, 7]);
    tree.set_root(root);

    assert_eq!(tree.heights(), vec![0, 1]);
    assert!(matches!(tree.validate(), Err(AlignmentError::MalformedTree(_))));
    assert!(matches!(
        driver().run(&tree, &samples),
        Err(AlignmentError::MalformedTree(_))
    ));
}

#[test]
fn test_shared_or_detached_nodes_are_rejected() {
    let samples = samples(&["A", "B", "C"]);

    // B under two parents
    let mut tree = MergeTree::new();
    let a = tree.add_leaf("A", 0);
    let b = tree.add_leaf("B", 1);
    let c = tree.add_leaf("C", 2);
    let ab = tree.add_internal("ab", 0.1, &[a, b]);
    let bc = tree.add_internal("bc", 0.2, &[b, c]);
    let root = tree.add_internal("root", 0.5, &[ab, bc]);
    tree.set_root(root);
    assert!(matches!(
        driver().run(&tree, &samples),
        Err(AlignmentError::MalformedTree(_))
    ));

    // C never joined
    let mut tree = MergeTree::new();
    let a = tree.add_leaf("A", 0);
    let b = tree.add_leaf("B", 1);
    tree.add_leaf("C", 2);
    let root = tree.add_internal("ab", 0.1, &[a, b]);
    tree.set_root(root);
    assert!(matches!(
        driver().run(&tree, &samples),
        Err(AlignmentError::MalformedTree(_))
    ));
}

#[test]
fn test_built_trees_validate() {
    let samples = samples(&["A", "B", "C"]);
    let tree = DendrogramBuilder::new(&abc_library()).build(&samples).unwrap();
    assert!(tree.validate().is_ok());
    assert!(MergeTree::new().validate().is_ok());
}
