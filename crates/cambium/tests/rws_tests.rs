//! End-to-end scenarios for the matching driver over decorated terms.

use cambium::{
    Diff, DiffParams, DiffStats, Featured, Patch, Tree, feature_vector_decorator, rws,
};

const PARAMS: DiffParams = DiffParams { p: 2, q: 2, d: 4 };

fn own_label(tree: &Tree<char>) -> char {
    *tree.annotation()
}

fn decorate(labels: &[char]) -> Vec<Tree<Featured<char>>> {
    labels
        .iter()
        .map(|&label| feature_vector_decorator(Tree::leaf(label), own_label, PARAMS))
        .collect()
}

/// Align exactly when the root labels agree.
fn by_label(old: &Tree<Featured<char>>, new: &Tree<Featured<char>>) -> Option<Diff<char>> {
    (old.annotation().annotation == new.annotation().annotation).then(|| Diff::Aligned {
        old: old.annotation().clone(),
        new: new.annotation().clone(),
        children: Vec::new(),
    })
}

/// The labels of aligned old sides, in output order.
fn matched_old_labels(diffs: &[Diff<char>]) -> Vec<char> {
    diffs
        .iter()
        .filter_map(|diff| match diff {
            Diff::Aligned { old, .. } => Some(old.annotation),
            Diff::Patch(_) => None,
        })
        .collect()
}

fn patch_label(patch: &Patch<Tree<Featured<char>>>) -> char {
    match patch {
        Patch::Insert(term) | Patch::Delete(term) | Patch::Replace(term, _) => {
            term.annotation().annotation
        }
    }
}

/// Matched old indices must be non-decreasing, given unique old labels.
fn assert_monotone(diffs: &[Diff<char>], old_labels: &[char]) {
    let position = |label: char| {
        old_labels
            .iter()
            .position(|&l| l == label)
            .unwrap_or_else(|| panic!("label {label} not on the old side"))
    };
    let indices: Vec<usize> = matched_old_labels(diffs).into_iter().map(position).collect();
    assert!(
        indices.windows(2).all(|w| w[0] <= w[1]),
        "matched old indices decreased: {indices:?}"
    );
}

#[test]
fn identical_singletons_match() {
    let diffs = rws(by_label, decorate(&['A']), decorate(&['A']));
    assert_eq!(matched_old_labels(&diffs), vec!['A']);
    assert_eq!(diffs.len(), 1);
}

#[test]
fn identical_pairs_match_in_order() {
    let diffs = rws(by_label, decorate(&['A', 'B']), decorate(&['A', 'B']));
    assert_eq!(matched_old_labels(&diffs), vec!['A', 'B']);
    let stats = DiffStats::of(&diffs);
    assert_eq!(stats.matched, 2);
    assert_eq!(stats.insertions, 0);
    assert_eq!(stats.deletions, 0);
}

#[test]
fn swapped_pair_stays_monotone_and_conserves_terms() {
    let old = ['A', 'B'];
    let diffs = rws(by_label, decorate(&old), decorate(&['B', 'A']));
    assert_monotone(&diffs, &old);
    let stats = DiffStats::of(&diffs);
    assert_eq!(stats.deletions + stats.matched, 2);
    assert_eq!(stats.insertions + stats.matched, 2);
}

#[test]
fn dropped_middle_term_becomes_a_delete_between_matches() {
    let diffs = rws(by_label, decorate(&['A', 'B', 'C']), decorate(&['A', 'C']));
    assert_eq!(diffs.len(), 3);
    assert_eq!(matched_old_labels(&diffs), vec!['A', 'C']);
    match &diffs[1] {
        Diff::Patch(patch) => {
            assert!(patch.is_delete());
            assert_eq!(patch_label(patch), 'B');
        }
        Diff::Aligned { .. } => panic!("expected Delete(B) between the matches"),
    }
}

#[test]
fn empty_old_side_inserts_everything_in_order() {
    let diffs = rws(by_label, Vec::new(), decorate(&['X', 'Y', 'Z']));
    let labels: Vec<char> = diffs
        .iter()
        .map(|diff| {
            let patch = diff.patch().expect("all entries should be patches");
            assert!(patch.is_insert());
            patch_label(patch)
        })
        .collect();
    assert_eq!(labels, vec!['X', 'Y', 'Z']);
}

#[test]
fn rejected_singleton_pair_inserts_then_deletes() {
    let diffs = rws(by_label, decorate(&['A']), decorate(&['B']));
    assert_eq!(diffs.len(), 2);
    assert!(diffs[0].patch().is_some_and(Patch::is_insert));
    assert!(diffs[1].patch().is_some_and(Patch::is_delete));
    assert_eq!(patch_label(diffs[0].patch().expect("insert")), 'B');
    assert_eq!(patch_label(diffs[1].patch().expect("delete")), 'A');
}

#[test]
fn wildly_different_lengths_conserve_terms() {
    let old = ['A'];
    let new = ['A', 'Q', 'R', 'S', 'T', 'U', 'V', 'W'];
    let diffs = rws(by_label, decorate(&old), decorate(&new));
    let stats = DiffStats::of(&diffs);
    assert_eq!(stats.matched + stats.deletions, old.len());
    assert_eq!(stats.matched + stats.insertions, new.len());
    assert_monotone(&diffs, &old);
}

#[test]
fn degenerate_gram_parameters_still_produce_a_valid_diff() {
    let params = DiffParams { p: 0, q: 0, d: 4 };
    let decorate_with = |labels: &[char]| -> Vec<Tree<Featured<char>>> {
        labels
            .iter()
            .map(|&label| feature_vector_decorator(Tree::leaf(label), own_label, params))
            .collect()
    };
    // All grams collapse to the empty gram, so every vector is equal;
    // the comparator still separates the labels.
    let diffs = rws(by_label, decorate_with(&['A']), decorate_with(&['B']));
    let stats = DiffStats::of(&diffs);
    assert_eq!(stats.matched, 0);
    assert_eq!(stats.insertions, 1);
    assert_eq!(stats.deletions, 1);

    let diffs = rws(by_label, decorate_with(&['A']), decorate_with(&['A']));
    assert_eq!(DiffStats::of(&diffs).matched, 1);
}

#[test]
fn nested_subtrees_align_on_structure() {
    let old = vec![
        Tree::new('f', vec![Tree::leaf('x'), Tree::leaf('y')]),
        Tree::new('g', vec![Tree::leaf('z')]),
    ];
    let new = vec![
        Tree::new('f', vec![Tree::leaf('x'), Tree::leaf('y')]),
        Tree::new('h', vec![Tree::leaf('z')]),
    ];
    let decorate_trees = |trees: Vec<Tree<char>>| -> Vec<Tree<Featured<char>>> {
        trees
            .into_iter()
            .map(|t| feature_vector_decorator(t, own_label, PARAMS))
            .collect()
    };
    let diffs = rws(by_label, decorate_trees(old), decorate_trees(new));
    let stats = DiffStats::of(&diffs);
    assert_eq!(stats.matched, 1);
    assert_eq!(stats.insertions, 1);
    assert_eq!(stats.deletions, 1);
    assert_eq!(matched_old_labels(&diffs), vec!['f']);
}
