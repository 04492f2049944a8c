//! # Decoration Pipeline
//!
//! This module annotates trees, stage by stage, until every node
//! carries the feature vector of its subtree.
//!
//! ## Overview
//!
//! The pipeline has three stages, each consuming a tree and producing
//! a new one with a richer annotation type:
//!
//! 1. [`label_decorator`] computes a label for every node from its own
//!    annotation and the shape of its children.
//! 2. [`pq_gram_decorator`] replaces each label with a [`Gram`]: the
//!    labels of the `p` nearest ancestors plus a `q`-wide window over
//!    the node and its following siblings.
//! 3. [`feature_vector_decorator`] composes both stages and folds each
//!    subtree's grams into a feature vector, bottom-up.
//!
//! [`pq_grams`] runs the first two stages over a borrowed tree and
//! collects the resulting bag of grams without decorating it.

use crate::error::ParamError;
use crate::feature::{FeatureVector, gram_fingerprint, unit_vector};
use crate::gram::{Gram, LabelSeq, pad_to_size};
use crate::tree::Tree;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// Tunable parameters of the vectorization pipeline.
///
/// `p` is the stem length, `q` the base length, and `d` the feature
/// dimension. The defaults follow the values commonly used for
/// source trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct DiffParams {
    /// Number of ancestor labels in each gram's stem.
    pub p: usize,
    /// Number of sibling labels in each gram's base.
    pub q: usize,
    /// Feature-vector dimension.
    pub d: usize,
}

impl DiffParams {
    /// Validated constructor. `p` and `q` may be zero; the feature
    /// dimension must be at least one, since a zero-dimension space
    /// cannot hold unit vectors.
    pub fn new(p: usize, q: usize, d: usize) -> Result<Self, ParamError> {
        if d == 0 {
            return Err(ParamError::ZeroDimension);
        }
        Ok(Self { p, q, d })
    }
}

impl Default for DiffParams {
    fn default() -> Self {
        Self { p: 2, q: 3, d: 15 }
    }
}

/// Annotation produced by [`label_decorator`]: the computed label in
/// front of the original annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Labeled<L, A> {
    pub label: L,
    pub annotation: A,
}

/// Annotation produced by [`pq_gram_decorator`]: the label replaced by
/// the node's gram.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Grammed<L, A> {
    pub gram: Gram<L>,
    pub annotation: A,
}

/// Annotation produced by [`feature_vector_decorator`]: the subtree's
/// feature vector in front of the original annotation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Featured<A> {
    pub feature: FeatureVector,
    pub annotation: A,
}

/// Decorate every node with the label computed by `label_fn`.
///
/// The function receives each subtree by reference, so it can read the
/// node's annotation and the shape of its children. It is applied to
/// parents before their children.
#[must_use]
pub fn label_decorator<A, L, F>(tree: Tree<A>, label_fn: F) -> Tree<Labeled<L, A>>
where
    F: Fn(&Tree<A>) -> L,
{
    label_inner(tree, &label_fn)
}

fn label_inner<A, L, F>(tree: Tree<A>, label_fn: &F) -> Tree<Labeled<L, A>>
where
    F: Fn(&Tree<A>) -> L,
{
    let label = label_fn(&tree);
    let (annotation, children) = tree.into_parts();
    let children = children
        .into_iter()
        .map(|child| label_inner(child, label_fn))
        .collect();
    Tree::new(Labeled { label, annotation }, children)
}

/// Replace every label with the node's pq-gram.
///
/// Stems are assigned top-down by threading the ancestor labels; bases
/// are completed afterwards, each node receiving a `q`-wide window
/// over itself and its following siblings from its parent. The root,
/// which has no siblings, gets its own label padded to `q`.
#[must_use]
pub fn pq_gram_decorator<A, L>(tree: Tree<Labeled<L, A>>, p: usize, q: usize) -> Tree<Grammed<L, A>>
where
    L: Clone,
{
    let mut ancestors = Vec::new();
    let provisional = stem_pass(tree, p, &mut ancestors);
    let root_base = pad_to_size(q, provisional.annotation().gram.base());
    base_pass(provisional, q, root_base)
}

/// Top-down pass: stem = the `p` nearest ancestor labels; base = the
/// node's own label, provisionally.
fn stem_pass<A, L>(tree: Tree<Labeled<L, A>>, p: usize, ancestors: &mut Vec<L>) -> Tree<Grammed<L, A>>
where
    L: Clone,
{
    let (Labeled { label, annotation }, children) = tree.into_parts();
    let stem: LabelSeq<L> = ancestors
        .iter()
        .rev()
        .map(|ancestor| Some(ancestor.clone()))
        .chain(std::iter::repeat(None))
        .take(p)
        .collect();
    let gram = Gram {
        stem,
        base: std::iter::once(Some(label.clone())).collect(),
    };
    ancestors.push(label);
    let children = children
        .into_iter()
        .map(|child| stem_pass(child, p, ancestors))
        .collect();
    ancestors.pop();
    Tree::new(Grammed { gram, annotation }, children)
}

/// Bottom-up pass: assign every child its final base, a window over
/// the sibling labels starting at the child itself.
fn base_pass<A, L>(tree: Tree<Grammed<L, A>>, q: usize, base: LabelSeq<L>) -> Tree<Grammed<L, A>>
where
    L: Clone,
{
    let (Grammed { gram, annotation }, children) = tree.into_parts();
    let sibling_labels: Vec<Option<L>> = children
        .iter()
        .map(|child| child.annotation().gram.base().first().cloned().flatten())
        .collect();
    let children = children
        .into_iter()
        .enumerate()
        .map(|(i, child)| {
            let child_base = pad_to_size(q, &sibling_labels[i..]);
            base_pass(child, q, child_base)
        })
        .collect();
    Tree::new(
        Grammed {
            gram: Gram {
                stem: gram.stem,
                base,
            },
            annotation,
        },
        children,
    )
}

/// Decorate every node with its subtree's feature vector.
///
/// Runs the labeling and pq-gram stages, then folds each subtree
/// bottom-up: a node's vector is the unit vector of its own gram plus
/// the vectors of its children. This equals vectorizing the bag of all
/// grams in the subtree, computed in one pass.
#[must_use]
pub fn feature_vector_decorator<A, L, F>(
    tree: Tree<A>,
    label_fn: F,
    params: DiffParams,
) -> Tree<Featured<A>>
where
    L: Clone + Hash,
    F: Fn(&Tree<A>) -> L,
{
    let labeled = label_decorator(tree, label_fn);
    let grammed = pq_gram_decorator(labeled, params.p, params.q);
    feature_pass(grammed, params.d)
}

fn feature_pass<A, L: Hash>(tree: Tree<Grammed<L, A>>, d: usize) -> Tree<Featured<A>> {
    let (Grammed { gram, annotation }, children) = tree.into_parts();
    let children: Vec<Tree<Featured<A>>> = children
        .into_iter()
        .map(|child| feature_pass(child, d))
        .collect();
    let mut feature = unit_vector(d, gram_fingerprint(&gram));
    for child in &children {
        feature += &child.annotation().feature;
    }
    Tree::new(Featured { feature, annotation }, children)
}

/// Parallel variant of [`feature_vector_decorator`].
///
/// Sibling subtrees are vectorized on the rayon thread pool. Each
/// node's sum still runs sequentially in child order, so the output is
/// bitwise identical to the sequential decorator.
#[cfg(feature = "parallel")]
#[must_use]
pub fn feature_vector_decorator_par<A, L, F>(
    tree: Tree<A>,
    label_fn: F,
    params: DiffParams,
) -> Tree<Featured<A>>
where
    A: Send,
    L: Clone + Hash + Send,
    F: Fn(&Tree<A>) -> L,
{
    let labeled = label_decorator(tree, label_fn);
    let grammed = pq_gram_decorator(labeled, params.p, params.q);
    feature_pass_par(grammed, params.d)
}

#[cfg(feature = "parallel")]
fn feature_pass_par<A, L>(tree: Tree<Grammed<L, A>>, d: usize) -> Tree<Featured<A>>
where
    A: Send,
    L: Hash + Send,
{
    let (Grammed { gram, annotation }, children) = tree.into_parts();
    let children: Vec<Tree<Featured<A>>> = children
        .into_par_iter()
        .map(|child| feature_pass_par(child, d))
        .collect();
    let mut feature = unit_vector(d, gram_fingerprint(&gram));
    for child in &children {
        feature += &child.annotation().feature;
    }
    Tree::new(Featured { feature, annotation }, children)
}

/// Collect the bag of grams summarizing `tree`, one per node.
///
/// Equivalent to labeling and gram-decorating the tree and reading off
/// every node's gram in pre-order, without consuming the input.
#[must_use]
pub fn pq_grams<A, L, F>(tree: &Tree<A>, label_fn: F, p: usize, q: usize) -> Vec<Gram<L>>
where
    L: Clone,
    F: Fn(&Tree<A>) -> L,
{
    let labeled = label_shadow(tree, &label_fn);
    let grammed = pq_gram_decorator(labeled, p, q);
    grammed
        .pre_order()
        .map(|node| node.annotation().gram.clone())
        .collect()
}

/// Same-shape tree of labels over a borrowed input.
fn label_shadow<A, L, F>(tree: &Tree<A>, label_fn: &F) -> Tree<Labeled<L, ()>>
where
    F: Fn(&Tree<A>) -> L,
{
    let label = label_fn(tree);
    let children = tree
        .children()
        .iter()
        .map(|child| label_shadow(child, label_fn))
        .collect();
    Tree::new(
        Labeled {
            label,
            annotation: (),
        },
        children,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::feature_vector;

    fn own_label(tree: &Tree<char>) -> char {
        *tree.annotation()
    }

    /// `a` with children `b` and `c`, where `c` has child `d`.
    fn sample() -> Tree<char> {
        Tree::new(
            'a',
            vec![Tree::leaf('b'), Tree::new('c', vec![Tree::leaf('d')])],
        )
    }

    fn gram_at<'t, L, A>(tree: &'t Tree<Grammed<L, A>>, path: &[usize]) -> &'t Gram<L> {
        let mut node = tree;
        for &index in path {
            node = &node.children()[index];
        }
        &node.annotation().gram
    }

    #[test]
    fn stems_hold_nearest_ancestors_first() {
        let grammed = pq_gram_decorator(label_decorator(sample(), own_label), 2, 2);
        assert_eq!(gram_at(&grammed, &[]).stem(), &[None, None]);
        assert_eq!(gram_at(&grammed, &[0]).stem(), &[Some('a'), None]);
        assert_eq!(gram_at(&grammed, &[1]).stem(), &[Some('a'), None]);
        assert_eq!(gram_at(&grammed, &[1, 0]).stem(), &[Some('c'), Some('a')]);
    }

    #[test]
    fn bases_window_over_following_siblings() {
        let grammed = pq_gram_decorator(label_decorator(sample(), own_label), 2, 2);
        assert_eq!(gram_at(&grammed, &[]).base(), &[Some('a'), None]);
        assert_eq!(gram_at(&grammed, &[0]).base(), &[Some('b'), Some('c')]);
        assert_eq!(gram_at(&grammed, &[1]).base(), &[Some('c'), None]);
        assert_eq!(gram_at(&grammed, &[1, 0]).base(), &[Some('d'), None]);
    }

    #[test]
    fn zero_p_and_q_still_decorate() {
        let grammed = pq_gram_decorator(label_decorator(sample(), own_label), 0, 0);
        for node in grammed.pre_order() {
            assert!(node.annotation().gram.stem().is_empty());
            assert!(node.annotation().gram.base().is_empty());
        }
    }

    #[test]
    fn gram_bag_has_one_gram_per_node() {
        let bag = pq_grams(&sample(), own_label, 2, 3);
        assert_eq!(bag.len(), sample().node_count());
    }

    #[test]
    fn root_feature_matches_bag_vectorization() {
        let params = DiffParams { p: 2, q: 2, d: 8 };
        let decorated = feature_vector_decorator(sample(), own_label, params);
        let bag = pq_grams(&sample(), own_label, params.p, params.q);
        let expected = feature_vector(params.d, &bag);
        assert!(decorated.annotation().feature.approx_eq(&expected, 1e-9));
    }

    #[test]
    fn decorator_is_deterministic() {
        let params = DiffParams::default();
        let first = feature_vector_decorator(sample(), own_label, params);
        let second = feature_vector_decorator(sample(), own_label, params);
        assert_eq!(
            first.annotation().feature,
            second.annotation().feature
        );
    }

    #[test]
    fn params_reject_zero_dimension() {
        assert!(DiffParams::new(2, 3, 0).is_err());
        assert!(DiffParams::new(0, 0, 1).is_ok());
    }
}
