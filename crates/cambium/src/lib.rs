//! # Cambium
//!
//! Structural tree diffing via random-walk similarity over pq-gram
//! feature vectors.
//!
//! ## Overview
//!
//! Given two labelled, ordered trees (typically the old and new
//! versions of a parsed source file), cambium aligns matching subtrees
//! and marks the rest as insertions or deletions. The alignment is the
//! random-walk similarity heuristic: every subtree is summarized as a
//! fixed-dimension feature vector built from its pq-grams, and new
//! subtrees are matched to their nearest old neighbours in feature
//! space, subject to old-side sibling order.
//!
//! The pipeline:
//!
//! 1. **Labeling**: every node gets a label derived from its shape.
//! 2. **PQ-grams**: each label becomes a [`Gram`]: `p` ancestor
//!    labels plus a `q`-wide sibling window.
//! 3. **Vectorization**: each subtree's gram bag is folded into a
//!    `d`-dimensional vector by hash-seeded random projection.
//! 4. **Matching**: a k-d tree over the old vectors answers
//!    nearest-neighbour queries while [`rws`] walks the new side in
//!    order, committing matches through a caller-supplied
//!    [`Comparator`] and keeping matched old indices non-decreasing.
//!
//! The matching is a heuristic: it trades optimality for log-linear
//! running time and a well-formed, order-respecting edit script.
//!
//! ## Quick Start
//!
//! ```rust
//! use cambium::{Diff, DiffParams, DiffStats, Featured, Tree, feature_vector_decorator, rws};
//!
//! // Align pairs whose root labels agree; real callers descend
//! // recursively instead of stopping at the root.
//! fn align_roots(old: &Tree<Featured<char>>, new: &Tree<Featured<char>>) -> Option<Diff<char>> {
//!     (old.annotation().annotation == new.annotation().annotation).then(|| Diff::Aligned {
//!         old: old.annotation().clone(),
//!         new: new.annotation().clone(),
//!         children: Vec::new(),
//!     })
//! }
//!
//! let old = vec![
//!     Tree::new('a', vec![Tree::leaf('b')]),
//!     Tree::leaf('c'),
//! ];
//! let new = vec![
//!     Tree::new('a', vec![Tree::leaf('b')]),
//!     Tree::leaf('d'),
//! ];
//!
//! // Decorate both sides; here the label is the node's own character.
//! let params = DiffParams::default();
//! let decorate = |terms: Vec<Tree<char>>| -> Vec<Tree<Featured<char>>> {
//!     terms
//!         .into_iter()
//!         .map(|t| feature_vector_decorator(t, |node: &Tree<char>| *node.annotation(), params))
//!         .collect()
//! };
//!
//! let diffs = rws(align_roots, decorate(old), decorate(new));
//!
//! let stats = DiffStats::of(&diffs);
//! assert_eq!(stats.matched, 1);
//! assert_eq!(stats.insertions, 1);
//! assert_eq!(stats.deletions, 1);
//! ```
//!
//! ## Modules
//!
//! - [`tree`] - The annotated ordered tree the pipeline operates on
//! - [`gram`] - PQ-gram values and padding
//! - [`decorate`] - The labeling, gram, and feature decoration stages
//! - [`feature`] - Feature vectors and the deterministic projection
//! - [`kdtree`] - The static nearest-neighbour index
//! - [`rws`] - The matching driver and edit-script types
//! - [`testing`] - Deterministic tree generation for tests and benches
//!
//! ## Cargo features
//!
//! - `serialize` - serde derives on the public value types
//! - `diagnostics` - miette diagnostics on error types
//! - `parallel` - a rayon-powered variant of the feature decorator

pub mod decorate;
pub mod error;
pub mod feature;
pub mod gram;
pub mod kdtree;
pub mod rws;
pub mod testing;
pub mod tree;

// Re-export commonly used types
pub use decorate::{
    DiffParams, Featured, Grammed, Labeled, feature_vector_decorator, label_decorator,
    pq_gram_decorator, pq_grams,
};
pub use error::ParamError;
pub use feature::{FeatureVector, feature_vector, gram_fingerprint, unit_vector};
pub use gram::{Gram, LabelSeq, pad_to_size};
pub use kdtree::KdTree;
pub use rws::{Comparator, Diff, DiffStats, Patch, rws};
pub use tree::{PreOrder, Tree};

#[cfg(feature = "parallel")]
pub use decorate::feature_vector_decorator_par;
