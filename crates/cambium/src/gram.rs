//! PQ-gram values: fixed-size structural fingerprints of tree nodes.
//!
//! A [`Gram`] records a node's neighbourhood as two ordered label
//! sequences: the `stem` holds the labels of the *p* nearest ancestors
//! (most recent first) and the `base` holds the labels of the node
//! itself and its following siblings, truncated or padded to *q*.
//! Positions that fall outside the tree are `None`.

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::hash::{Hash, Hasher};

/// Short inline sequence of optional labels, as stored in gram stems
/// and bases.
pub type LabelSeq<L> = SmallVec<[Option<L>; 4]>;

/// A pq-gram: `p` ancestor labels plus `q` sibling-window labels.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Gram<L> {
    pub(crate) stem: LabelSeq<L>,
    pub(crate) base: LabelSeq<L>,
}

impl<L> Gram<L> {
    /// Create a gram from its stem and base sequences.
    pub fn new(
        stem: impl IntoIterator<Item = Option<L>>,
        base: impl IntoIterator<Item = Option<L>>,
    ) -> Self {
        Self {
            stem: stem.into_iter().collect(),
            base: base.into_iter().collect(),
        }
    }

    /// Ancestor labels, nearest first.
    #[inline]
    #[must_use]
    pub fn stem(&self) -> &[Option<L>] {
        &self.stem
    }

    /// The node's own label followed by its sibling window.
    #[inline]
    #[must_use]
    pub fn base(&self) -> &[Option<L>] {
        &self.base
    }
}

/// The hash of a gram is the hash of `stem ++ base` as one sequence:
/// elements are fed to the hasher in order with no per-sequence length
/// prefix, so the partition between stem and base does not perturb it.
impl<L: Hash> Hash for Gram<L> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for label in self.stem.iter().chain(self.base.iter()) {
            label.hash(state);
        }
    }
}

/// The first `n` elements of `labels` extended with `None` on the
/// right: truncates when `labels` is longer than `n`, pads when it is
/// shorter.
#[must_use]
pub fn pad_to_size<L: Clone>(n: usize, labels: &[Option<L>]) -> LabelSeq<L> {
    labels
        .iter()
        .cloned()
        .chain(std::iter::repeat(None))
        .take(n)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn pad_truncates_and_pads() {
        let labels = [Some('a'), Some('b'), Some('c')];
        assert_eq!(pad_to_size(2, &labels).as_slice(), &[Some('a'), Some('b')]);
        assert_eq!(
            pad_to_size(5, &labels).as_slice(),
            &[Some('a'), Some('b'), Some('c'), None, None]
        );
        assert_eq!(pad_to_size(0, &labels).as_slice(), &[] as &[Option<char>]);
    }

    #[test]
    fn hash_ignores_stem_base_partition() {
        let left = Gram::new([Some('a')], [Some('b'), None]);
        let right = Gram::new([Some('a'), Some('b')], [None]);
        assert_ne!(left, right);
        assert_eq!(hash_of(&left), hash_of(&right));
    }

    #[test]
    fn hash_distinguishes_labels() {
        let left = Gram::new([Some('a')], [Some('b')]);
        let right = Gram::new([Some('a')], [Some('c')]);
        assert_ne!(hash_of(&left), hash_of(&right));
    }

    #[test]
    fn equal_grams_hash_equal() {
        let gram = Gram::new([None, Some('x')], [Some('y'), None, None]);
        assert_eq!(hash_of(&gram), hash_of(&gram.clone()));
    }
}
