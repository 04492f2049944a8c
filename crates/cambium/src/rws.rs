//! # Random-Walk Similarity Matching
//!
//! This module aligns two ordered lists of feature-decorated subtrees
//! and emits a tree-structured edit script.
//!
//! ## Overview
//!
//! The driver walks the new-side terms in order and, for each one,
//! asks a k-d tree over the old-side feature vectors for the nearest
//! old term. A candidate is committed only when all three checks pass:
//!
//! 1. the old term has not been matched already,
//! 2. its old-side index is not smaller than the largest index matched
//!    so far (matches must respect old-side sibling order), and
//! 3. the caller-supplied [`Comparator`] accepts the pair and produces
//!    their sub-diff.
//!
//! Anything on the new side that fails the checks becomes an
//! [`Patch::Insert`]; old terms left over at the end become
//! [`Patch::Delete`]s, merged into the output in old-index order.
//!
//! The monotonicity constraint is what makes the result a valid edit
//! script for ordered trees: without it, matches could cross and the
//! output would not render as a coherent alignment. The price is that
//! some similarity matches are rejected.
//!
//! ## Complexity
//!
//! Building the index is `O(n log n)`, each query `O(log n)` expected,
//! and membership bookkeeping is `O(1)` per term via a hash map keyed
//! by old index, for a log-linear total.

use crate::decorate::Featured;
use crate::feature::FeatureVector;
use crate::kdtree::KdTree;
use crate::tree::Tree;
use hashbrown::HashMap;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A single unmatched-term edit.
///
/// `Replace` belongs to the vocabulary consumed by renderers but is
/// never produced by [`rws`]: descending into matched pairs is the
/// comparator's job.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Patch<T> {
    /// A new-side term with no counterpart on the old side.
    Insert(T),
    /// An old-side term with no counterpart on the new side.
    Delete(T),
    /// A term substituted wholesale.
    Replace(T, T),
}

impl<T> Patch<T> {
    /// Check whether this patch inserts.
    #[must_use]
    pub fn is_insert(&self) -> bool {
        matches!(self, Self::Insert(_))
    }

    /// Check whether this patch deletes.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete(_))
    }
}

/// A node of the edit script: either an unmatched-term patch or an
/// aligned pair with the diffs of its children.
///
/// Aligned nodes are produced by the [`Comparator`]; the driver only
/// wraps terms it could not align.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Diff<A> {
    /// An unmatched term.
    Patch(Patch<Tree<Featured<A>>>),
    /// Two aligned subtrees and the edit scripts of their children.
    Aligned {
        old: Featured<A>,
        new: Featured<A>,
        children: Vec<Diff<A>>,
    },
}

impl<A> Diff<A> {
    /// Check whether this is an unmatched-term patch.
    #[must_use]
    pub fn is_patch(&self) -> bool {
        matches!(self, Self::Patch(_))
    }

    /// The patch held by this node, if any.
    #[must_use]
    pub fn patch(&self) -> Option<&Patch<Tree<Featured<A>>>> {
        match self {
            Self::Patch(patch) => Some(patch),
            Self::Aligned { .. } => None,
        }
    }
}

/// Counts over a diff sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct DiffStats {
    /// Aligned pairs.
    pub matched: usize,
    /// `Insert` patches.
    pub insertions: usize,
    /// `Delete` patches.
    pub deletions: usize,
    /// `Replace` patches.
    pub replacements: usize,
}

impl DiffStats {
    /// Tally the top-level entries of a diff sequence.
    #[must_use]
    pub fn of<A>(diffs: &[Diff<A>]) -> Self {
        let mut stats = Self::default();
        for diff in diffs {
            match diff {
                Diff::Aligned { .. } => stats.matched += 1,
                Diff::Patch(Patch::Insert(_)) => stats.insertions += 1,
                Diff::Patch(Patch::Delete(_)) => stats.deletions += 1,
                Diff::Patch(Patch::Replace(..)) => stats.replacements += 1,
            }
        }
        stats
    }

    /// Total number of entries tallied.
    #[must_use]
    pub fn total(&self) -> usize {
        self.matched + self.insertions + self.deletions + self.replacements
    }
}

/// Decides whether two subtrees align and, if so, produces their diff.
///
/// Returning `None` means "too different to align here"; returning a
/// diff commits the pair. The driver trusts the verdict either way.
pub trait Comparator<A> {
    fn compare(
        &mut self,
        old: &Tree<Featured<A>>,
        new: &Tree<Featured<A>>,
    ) -> Option<Diff<A>>;
}

impl<A, F> Comparator<A> for F
where
    F: FnMut(&Tree<Featured<A>>, &Tree<Featured<A>>) -> Option<Diff<A>>,
{
    fn compare(
        &mut self,
        old: &Tree<Featured<A>>,
        new: &Tree<Featured<A>>,
    ) -> Option<Diff<A>> {
        self(old, new)
    }
}

/// An old-side term awaiting a match.
#[derive(Debug)]
struct UnmappedTerm<A> {
    index: usize,
    feature: FeatureVector,
    term: Tree<Featured<A>>,
}

/// Insert patches carry this sentinel instead of an old-side index.
const UNMATCHED: isize = -1;

/// Align `old` against `new` and emit the edit script.
///
/// Every input term appears in the output exactly once: as the old
/// side of an aligned pair, as an `Insert`, or as a `Delete`. The old
/// indices of aligned pairs form a non-decreasing sequence, and
/// deletes land in old-index order relative to their neighbours.
///
/// The function is total; a misbehaving comparator yields a wrong but
/// well-formed script.
#[must_use]
pub fn rws<A, C>(
    mut compare: C,
    old: Vec<Tree<Featured<A>>>,
    new: Vec<Tree<Featured<A>>>,
) -> Vec<Diff<A>>
where
    C: Comparator<A>,
{
    if old.is_empty() {
        return new
            .into_iter()
            .map(|term| Diff::Patch(Patch::Insert(term)))
            .collect();
    }
    if new.is_empty() {
        return old
            .into_iter()
            .map(|term| Diff::Patch(Patch::Delete(term)))
            .collect();
    }

    let terms: Vec<UnmappedTerm<A>> = old
        .into_iter()
        .enumerate()
        .map(|(index, term)| UnmappedTerm {
            index,
            feature: term.annotation().feature.clone(),
            term,
        })
        .collect();
    let index = KdTree::build(terms.iter().map(|t| t.feature.clone()).collect());
    let mut unmapped: HashMap<usize, UnmappedTerm<A>, ahash::RandomState> =
        terms.into_iter().map(|t| (t.index, t)).collect();

    let mut previous = UNMATCHED;
    let mut walked: Vec<(isize, Diff<A>)> = Vec::with_capacity(new.len());

    for term in new {
        let committed = index
            .nearest(&term.annotation().feature)
            .and_then(|candidate| {
                if (candidate as isize) < previous {
                    return None;
                }
                let unmatched = unmapped.get(&candidate)?;
                compare
                    .compare(&unmatched.term, &term)
                    .map(|diff| (candidate, diff))
            });
        match committed {
            Some((matched, diff)) => {
                previous = matched as isize;
                unmapped.remove(&matched);
                walked.push((matched as isize, diff));
            }
            None => walked.push((UNMATCHED, Diff::Patch(Patch::Insert(term)))),
        }
    }

    let mut remaining: Vec<UnmappedTerm<A>> = unmapped.into_values().collect();
    remaining.sort_unstable_by_key(|t| t.index);
    merge_deletions(walked, remaining)
}

/// Weave the leftover old terms into the walk output: each deletion
/// goes immediately before the first entry whose old index exceeds
/// its own, which keeps matched indices and deletions in ascending
/// old-index order while inserts stay where the walk put them.
fn merge_deletions<A>(
    walked: Vec<(isize, Diff<A>)>,
    remaining: Vec<UnmappedTerm<A>>,
) -> Vec<Diff<A>> {
    let mut output = Vec::with_capacity(walked.len() + remaining.len());
    let mut deletions = remaining.into_iter().peekable();
    for (index, diff) in walked {
        while let Some(leftover) = deletions.next_if(|t| (t.index as isize) < index) {
            output.push(Diff::Patch(Patch::Delete(leftover.term)));
        }
        output.push(diff);
    }
    output.extend(
        deletions.map(|leftover| Diff::Patch(Patch::Delete(leftover.term))),
    );
    output
}
