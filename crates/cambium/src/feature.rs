//! # Feature Vectorization
//!
//! This module turns bags of grams into fixed-dimension real vectors
//! by hash-seeded random projection.
//!
//! ## Overview
//!
//! Every gram is mapped to a unit vector drawn from a deterministic
//! pseudo-random generator seeded with the gram's fingerprint. The
//! feature vector of a bag of grams is the element-wise sum of the
//! unit vectors of its members, so structurally similar subtrees land
//! close together in feature space.
//!
//! ## Determinism
//!
//! Two generators are fixed and documented here:
//!
//! - Gram fingerprints use `std::collections::hash_map::DefaultHasher`
//!   (SipHash-1-3 with fixed keys), so equal grams fingerprint equally
//!   within a build.
//! - Unit-vector draws use a xorshift64 generator (shift triple
//!   13/7/17). Xorshift fixes the all-zero state, so a zero fingerprint
//!   is replaced with a non-zero default seed; every draw is therefore
//!   non-zero and the normalized vector always has magnitude one.
//!
//! Fixed inputs produce bitwise-identical vectors. Callers comparing
//! vectors assembled in different summation orders must still use
//! [`FeatureVector::approx_eq`], since floating-point addition is not
//! associative.

use crate::gram::Gram;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::ops::AddAssign;

/// A fixed-dimension real-valued summary of a subtree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct FeatureVector(Box<[f64]>);

impl FeatureVector {
    /// The zero vector of the given dimension.
    #[must_use]
    pub fn zeros(dimension: usize) -> Self {
        Self(vec![0.0; dimension].into_boxed_slice())
    }

    /// A vector with the given components.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Self {
        Self(values.into())
    }

    /// Number of components.
    #[inline]
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// The components as a slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Euclidean magnitude.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.0.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Squared Euclidean distance to another vector of the same
    /// dimension.
    #[must_use]
    pub fn squared_distance(&self, other: &Self) -> f64 {
        debug_assert_eq!(self.dimension(), other.dimension());
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| {
                let d = a - b;
                d * d
            })
            .sum()
    }

    /// Scale to magnitude one. A zero vector is left unchanged.
    pub fn normalize(&mut self) {
        let magnitude = self.magnitude();
        if magnitude > 0.0 {
            for v in self.0.iter_mut() {
                *v /= magnitude;
            }
        }
    }

    /// Cosine of the angle between two vectors, or `0.0` when either
    /// has zero magnitude.
    #[must_use]
    pub fn cosine_similarity(&self, other: &Self) -> f64 {
        debug_assert_eq!(self.dimension(), other.dimension());
        let dot: f64 = self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum();
        let norms = self.magnitude() * other.magnitude();
        if norms > 0.0 { dot / norms } else { 0.0 }
    }

    /// Component-wise equality within `epsilon`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.dimension() == other.dimension()
            && self
                .0
                .iter()
                .zip(other.0.iter())
                .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl AddAssign<&FeatureVector> for FeatureVector {
    fn add_assign(&mut self, rhs: &FeatureVector) {
        debug_assert_eq!(self.dimension(), rhs.dimension());
        for (a, b) in self.0.iter_mut().zip(rhs.0.iter()) {
            *a += b;
        }
    }
}

/// Deterministic xorshift64 generator (shift triple 13/7/17).
///
/// Zero is a fixed point of xorshift, so zero seeds are replaced with
/// a non-zero default state.
#[derive(Debug, Clone)]
pub(crate) struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    const DEFAULT_STATE: u64 = 0x853c_49e6_748f_ea9b;

    pub(crate) fn seeded(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::DEFAULT_STATE } else { seed },
        }
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform draw in `[-1, 1]`.
    pub(crate) fn next_signed(&mut self) -> f64 {
        (self.next_u64() as f64 / u64::MAX as f64).mul_add(2.0, -1.0)
    }
}

/// Fingerprint a gram for seeding its unit-vector draw.
#[must_use]
pub fn gram_fingerprint<L: Hash>(gram: &Gram<L>) -> u64 {
    let mut hasher = DefaultHasher::new();
    gram.hash(&mut hasher);
    hasher.finish()
}

/// The unit vector of dimension `dimension` drawn deterministically
/// from `seed`.
///
/// The result has Euclidean magnitude one for every `dimension >= 1`.
#[must_use]
pub fn unit_vector(dimension: usize, seed: u64) -> FeatureVector {
    let mut rng = XorShift64::seeded(seed);
    let mut vector = FeatureVector(
        (0..dimension)
            .map(|_| rng.next_signed())
            .collect::<Vec<f64>>()
            .into_boxed_slice(),
    );
    vector.normalize();
    vector
}

/// Fold a bag of grams into a feature vector of length `dimension`:
/// the element-wise sum of each gram's unit vector, starting from the
/// zero vector.
#[must_use]
pub fn feature_vector<L: Hash>(dimension: usize, grams: &[Gram<L>]) -> FeatureVector {
    let mut sum = FeatureVector::zeros(dimension);
    for gram in grams {
        sum += &unit_vector(dimension, gram_fingerprint(gram));
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xorshift_is_deterministic() {
        let mut a = XorShift64::seeded(12345);
        let mut b = XorShift64::seeded(12345);
        assert_eq!(a.next_u64(), b.next_u64());
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn xorshift_zero_seed_is_replaced() {
        let mut rng = XorShift64::seeded(0);
        assert_ne!(rng.next_u64(), 0);
    }

    #[test]
    fn unit_vectors_have_magnitude_one() {
        for seed in [0, 1, 42, u64::MAX] {
            let v = unit_vector(12, seed);
            assert!((v.magnitude() - 1.0).abs() < 1e-9, "seed {seed}");
        }
    }

    #[test]
    fn unit_vectors_differ_across_seeds() {
        let a = unit_vector(8, 1);
        let b = unit_vector(8, 2);
        assert!(!a.approx_eq(&b, 1e-9));
    }

    #[test]
    fn bag_vector_sums_unit_vectors() {
        let grams = vec![
            Gram::new([Some(1u8)], [Some(2), None]),
            Gram::new([Some(3)], [Some(4), None]),
        ];
        let mut expected = unit_vector(6, gram_fingerprint(&grams[0]));
        expected += &unit_vector(6, gram_fingerprint(&grams[1]));
        assert!(feature_vector(6, &grams).approx_eq(&expected, 1e-12));
    }

    #[test]
    fn empty_bag_is_the_zero_vector() {
        let vector = feature_vector::<u8>(4, &[]);
        assert_eq!(vector, FeatureVector::zeros(4));
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = unit_vector(10, 7);
        assert!((v.cosine_similarity(&v) - 1.0).abs() < 1e-9);
    }
}
