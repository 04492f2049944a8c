//! Deterministic tree generation for tests and benches.
//!
//! Seeded generation keeps fixtures reproducible across runs without
//! checked-in corpora.

use crate::feature::XorShift64;
use crate::tree::Tree;

/// Configuration for [`TreeGenerator`].
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Maximum tree depth (0 generates only leaves).
    pub max_depth: usize,
    /// Maximum children per node.
    pub max_children: usize,
    /// Labels are drawn from `0..label_count`.
    pub label_count: u32,
    /// Seed for reproducible generation.
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            max_children: 4,
            label_count: 8,
            seed: 0x5eed,
        }
    }
}

/// Generator for random labelled trees.
#[derive(Debug)]
pub struct TreeGenerator {
    config: GeneratorConfig,
    rng: XorShift64,
}

impl TreeGenerator {
    /// Create a generator from a configuration.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = XorShift64::seeded(config.seed);
        Self { config, rng }
    }

    /// Generate one tree.
    pub fn generate(&mut self) -> Tree<u32> {
        self.generate_node(0)
    }

    /// Generate an ordered list of independent trees.
    pub fn generate_forest(&mut self, len: usize) -> Vec<Tree<u32>> {
        (0..len).map(|_| self.generate()).collect()
    }

    /// Relabel roughly one node in eight, keeping the structure.
    pub fn perturb(&mut self, tree: Tree<u32>) -> Tree<u32> {
        let label_count = self.config.label_count.max(1);
        tree.map(|label| {
            if self.rng.next_u64() % 8 == 0 {
                self.rng.next_u64() as u32 % label_count
            } else {
                label
            }
        })
    }

    fn generate_node(&mut self, depth: usize) -> Tree<u32> {
        let label = self.rng.next_u64() as u32 % self.config.label_count.max(1);
        if depth >= self.config.max_depth {
            return Tree::leaf(label);
        }
        let child_count = self.rng.next_u64() as usize % (self.config.max_children + 1);
        let children = (0..child_count)
            .map(|_| self.generate_node(depth + 1))
            .collect();
        Tree::new(label, children)
    }
}
