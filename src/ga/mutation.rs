//! Transposition-based mutation.
//!
//! Both operators only exchange positions, so a permutation stays a
//! permutation.
//!
//! - [`swap`]: one transposition of two distinct positions — O(1)
//! - [`multi_swap`]: `k` transpositions in sequence — O(k)

use super::config::{check_rate, MutationKind};
use super::tour::City;
use crate::error::TourResult;
use rand::Rng;

/// Mutation gate applied independently to each child of a pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mutation {
    rate: f64,
}

impl Mutation {
    /// Creates a gate that mutates each child with probability `rate`.
    ///
    /// # Errors
    /// [`TourError::InvalidConfiguration`](crate::error::TourError::InvalidConfiguration)
    /// if `rate` is outside `[0, 1]` or NaN.
    pub fn new(rate: f64) -> TourResult<Self> {
        check_rate("mutation_rate", rate)?;
        Ok(Self { rate })
    }

    /// Applies the operator selected by `kind` to both children.
    ///
    /// Returns whether each child passed the gate.
    pub fn apply<R: Rng>(
        &self,
        kind: MutationKind,
        child1: &mut [City],
        child2: &mut [City],
        rng: &mut R,
    ) -> (bool, bool) {
        match kind {
            MutationKind::Swap => self.swap_mutation(child1, child2, rng),
            MutationKind::MultiSwap(k) => self.multi_swap_mutation(child1, child2, k, rng),
        }
    }

    /// Swaps two distinct positions in each child that passes the gate.
    pub fn swap_mutation<R: Rng>(
        &self,
        child1: &mut [City],
        child2: &mut [City],
        rng: &mut R,
    ) -> (bool, bool) {
        self.multi_swap_mutation(child1, child2, 1, rng)
    }

    /// Applies `num_swaps` transpositions to each child that passes the gate.
    pub fn multi_swap_mutation<R: Rng>(
        &self,
        child1: &mut [City],
        child2: &mut [City],
        num_swaps: usize,
        rng: &mut R,
    ) -> (bool, bool) {
        let first = self.gate(rng);
        if first {
            multi_swap(child1, num_swaps, rng);
        }
        let second = self.gate(rng);
        if second {
            multi_swap(child2, num_swaps, rng);
        }
        (first, second)
    }

    fn gate<R: Rng>(&self, rng: &mut R) -> bool {
        rng.random_range(0.0..1.0) < self.rate
    }
}

/// Swap mutation: exchange two distinct random positions.
///
/// No-op for tours shorter than 2.
pub fn swap<R: Rng>(perm: &mut [City], rng: &mut R) {
    let n = perm.len();
    if n < 2 {
        return;
    }
    let i = rng.random_range(0..n);
    // Draw from the other n-1 positions.
    let mut j = rng.random_range(0..n - 1);
    if j >= i {
        j += 1;
    }
    perm.swap(i, j);
}

/// Multi-swap mutation: `num_swaps` independent transpositions.
///
/// Positions are redrawn for each swap, so later swaps may undo earlier ones.
pub fn multi_swap<R: Rng>(perm: &mut [City], num_swaps: usize, rng: &mut R) {
    for _ in 0..num_swaps {
        swap(perm, rng);
    }
}
