//! Cut-point crossover with permutation repair.
//!
//! Exchanging segments between two permutations almost always duplicates
//! some cities and drops others. Every child produced here is repaired
//! before it is returned: each later occurrence of a duplicated city is
//! replaced by a city that is missing from the child, taken in the order
//! of the parent that contributed that position.
//!
//! # Operators
//!
//! - [`Crossover::single_point`]: one cut, tails exchanged
//! - [`Crossover::multi_points`]: `k` cuts, alternating segments exchanged
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Larrañaga et al. (1999), "Genetic Algorithms for the Travelling Salesman
//!   Problem: A Review of Representations and Operators"

use super::config::{check_rate, CrossoverKind};
use super::tour::{duplicate_positions, find_duplicate_indexes, City, Tour};
use crate::error::{TourError, TourResult};
use rand::seq::index;
use rand::Rng;
use std::collections::HashSet;

/// A parent pair with the probability of recombining it.
#[derive(Debug, Clone, Copy)]
pub struct Crossover<'a> {
    parent1: &'a [City],
    parent2: &'a [City],
    rate: f64,
}

impl<'a> Crossover<'a> {
    /// Pairs two parents for recombination.
    ///
    /// # Errors
    /// - [`TourError::InvalidConfiguration`] if `rate` is outside `[0, 1]` or NaN.
    /// - [`TourError::LengthMismatch`] if the parents differ in length.
    pub fn new(parent1: &'a [City], parent2: &'a [City], rate: f64) -> TourResult<Self> {
        check_rate("crossover_rate", rate)?;
        if parent1.len() != parent2.len() {
            return Err(TourError::LengthMismatch {
                expected: parent1.len(),
                actual: parent2.len(),
            });
        }
        Ok(Self {
            parent1,
            parent2,
            rate,
        })
    }

    /// Applies the operator selected by `kind`.
    pub fn apply<R: Rng>(&self, kind: CrossoverKind, rng: &mut R) -> TourResult<(Tour, Tour)> {
        match kind {
            CrossoverKind::SinglePoint => self.single_point(rng),
            CrossoverKind::MultiPoint(points) => self.multi_points(points, rng),
        }
    }

    /// Single-point crossover.
    ///
    /// With probability `1 - rate` (or when `N < 3`, which leaves no
    /// interior cut) the children are copies of the parents. Otherwise a
    /// cut is drawn from `[1, N-1)`, tails are exchanged, and both children
    /// are repaired one duplicate pair at a time.
    ///
    /// # Errors
    /// [`TourError::RepairExhausted`] if a duplicate has no replacement,
    /// which only happens when the parents are not permutations of the
    /// same cities.
    pub fn single_point<R: Rng>(&self, rng: &mut R) -> TourResult<(Tour, Tour)> {
        let n = self.parent1.len();
        if n < 3 || !self.gate(rng) {
            return Ok(self.copies());
        }
        let cut = rng.random_range(1..n - 1);
        single_point_at(self.parent1, self.parent2, cut)
    }

    /// Multi-point crossover with `num_points` distinct cuts in `[1, N-1)`.
    ///
    /// Gated by `rate` like [`single_point`](Self::single_point). Segments
    /// at even positions are exchanged, odd ones kept, and every duplicate
    /// in each child is repaired.
    ///
    /// # Errors
    /// - [`TourError::InvalidConfiguration`] if `num_points` is zero or
    ///   exceeds the `N - 2` available cut positions. Tours shorter than 3
    ///   have no cut positions, so every `num_points` is rejected there.
    /// - [`TourError::RepairExhausted`] as for `single_point`.
    pub fn multi_points<R: Rng>(&self, num_points: usize, rng: &mut R) -> TourResult<(Tour, Tour)> {
        let n = self.parent1.len();
        if num_points == 0 {
            return Err(TourError::config("num_points must be at least 1"));
        }
        if num_points.saturating_add(1) >= n {
            return Err(TourError::config(format!(
                "num_points must be below {} for {n} cities, got {num_points}",
                n.saturating_sub(1)
            )));
        }
        if !self.gate(rng) {
            return Ok(self.copies());
        }

        let mut cuts: Vec<usize> = index::sample(rng, n - 2, num_points)
            .into_iter()
            .map(|i| i + 1)
            .collect();
        cuts.sort_unstable();
        multi_point_at(self.parent1, self.parent2, &cuts)
    }

    /// Whether this pair recombines. `rate = 0` never does, `rate = 1` always does.
    fn gate<R: Rng>(&self, rng: &mut R) -> bool {
        rng.random_range(0.0..1.0) < self.rate
    }

    fn copies(&self) -> (Tour, Tour) {
        (self.parent1.to_vec(), self.parent2.to_vec())
    }
}

/// Single-point crossover at a fixed `cut`, followed by repair.
///
/// `child1 = parent1[..cut] ++ parent2[cut..]` and symmetrically for
/// `child2`. Duplicates always sit in the exchanged tail, so the tail's
/// parent is the repair donor.
pub fn single_point_at(parent1: &[City], parent2: &[City], cut: usize) -> TourResult<(Tour, Tour)> {
    let mut child1 = [&parent1[..cut], &parent2[cut..]].concat();
    let mut child2 = [&parent2[..cut], &parent1[cut..]].concat();

    while repair_first_duplicate(&mut child1, parent2)? {}
    while repair_first_duplicate(&mut child2, parent1)? {}

    Ok((child1, child2))
}

/// Multi-point crossover at fixed, ascending `cuts`, followed by repair.
///
/// The parents are split into `cuts.len() + 1` segments. Even segments
/// come from the other parent, odd segments from the child's own parent.
pub fn multi_point_at(parent1: &[City], parent2: &[City], cuts: &[usize]) -> TourResult<(Tour, Tour)> {
    let exchanged = |pos: usize| cuts.partition_point(|&c| c <= pos) % 2 == 0;

    let mut child1 = Vec::with_capacity(parent1.len());
    let mut child2 = Vec::with_capacity(parent2.len());
    for pos in 0..parent1.len() {
        if exchanged(pos) {
            child1.push(parent2[pos]);
            child2.push(parent1[pos]);
        } else {
            child1.push(parent1[pos]);
            child2.push(parent2[pos]);
        }
    }

    repair_all_duplicates(&mut child1, |pos| {
        if exchanged(pos) {
            parent2
        } else {
            parent1
        }
    })?;
    repair_all_duplicates(&mut child2, |pos| {
        if exchanged(pos) {
            parent1
        } else {
            parent2
        }
    })?;

    Ok((child1, child2))
}

/// Resolves the first duplicate pair found scanning left to right.
///
/// The later occurrence is overwritten with the first city of `donor`
/// that is absent from `child`. Returns `Ok(false)` when there was
/// nothing to repair.
///
/// # Errors
/// [`TourError::RepairExhausted`] if every donor city is already present;
/// the child is left unchanged.
pub fn repair_first_duplicate(child: &mut [City], donor: &[City]) -> TourResult<bool> {
    let Some((_, second)) = find_duplicate_indexes(child) else {
        return Ok(false);
    };
    let present: HashSet<City> = child.iter().copied().collect();
    match donor.iter().find(|city| !present.contains(*city)) {
        Some(&city) => {
            child[second] = city;
            Ok(true)
        }
        None => Err(TourError::RepairExhausted {
            position: second,
            city: child[second],
        }),
    }
}

/// Resolves every duplicate position in `child`, left to right.
///
/// Each later occurrence is overwritten with the first city of
/// `donor_at(position)` still missing from the child. Returns the number
/// of positions repaired.
///
/// # Errors
/// [`TourError::RepairExhausted`] at the first position with no missing
/// city left; positions before it stay repaired.
pub fn repair_all_duplicates<'d, F>(child: &mut [City], donor_at: F) -> TourResult<usize>
where
    F: Fn(usize) -> &'d [City],
{
    let positions = duplicate_positions(child);
    let mut present: HashSet<City> = child.iter().copied().collect();

    for &pos in &positions {
        let replacement = donor_at(pos)
            .iter()
            .copied()
            .find(|city| !present.contains(city));
        match replacement {
            Some(city) => {
                child[pos] = city;
                present.insert(city);
            }
            None => {
                return Err(TourError::RepairExhausted {
                    position: pos,
                    city: child[pos],
                })
            }
        }
    }
    Ok(positions.len())
}
