//! Tournament selection.
//!
//! [`TournamentSelection`] borrows a read view of the [`Population`] and
//! ranks pool members by the population's cached tour lengths. It never
//! mutates the population.
//!
//! # References
//!
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"

use super::population::Population;
use super::tour::Tour;
use rand::Rng;

/// Tournament selection over a borrowed population.
///
/// Pool size `k` controls selection pressure:
/// - `k = 1`: the single sampled member always wins, so parents are
///   uniform random draws (no pressure). Accepted as-is.
/// - `k = 2..4`: light to moderate pressure
/// - larger `k`: strong pressure, risk of premature convergence
#[derive(Debug, Clone, Copy)]
pub struct TournamentSelection<'p, 'm> {
    population: &'p Population<'m>,
}

impl<'p, 'm> TournamentSelection<'p, 'm> {
    /// Creates a selector reading from `population`.
    pub fn new(population: &'p Population<'m>) -> Self {
        Self { population }
    }

    /// Draws `k` member indices uniformly with replacement.
    ///
    /// The same member may appear more than once in a pool.
    pub fn selection_pool<R: Rng>(&self, k: usize, rng: &mut R) -> Vec<usize> {
        let n = self.population.len();
        (0..k).map(|_| rng.random_range(0..n)).collect()
    }

    /// Index of the fittest member of `pool`.
    ///
    /// Ties go to the first one in pool order. Returns `None` for an empty pool.
    pub fn fittest(&self, pool: &[usize]) -> Option<usize> {
        let scores = self.population.scores();
        let (&first, rest) = pool.split_first()?;
        let mut best = first;
        for &idx in rest {
            if scores[idx] < scores[best] {
                best = idx;
            }
        }
        Some(best)
    }

    /// Runs one tournament of size `k` and returns the winner's index.
    ///
    /// `k = 0` is treated as `k = 1`.
    pub fn tournament<R: Rng>(&self, k: usize, rng: &mut R) -> usize {
        let pool = self.selection_pool(k.max(1), rng);
        // Pool holds at least one index.
        self.fittest(&pool).unwrap_or(pool[0])
    }

    /// Runs two independent tournaments and returns copies of both winners.
    ///
    /// The two parents may be the same tour.
    pub fn parents_selection<R: Rng>(&self, k: usize, rng: &mut R) -> (Tour, Tour) {
        let first = self.tournament(k, rng);
        let second = self.tournament(k, rng);
        let tours = self.population.tours();
        (tours[first].clone(), tours[second].clone())
    }
}
