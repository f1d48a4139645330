//! Population container and fitness.
//!
//! [`Population`] owns the tours, caches each member's tour length, and
//! tracks the best tour seen. It is the single writer in the GA: selection
//! reads it, replacement mutates it.

use super::config::ReplacementPolicy;
use super::tour::{is_permutation, random_tour, Tour};
use crate::distance::DistanceMatrix;
use crate::error::{TourError, TourResult};
use rand::Rng;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Outcome of offering a child to [`Population::replacement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    /// The child overwrote the member at `index`.
    Replaced {
        /// Population slot that now holds the child.
        index: usize,
    },
    /// The child was no better than its competitor and was dropped.
    Discarded,
}

/// A fixed-size population of tours over one distance matrix.
#[derive(Debug, Clone)]
pub struct Population<'m> {
    matrix: &'m DistanceMatrix,
    tours: Vec<Tour>,
    scores: Vec<f64>,
    best_score: f64,
    best_solution: Tour,
}

impl<'m> Population<'m> {
    /// Creates `size` random permutations of `1..=N` and evaluates them.
    ///
    /// # Errors
    /// [`TourError::InvalidConfiguration`] if `size` is zero.
    pub fn random<R: Rng>(
        matrix: &'m DistanceMatrix,
        size: usize,
        rng: &mut R,
    ) -> TourResult<Self> {
        if size == 0 {
            return Err(TourError::config("population_size must be at least 1"));
        }
        let tours = (0..size).map(|_| random_tour(matrix.len(), rng)).collect();
        Ok(Self::evaluated(matrix, tours))
    }

    /// Builds a population from existing tours and evaluates them.
    ///
    /// # Errors
    /// [`TourError::InvalidTour`] if `tours` is empty or any tour is not a
    /// permutation of `1..=N`.
    pub fn from_tours(matrix: &'m DistanceMatrix, tours: Vec<Tour>) -> TourResult<Self> {
        if tours.is_empty() {
            return Err(TourError::tour("population must hold at least one tour"));
        }
        if let Some(i) = tours.iter().position(|t| !is_permutation(t, matrix.len())) {
            return Err(TourError::tour(format!(
                "member {i} is not a permutation of 1..={}",
                matrix.len()
            )));
        }
        Ok(Self::evaluated(matrix, tours))
    }

    fn evaluated(matrix: &'m DistanceMatrix, tours: Vec<Tour>) -> Self {
        let mut population = Self {
            matrix,
            tours,
            scores: Vec::new(),
            best_score: f64::INFINITY,
            best_solution: Vec::new(),
        };
        population.evaluate();
        population
    }

    /// Closed-tour length of `tour` under this population's matrix.
    #[inline]
    pub fn fitness(&self, tour: &[usize]) -> f64 {
        self.matrix.tour_length(tour)
    }

    /// Recomputes every member's fitness and resets the best-known tour.
    ///
    /// Ties for the best score go to the first member in population order.
    pub fn evaluate(&mut self) {
        let matrix = self.matrix;

        #[cfg(feature = "parallel")]
        {
            self.scores = self
                .tours
                .par_iter()
                .map(|t| matrix.tour_length(t))
                .collect();
        }
        #[cfg(not(feature = "parallel"))]
        {
            self.scores = self.tours.iter().map(|t| matrix.tour_length(t)).collect();
        }

        let best = first_min(&self.scores);
        self.best_score = self.scores[best];
        self.best_solution = self.tours[best].clone();
    }

    /// Offers `candidate` to the population under `policy`.
    ///
    /// The competitor is the worst member ([`ReplacementPolicy::ReplaceWorst`])
    /// or a uniformly random one ([`ReplacementPolicy::ReplaceRandom`]). The
    /// candidate overwrites it only if its length is strictly lower. The
    /// best-known tour is refreshed after a successful replacement, so
    /// [`best_score`](Self::best_score) never increases.
    ///
    /// # Errors
    /// [`TourError::InvalidTour`] if `candidate` is not a permutation of
    /// `1..=N`; the population is left untouched.
    pub fn replacement<R: Rng>(
        &mut self,
        candidate: Tour,
        policy: ReplacementPolicy,
        rng: &mut R,
    ) -> TourResult<Replacement> {
        if !is_permutation(&candidate, self.matrix.len()) {
            return Err(TourError::tour(format!(
                "candidate {candidate:?} is not a permutation of 1..={}",
                self.matrix.len()
            )));
        }

        let victim = match policy {
            ReplacementPolicy::ReplaceWorst => self.worst_index(),
            ReplacementPolicy::ReplaceRandom => rng.random_range(0..self.tours.len()),
        };

        let score = self.fitness(&candidate);
        if score >= self.scores[victim] {
            return Ok(Replacement::Discarded);
        }

        if score < self.best_score {
            self.best_score = score;
            self.best_solution.clone_from(&candidate);
        }
        self.tours[victim] = candidate;
        self.scores[victim] = score;
        Ok(Replacement::Replaced { index: victim })
    }

    /// Index of the worst (longest) member; ties go to the first in order.
    pub fn worst_index(&self) -> usize {
        let mut worst = 0;
        for (i, &s) in self.scores.iter().enumerate().skip(1) {
            if s > self.scores[worst] {
                worst = i;
            }
        }
        worst
    }

    /// Lowest tour length observed so far.
    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    /// The tour achieving [`best_score`](Self::best_score).
    pub fn best_solution(&self) -> &[usize] {
        &self.best_solution
    }

    /// All members, in population order.
    pub fn tours(&self) -> &[Tour] {
        &self.tours
    }

    /// Cached tour length of each member, aligned with [`tours`](Self::tours).
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.tours.len()
    }

    /// Always `false`: construction rejects empty populations.
    pub fn is_empty(&self) -> bool {
        self.tours.is_empty()
    }

    /// The matrix this population is scored against.
    pub fn matrix(&self) -> &'m DistanceMatrix {
        self.matrix
    }
}

/// Index of the first minimum in a non-empty slice.
fn first_min(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, &s) in scores.iter().enumerate().skip(1) {
        if s < scores[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn square() -> DistanceMatrix {
        DistanceMatrix::from_rows(vec![
            vec![0.0, 1.0, 2.0, 1.0],
            vec![1.0, 0.0, 1.0, 2.0],
            vec![2.0, 1.0, 0.0, 1.0],
            vec![1.0, 2.0, 1.0, 0.0],
        ])
        .unwrap()
    }

    fn line(n: usize) -> DistanceMatrix {
        let coords: Vec<(f64, f64)> = (0..n).map(|i| (i as f64, 0.0)).collect();
        DistanceMatrix::from_coordinates(&coords).unwrap()
    }

    #[test]
    fn test_random_population_is_valid() {
        let m = line(12);
        let mut rng = StdRng::seed_from_u64(15);
        let pop = Population::random(&m, 30, &mut rng).unwrap();
        assert_eq!(pop.len(), 30);
        for tour in pop.tours() {
            assert!(is_permutation(tour, 12), "{tour:?}");
        }
    }

    #[test]
    fn test_random_population_rejects_zero_size() {
        let m = line(5);
        let mut rng = StdRng::seed_from_u64(15);
        assert!(Population::random(&m, 0, &mut rng).is_err());
    }

    #[test]
    fn test_same_seed_same_population() {
        let m = line(10);
        let a = Population::random(&m, 20, &mut StdRng::seed_from_u64(2984)).unwrap();
        let b = Population::random(&m, 20, &mut StdRng::seed_from_u64(2984)).unwrap();
        assert_eq!(a.tours(), b.tours());
    }

    #[test]
    fn test_evaluate_picks_first_best() {
        let m = square();
        let pop = Population::from_tours(
            &m,
            vec![vec![1, 3, 2, 4], vec![2, 3, 4, 1], vec![1, 2, 3, 4]],
        )
        .unwrap();
        assert_eq!(pop.scores(), &[6.0, 4.0, 4.0]);
        assert_eq!(pop.best_score(), 4.0);
        assert_eq!(pop.best_solution(), &[2, 3, 4, 1]);
    }

    #[test]
    fn test_from_tours_rejects_invalid() {
        let m = square();
        assert!(Population::from_tours(&m, vec![]).is_err());
        let err = Population::from_tours(&m, vec![vec![1, 2, 3, 4], vec![1, 1, 3, 4]]).unwrap_err();
        assert!(err.to_string().contains("member 1"));
    }

    #[test]
    fn test_replace_worst_overwrites_first_worst() {
        let m = square();
        let mut rng = StdRng::seed_from_u64(1);
        let mut pop = Population::from_tours(
            &m,
            vec![vec![1, 2, 3, 4], vec![1, 3, 2, 4], vec![1, 3, 4, 2]],
        )
        .unwrap();
        assert_eq!(pop.worst_index(), 1);

        let outcome = pop
            .replacement(vec![4, 3, 2, 1], ReplacementPolicy::ReplaceWorst, &mut rng)
            .unwrap();
        assert_eq!(outcome, Replacement::Replaced { index: 1 });
        assert_eq!(pop.tours()[1], vec![4, 3, 2, 1]);
        assert_eq!(pop.scores()[1], 4.0);
        assert_eq!(pop.best_score(), 4.0);
        assert_eq!(pop.best_solution(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_replacement_discards_ties_and_worse() {
        let m = square();
        let mut rng = StdRng::seed_from_u64(1);
        let mut pop =
            Population::from_tours(&m, vec![vec![1, 3, 2, 4], vec![1, 3, 4, 2]]).unwrap();
        let before = pop.tours().to_vec();

        // Same length as the worst (6): incumbent kept.
        let outcome = pop
            .replacement(vec![2, 4, 1, 3], ReplacementPolicy::ReplaceWorst, &mut rng)
            .unwrap();
        assert_eq!(outcome, Replacement::Discarded);
        assert_eq!(pop.tours(), before.as_slice());
    }

    #[test]
    fn test_replacement_improves_best() {
        let m = square();
        let mut rng = StdRng::seed_from_u64(1);
        let mut pop =
            Population::from_tours(&m, vec![vec![1, 3, 2, 4], vec![1, 3, 4, 2]]).unwrap();
        assert_eq!(pop.best_score(), 6.0);

        pop.replacement(vec![3, 4, 1, 2], ReplacementPolicy::ReplaceWorst, &mut rng)
            .unwrap();
        assert_eq!(pop.best_score(), 4.0);
        assert_eq!(pop.best_solution(), &[3, 4, 1, 2]);
    }

    #[test]
    fn test_replacement_rejects_invalid_candidate() {
        let m = square();
        let mut rng = StdRng::seed_from_u64(1);
        let mut pop = Population::from_tours(&m, vec![vec![1, 3, 2, 4]]).unwrap();
        let err = pop
            .replacement(vec![1, 1, 2, 3], ReplacementPolicy::ReplaceWorst, &mut rng)
            .unwrap_err();
        assert!(matches!(err, TourError::InvalidTour { .. }));
        assert_eq!(pop.tours()[0], vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_replace_random_only_accepts_strict_improvement() {
        let m = square();
        let mut rng = StdRng::seed_from_u64(7);
        let mut pop = Population::from_tours(&m, vec![vec![1, 2, 3, 4]; 5]).unwrap();

        // Every member is already optimal, nothing can beat it.
        for _ in 0..20 {
            let outcome = pop
                .replacement(vec![1, 3, 2, 4], ReplacementPolicy::ReplaceRandom, &mut rng)
                .unwrap();
            assert_eq!(outcome, Replacement::Discarded);
        }
        assert!(pop.scores().iter().all(|&s| s == 4.0));
    }

    #[test]
    fn test_best_score_non_increasing_under_replacement() {
        let m = line(9);
        let mut rng = StdRng::seed_from_u64(24);
        let mut pop = Population::random(&m, 8, &mut rng).unwrap();

        let mut last = pop.best_score();
        for i in 0..500 {
            let policy = if i % 2 == 0 {
                ReplacementPolicy::ReplaceWorst
            } else {
                ReplacementPolicy::ReplaceRandom
            };
            let candidate = random_tour(9, &mut rng);
            pop.replacement(candidate, policy, &mut rng).unwrap();
            assert!(pop.best_score() <= last);
            assert_eq!(pop.fitness(pop.best_solution()), pop.best_score());
            last = pop.best_score();
        }
    }
}
