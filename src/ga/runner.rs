//! GA evolutionary loop execution.
//!
//! [`Evolution`] holds the state of one run and advances it a generation
//! at a time: select → crossover → mutate → replace → record.
//! [`GaRunner`] drives an `Evolution` until the generation budget, the
//! wall-clock limit, or a cancellation flag stops it.

use super::config::GaConfig;
use super::crossover::Crossover;
use super::mutation::Mutation;
use super::population::{Population, Replacement};
use super::selection::TournamentSelection;
use super::tour::Tour;
use crate::distance::DistanceMatrix;
use crate::error::TourResult;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Upper bound on the convergence record reserved up front.
const HISTORY_PREALLOC: usize = 1 << 16;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// All `max_generations` generations ran.
    BudgetExhausted,
    /// The cancellation flag was set.
    Cancelled,
    /// `time_limit_ms` elapsed.
    TimeLimit,
}

/// Result of a GA run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaResult {
    /// The shortest tour found.
    pub best_solution: Tour,

    /// Length of `best_solution`.
    pub best_score: f64,

    /// Number of completed generations.
    pub generations: usize,

    /// Why the run stopped.
    pub termination: Termination,

    /// Best score after each completed generation. Non-increasing.
    pub convergence: Vec<f64>,

    /// Children that entered the population.
    pub accepted_offspring: usize,

    /// Parent pairs passed through unchanged because repair kept failing.
    pub repair_fallbacks: usize,
}

/// State of one evolutionary run.
///
/// Construction performs initialization (random population under the
/// configured seed, full evaluation). Each [`step`](Self::step) runs one
/// generation; state between steps is always consistent, so a run can be
/// stopped at any generation boundary.
#[derive(Debug)]
pub struct Evolution<'m> {
    config: GaConfig,
    population: Population<'m>,
    rng: StdRng,
    seed: u64,
    convergence: Vec<f64>,
    accepted_offspring: usize,
    repair_fallbacks: usize,
}

impl<'m> Evolution<'m> {
    /// Validates `config` and builds the initial population.
    ///
    /// # Errors
    /// [`TourError::InvalidConfiguration`](crate::TourError::InvalidConfiguration)
    /// if any parameter is out of range for this matrix.
    pub fn new(matrix: &'m DistanceMatrix, config: &GaConfig) -> TourResult<Self> {
        config.validate(matrix.len())?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let population = Population::random(matrix, config.population_size, &mut rng)?;

        debug!(
            "initial population of {} tours, best length {:.3}",
            population.len(),
            population.best_score()
        );

        Ok(Self {
            config: config.clone(),
            population,
            rng,
            seed,
            convergence: Vec::with_capacity(config.max_generations.min(HISTORY_PREALLOC)),
            accepted_offspring: 0,
            repair_fallbacks: 0,
        })
    }

    /// Runs one generation and records the best score.
    ///
    /// # Errors
    /// Only if a child fails the permutation check on replacement, which
    /// the operators rule out for valid populations.
    pub fn step(&mut self) -> TourResult<()> {
        let before = self.population.best_score();

        let (parent1, parent2) = TournamentSelection::new(&self.population)
            .parents_selection(self.config.tournament_size, &mut self.rng);

        let (mut child1, mut child2) = self.recombine(parent1, parent2)?;

        Mutation::new(self.config.mutation_rate)?.apply(
            self.config.mutation,
            &mut child1,
            &mut child2,
            &mut self.rng,
        );

        for child in [child1, child2] {
            let outcome =
                self.population
                    .replacement(child, self.config.replacement, &mut self.rng)?;
            if let Replacement::Replaced { .. } = outcome {
                self.accepted_offspring += 1;
            }
        }

        let best = self.population.best_score();
        self.convergence.push(best);
        if best < before {
            debug!(
                "generation {}: best length {:.3} -> {:.3}",
                self.convergence.len(),
                before,
                best
            );
        }
        Ok(())
    }

    /// Crossover with the retry-then-fallback policy for repair exhaustion.
    fn recombine(&mut self, parent1: Tour, parent2: Tour) -> TourResult<(Tour, Tour)> {
        let crossover = Crossover::new(&parent1, &parent2, self.config.crossover_rate)?;

        for attempt in 0..=self.config.repair_retries {
            match crossover.apply(self.config.crossover, &mut self.rng) {
                Ok(children) => return Ok(children),
                Err(err) if err.is_recoverable() => {
                    debug!("crossover attempt {} failed: {err}", attempt + 1);
                }
                Err(err) => return Err(err),
            }
        }

        self.repair_fallbacks += 1;
        debug!(
            "generation {}: repair exhausted, keeping parents",
            self.convergence.len() + 1
        );
        Ok((parent1, parent2))
    }

    /// Completed generations.
    pub fn generation(&self) -> usize {
        self.convergence.len()
    }

    /// The current population.
    pub fn population(&self) -> &Population<'m> {
        &self.population
    }

    /// Seed actually used, including one drawn when the config had none.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Best score per completed generation.
    pub fn convergence(&self) -> &[f64] {
        &self.convergence
    }

    /// Ends the run and packages its outcome.
    pub fn finish(self, termination: Termination) -> GaResult {
        GaResult {
            best_solution: self.population.best_solution().to_vec(),
            best_score: self.population.best_score(),
            generations: self.convergence.len(),
            termination,
            convergence: self.convergence,
            accepted_offspring: self.accepted_offspring,
            repair_fallbacks: self.repair_fallbacks,
        }
    }
}

/// Executes the GA evolutionary loop.
///
/// # Usage
///
/// ```
/// use tour_ga::{DistanceMatrix, GaConfig, GaRunner};
///
/// let matrix = DistanceMatrix::from_coordinates(&[
///     (0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0),
/// ]).unwrap();
/// let config = GaConfig::default()
///     .with_population_size(10)
///     .with_max_generations(200)
///     .with_seed(42);
///
/// let result = GaRunner::run(&matrix, &config).unwrap();
/// assert_eq!(result.convergence.len(), 200);
/// assert!((result.best_score - 4.0).abs() < 1e-9);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA to completion.
    ///
    /// # Errors
    /// [`TourError::InvalidConfiguration`](crate::TourError::InvalidConfiguration)
    /// before the loop starts if `config` is invalid for `matrix`.
    pub fn run(matrix: &DistanceMatrix, config: &GaConfig) -> TourResult<GaResult> {
        Self::run_with_cancel(matrix, config, None)
    }

    /// Runs the GA with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the GA stops at
    /// the next generation boundary and returns the best tour so far.
    pub fn run_with_cancel(
        matrix: &DistanceMatrix,
        config: &GaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> TourResult<GaResult> {
        let mut evolution = Evolution::new(matrix, config)?;
        info!(
            "GA start: {} cities, population {}, {} generations, seed {}",
            matrix.len(),
            config.population_size,
            config.max_generations,
            evolution.seed()
        );

        let started = Instant::now();
        let deadline = config.time_limit_ms.map(Duration::from_millis);
        let mut termination = Termination::BudgetExhausted;

        while evolution.generation() < config.max_generations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    warn!("GA cancelled after {} generations", evolution.generation());
                    termination = Termination::Cancelled;
                    break;
                }
            }
            if let Some(limit) = deadline {
                if started.elapsed() >= limit {
                    warn!(
                        "GA hit time limit of {:?} after {} generations",
                        limit,
                        evolution.generation()
                    );
                    termination = Termination::TimeLimit;
                    break;
                }
            }
            evolution.step()?;
        }

        let result = evolution.finish(termination);
        info!(
            "GA done: best length {:.3} after {} generations in {:.2?} ({} children accepted, {} repair fallbacks)",
            result.best_score,
            result.generations,
            started.elapsed(),
            result.accepted_offspring,
            result.repair_fallbacks
        );
        Ok(result)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TourError;
    use crate::ga::config::{CrossoverKind, MutationKind, ReplacementPolicy};
    use crate::ga::tour::is_permutation;

    /// Unit square: adjacent edges 1, diagonals 2. Optimal tour length 4.
    fn square() -> DistanceMatrix {
        DistanceMatrix::from_rows(vec![
            vec![0.0, 1.0, 2.0, 1.0],
            vec![1.0, 0.0, 1.0, 2.0],
            vec![2.0, 1.0, 0.0, 1.0],
            vec![1.0, 2.0, 1.0, 0.0],
        ])
        .unwrap()
    }

    /// Cities evenly spaced on a circle; the optimal tour visits them in order.
    fn circle(n: usize) -> (DistanceMatrix, f64) {
        let coords: Vec<(f64, f64)> = (0..n)
            .map(|i| {
                let a = i as f64 / n as f64 * std::f64::consts::TAU;
                (a.cos() * 100.0, a.sin() * 100.0)
            })
            .collect();
        let matrix = DistanceMatrix::from_coordinates(&coords).unwrap();
        let order: Vec<usize> = (1..=n).collect();
        let optimum = matrix.tour_length(&order);
        (matrix, optimum)
    }

    #[test]
    fn test_square_converges_to_optimum() {
        let matrix = square();
        let config = GaConfig::default()
            .with_population_size(10)
            .with_tournament_size(4)
            .with_crossover_rate(0.9)
            .with_mutation_rate(0.1)
            .with_max_generations(1000)
            .with_seed(15);

        let result = GaRunner::run(&matrix, &config).unwrap();

        assert_eq!(result.best_score, 4.0);
        assert_eq!(matrix.tour_length(&result.best_solution), 4.0);
        assert_eq!(result.generations, 1000);
        assert_eq!(result.termination, Termination::BudgetExhausted);
    }

    #[test]
    fn test_convergence_is_non_increasing() {
        let (matrix, _) = circle(20);
        let config = GaConfig::default()
            .with_population_size(30)
            .with_max_generations(2000)
            .with_seed(24);

        let result = GaRunner::run(&matrix, &config).unwrap();

        assert_eq!(result.convergence.len(), 2000);
        for window in result.convergence.windows(2) {
            assert!(
                window[1] <= window[0],
                "best score increased: {} > {}",
                window[1],
                window[0]
            );
        }
        assert_eq!(result.convergence.last().copied(), Some(result.best_score));
    }

    #[test]
    fn test_improves_on_circle() {
        let (matrix, optimum) = circle(15);
        let config = GaConfig::default()
            .with_population_size(50)
            .with_mutation_rate(0.3)
            .with_seed(2984);

        let mut evo = Evolution::new(&matrix, &config).unwrap();
        let initial = evo.population().best_score();
        for _ in 0..5000 {
            evo.step().unwrap();
        }
        let result = evo.finish(Termination::BudgetExhausted);

        assert!(result.best_score < initial, "{} !< {initial}", result.best_score);
        assert!(result.best_score >= optimum - 1e-9);
        assert!(is_permutation(&result.best_solution, 15));
    }

    #[test]
    fn test_all_operator_combinations_keep_permutations() {
        let (matrix, _) = circle(12);
        for crossover in [CrossoverKind::SinglePoint, CrossoverKind::MultiPoint(3)] {
            for mutation in [MutationKind::Swap, MutationKind::MultiSwap(3)] {
                for replacement in [ReplacementPolicy::ReplaceWorst, ReplacementPolicy::ReplaceRandom] {
                    let config = GaConfig::default()
                        .with_population_size(20)
                        .with_max_generations(300)
                        .with_crossover(crossover)
                        .with_mutation(mutation)
                        .with_replacement(replacement)
                        .with_mutation_rate(0.5)
                        .with_seed(7);
                    let mut evo = Evolution::new(&matrix, &config).unwrap();
                    for _ in 0..300 {
                        evo.step().unwrap();
                        assert!(evo
                            .population()
                            .tours()
                            .iter()
                            .all(|t| is_permutation(t, 12)));
                    }
                    let result = evo.finish(Termination::BudgetExhausted);
                    assert_eq!(result.repair_fallbacks, 0);
                }
            }
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        let (matrix, _) = circle(10);
        let config = GaConfig::default()
            .with_population_size(20)
            .with_max_generations(500)
            .with_crossover(CrossoverKind::MultiPoint(2))
            .with_seed(42);

        let a = GaRunner::run(&matrix, &config).unwrap();
        let b = GaRunner::run(&matrix, &config).unwrap();
        assert_eq!(a.best_solution, b.best_solution);
        assert_eq!(a.convergence, b.convergence);
        assert_eq!(a.accepted_offspring, b.accepted_offspring);
    }

    #[test]
    fn test_invalid_config_fails_before_loop() {
        let matrix = square();
        let config = GaConfig::default()
            .with_population_size(5)
            .with_tournament_size(6);
        let err = GaRunner::run(&matrix, &config).unwrap_err();
        assert!(matches!(err, TourError::InvalidConfiguration { .. }));

        // 4 cities leave 2 cut positions.
        let config = GaConfig::default().with_crossover(CrossoverKind::MultiPoint(3));
        assert!(GaRunner::run(&matrix, &config).is_err());
    }

    #[test]
    fn test_cancellation() {
        let (matrix, _) = circle(30);
        let config = GaConfig::default()
            .with_population_size(50)
            .with_max_generations(usize::MAX)
            .with_seed(42);

        let cancel = Arc::new(AtomicBool::new(false));

        let cancel_clone = cancel.clone();
        std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(10));
            cancel_clone.store(true, Ordering::Relaxed);
        });

        let result = GaRunner::run_with_cancel(&matrix, &config, Some(cancel)).unwrap();

        assert_eq!(result.termination, Termination::Cancelled);
        assert_eq!(result.convergence.len(), result.generations);
        assert!(is_permutation(&result.best_solution, 30));
    }

    #[test]
    fn test_cancelled_before_start() {
        let matrix = square();
        let config = GaConfig::default().with_population_size(4).with_seed(1);
        let cancel = Arc::new(AtomicBool::new(true));

        let result = GaRunner::run_with_cancel(&matrix, &config, Some(cancel)).unwrap();

        assert_eq!(result.generations, 0);
        assert!(result.convergence.is_empty());
        assert!(is_permutation(&result.best_solution, 4));
    }

    #[test]
    fn test_time_limit() {
        let (matrix, _) = circle(30);
        let config = GaConfig::default()
            .with_population_size(50)
            .with_max_generations(usize::MAX)
            .with_time_limit_ms(20)
            .with_seed(42);

        let result = GaRunner::run(&matrix, &config).unwrap();

        assert_eq!(result.termination, Termination::TimeLimit);
        assert!(result.generations > 0);
    }

    #[test]
    fn test_degenerate_inputs() {
        // One city: every operator is a no-op.
        let one = DistanceMatrix::from_rows(vec![vec![0.0]]).unwrap();
        let config = GaConfig::default()
            .with_population_size(3)
            .with_tournament_size(1)
            .with_max_generations(10)
            .with_seed(3);
        let result = GaRunner::run(&one, &config).unwrap();
        assert_eq!(result.best_solution, vec![1]);
        assert_eq!(result.best_score, 0.0);

        // Two cities: crossover passes through, mutation still swaps.
        let two = DistanceMatrix::from_rows(vec![vec![0.0, 5.0], vec![5.0, 0.0]]).unwrap();
        let result = GaRunner::run(&two, &config.with_mutation_rate(1.0)).unwrap();
        assert_eq!(result.best_score, 10.0);
        assert!(is_permutation(&result.best_solution, 2));
    }

    #[test]
    fn test_evolution_exposes_seed() {
        let matrix = square();
        let config = GaConfig::default().with_population_size(4);
        let evo = Evolution::new(&matrix, &config).unwrap();
        let replay = Evolution::new(&matrix, &config.clone().with_seed(evo.seed())).unwrap();
        assert_eq!(evo.population().tours(), replay.population().tours());
    }
}
