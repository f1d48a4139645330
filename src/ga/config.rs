//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.
//! Builders store values as given; [`GaConfig::validate`] rejects anything
//! out of range before the loop starts.

use crate::error::{TourError, TourResult};

/// Recombination operator applied to each parent pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CrossoverKind {
    /// One cut in `[1, N-1)`, tails exchanged.
    SinglePoint,
    /// `num_points` distinct cuts, alternating segments exchanged.
    MultiPoint(usize),
}

impl Default for CrossoverKind {
    fn default() -> Self {
        CrossoverKind::SinglePoint
    }
}

/// Perturbation applied to each child that passes the mutation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MutationKind {
    /// One transposition of two distinct positions.
    Swap,
    /// `num_swaps` transpositions applied one after another.
    MultiSwap(usize),
}

impl Default for MutationKind {
    fn default() -> Self {
        MutationKind::Swap
    }
}

/// Steady-state replacement policy: which member a child competes against.
///
/// In both policies the victim is overwritten only when the candidate's
/// tour length is strictly lower; ties keep the incumbent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReplacementPolicy {
    /// Compete against the worst member. Among equally bad members the
    /// first one in population order is chosen.
    ReplaceWorst,
    /// Compete against a uniformly random member.
    ReplaceRandom,
}

impl Default for ReplacementPolicy {
    fn default() -> Self {
        ReplacementPolicy::ReplaceWorst
    }
}

/// Configuration for the tour GA.
///
/// # Defaults
///
/// ```
/// use tour_ga::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_generations, 10_000);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use tour_ga::ga::{CrossoverKind, GaConfig, MutationKind};
///
/// let config = GaConfig::default()
///     .with_population_size(10)
///     .with_tournament_size(4)
///     .with_crossover(CrossoverKind::MultiPoint(2))
///     .with_mutation(MutationKind::MultiSwap(3))
///     .with_seed(15);
/// assert!(config.validate(20).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GaConfig {
    /// Number of tours in the population.
    pub population_size: usize,

    /// Generation budget. Each generation produces two children.
    pub max_generations: usize,

    /// Tournament pool size `k`, sampled with replacement.
    ///
    /// `k = 1` is accepted and means zero selection pressure: the single
    /// sampled member always wins.
    pub tournament_size: usize,

    /// Probability of recombining a parent pair (0.0–1.0).
    ///
    /// When crossover is not applied, the children are copies of the parents.
    pub crossover_rate: f64,

    /// Probability of mutating each child, drawn independently (0.0–1.0).
    pub mutation_rate: f64,

    /// Crossover operator.
    pub crossover: CrossoverKind,

    /// Mutation operator.
    pub mutation: MutationKind,

    /// How children are merged into the population.
    pub replacement: ReplacementPolicy,

    /// How many fresh crossover attempts to make after repair exhaustion
    /// before falling back to copies of the parents.
    pub repair_retries: usize,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Optional wall-clock time limit in milliseconds.
    ///
    /// Checked once per generation boundary, so a run may overshoot by one
    /// generation's worth of work.
    pub time_limit_ms: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 10_000,
            tournament_size: 4,
            crossover_rate: 0.9,
            mutation_rate: 0.1,
            crossover: CrossoverKind::default(),
            mutation: MutationKind::default(),
            replacement: ReplacementPolicy::default(),
            repair_retries: 3,
            seed: None,
            time_limit_ms: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the generation budget.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the tournament pool size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the crossover operator.
    pub fn with_crossover(mut self, kind: CrossoverKind) -> Self {
        self.crossover = kind;
        self
    }

    /// Sets the mutation operator.
    pub fn with_mutation(mut self, kind: MutationKind) -> Self {
        self.mutation = kind;
        self
    }

    /// Sets the replacement policy.
    pub fn with_replacement(mut self, policy: ReplacementPolicy) -> Self {
        self.replacement = policy;
        self
    }

    /// Sets the number of crossover retries after repair exhaustion.
    pub fn with_repair_retries(mut self, n: usize) -> Self {
        self.repair_retries = n;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Preset for quick runs on small instances.
    ///
    /// - Population: 50, Generations: 2_000, Time limit: 10s
    pub fn fast() -> Self {
        Self {
            population_size: 50,
            max_generations: 2_000,
            time_limit_ms: Some(10_000),
            ..Self::default()
        }
    }

    /// Preset balancing tour quality and run time.
    ///
    /// - Population: 100, Generations: 10_000, Time limit: 30s
    pub fn balanced() -> Self {
        Self {
            population_size: 100,
            max_generations: 10_000,
            time_limit_ms: Some(30_000),
            ..Self::default()
        }
    }

    /// Preset for large instances: bigger population, longer budget,
    /// stronger tournament.
    ///
    /// - Population: 1_000, Generations: 100_000, Tournament: 7, Time limit: 60s
    pub fn quality() -> Self {
        Self {
            population_size: 1_000,
            max_generations: 100_000,
            tournament_size: 7,
            time_limit_ms: Some(60_000),
            ..Self::default()
        }
    }

    /// Validates the configuration against an instance of `n_cities` cities.
    ///
    /// # Errors
    /// [`TourError::InvalidConfiguration`] naming the first offending parameter.
    pub fn validate(&self, n_cities: usize) -> TourResult<()> {
        if self.population_size == 0 {
            return Err(TourError::config("population_size must be at least 1"));
        }
        if self.max_generations == 0 {
            return Err(TourError::config("max_generations must be at least 1"));
        }
        if self.tournament_size == 0 || self.tournament_size > self.population_size {
            return Err(TourError::config(format!(
                "tournament_size must be in [1, {}], got {}",
                self.population_size, self.tournament_size
            )));
        }
        check_rate("crossover_rate", self.crossover_rate)?;
        check_rate("mutation_rate", self.mutation_rate)?;

        if let CrossoverKind::MultiPoint(points) = self.crossover {
            if points == 0 {
                return Err(TourError::config("num_points must be at least 1"));
            }
            // Cuts are drawn from [1, N-1), which holds N-2 positions.
            if points.saturating_add(1) >= n_cities {
                return Err(TourError::config(format!(
                    "num_points must be below {} for {n_cities} cities, got {points}",
                    n_cities.saturating_sub(1)
                )));
            }
        }
        if self.mutation == MutationKind::MultiSwap(0) {
            return Err(TourError::config("num_swaps must be at least 1"));
        }
        if self.time_limit_ms == Some(0) {
            return Err(TourError::config("time_limit_ms must be positive or None"));
        }
        Ok(())
    }
}

pub(crate) fn check_rate(name: &str, rate: f64) -> TourResult<()> {
    if (0.0..=1.0).contains(&rate) {
        Ok(())
    } else {
        Err(TourError::config(format!(
            "{name} must be in [0, 1], got {rate}"
        )))
    }
}
