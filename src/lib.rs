//! Permutation genetic algorithm for the symmetric travelling salesman problem.
//!
//! Evolves a population of closed tours over a fixed [`DistanceMatrix`]
//! to minimize total travel distance:
//!
//! - **Population**: tours, cached tour lengths, best-known solution, and
//!   steady-state replacement.
//! - **Tournament selection**: sample `k` members with replacement, keep
//!   the shortest.
//! - **Crossover**: single- and multi-point recombination followed by a
//!   repair step that restores the permutation invariant.
//! - **Mutation**: swap and multi-swap transpositions.
//! - **Runner**: the generational loop with a seeded RNG, cancellation and
//!   a wall-clock limit.
//!
//! Every tour observable through the public API is a permutation of the
//! 1-based city ids `1..=N`.
//!
//! # Example
//!
//! ```
//! use tour_ga::{DistanceMatrix, GaConfig, GaRunner};
//!
//! let matrix = DistanceMatrix::from_rows(vec![
//!     vec![0.0, 1.0, 2.0, 1.0],
//!     vec![1.0, 0.0, 1.0, 2.0],
//!     vec![2.0, 1.0, 0.0, 1.0],
//!     vec![1.0, 2.0, 1.0, 0.0],
//! ])
//! .unwrap();
//!
//! let config = GaConfig::default()
//!     .with_population_size(10)
//!     .with_max_generations(1000)
//!     .with_seed(15);
//!
//! let result = GaRunner::run(&matrix, &config).unwrap();
//! assert_eq!(result.best_score, 4.0);
//! ```
//!
//! Distance data ingestion, run logs on disk, and plotting are left to
//! callers; the crate only logs through the [`log`] facade.

pub mod distance;
pub mod error;
pub mod ga;

pub use distance::DistanceMatrix;
pub use error::{TourError, TourResult};
pub use ga::{GaConfig, GaResult, GaRunner};
