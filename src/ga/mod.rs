//! Genetic Algorithm over tours.
//!
//! One generation of the steady-state loop:
//!
//! 1. [`TournamentSelection::parents_selection`] picks two parents.
//! 2. [`Crossover`] recombines them (or copies them) and repairs duplicates.
//! 3. [`Mutation`] perturbs each child with an independent gate.
//! 4. [`Population::replacement`] merges each child if it beats its competitor.
//! 5. The population's best score is appended to the convergence record.
//!
//! # Key Types
//!
//! - [`GaConfig`]: Algorithm parameters (population size, rates, operators, presets)
//! - [`GaRunner`]: Executes the evolutionary loop
//! - [`Evolution`]: Step-by-step access to a run
//! - [`GaResult`]: Best tour, its length, and the convergence record
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Syswerda (1989), "Uniform Crossover in Genetic Algorithms" (steady-state GA)

mod config;
mod crossover;
mod mutation;
mod population;
mod runner;
mod selection;
mod tour;

pub use config::{CrossoverKind, GaConfig, MutationKind, ReplacementPolicy};
pub use crossover::{
    multi_point_at, repair_all_duplicates, repair_first_duplicate, single_point_at, Crossover,
};
pub use mutation::{multi_swap, swap, Mutation};
pub use population::{Population, Replacement};
pub use runner::{Evolution, GaResult, GaRunner, Termination};
pub use selection::TournamentSelection;
pub use tour::{
    contains_duplicates, duplicate_positions, find_duplicate_indexes, is_permutation, random_tour,
    City, Tour,
};
