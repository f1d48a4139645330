//! Tour representation and permutation helpers.
//!
//! A [`Tour`] is an ordered sequence of 1-based city ids, read as a closed
//! cycle. A valid tour over `N` cities is a permutation of `1..=N`.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// 1-based city id.
pub type City = usize;

/// A chromosome: ordered sequence of city ids.
pub type Tour = Vec<City>;

/// Creates a uniformly random permutation of `1..=n`.
pub fn random_tour<R: Rng>(n: usize, rng: &mut R) -> Tour {
    let mut tour: Tour = (1..=n).collect();
    tour.shuffle(rng);
    tour
}

/// Checks that `tour` holds every id in `1..=n` exactly once.
pub fn is_permutation(tour: &[City], n: usize) -> bool {
    if tour.len() != n {
        return false;
    }
    let mut seen = vec![false; n + 1];
    for &city in tour {
        if city == 0 || city > n || seen[city] {
            return false;
        }
        seen[city] = true;
    }
    true
}

/// Reports whether any city id occurs more than once.
pub fn contains_duplicates(tour: &[City]) -> bool {
    let mut seen = HashSet::with_capacity(tour.len());
    !tour.iter().all(|city| seen.insert(*city))
}

/// Returns the positions of the first value that repeats.
///
/// Scans left to right and stops at the second occurrence of the first
/// repeated value, returning `(first_index, second_index)`. Later
/// duplicate pairs are not reported.
///
/// ```
/// use tour_ga::ga::find_duplicate_indexes;
///
/// assert_eq!(find_duplicate_indexes(&[1, 2, 3, 2]), Some((1, 3)));
/// assert_eq!(find_duplicate_indexes(&[1, 2, 3, 4]), None);
/// ```
pub fn find_duplicate_indexes(tour: &[City]) -> Option<(usize, usize)> {
    let mut seen: HashMap<City, usize> = HashMap::with_capacity(tour.len());
    for (index, &city) in tour.iter().enumerate() {
        if let Some(&first) = seen.get(&city) {
            return Some((first, index));
        }
        seen.insert(city, index);
    }
    None
}

/// Positions holding a value already seen earlier in the tour, in order.
pub fn duplicate_positions(tour: &[City]) -> Vec<usize> {
    let mut seen = HashSet::with_capacity(tour.len());
    tour.iter()
        .enumerate()
        .filter(|(_, city)| !seen.insert(**city))
        .map(|(i, _)| i)
        .collect()
}
