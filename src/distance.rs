//! Symmetric distance matrix between cities.
//!
//! [`DistanceMatrix`] is the only input the GA consumes. It is validated
//! once at construction and never mutated afterwards, so fitness
//! evaluation can read it from any number of threads.
//!
//! Cities are addressed by 1-based ids (`1..=N`); the matrix stores
//! them at index `id - 1`.

use crate::error::{TourError, TourResult};

/// Tolerance used when checking symmetry of floating-point input.
const SYMMETRY_EPS: f64 = 1e-9;

/// Immutable N×N symmetric, zero-diagonal, non-negative cost matrix.
///
/// # Examples
///
/// ```
/// use tour_ga::DistanceMatrix;
///
/// let m = DistanceMatrix::from_rows(vec![
///     vec![0.0, 1.0, 2.0],
///     vec![1.0, 0.0, 1.5],
///     vec![2.0, 1.5, 0.0],
/// ])
/// .unwrap();
///
/// assert_eq!(m.len(), 3);
/// assert_eq!(m.distance(1, 3), 2.0);
/// assert_eq!(m.tour_length(&[1, 2, 3]), 4.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Builds a matrix from full rows.
    ///
    /// # Errors
    /// [`TourError::InvalidMatrix`] if the input is empty, not square,
    /// asymmetric, has a non-zero diagonal, or holds negative or
    /// non-finite values.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> TourResult<Self> {
        let n = rows.len();
        if n == 0 {
            return Err(TourError::matrix("matrix must contain at least one city"));
        }

        let mut data = Vec::with_capacity(n * n);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(TourError::matrix(format!(
                    "row {i} has {} entries, expected {n}",
                    row.len()
                )));
            }
            data.extend(row);
        }

        let matrix = Self { n, data };
        matrix.check()?;
        Ok(matrix)
    }

    /// Builds a matrix from rows that omit the diagonal.
    ///
    /// Row `i` lists the costs from city `i + 1` to every other city in id
    /// order, skipping itself, so each row has `N - 1` entries. This is the
    /// edge layout used by TSPLIB XML instances.
    ///
    /// # Errors
    /// Same as [`from_rows`](Self::from_rows), plus a row of the wrong length.
    pub fn from_off_diagonal(rows: Vec<Vec<f64>>) -> TourResult<Self> {
        let n = rows.len();
        let mut full = Vec::with_capacity(n);
        for (i, mut row) in rows.into_iter().enumerate() {
            if row.len() + 1 != n {
                return Err(TourError::matrix(format!(
                    "row {i} has {} off-diagonal entries, expected {}",
                    row.len(),
                    n.saturating_sub(1)
                )));
            }
            row.insert(i, 0.0);
            full.push(row);
        }
        Self::from_rows(full)
    }

    /// Builds a Euclidean matrix from planar coordinates.
    ///
    /// City `i + 1` sits at `coords[i]`.
    ///
    /// # Errors
    /// [`TourError::InvalidMatrix`] if `coords` is empty or holds
    /// non-finite values.
    pub fn from_coordinates(coords: &[(f64, f64)]) -> TourResult<Self> {
        let n = coords.len();
        if n == 0 {
            return Err(TourError::matrix("matrix must contain at least one city"));
        }

        let mut data = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let (xi, yi) = coords[i];
                let (xj, yj) = coords[j];
                let d = ((xi - xj).powi(2) + (yi - yj).powi(2)).sqrt();
                data[i * n + j] = d;
                data[j * n + i] = d;
            }
        }

        let matrix = Self { n, data };
        matrix.check()?;
        Ok(matrix)
    }

    /// Number of cities.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Always `false`: construction rejects empty matrices.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Distance between two cities given by 1-based id.
    ///
    /// # Panics
    /// Panics if either id is outside `1..=N`.
    #[inline]
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.data[(from - 1) * self.n + (to - 1)]
    }

    /// Total length of a closed tour: consecutive legs plus the leg from
    /// the last city back to the first.
    ///
    /// An empty tour has length 0.
    ///
    /// # Panics
    /// Panics if the tour holds an id outside `1..=N`.
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        let (first, last) = match (tour.first(), tour.last()) {
            (Some(&f), Some(&l)) => (f, l),
            _ => return 0.0,
        };
        let open: f64 = tour
            .windows(2)
            .map(|leg| self.distance(leg[0], leg[1]))
            .sum();
        open + self.distance(last, first)
    }

    /// Full row for a city (1-based id), in id order.
    ///
    /// # Panics
    /// Panics if `city` is outside `1..=N`.
    pub fn row(&self, city: usize) -> &[f64] {
        let start = (city - 1) * self.n;
        &self.data[start..start + self.n]
    }

    fn check(&self) -> TourResult<()> {
        let n = self.n;
        for i in 0..n {
            let diag = self.data[i * n + i];
            if diag != 0.0 {
                return Err(TourError::matrix(format!(
                    "diagonal entry ({i}, {i}) is {diag}, expected 0"
                )));
            }
            for j in 0..n {
                let d = self.data[i * n + j];
                if !d.is_finite() || d < 0.0 {
                    return Err(TourError::matrix(format!(
                        "entry ({i}, {j}) is {d}, expected a finite non-negative value"
                    )));
                }
                if j > i && (d - self.data[j * n + i]).abs() > SYMMETRY_EPS {
                    return Err(TourError::matrix(format!(
                        "entries ({i}, {j}) and ({j}, {i}) differ; matrix must be symmetric"
                    )));
                }
            }
        }
        Ok(())
    }
}
