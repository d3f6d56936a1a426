//! Grid input for the risk propagation simulation endpoint.

use serde::{Deserialize, Serialize};

/// Default wind multiplier applied to spread probability.
pub const DEFAULT_WIND_FACTOR: f64 = 1.0;

/// Default number of propagation steps.
pub const DEFAULT_STEPS: u32 = 3;

/// A non-empty, rectangular grid of cell risk values in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct SimulationGrid {
    rows: Vec<Vec<f64>>,
}

impl SimulationGrid {
    /// Validates and wraps a grid.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidGridError`] if the grid is empty, ragged, or holds a
    /// value outside `[0, 1]`.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, InvalidGridError> {
        let Some(width) = rows.first().map(Vec::len) else {
            return Err(InvalidGridError::Empty);
        };
        if width == 0 {
            return Err(InvalidGridError::Empty);
        }

        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != width {
                return Err(InvalidGridError::Ragged {
                    row,
                    expected: width,
                    actual: cells.len(),
                });
            }
            if let Some(col) = cells.iter().position(|v| !(0.0..=1.0).contains(v)) {
                return Err(InvalidGridError::OutOfRange {
                    row,
                    col,
                    value: cells[col],
                });
            }
        }

        Ok(Self { rows })
    }

    /// `(rows, columns)`.
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows.len(), self.rows[0].len())
    }

    /// Grid rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }
}

impl TryFrom<Vec<Vec<f64>>> for SimulationGrid {
    type Error = InvalidGridError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

impl From<SimulationGrid> for Vec<Vec<f64>> {
    fn from(grid: SimulationGrid) -> Self {
        grid.rows
    }
}

/// Error returned when a grid cannot be simulated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvalidGridError {
    /// The grid has no rows or no columns.
    Empty,
    /// A row's length differs from the first row's.
    Ragged {
        /// Offending row index.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        actual: usize,
    },
    /// A cell value lies outside `[0, 1]`.
    OutOfRange {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
        /// The offending value.
        value: f64,
    },
}

impl std::fmt::Display for InvalidGridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "grid must have at least one row and one column"),
            Self::Ragged {
                row,
                expected,
                actual,
            } => write!(
                f,
                "row {row} has {actual} cells, expected {expected} (grid must be rectangular)"
            ),
            Self::OutOfRange { row, col, value } => {
                write!(f, "cell ({row}, {col}) is {value}, expected a value in [0, 1]")
            }
        }
    }
}

impl std::error::Error for InvalidGridError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_rectangular_grid() {
        let grid = SimulationGrid::new(vec![vec![0.1, 0.2, 0.3], vec![0.0, 1.0, 0.5]]).unwrap();
        assert_eq!(grid.dimensions(), (2, 3));
    }

    #[test]
    fn rejects_empty_and_ragged_grids() {
        assert_eq!(SimulationGrid::new(vec![]), Err(InvalidGridError::Empty));
        assert_eq!(SimulationGrid::new(vec![vec![]]), Err(InvalidGridError::Empty));
        assert_eq!(
            SimulationGrid::new(vec![vec![0.1, 0.2], vec![0.3]]),
            Err(InvalidGridError::Ragged {
                row: 1,
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn rejects_out_of_range_cells() {
        let err = SimulationGrid::new(vec![vec![0.1, 1.5]]).unwrap_err();
        assert!(matches!(err, InvalidGridError::OutOfRange { row: 0, col: 1, .. }));
        assert!(SimulationGrid::new(vec![vec![f64::NAN]]).is_err());
    }

    #[test]
    fn deserialization_validates() {
        let ok: SimulationGrid = serde_json::from_str("[[0.2, 0.4], [0.6, 0.8]]").unwrap();
        assert_eq!(ok.dimensions(), (2, 2));
        assert!(serde_json::from_str::<SimulationGrid>("[[0.2], [0.6, 0.8]]").is_err());
    }
}
