use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::lattice::Lattice;

/// Cartesian coordinates in angstrom
pub type Position = Vector3<f64>;

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Representing an atomic configuration
pub struct Cell {
    /// Lattice of the cell.
    pub lattice: Lattice,
    /// `positions[i]` is the cartesian coordinates of the i-th atom.
    pub positions: Vec<Position>,
    /// `elements[i]` is the element symbol of the i-th atom.
    pub elements: Vec<String>,
    /// Whether the cell repeats periodically in all three directions.
    pub periodic: bool,
}

impl Cell {
    pub fn new(
        lattice: Lattice,
        positions: Vec<Position>,
        elements: Vec<String>,
        periodic: bool,
    ) -> Self {
        if positions.len() != elements.len() {
            panic!("positions and elements should be the same length");
        }
        Self {
            lattice,
            positions,
            elements,
            periodic,
        }
    }

    /// Return the number of atoms in the cell.
    pub fn num_atoms(&self) -> usize {
        self.positions.len()
    }
}

#[cfg(test)]
mod tests {
    use std::panic;

    use nalgebra::{vector, Matrix3};

    use super::Cell;
    use crate::base::lattice::Lattice;

    #[test]
    fn test_mismatched_length() {
        let lattice = Lattice::new(Matrix3::<f64>::identity());
        let positions = vec![vector![0.0, 0.0, 0.0], vector![0.5, 0.5, 0.5]];
        let elements = vec!["Cu".to_string()];

        let result = panic::catch_unwind(|| Cell::new(lattice, positions, elements, false));
        assert!(result.is_err());
    }
}
