use log::debug;
use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::base::{Cell, NaborError, Position};

/// Above this supercell atom count the distance matrix falls back to the
/// primary cell
pub const MAX_SUPERCELL_ATOMS: usize = 1_000_000_000;

/// Upper bound on the distance-matrix allocation (16 GiB)
const MAX_DISTANCE_MATRIX_BYTES: u64 = 17_179_869_184;

/// Midpoint factor between the first and second neighbor shell of a
/// close-packed lattice
const CUTOFF_SCALE: f64 = (1.0 + std::f64::consts::SQRT_2) / 2.0;

#[derive(Debug)]
/// Geometric substrate shared by the CNA and similarity analyses: the 3x3x3
/// supercell expansion of an atomic configuration and the full symmetric
/// matrix of interatomic distances.
pub struct State {
    cell: Cell,
    /// Supercell positions; indices `[0, num_atoms)` refer to the primary cell
    positions: Vec<Position>,
    /// `distances[(i, j)]` is the distance between atoms `i` and `j` over the
    /// scan range. Symmetric, zero diagonal.
    distances: DMatrix<f32>,
}

impl State {
    /// Expand the supercell and compute all interatomic distances.
    ///
    /// Fails with `ResourceExhausted` when the distance matrix would exceed
    /// 16 GiB.
    pub fn build(cell: Cell) -> Result<Self, NaborError> {
        let num_atoms = cell.num_atoms();

        let positions = if cell.periodic {
            Self::supercell_positions(&cell)
        } else {
            cell.positions.clone()
        };

        let scan = if cell.periodic && 27 * num_atoms <= MAX_SUPERCELL_ATOMS {
            27 * num_atoms
        } else {
            num_atoms
        };

        let memsize = (scan as u64) * (scan as u64) * (std::mem::size_of::<f32>() as u64);
        if memsize > MAX_DISTANCE_MATRIX_BYTES {
            return Err(NaborError::ResourceExhausted(format!(
                "distance matrix for {} atoms requires {} bytes, limit is {}",
                scan, memsize, MAX_DISTANCE_MATRIX_BYTES
            )));
        }

        debug!("calculating {}x{} interatomic distances", scan, scan);
        let distances = Self::calculate_distances(&positions, scan);

        Ok(Self {
            cell,
            positions,
            distances,
        })
    }

    /// Tile the primary cell over the 27 replicas, identity tile first.
    fn supercell_positions(cell: &Cell) -> Vec<Position> {
        let mut positions = Vec::with_capacity(27 * cell.num_atoms());
        positions.extend_from_slice(&cell.positions);

        for i in -1..=1 {
            for j in -1..=1 {
                for k in -1..=1 {
                    if (i, j, k) == (0, 0, 0) {
                        continue;
                    }
                    let translation = cell.lattice.tile_translation(i, j, k);
                    for position in &cell.positions {
                        positions.push(position + translation);
                    }
                }
            }
        }

        positions
    }

    fn calculate_distances(positions: &[Position], scan: usize) -> DMatrix<f32> {
        let mut distances = DMatrix::<f32>::zeros(scan, scan);
        if scan == 0 {
            return distances;
        }
        // column-major storage: each chunk is one column, which equals the
        // corresponding row by symmetry of the norm
        distances
            .as_mut_slice()
            .par_chunks_mut(scan)
            .enumerate()
            .for_each(|(j, column)| {
                let pj = positions[j];
                for (i, entry) in column.iter_mut().enumerate() {
                    *entry = (positions[i] - pj).norm() as f32;
                }
            });
        distances
    }

    /// Number of atoms in the primary cell
    pub fn nr_atoms(&self) -> usize {
        self.cell.num_atoms()
    }

    /// Number of atoms including periodic replicas
    pub fn nr_atoms_supercell(&self) -> usize {
        self.positions.len()
    }

    pub fn is_periodic(&self) -> bool {
        self.cell.periodic
    }

    /// Cartesian position of atom `index` over `[0, nr_atoms_supercell())`
    pub fn position(&self, index: usize) -> &Position {
        &self.positions[index]
    }

    /// Element symbols of the primary cell
    pub fn elements(&self) -> &[String] {
        &self.cell.elements
    }

    /// The full symmetric distance matrix
    pub fn distances(&self) -> &DMatrix<f32> {
        &self.distances
    }

    /// Number of atoms covered by the distance matrix; neighbor searches scan
    /// `[0, scan_range())`
    pub fn scan_range(&self) -> usize {
        self.distances.nrows()
    }

    /// Distance cutoff separating the first and second neighbor shell of
    /// `atom`: the mean over the six smallest non-self distances, scaled to
    /// the shell midpoint of a close-packed lattice. Lists shorter than six
    /// are padded by repeating their last entry.
    pub fn cutoff(&self, atom: usize) -> f64 {
        let mut sorted: Vec<f32> = (0..self.scan_range())
            .filter(|&j| j != atom)
            .map(|j| self.distances[(atom, j)])
            .collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let mut sum = 0.0;
        let mut last = 0.0;
        for i in 0..6 {
            let value = if i < sorted.len() {
                sorted[i] as f64
            } else {
                last
            };
            sum += value;
            last = value;
        }

        sum / 6.0 * CUTOFF_SCALE
    }

    /// Indices of all atoms within `cutoff` of `atom`, in ascending order;
    /// primary-cell atoms come before periodic replicas.
    pub fn neighbors(&self, atom: usize, cutoff: f64) -> Vec<usize> {
        (0..self.scan_range())
            .filter(|&j| j != atom && (self.distances[(atom, j)] as f64) < cutoff)
            .collect()
    }

    /// Symmetric zero-diagonal matrix of distances among `neighbors`
    pub fn local_distance_matrix(&self, neighbors: &[usize]) -> DMatrix<f64> {
        let k = neighbors.len();
        DMatrix::from_fn(k, k, |i, j| {
            if i == j {
                0.0
            } else {
                self.distances[(neighbors[i], neighbors[j])] as f64
            }
        })
    }

    /// Symmetric zero-diagonal boolean matrix marking which neighbor pairs
    /// are themselves within `cutoff`
    pub fn local_adjacency_matrix(&self, neighbors: &[usize], cutoff: f64) -> DMatrix<bool> {
        let k = neighbors.len();
        DMatrix::from_fn(k, k, |i, j| {
            i != j && (self.distances[(neighbors[i], neighbors[j])] as f64) < cutoff
        })
    }
}
