use itertools::Itertools;
use log::debug;
use nalgebra::DMatrix;
use rayon::prelude::*;

use super::triplet::CnaTriplet;
use crate::state::State;

#[derive(Debug)]
/// Per-atom result of the common neighbor analysis
pub struct CnaAnalysis {
    /// Canonical fingerprint of each atom's local environment
    pub fingerprints: Vec<String>,
    /// Local adjacency matrix of each atom's neighbor shell
    pub adjacency_matrices: Vec<DMatrix<bool>>,
    /// Neighbor indices of each atom, over the supercell scan range
    pub neighbor_ids: Vec<Vec<usize>>,
}

impl CnaAnalysis {
    /// Classify the local environment of every atom in the primary cell.
    ///
    /// Atoms are independent; the analysis runs in parallel over the atom
    /// index range.
    pub fn new(state: &State) -> Self {
        debug!("starting common neighbor analysis for {} atoms", state.nr_atoms());

        let per_atom: Vec<(String, DMatrix<bool>, Vec<usize>)> = (0..state.nr_atoms())
            .into_par_iter()
            .map(|atom| {
                let cutoff = state.cutoff(atom);
                let neighbors = state.neighbors(atom, cutoff);
                let adjacency = state.local_adjacency_matrix(&neighbors, cutoff);
                let fingerprint = fingerprint_from_adjacency(&adjacency);
                (fingerprint, adjacency, neighbors)
            })
            .collect();

        let mut fingerprints = Vec::with_capacity(per_atom.len());
        let mut adjacency_matrices = Vec::with_capacity(per_atom.len());
        let mut neighbor_ids = Vec::with_capacity(per_atom.len());
        for (fingerprint, adjacency, neighbors) in per_atom {
            fingerprints.push(fingerprint);
            adjacency_matrices.push(adjacency);
            neighbor_ids.push(neighbors);
        }

        Self {
            fingerprints,
            adjacency_matrices,
            neighbor_ids,
        }
    }

    pub fn fingerprint(&self, atom: usize) -> &str {
        &self.fingerprints[atom]
    }
}

/// Assemble the canonical fingerprint of a local adjacency matrix: one CNA
/// triplet per neighbor, identical triplets counted, tokens emitted in
/// descending lexicographic order of the rendered triplet.
pub fn fingerprint_from_adjacency(adjacency: &DMatrix<bool>) -> String {
    (0..adjacency.nrows())
        .map(|index| CnaTriplet::new(adjacency, index).to_string())
        .counts()
        .into_iter()
        .sorted_by(|(a, _), (b, _)| b.cmp(a))
        .map(|(triplet, count)| format!("{}{}", count, triplet))
        .collect()
}
