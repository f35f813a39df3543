use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use log::debug;
use nalgebra::DMatrix;
use rayon::prelude::*;

use super::metric::distance_metric;
use super::permutation::{PermutationTable, MAX_PERMUTATION_SIZE};
use crate::state::State;

/// Sentinel recorded on the diagonal and for refused or failed pairs
pub const SKIPPED: f64 = -1.0;

#[derive(Debug)]
/// Pairwise result of the similarity analysis
pub struct SimilarityAnalysis {
    /// Minimal permutation-invariant distance per unordered atom pair;
    /// [`SKIPPED`] on the diagonal and for pairs whose embedding size exceeds
    /// [`MAX_PERMUTATION_SIZE`]
    pub pair_distance: DMatrix<f64>,
    /// Wall-clock seconds spent per pair; [`SKIPPED`] on the diagonal
    pub pair_time: DMatrix<f64>,
    /// Local distance matrix of each atom's neighbor shell
    pub distance_matrices: Vec<DMatrix<f64>>,
    /// Neighbor indices of each atom, over the supercell scan range
    pub neighbor_ids: Vec<Vec<usize>>,
}

impl SimilarityAnalysis {
    pub fn new(state: &State) -> Self {
        Self::with_progress(state, |_, _| {})
    }

    /// Run the similarity analysis over all `N(N-1)/2` unordered atom pairs,
    /// invoking `progress(done, total)` after every completed pair.
    ///
    /// Jobs are pulled dynamically by the worker threads; per-pair refusals
    /// are recorded as [`SKIPPED`] and never abort the run.
    pub fn with_progress(state: &State, progress: impl Fn(usize, usize) + Sync) -> Self {
        let nr_atoms = state.nr_atoms();

        debug!("constructing local distance matrices for {} atoms", nr_atoms);
        let locals: Vec<(DMatrix<f64>, Vec<usize>)> = (0..nr_atoms)
            .into_par_iter()
            .map(|atom| {
                let cutoff = state.cutoff(atom);
                let neighbors = state.neighbors(atom, cutoff);
                (state.local_distance_matrix(&neighbors), neighbors)
            })
            .collect();
        let (distance_matrices, neighbor_ids): (Vec<_>, Vec<_>) = locals.into_iter().unzip();

        // materialize the permutation tables the pair jobs will draw from;
        // oversize environments are refused per pair later
        let mut table = PermutationTable::new();
        for dm in &distance_matrices {
            let size = dm.nrows();
            if (1..=MAX_PERMUTATION_SIZE).contains(&size) {
                table
                    .ensure(size)
                    .expect("size is within the supported range");
            }
        }

        let jobs: Vec<(usize, usize)> = (0..nr_atoms)
            .flat_map(|i| ((i + 1)..nr_atoms).map(move |j| (i, j)))
            .collect();
        let total = jobs.len();
        debug!("executing {} similarity jobs", total);

        let counter = AtomicUsize::new(0);
        let table_ref = &table;
        let progress_ref = &progress;
        let results: Vec<(usize, usize, f64, f64)> = jobs
            .into_par_iter()
            .map(|(i, j)| {
                let started = Instant::now();
                let distance =
                    match distance_metric(&distance_matrices[i], &distance_matrices[j], table_ref)
                    {
                        Ok(result) => result.distance,
                        Err(_) => SKIPPED,
                    };
                let elapsed = started.elapsed().as_secs_f64();

                let done = counter.fetch_add(1, Ordering::Relaxed) + 1;
                progress_ref(done, total);

                (i, j, distance, elapsed)
            })
            .collect();

        let mut pair_distance = DMatrix::from_element(nr_atoms, nr_atoms, SKIPPED);
        let mut pair_time = DMatrix::from_element(nr_atoms, nr_atoms, SKIPPED);
        for (i, j, distance, time) in results {
            pair_distance[(i, j)] = distance;
            pair_distance[(j, i)] = distance;
            pair_time[(i, j)] = time;
            pair_time[(j, i)] = time;
        }

        Self {
            pair_distance,
            pair_time,
            distance_matrices,
            neighbor_ids,
        }
    }
}
