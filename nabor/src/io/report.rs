use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;
use itertools::Itertools;

use crate::base::NaborError;
use crate::cna::CnaAnalysis;
use crate::pattern::PatternLibrary;
use crate::similarity::SimilarityAnalysis;
use crate::state::State;

const SEPARATOR_WIDTH: usize = 100;

/// Write the CNA report: header, per-atom classification table, abundancy
/// statistics and the adjacency-matrix dump.
pub fn write_cna_report(
    out: &mut impl Write,
    state: &State,
    analysis: &CnaAnalysis,
    library: &PatternLibrary,
) -> Result<(), NaborError> {
    let line = "-".repeat(SEPARATOR_WIDTH);
    let nr_atoms = state.nr_atoms();

    write_header(out, nr_atoms)?;
    writeln!(
        out,
        "#     atom           x             y             z   color       pattern  fingerprint"
    )?;
    writeln!(out, "{}", line)?;

    for atom in 0..nr_atoms {
        let position = state.position(atom);
        let fingerprint = &analysis.fingerprints[atom];
        writeln!(
            out,
            "{:04}  {:>2}  {:12.6}  {:12.6}  {:12.6}  {:>6}  {:>12}  {}",
            atom + 1,
            state.elements()[atom],
            position[0],
            position[1],
            position[2],
            library.get(fingerprint)?.color,
            library.identify(fingerprint)?,
            fingerprint
        )?;
    }
    writeln!(out, "{}", line)?;
    writeln!(out)?;

    // abundancy statistics, most common motif first
    let abundancies = analysis
        .fingerprints
        .iter()
        .counts()
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)))
        .collect::<Vec<_>>();

    writeln!(out, "Statistics")?;
    writeln!(out, "{}", line)?;
    writeln!(out, " #atom    perc      pattern fingerprint")?;
    writeln!(out, "{}", line)?;
    for (fingerprint, count) in abundancies {
        writeln!(
            out,
            "{:6}  {:5.2}% {:>12} {}",
            count,
            count as f64 / nr_atoms as f64 * 100.0,
            library.identify(fingerprint)?,
            fingerprint
        )?;
    }
    writeln!(out)?;

    writeln!(out, "{}", line)?;
    writeln!(out, "ADJACENCY MATRICES")?;
    writeln!(out, "{}", line)?;
    writeln!(out)?;
    for atom in 0..nr_atoms {
        writeln!(out, "{}", line)?;
        write!(out, "Atom {} ( ", atom + 1)?;
        for &id in &analysis.neighbor_ids[atom] {
            if id >= nr_atoms {
                // periodic image; refer back to its primary-cell atom
                write!(out, "/{}/ ", id % nr_atoms + 1)?;
            } else {
                write!(out, "{} ", id + 1)?;
            }
        }
        writeln!(out, ")")?;
        writeln!(out, "{}", line)?;

        let adjacency = &analysis.adjacency_matrices[atom];
        for i in 0..adjacency.nrows() {
            let row = (0..adjacency.ncols())
                .map(|j| if adjacency[(i, j)] { "1" } else { "0" })
                .join(" ");
            writeln!(out, "{}", row)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "{}", line)?;
    writeln!(out, "Done")?;
    Ok(())
}

pub fn write_cna_report_file(
    path: &Path,
    state: &State,
    analysis: &CnaAnalysis,
    library: &PatternLibrary,
) -> Result<(), NaborError> {
    let mut out = BufWriter::new(File::create(path)?);
    write_cna_report(&mut out, state, analysis, library)
}

/// Write the similarity report: header, one row per ordered atom pair and the
/// local distance-matrix dump.
pub fn write_similarity_report(
    out: &mut impl Write,
    state: &State,
    analysis: &SimilarityAnalysis,
) -> Result<(), NaborError> {
    let line = "-".repeat(SEPARATOR_WIDTH);
    let nr_atoms = state.nr_atoms();

    write_header(out, nr_atoms)?;
    for i in 0..nr_atoms {
        for j in 0..nr_atoms {
            let rows_i = analysis.distance_matrices[i].nrows();
            let rows_j = analysis.distance_matrices[j].nrows();
            if i == j {
                writeln!(
                    out,
                    "{:04}  {:04}  {:02}  {:02}  {:>12}  {:>6}",
                    i + 1,
                    j + 1,
                    rows_i,
                    rows_j,
                    "N/A",
                    "N/A"
                )?;
            } else {
                writeln!(
                    out,
                    "{:04}  {:04}  {:02}  {:02}  {:12.6}  {:6.2} s",
                    i + 1,
                    j + 1,
                    rows_i,
                    rows_j,
                    analysis.pair_distance[(i, j)],
                    analysis.pair_time[(i, j)]
                )?;
            }
        }
    }
    writeln!(out)?;

    writeln!(out, "{}", line)?;
    writeln!(out, "DISTANCE MATRICES")?;
    writeln!(out, "{}", line)?;
    writeln!(out)?;
    for atom in 0..nr_atoms {
        writeln!(out, "{}", line)?;
        writeln!(out, "Atom {}", atom + 1)?;
        writeln!(out, "{}", line)?;
        let matrix = &analysis.distance_matrices[atom];
        for i in 0..matrix.nrows() {
            let row = (0..matrix.ncols())
                .map(|j| format!("{:.5}", matrix[(i, j)]))
                .join(" ");
            writeln!(out, "{}", row)?;
        }
        writeln!(out)?;
    }

    Ok(())
}

pub fn write_similarity_report_file(
    path: &Path,
    state: &State,
    analysis: &SimilarityAnalysis,
) -> Result<(), NaborError> {
    let mut out = BufWriter::new(File::create(path)?);
    write_similarity_report(&mut out, state, analysis)
}

fn write_header(out: &mut impl Write, nr_atoms: usize) -> Result<(), NaborError> {
    let line = "-".repeat(SEPARATOR_WIDTH);
    writeln!(out, "{}", line)?;
    writeln!(out, "nabor v{}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "{}", line)?;
    writeln!(out, "Run date: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "{}", line)?;
    writeln!(out, "Number of atoms: {}", nr_atoms)?;
    writeln!(out, "{}", line)?;
    Ok(())
}
