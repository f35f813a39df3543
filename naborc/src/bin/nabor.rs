use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use nabor::io::{read_geometry, write_cna_report_file, write_similarity_report_file};
use nabor::{CnaAnalysis, PatternLibrary, SimilarityAnalysis, State};

/// Classify local atomic environments by common neighbor analysis, or
/// quantify their pairwise geometric similarity.
#[derive(Parser)]
#[command(name = "nabor", version, about)]
struct Args {
    /// Input geometry (POSCAR/CONTCAR, .xyz or .geo)
    #[arg(short, long)]
    input: PathBuf,

    /// Output report file
    #[arg(short, long)]
    output: PathBuf,

    /// Pattern library (patterns.json); required for the CNA analysis
    #[arg(short, long)]
    pattern: Option<PathBuf>,

    /// Run the similarity analysis instead of the CNA
    #[arg(short, long)]
    similarity: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("nabor v{}", env!("CARGO_PKG_VERSION"));

    let started = Instant::now();

    let cell = read_geometry(&args.input)
        .with_context(|| format!("cannot read geometry from {}", args.input.display()))?;
    println!("Geometry file contains {} atoms.", cell.num_atoms());

    let state = State::build(cell).context("cannot set up the analysis state")?;

    if args.similarity {
        let nr_atoms = state.nr_atoms() as u64;
        let bar = ProgressBar::new(nr_atoms * nr_atoms.saturating_sub(1) / 2);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} pairs ({eta} remaining)")
                .expect("template is valid"),
        );
        let analysis = SimilarityAnalysis::with_progress(&state, |_, _| bar.inc(1));
        bar.finish();

        write_similarity_report_file(&args.output, &state, &analysis)
            .with_context(|| format!("cannot write report to {}", args.output.display()))?;
    } else {
        let Some(pattern_path) = args.pattern.as_deref() else {
            bail!("the CNA analysis requires a pattern library (-p patterns.json)");
        };
        let library = PatternLibrary::load(pattern_path)
            .with_context(|| format!("cannot read pattern library {}", pattern_path.display()))?;

        let analysis = CnaAnalysis::new(&state);
        write_cna_report_file(&args.output, &state, &analysis, &library)
            .with_context(|| format!("cannot write report to {}", args.output.display()))?;
    }

    info!("report written to {}", args.output.display());
    println!("Done in {:.2} seconds.", started.elapsed().as_secs_f64());

    Ok(())
}
