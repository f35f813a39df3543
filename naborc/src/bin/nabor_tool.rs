use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use nabor::PatternLibrary;

/// Manage a pattern library: create, list, validate, and add, edit or delete
/// individual patterns.
#[derive(Parser)]
#[command(name = "nabor-tool", version, about)]
struct Args {
    /// Pattern library (patterns.json)
    #[arg(short, long)]
    pattern: PathBuf,

    /// Create a new empty pattern library
    #[arg(short, long)]
    create: bool,

    /// List all patterns in the library
    #[arg(short, long)]
    list: bool,

    /// Validate all fingerprints in the library
    #[arg(short, long)]
    validate: bool,

    /// Add a pattern, given as KEY;FINGERPRINT;LABEL;COLOR
    #[arg(short, long, value_name = "PATTERN")]
    add: Option<String>,

    /// Edit an existing pattern, given as KEY;FINGERPRINT;LABEL;COLOR
    #[arg(short, long, value_name = "PATTERN")]
    edit: Option<String>,

    /// Delete the pattern stored under KEY
    #[arg(short, long, value_name = "KEY")]
    delete: Option<String>,
}

fn split_pattern_argument(argument: &str) -> anyhow::Result<[&str; 4]> {
    let pieces: Vec<&str> = argument.split(';').map(str::trim).collect();
    let &[key, fingerprint, label, color] = pieces.as_slice() else {
        bail!("expected KEY;FINGERPRINT;LABEL;COLOR, got '{argument}'");
    };
    Ok([key, fingerprint, label, color])
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("nabor-tool v{}", env!("CARGO_PKG_VERSION"));

    if args.create {
        let library = PatternLibrary::new();
        library
            .save(&args.pattern)
            .with_context(|| format!("cannot write {}", args.pattern.display()))?;
        println!("Created empty pattern library: {}", args.pattern.display());
        return Ok(());
    }

    let mut library = PatternLibrary::load(&args.pattern)
        .with_context(|| format!("cannot read pattern library {}", args.pattern.display()))?;

    if args.list {
        println!("{:<20} {:<20} {:>6}  fingerprint", "key", "label", "color");
        for pattern in library.patterns() {
            println!(
                "{:<20} {:<20} {:>6}  {}",
                pattern.key, pattern.label, pattern.color, pattern.fingerprint
            );
        }
        return Ok(());
    }

    if args.validate {
        let mut invalid = 0;
        for pattern in library.patterns() {
            if PatternLibrary::is_valid_fingerprint(&pattern.fingerprint) {
                println!("{:<20} ok", pattern.key);
            } else {
                println!("{:<20} INVALID: {}", pattern.key, pattern.fingerprint);
                invalid += 1;
            }
        }
        if invalid > 0 {
            bail!("{invalid} invalid fingerprints found");
        }
        return Ok(());
    }

    if let Some(argument) = args.add.as_deref() {
        let [key, fingerprint, label, color] = split_pattern_argument(argument)?;
        library.add(key, fingerprint, label, color)?;
        library.save(&args.pattern)?;
        println!("Added pattern '{key}'.");
        return Ok(());
    }

    if let Some(argument) = args.edit.as_deref() {
        let [key, fingerprint, label, color] = split_pattern_argument(argument)?;
        library.edit(key, fingerprint, label, color)?;
        library.save(&args.pattern)?;
        println!("Edited pattern '{key}'.");
        return Ok(());
    }

    if let Some(key) = args.delete.as_deref() {
        library.remove(key)?;
        library.save(&args.pattern)?;
        println!("Deleted pattern '{key}'.");
        return Ok(());
    }

    bail!("no operation requested; use one of -c, -l, -v, -a, -e or -d");
}
