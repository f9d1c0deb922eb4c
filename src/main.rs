//! unmix CLI - Music Source Separation
//!
//! Thin driver around the library: parses arguments, acquires and verifies
//! the model, then runs the separation pipeline over the given tracks. This
//! is the only place where failures turn into a process exit code.

use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::info;

use unmix::cli::Cli;
use unmix::model::{self, ModelResolver, PretrainedCatalog};
use unmix::pipeline::{PipelineOptions, SeparationPipeline};
use unmix::Result;

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            for hint in err.recovery_suggestions() {
                eprintln!("  hint: {}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let catalog = match &cli.catalog {
        Some(path) => PretrainedCatalog::from_json_file(path)?,
        None => PretrainedCatalog::default(),
    };

    let resolver = ModelResolver::new(&catalog, cli.models.clone(), cli.dl);
    let resolved = resolver.resolve(&cli.name, cli.quantized)?;

    // Verification is unconditional whenever a digest is known, regardless
    // of how the file got on disk.
    if let Some(digest) = &resolved.digest {
        model::verify_checksum(&resolved.path, digest)?;
    }

    let separator = model::load_separator(&resolved.path, &cli.device)?;
    info!("using '{}' backend on device '{}'", separator.name(), cli.device);

    let out = cli.out.join(&cli.name);
    println!("Separated tracks will be stored in {}", out.display());

    let options = PipelineOptions {
        shifts: cli.shifts,
        split: cli.split,
        float32: cli.float32,
    };
    let pipeline = SeparationPipeline::new(separator.as_ref(), cli.out, cli.name, options);
    let summary = pipeline.run(&cli.tracks);

    info!(
        "done: {} separated, {} skipped, {} failed",
        summary.separated, summary.skipped, summary.failed
    );
    Ok(())
}
