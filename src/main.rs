//! Persona Architect: customer persona generation CLI
//!
//! This is the main entrypoint that orchestrates data loading, persona
//! generation, strategy reporting and CSV export.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use persona_architect::{
    data, default_features, export, load_dataset, numeric_columns, report, run, to_csv_bytes, Args,
    DisplayNames, PersonaReport,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.verbose {
        println!("Persona Architect - Customer Personas using K-Means");
        println!("===================================================\n");
    }

    let names = args.parse_display_names()?;
    run_full_pipeline(&args, &names)
}

/// Log to stderr; RUST_LOG takes precedence over --verbose
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run full persona pipeline
fn run_full_pipeline(args: &Args, names: &DisplayNames) -> Result<()> {
    println!("=== Persona Generation Pipeline ===\n");

    let start_time = Instant::now();

    // Step 1: Load data
    if args.verbose {
        println!("Step 1: Loading data");
        println!("  Input file: {}", args.input);
    }

    let dataset = load_dataset(&args.input)?;

    println!("✓ Data loaded: {} customers, {} attributes", dataset.height(), dataset.width());
    if args.verbose {
        println!("  Numeric columns: {}", numeric_columns(&dataset).join(", "));
        println!("{}", dataset.head(Some(5)));
    }

    if args.overview {
        println!("\n=== Data Overview ===");
        print!("{}", report::render_overview(&data::describe(&dataset)?)?);
    }

    // Step 2: Generate personas
    let features = if args.features.is_empty() {
        default_features(&dataset)
    } else {
        args.features.clone()
    };
    if features.is_empty() {
        anyhow::bail!("Please select features with --features to create personas");
    }

    let config = args.persona_config(features);
    if args.verbose {
        println!("\nStep 2: Generating personas");
        println!("  Features: {}", config.features.join(", "));
        println!("  Number of personas: {}", config.kmeans.n_clusters);
        println!("  Initializations: {}", config.kmeans.n_init);
        println!("  Max iterations: {}", config.kmeans.max_iters);
        println!("  Seed: {}", config.kmeans.seed);
    }

    let model_start = Instant::now();
    let persona_run = run(&dataset, &config)?;
    let model_time = model_start.elapsed();

    println!("✓ {} personas have been successfully created!", persona_run.n_segments());
    if args.verbose {
        println!("  Fitting time: {:.2}s", model_time.as_secs_f64());
        println!("  Inertia: {:.2}", persona_run.inertia);
    }

    // Step 3: Profiles and strategies
    println!("\n=== Persona Profile Summary ===");
    print!("{}", report::render_profile(&persona_run, names)?);

    println!("\n=== Marketing Strategy ===");
    print!("{}", report::render_strategies(&persona_run, names)?);

    // Step 4: Export
    export::write_csv(&args.output, &to_csv_bytes(&persona_run.dataset)?)?;

    if let Some(path) = &args.report {
        let json = PersonaReport::new(&persona_run, names).to_json()?;
        std::fs::write(path, json).with_context(|| format!("failed to write {path}"))?;
    }

    let total_time = start_time.elapsed();
    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", total_time.as_secs_f64());
    println!("Segmented data saved to: {}", args.output);
    if let Some(path) = &args.report {
        println!("Report saved to: {path}");
    }

    Ok(())
}
