//! Partitioning tool for person re-identification datasets.
//!
//! Indexes one or more datasets, spreads their cameras over simulated edge
//! nodes, cuts each node's persons into sequential tasks and writes a
//! train/query/gallery tree per task:
//!
//! ```text
//! <output>/<camera>-<task>/{train,query,gallery}/<person>/<image>
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use reid_core::{
    load_toml_config, save_toml_config, setup_cli_logging, DatasetSource, PartitionConfig,
    SplitRatios, TaskIndices, TemporalIndices,
};
use reid_dataset::DATASET_NAMES;
use reid_partition::{PartitionPlan, Pipeline};
use tracing::info;

/// File name of the effective configuration inside the output directory
const CONFIG_FILE: &str = "partition_config.toml";

#[derive(Parser, Debug)]
#[command(name = "partition")]
#[command(about = "Stage re-ID datasets as per-node, per-task train/query/gallery splits", long_about = None)]
struct Args {
    /// Dataset names, one per root
    #[arg(short, long, num_args = 1..)]
    datasets: Vec<String>,

    /// Dataset root directories, in the same order as --datasets
    #[arg(short, long, num_args = 1..)]
    roots: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Train, query and gallery ratios (default: 0.8 0.1 0.7)
    #[arg(long, num_args = 3, value_names = ["TRAIN", "QUERY", "GALLERY"])]
    split_ratios: Option<Vec<f64>>,

    /// Edge node count and tasks per node (default: 5 10)
    #[arg(long, num_args = 2, value_names = ["NODES", "TASKS"])]
    task_indices: Option<Vec<usize>>,

    /// Temporal swap ratio and distance (default: 0.5 3.0)
    #[arg(long, num_args = 2, value_names = ["RATIO", "DISTANCE"])]
    temporal_indices: Option<Vec<f64>>,

    /// Keep the balanced person order
    #[arg(long, conflicts_with = "temporal_indices")]
    no_temporal: bool,

    /// Sample extra gallery images from the person's own train images
    #[arg(long)]
    own_camera_gallery: bool,

    /// Keep registration-order person ids
    #[arg(long)]
    no_relabel: bool,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// TOML configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run every stage in memory and report the plan without copying
    #[arg(long)]
    dry_run: bool,

    /// Number of parallel copy workers (default: num_cpus)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_cli_logging(args.verbose)?;

    let config = build_config(&args)?;
    let pipeline = Pipeline::new(config).context("Invalid configuration")?;
    let output = pipeline.config().output_dir.clone();

    println!("{}", "Partitioning re-ID datasets...".green().bold());
    let plan = pipeline.plan().context("Failed to partition datasets")?;

    if args.dry_run {
        info!("Dry run: nothing written to {}", output.display());
        print_summary(&plan);
        return Ok(());
    }

    std::fs::create_dir_all(&output)
        .with_context(|| format!("Failed to create output directory {}", output.display()))?;
    save_toml_config(pipeline.config(), &output.join(CONFIG_FILE))
        .context("Failed to save effective configuration")?;

    if let Some(n) = args.workers {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .context("Failed to set thread pool size")?;
    }

    println!("{}", "Copying images...".cyan());
    let jobs = plan.copy_jobs(&output);
    let total: usize = jobs.iter().map(|job| job.sources.len()).sum();
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    // destination directories are pairwise distinct
    jobs.par_iter()
        .try_for_each(|job| {
            let copied = job.execute()?;
            pb.inc(copied as u64);
            Ok::<_, reid_core::Error>(())
        })
        .context("Failed to copy images")?;
    pb.finish_with_message("Done");

    plan.manifest
        .save(&output)
        .context("Failed to save partition manifest")?;

    print_summary(&plan);
    println!(
        "{} {}",
        "Output written to".green().bold(),
        output.display()
    );
    Ok(())
}

/// Default config, then the config file, then command-line flags
fn build_config(args: &Args) -> Result<PartitionConfig> {
    let mut config: PartitionConfig = match &args.config {
        Some(path) => load_toml_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PartitionConfig::default(),
    };

    if !args.datasets.is_empty() || !args.roots.is_empty() {
        config.datasets = DatasetSource::zip(&args.datasets, &args.roots).with_context(|| {
            format!("Known datasets: {}", DATASET_NAMES.join(", "))
        })?;
    }
    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }
    if let Some(values) = &args.split_ratios {
        config.split_ratios = SplitRatios::from_slice(values)?;
    }
    if let Some(values) = &args.task_indices {
        config.task_indices = TaskIndices::from_slice(values)?;
    }
    if let Some(values) = &args.temporal_indices {
        config.temporal = TemporalIndices::from_slice(values)?;
        config.temporal_resampling = true;
    }
    if args.no_temporal {
        config.temporal_resampling = false;
    }
    if args.own_camera_gallery {
        config.cross_camera_gallery = false;
    }
    if args.no_relabel {
        config.relabel_persons = false;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    Ok(config)
}

fn print_summary(plan: &PartitionPlan) {
    let manifest = &plan.manifest;

    println!("{}", "Datasets:".cyan().bold());
    for dataset in &manifest.datasets {
        println!(
            "  {}: {} cameras, {} persons, {} images",
            dataset.dataset, dataset.cameras, dataset.persons, dataset.images
        );
    }

    println!("{}", "Edge nodes:".cyan().bold());
    println!(
        "  {} camera buckets -> {} nodes ({} merges, {} splits)",
        manifest.balance.initial_buckets,
        manifest.balance.final_buckets,
        manifest.balance.merges,
        manifest.balance.splits
    );
    for camera in &manifest.statistics.cameras {
        println!(
            "  Node {}: {} persons, {} images",
            camera.camera_id, camera.persons, camera.images
        );
    }

    println!("{}", "Splits:".cyan().bold());
    println!("  Train:   {}", manifest.train_count);
    println!("  Query:   {}", manifest.query_count);
    println!("  Gallery: {}", manifest.gallery_count);
    if !manifest.empty_splits.is_empty() {
        println!(
            "  {}",
            format!("{} empty query/gallery lists", manifest.empty_splits.len()).yellow()
        );
    }
}
