//! TSPLIB to JSON - Command Line Interface
//!
//! Converts a directory of TSPLIB instances into JSON documents.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tsplib_json::batch::{
    BatchConfig, BatchConverter, FileOutcome, DEFAULT_DISTANCES_THRESHOLD, DEFAULT_OUT_DIR, DEFAULT_SRC_DIR,
};
use tsplib_json::instance::TspInstance;
use tsplib_json::solutions::{SolutionTable, DEFAULT_SOLUTIONS_FILE};

use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "tsplib-json")]
#[command(version = "1.0")]
#[command(about = "Converts symmetric TSPLIB instances to self-contained JSON documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every .tsp file of a directory
    Run {
        /// Directory containing the .tsp files and the solutions file
        #[arg(long, default_value = DEFAULT_SRC_DIR)]
        src_directory: PathBuf,

        /// Directory where the JSON documents are written
        #[arg(long, default_value = DEFAULT_OUT_DIR)]
        out_directory: PathBuf,

        /// Best known solutions file, relative to the source directory
        #[arg(long, default_value = DEFAULT_SOLUTIONS_FILE)]
        solutions_file: PathBuf,

        /// Do not include distance matrices (explicit instances keep theirs)
        #[arg(long)]
        no_distances: bool,

        /// Leave out distances for instances with more nodes than this
        #[arg(long, default_value_t = DEFAULT_DISTANCES_THRESHOLD)]
        distances_threshold: usize,

        /// Pretty-print the JSON documents
        #[arg(long)]
        pretty: bool,

        /// Convert files in parallel
        #[arg(long)]
        parallel: bool,

        /// Export a per-file CSV report
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Convert a single instance
    Convert {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,

        /// Best known solutions file
        #[arg(short, long)]
        solutions: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_directory: PathBuf,

        /// Do not include the distance matrix
        #[arg(long)]
        no_distances: bool,

        /// Pretty-print the JSON document
        #[arg(long)]
        pretty: bool,
    },

    /// Print a summary of an instance
    Inspect {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            src_directory,
            out_directory,
            solutions_file,
            no_distances,
            distances_threshold,
            pretty,
            parallel,
            report,
        } => {
            let config = BatchConfig {
                src_dir: src_directory,
                out_dir: out_directory,
                solutions_file,
                include_distances: !no_distances,
                distances_threshold,
                pretty,
                parallel,
            };
            run_batch(config, report);
        }

        Commands::Convert { instance, solutions, out_directory, no_distances, pretty } => {
            convert_instance(&instance, solutions, out_directory, no_distances, pretty);
        }

        Commands::Inspect { instance } => {
            inspect_instance(&instance);
        }
    }
}

fn run_batch(config: BatchConfig, report_path: Option<PathBuf>) {
    println!("Started converting TSP instances in {:?} to JSON...", config.src_dir);
    let start = Instant::now();

    let converter = match BatchConverter::open(config) {
        Ok(converter) => converter,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let pb = ProgressBar::new(converter.files().len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );

    let result = converter.run_with_progress(|outcome| {
        pb.set_message(outcome.file().to_string());
        pb.inc(1);
    });
    pb.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!("\n{}", report.generate_report());
    println!(
        "Done in {:.2}s, results written in {:?}",
        start.elapsed().as_secs_f64(),
        converter.config().out_dir
    );

    if let Some(path) = report_path {
        match report.export_to_csv(&path) {
            Ok(()) => println!("Report exported to {:?}", path),
            Err(e) => eprintln!("Failed to export report: {}", e),
        }
    }
}

fn convert_instance(
    path: &PathBuf,
    solutions: Option<PathBuf>,
    out_directory: PathBuf,
    no_distances: bool,
    pretty: bool,
) {
    let table = match solutions {
        Some(solutions_path) => match SolutionTable::load(&solutions_path) {
            Ok(table) => table,
            Err(e) => {
                eprintln!("Error loading solutions: {}", e);
                std::process::exit(1);
            }
        },
        None => SolutionTable::new(),
    };

    if let Err(e) = std::fs::create_dir_all(&out_directory) {
        eprintln!("Cannot create output directory {:?}: {}", out_directory, e);
        std::process::exit(1);
    }

    let config = BatchConfig {
        out_dir: out_directory,
        include_distances: !no_distances,
        pretty,
        ..Default::default()
    };
    let converter = BatchConverter::new(config, table);

    match converter.convert_file(path) {
        FileOutcome::Converted(c) => println!("Converted {} (n={}) to {:?}", c.instance, c.dimension, c.output),
        FileOutcome::Skipped(s) => println!("Skipped {}: {}", s.file, s.reason),
        FileOutcome::Failed(f) => {
            eprintln!("Failed to convert {}: [{}] {}", f.file, f.kind, f.message);
            std::process::exit(1);
        }
    }
}

fn inspect_instance(path: &PathBuf) {
    let instance = match TspInstance::from_file(path) {
        Ok(inst) => inst,
        Err(e) => {
            eprintln!("Error loading instance: {}", e);
            std::process::exit(1);
        }
    };

    println!("========== Instance Summary ==========\n");
    println!("{}", instance.summary());
    if !instance.is_symmetric_tsp() {
        println!("\nNot a symmetric TSP instance: it would be skipped by `run`.");
    }
}
