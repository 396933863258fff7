//! CLI binary for copy-number z-score annotation of genomic intervals

use clap::Parser;
use env_logger::Env;
use std::path::PathBuf;
use caza_rs::{
    coverage::{load_coverage, validate_filter},
    intervals::read_intervals,
    output::{output_path, write_zscore_results},
    utils::{get_num_cpus, validate_file_readable, Timer},
    zscore::{annotate_intervals, summarize},
    AnnotationConfig, CazaError, CazaResult, CoverageFilter,
};

#[derive(Parser)]
#[command(name = "caza_copynum")]
#[command(about = "Get read density distribution across intervals of interest")]
#[command(long_about = "
Annotates each interval of a BED-like interval file with the z-score of the
reads-per-base of the coverage records overlapping it, measured against the
reads-per-base distribution of the whole coverage table.

Coverage file columns (tab-separated, no header):
  chr  start  end  gene_ids  reads  bases_covered_1  bases_covered_2  percent_covered

Interval file columns (tab-separated, no header):
  chr  start  end  copy_number

Output is written to <output-dir>/<output-prefix>_zscore.txt with columns
  chr  start  end  zscore_sample  zscore_population

Intervals without overlapping coverage are reported as 'na'.
")]
struct Args {
    /// Input file with read count data
    #[arg(short = 'a', long, visible_alias = "file1", value_name = "FILE")]
    coverage: PathBuf,

    /// Interval definition bed file
    #[arg(short = 'b', long, visible_alias = "file2", value_name = "FILE")]
    intervals: PathBuf,

    /// Prefix of the output file; a trailing .bed is removed
    #[arg(short = 'p', long, visible_alias = "oprefix", value_name = "PREFIX")]
    output_prefix: String,

    /// Output directory, created if missing
    #[arg(short = 'o', long, visible_alias = "odir", value_name = "DIR")]
    output_dir: PathBuf,

    /// Filter coverage records by percent covered and reads per base
    #[arg(short, long)]
    filter: bool,

    /// Minimum fraction of the region covered when filtering
    #[arg(long, default_value = "1.0")]
    min_percent_covered: f64,

    /// Minimum reads per base when filtering
    #[arg(long, default_value = "1.0")]
    min_reads_per_base: f64,

    /// Number of processes to use for parallel processing
    #[arg(long, default_value_t = get_num_cpus())]
    num_processes: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn annotation_config(&self) -> AnnotationConfig {
        let filter = self.filter.then(|| CoverageFilter {
            min_percent_covered: self.min_percent_covered,
            min_reads_per_base: self.min_reads_per_base,
        });

        AnnotationConfig {
            filter,
            num_processes: self.num_processes.max(1),
        }
    }
}

fn run() -> CazaResult<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_secs()
        .init();

    log::info!("Starting copy-number z-score annotation");
    log::info!("Coverage file: {:?}", args.coverage);
    log::info!("Interval file: {:?}", args.intervals);
    log::info!("Output directory: {:?}", args.output_dir);

    validate_file_readable(&args.coverage)?;
    validate_file_readable(&args.intervals)?;

    let config = args.annotation_config();
    if let Some(filter) = &config.filter {
        validate_filter(filter)?;
        log::info!(
            "Filtering enabled: percent_covered >= {}, reads_per_base >= {}",
            filter.min_percent_covered,
            filter.min_reads_per_base
        );
    }

    let output = output_path(&args.output_dir, &args.output_prefix);
    std::fs::create_dir_all(&args.output_dir)?;

    let results = annotate(&args, &config)?;

    let _timer = Timer::new("Writing results");
    write_zscore_results(&results, &output)?;

    log::info!("Results written to: {:?}", output);
    log::info!("Analysis completed successfully");

    Ok(())
}

fn annotate(args: &Args, config: &AnnotationConfig) -> CazaResult<Vec<caza_rs::IntervalZScore>> {
    let timer = Timer::new("Loading coverage table");
    let (coverage, summary) = load_coverage(&args.coverage, config.filter.as_ref())?;
    drop(timer);

    log::info!(
        "Coverage records: {} loaded, {} with zero bases covered, {} filtered, {} retained",
        summary.loaded,
        summary.zero_coverage,
        summary.filtered,
        summary.retained
    );
    if coverage.is_empty() {
        log::warn!("No coverage records remain; every interval will be reported as na");
    }

    let timer = Timer::new("Loading intervals");
    let intervals = read_intervals(&args.intervals)?;
    drop(timer);
    log::info!("Read {} intervals", intervals.len());

    if intervals.is_empty() {
        log::warn!("No intervals found in the interval file");
    }

    let _timer = Timer::new("Calculating z-scores");
    let results = annotate_intervals(&intervals, &coverage, config.num_processes)?;

    let stats = summarize(&results);
    log::info!("Z-score summary:");
    log::info!("  Covered intervals: {}", stats.annotated);
    log::info!("  Intervals without coverage: {}", stats.not_covered);
    if let (Some(min), Some(max)) = (stats.min_sample, stats.max_sample) {
        log::info!("  Sample z-score range: {:.3} to {:.3}", min, max);
    }

    Ok(results)
}

/// Handle application errors and provide user-friendly messages
fn handle_error(error: CazaError) -> ! {
    match error {
        CazaError::FileNotFound(path) => {
            eprintln!("Error: File not found: {}", path);
            eprintln!("Please check that the file exists and is readable.");
        }
        CazaError::InvalidRecord(msg) => {
            eprintln!("Error: Invalid input record: {}", msg);
            eprintln!("Please check that your coverage and interval files are tab-separated with the expected columns.");
        }
        CazaError::InvalidConfig(msg) => {
            eprintln!("Error: Invalid configuration: {}", msg);
            eprintln!("Please check your filter thresholds and process count.");
        }
        CazaError::DegenerateBaseline(msg) => {
            eprintln!("Error: Cannot normalize coverage: {}", msg);
            eprintln!("The z-score needs at least two retained coverage records with differing reads per base.");
        }
        CazaError::Io(ref e) => {
            eprintln!("Error: I/O error: {}", e);
            eprintln!("Please check file permissions and disk space.");
        }
        CazaError::Csv(ref e) => {
            eprintln!("Error: Table parsing error: {}", e);
            eprintln!("Please check that your input files are tab-separated.");
        }
    }
    std::process::exit(1);
}

fn main() {
    if let Err(e) = run() {
        handle_error(e);
    }
}
