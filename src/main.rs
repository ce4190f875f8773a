use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;

use peakdb::merge::MergeParams;
use peakdb::partition::SortMode;
use peakdb::pipeline::{PeakPreprocessor, PreprocessConfig};

/// peakdb - Merge assay peak files into a fixed-size consensus peak database
///
/// Reads a manifest of `assay_name<TAB>bed_path` rows, optionally extends an
/// existing database, and writes `{prefix}.bed` plus the `{prefix}_act.txt`
/// activity matrix.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Manifest labeling the assays and providing their BED file paths
    #[clap(value_name = "TARGET_BEDS")]
    target_beds: PathBuf,

    /// Existing database of activity scores
    #[clap(short = 'a', long = "db-act")]
    db_act: Option<PathBuf>,

    /// Existing database of BED peaks
    #[clap(short = 'b', long = "db-bed")]
    db_bed: Option<PathBuf>,

    /// Table of chromosome lengths
    #[clap(short = 'c', long = "chrom-lengths")]
    chrom_lengths: Option<PathBuf>,

    /// Distance under which to merge peaks; can be negative
    #[clap(short = 'm', long = "merge-dist", default_value = "0", allow_negative_numbers = true)]
    merge_dist: i64,

    /// Do not pass along the activities of the database peaks
    #[clap(short = 'n', long = "no-db-activity")]
    no_db_activity: bool,

    /// Output file prefix
    #[clap(short = 'o', long = "out-prefix", default_value = "peaks")]
    out_prefix: String,

    /// Peak extension size
    #[clap(short = 's', long = "peak-size", default_value = "600")]
    peak_size: u64,

    /// Ignore Y chromosome peaks
    #[clap(short = 'y', long = "ignore-y")]
    ignore_y: bool,

    /// Sort partitions with an external sortBed-compatible program (`--sort-bed=PROGRAM`) instead of in memory
    #[clap(
        long = "sort-bed",
        value_name = "PROGRAM",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "sortBed"
    )]
    sort_bed: Option<String>,

    /// Quiet mode (warnings and errors only)
    #[clap(long = "quiet")]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.quiet { "warn" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    let config = PreprocessConfig {
        database: PreprocessConfig::database_from_paths(args.db_bed, args.db_act)?,
        chrom_lengths: args.chrom_lengths,
        merge: MergeParams {
            merge_dist: args.merge_dist,
            peak_size: args.peak_size,
        },
        no_db_activity: args.no_db_activity,
        ignore_y: args.ignore_y,
        sort_mode: match args.sort_bed {
            Some(program) => SortMode::External(program),
            None => SortMode::InMemory,
        },
    };
    config.validate()?;

    let summary = PeakPreprocessor::new(config).run(&args.target_beds, &args.out_prefix)?;
    info!(
        "Merged {} peaks from {} assays into {} consensus peaks across {} chromosome strands",
        summary.input_peaks, summary.assays, summary.merged_peaks, summary.partitions
    );

    Ok(())
}
