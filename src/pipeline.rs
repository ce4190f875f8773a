use anyhow::{bail, ensure, Context, Result};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::activity::ActivitySet;
use crate::activity_table::{write_activity_table, MergedRow};
use crate::assay::{assign_assay_indices, read_activity_header, read_manifest, AssayBed, AssayIndex};
use crate::bed::{for_each_record, read_chrom_lengths};
use crate::merge::{MergeParams, PeakClusterer};
use crate::partition::{Partitions, SortMode};
use crate::peak::Peak;

/// An existing peak database to extend
#[derive(Debug, Clone)]
pub struct ExistingDatabase {
    pub bed: PathBuf,          // -b/--db-bed
    pub activity_table: PathBuf, // -a/--db-act
}

/// Preprocessing configuration
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    pub database: Option<ExistingDatabase>,
    pub chrom_lengths: Option<PathBuf>, // -c/--chrom-lengths
    pub merge: MergeParams,             // -m/--merge-dist, -s/--peak-size
    pub no_db_activity: bool,           // -n/--no-db-activity
    pub ignore_y: bool,                 // -y/--ignore-y
    pub sort_mode: SortMode,            // --sort-bed
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        PreprocessConfig {
            database: None,
            chrom_lengths: None,
            merge: MergeParams::default(),
            no_db_activity: false,
            ignore_y: false,
            sort_mode: SortMode::InMemory,
        }
    }
}

impl PreprocessConfig {
    /// Build the database pair from the two optional paths, which must come together
    pub fn database_from_paths(
        db_bed: Option<PathBuf>,
        db_act: Option<PathBuf>,
    ) -> Result<Option<ExistingDatabase>> {
        match (db_bed, db_act) {
            (Some(bed), Some(activity_table)) => Ok(Some(ExistingDatabase { bed, activity_table })),
            (None, None) => Ok(None),
            _ => bail!(
                "Must provide both BED file and activity table if you want to add to an existing database"
            ),
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.merge.peak_size > 0, "Peak size must be positive");
        Ok(())
    }
}

/// What a run produced
#[derive(Debug, Clone)]
pub struct PeakDatabase {
    pub assays: AssayIndex,
    pub rows: Vec<MergedRow>,
}

/// Counts reported after a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreprocessSummary {
    pub input_peaks: usize,
    pub merged_peaks: usize,
    pub assays: usize,
    pub partitions: usize,
}

/// Merges assay peak files, optionally on top of an existing database
pub struct PeakPreprocessor {
    config: PreprocessConfig,
}

impl PeakPreprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        PeakPreprocessor { config }
    }

    pub fn with_sort_mode(mut self, sort_mode: SortMode) -> Self {
        self.config.sort_mode = sort_mode;
        self
    }

    /// Full run: read the manifest, merge, and write `{prefix}.bed` and `{prefix}_act.txt`
    pub fn run<P: AsRef<Path>>(&self, manifest_path: P, out_prefix: &str) -> Result<PreprocessSummary> {
        let manifest = read_manifest(manifest_path)?;
        let (db, summary) = self.build(&manifest)?;

        let bed_path = format!("{out_prefix}.bed");
        write_peak_bed(&bed_path, &db.rows)?;
        info!("Wrote {} merged peaks to {}", db.rows.len(), bed_path);

        let act_path = format!("{out_prefix}_act.txt");
        let mut out = BufWriter::new(
            File::create(&act_path).with_context(|| format!("Failed to create {act_path}"))?,
        );
        write_activity_table(&mut out, &db.assays, &db.rows)?;
        out.flush()?;
        info!("Wrote activity table for {} assays to {}", db.assays.len(), act_path);

        Ok(summary)
    }

    /// Merge the manifest's peaks (and the database's) without writing anything
    pub fn build(&self, manifest: &[AssayBed]) -> Result<(PeakDatabase, PreprocessSummary)> {
        self.config.validate()?;

        let db_assays = match &self.config.database {
            Some(db) if !self.config.no_db_activity => read_activity_header(&db.activity_table)?,
            _ => Vec::new(),
        };
        let (assays, columns) = assign_assay_indices(db_assays, manifest)?;
        debug!("Assay columns: {:?}", assays.names().collect::<Vec<_>>());

        let chrom_lengths = match &self.config.chrom_lengths {
            Some(path) => read_chrom_lengths(path)?,
            None => {
                warn!("Chromosome lengths not provided, so regions near ends may be incorrect.");
                HashMap::new()
            }
        };

        let mut partitions = Partitions::new();
        for (assay, &column) in manifest.iter().zip(&columns) {
            let before = partitions.num_peaks();
            for_each_record(&assay.bed_path, |rec| {
                partitions.add(
                    &rec.chrom,
                    rec.strand,
                    Peak::new(rec.start, rec.end, ActivitySet::single(column)),
                );
                Ok(())
            })?;
            info!(
                "Read {} peaks for assay {} (column {})",
                partitions.num_peaks() - before,
                assay.name,
                column
            );
        }

        if let Some(db) = &self.config.database {
            let before = partitions.num_peaks();
            let no_db_activity = self.config.no_db_activity;
            for_each_record(&db.bed, |rec| {
                let act = if no_db_activity {
                    ActivitySet::new()
                } else {
                    rec.activity_set()?
                };
                partitions.add(&rec.chrom, rec.strand, Peak::new(rec.start, rec.end, act));
                Ok(())
            })?;
            info!(
                "Read {} database peaks from {}",
                partitions.num_peaks() - before,
                db.bed.display()
            );
        }

        if self.config.ignore_y {
            let removed = partitions.remove_chrom("chrY");
            if removed > 0 {
                info!("Ignoring {removed} chrY peaks");
            }
        }

        let input_peaks = partitions.num_peaks();
        let num_partitions = partitions.len();
        partitions.sort(&self.config.sort_mode)?;

        let mut rows = Vec::new();
        for (key, peaks) in partitions {
            let chrom_len = chrom_lengths.get(&key.chrom).copied();
            let mut clusterer = PeakClusterer::new(self.config.merge, chrom_len);
            let before = rows.len();

            for peak in peaks {
                let closed = clusterer
                    .push(peak)
                    .with_context(|| format!("Merging {} {}", key.chrom, key.strand))?;
                if let Some(mpeak) = closed {
                    rows.push(MergedRow {
                        chrom: key.chrom.clone(),
                        strand: key.strand,
                        peak: mpeak,
                    });
                }
            }
            if let Some(mpeak) = clusterer.finish() {
                rows.push(MergedRow {
                    chrom: key.chrom.clone(),
                    strand: key.strand,
                    peak: mpeak,
                });
            }

            debug!("{} {}: {} merged peaks", key.chrom, key.strand, rows.len() - before);
        }

        let summary = PreprocessSummary {
            input_peaks,
            merged_peaks: rows.len(),
            assays: assays.len(),
            partitions: num_partitions,
        };
        Ok((PeakDatabase { assays, rows }, summary))
    }
}

/// Write the seven-column unified peak BED
pub fn write_peak_bed<P: AsRef<Path>>(path: P, rows: &[MergedRow]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for row in rows {
        writeln!(writer, "{}", row.bed_str())?;
    }
    writer.flush()?;

    Ok(())
}
