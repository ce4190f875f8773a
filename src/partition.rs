//! Per-chromosome, per-strand peak partitions
//!
//! The merge engine needs each partition sorted by start. Sorting happens in
//! memory by default; `SortMode::External` writes each partition to a scratch
//! BED file and sorts it with an external `sortBed`-compatible command.

use crate::activity::ActivitySet;
use crate::bed::{is_bed_header, BedRecord};
use crate::peak::{Peak, Strand};
use anyhow::{bail, Context, Result};
use log::debug;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::process::Command;

/// How partitions are put into start order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SortMode {
    #[default]
    InMemory,
    /// Program invoked as `<program> -i <file>`, writing sorted BED to stdout
    External(String),
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartitionKey {
    pub chrom: String,
    pub strand: Strand,
}

/// Peaks grouped by chromosome and strand, iterated in key order
#[derive(Debug, Default)]
pub struct Partitions {
    parts: BTreeMap<PartitionKey, Vec<Peak>>,
}

impl Partitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, chrom: &str, strand: Strand, peak: Peak) {
        let key = PartitionKey {
            chrom: chrom.to_string(),
            strand,
        };
        self.parts.entry(key).or_default().push(peak);
    }

    /// Drop both strands of a chromosome; returns the number of peaks removed
    pub fn remove_chrom(&mut self, chrom: &str) -> usize {
        let mut removed = 0;
        for strand in [Strand::Forward, Strand::Reverse] {
            let key = PartitionKey {
                chrom: chrom.to_string(),
                strand,
            };
            if let Some(peaks) = self.parts.remove(&key) {
                removed += peaks.len();
            }
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn num_peaks(&self) -> usize {
        self.parts.values().map(|p| p.len()).sum()
    }

    pub fn get(&self, chrom: &str, strand: Strand) -> Option<&[Peak]> {
        let key = PartitionKey {
            chrom: chrom.to_string(),
            strand,
        };
        self.parts.get(&key).map(|p| p.as_slice())
    }

    /// Sort every partition by start (ties by end)
    pub fn sort(&mut self, mode: &SortMode) -> Result<()> {
        match mode {
            SortMode::InMemory => {
                for peaks in self.parts.values_mut() {
                    peaks.sort_by_key(|p| (p.start, p.end));
                }
            }
            SortMode::External(program) => {
                let scratch = tempfile::TempDir::new()
                    .context("Failed to create scratch directory for external sort")?;
                for (key, peaks) in self.parts.iter_mut() {
                    let unsorted = std::mem::take(peaks);
                    *peaks = external_sort(program, scratch.path(), key, unsorted)?;
                }
            }
        }
        Ok(())
    }
}

impl IntoIterator for Partitions {
    type Item = (PartitionKey, Vec<Peak>);
    type IntoIter = std::collections::btree_map::IntoIter<PartitionKey, Vec<Peak>>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.into_iter()
    }
}

/// Sort one partition through an external command, failing on a non-zero exit
fn external_sort(
    program: &str,
    scratch_dir: &Path,
    key: &PartitionKey,
    peaks: Vec<Peak>,
) -> Result<Vec<Peak>> {
    let strand_tag = match key.strand {
        Strand::Forward => "pos",
        Strand::Reverse => "neg",
    };
    let unsorted_path = scratch_dir.join(format!("{}_{}.bed", key.chrom, strand_tag));
    {
        let mut writer = BufWriter::new(
            File::create(&unsorted_path)
                .with_context(|| format!("Failed to create {}", unsorted_path.display()))?,
        );
        for peak in &peaks {
            writeln!(writer, "{}", peak.bed_str(&key.chrom, key.strand))?;
        }
        writer.flush()?;
    }

    debug!(
        "Sorting {} peaks for {} {} with {}",
        peaks.len(),
        key.chrom,
        key.strand,
        program
    );
    let output = Command::new(program)
        .arg("-i")
        .arg(&unsorted_path)
        .output()
        .with_context(|| format!("Failed to run external sort '{program}'"))?;

    if !output.status.success() {
        bail!(
            "External sort '{}' failed for {} {} ({}): {}",
            program,
            key.chrom,
            key.strand,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let stdout = String::from_utf8(output.stdout).context("External sort produced non-UTF-8 output")?;
    let mut sorted = Vec::with_capacity(peaks.len());
    for line in stdout.lines() {
        if is_bed_header(line) {
            continue;
        }
        let record = BedRecord::parse(line)?;
        let act = match &record.activity {
            Some(col) => ActivitySet::parse(col)?,
            None => ActivitySet::new(),
        };
        sorted.push(Peak::new(record.start, record.end, act));
    }

    if sorted.len() != peaks.len() {
        bail!(
            "External sort returned {} of {} peaks for {} {}",
            sorted.len(),
            peaks.len(),
            key.chrom,
            key.strand
        );
    }

    Ok(sorted)
}
