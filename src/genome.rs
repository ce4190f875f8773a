//! Reference sequence lookup
//!
//! `SequenceSource` is the seam the SNP extractor fetches through. `Genome`
//! holds a whole FASTA in memory, read with noodles. `IndexedGenome` seeks
//! into a FASTA through its `.fai` index and only reads the queried windows.

use anyhow::{Context, Result};
use noodles::core::{Position, Region};
use noodles::fasta;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::bed::open_input;

/// Anything that can return reference bases for a region
pub trait SequenceSource {
    /// Uppercase bases of `[start, end)` (0-based), clipped to the chromosome end
    fn fetch(&mut self, chrom: &str, start: u64, end: u64) -> Result<Vec<u8>>;

    /// Chromosome length, if the chromosome is known
    fn chrom_len(&self, chrom: &str) -> Option<u64>;
}

/// In-memory reference genome
#[derive(Debug, Default)]
pub struct Genome {
    chroms: HashMap<String, Vec<u8>>,
}

impl Genome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a FASTA file (plain, gzip or bgzip)
    pub fn from_fasta<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = fasta::io::Reader::new(open_input(path)?);
        let mut genome = Genome::new();

        for result in reader.records() {
            let record = result.with_context(|| format!("Failed to read FASTA {}", path.display()))?;
            let name = String::from_utf8_lossy(record.name()).into_owned();
            let seq: &[u8] = record.sequence().as_ref();
            genome.insert(name, seq.to_vec());
        }

        Ok(genome)
    }

    /// Add or replace a chromosome; bases are stored uppercase
    pub fn insert<S: Into<String>>(&mut self, name: S, mut seq: Vec<u8>) {
        seq.make_ascii_uppercase();
        self.chroms.insert(name.into(), seq);
    }

    pub fn len(&self) -> usize {
        self.chroms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chroms.is_empty()
    }
}

impl SequenceSource for Genome {
    fn fetch(&mut self, chrom: &str, start: u64, end: u64) -> Result<Vec<u8>> {
        let seq = self
            .chroms
            .get(chrom)
            .with_context(|| format!("Chromosome {chrom} not found in genome"))?;
        let len = seq.len() as u64;
        let start = start.min(len) as usize;
        let end = end.min(len) as usize;
        if end <= start {
            return Ok(Vec::new());
        }
        Ok(seq[start..end].to_vec())
    }

    fn chrom_len(&self, chrom: &str) -> Option<u64> {
        self.chroms.get(chrom).map(|s| s.len() as u64)
    }
}

/// Path of the samtools-style index next to a FASTA (`genome.fa` -> `genome.fa.fai`)
pub fn fai_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut s = OsString::from(path.as_ref());
    s.push(".fai");
    PathBuf::from(s)
}

/// Reference genome read on demand through a `.fai` index
///
/// bgzip-compressed FASTA (`.gz`/`.bgz`) additionally needs its `.gzi`.
pub struct IndexedGenome {
    reader: fasta::io::IndexedReader<fasta::io::BufReader<File>>,
    lengths: HashMap<String, u64>,
}

impl IndexedGenome {
    /// Open `path` with the index at `{path}.fai`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = fasta::io::indexed_reader::Builder::default()
            .build_from_path(path)
            .with_context(|| format!("Failed to open indexed FASTA {}", path.display()))?;

        let records: &[fasta::fai::Record] = reader.index().as_ref();
        let lengths = records
            .iter()
            .map(|record| (String::from_utf8_lossy(record.name()).into_owned(), record.length()))
            .collect();

        Ok(IndexedGenome { reader, lengths })
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }
}

impl SequenceSource for IndexedGenome {
    fn fetch(&mut self, chrom: &str, start: u64, end: u64) -> Result<Vec<u8>> {
        let len = self
            .chrom_len(chrom)
            .with_context(|| format!("Chromosome {chrom} not found in genome index"))?;
        let end = end.min(len);
        if end <= start {
            return Ok(Vec::new());
        }

        // 0-based half-open to 1-based inclusive
        let first = Position::try_from(start as usize + 1)?;
        let last = Position::try_from(end as usize)?;
        let region = Region::new(chrom, first..=last);

        let record = self
            .reader
            .query(&region)
            .with_context(|| format!("Failed to fetch {region}"))?;
        let mut seq = record.sequence().as_ref().to_vec();
        seq.make_ascii_uppercase();
        Ok(seq)
    }

    fn chrom_len(&self, chrom: &str) -> Option<u64> {
        self.lengths.get(chrom).copied()
    }
}
