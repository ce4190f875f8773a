use crate::activity::ActivitySet;
use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;

/// Strand of a peak partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    /// Strand from an optional BED strand column; anything other than `-` is forward
    pub fn from_bed_column(column: Option<&str>) -> Self {
        match column {
            Some("-") => Strand::Reverse,
            _ => Strand::Forward,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Strand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            _ => bail!("Invalid strand '{}'", s),
        }
    }
}

/// A half-open, 0-based interval with the assays active over it.
///
/// Raw input peaks and merged consensus peaks share this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peak {
    pub start: u64,
    pub end: u64,
    pub act: ActivitySet,
}

impl Peak {
    pub fn new(start: u64, end: u64, act: ActivitySet) -> Self {
        Peak { start, end, act }
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Midpoint of the closed interval `[start, end - 1]`
    pub fn midpoint(&self) -> f64 {
        (self.start as f64 + self.end as f64 - 1.0) / 2.0
    }

    /// Weight in the merged-center average: one plus the number of active assays
    pub fn weight(&self) -> f64 {
        1.0 + self.act.len() as f64
    }

    /// Seven-column unified BED line (no trailing newline)
    pub fn bed_str(&self, chrom: &str, strand: Strand) -> String {
        format!(
            "{}\t{}\t{}\t.\t1\t{}\t{}",
            chrom, self.start, self.end, strand, self.act
        )
    }

    /// Row key used by the activity matrix
    pub fn peak_id(&self, chrom: &str, strand: Strand) -> String {
        format!("{}:{}-{}({})", chrom, self.start, self.end, strand)
    }
}
