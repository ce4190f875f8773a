//! BED input for peak files, the existing peak database, and chromosome lengths
//!
//! Plain, gzip and BGZF inputs are all accepted. BGZF is detected from the
//! header and read with noodles; other gzip files go through flate2's
//! multi-member decoder.

use crate::activity::ActivitySet;
use crate::peak::Strand;
use anyhow::{bail, Context, Result};
use flate2::read::MultiGzDecoder;
use noodles::bgzf;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Check for the gzip magic bytes plus the BGZF "BC" extra subfield
fn is_bgzf_file(path: &Path) -> bool {
    if let Ok(mut file) = File::open(path) {
        let mut header = [0u8; 18];
        if file.read_exact(&mut header).is_ok() {
            return header[0] == 0x1f
                && header[1] == 0x8b
                && header[3] & 0x04 != 0
                && header[12] == b'B'
                && header[13] == b'C';
        }
    }
    false
}

fn is_gzip_file(path: &Path) -> bool {
    let mut magic = [0u8; 2];
    File::open(path)
        .and_then(|mut f| f.read_exact(&mut magic))
        .map(|_| magic == [0x1f, 0x8b])
        .unwrap_or(false)
}

/// Open a text input, handling compression transparently
pub fn open_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    if is_bgzf_file(path) {
        Ok(Box::new(BufReader::new(bgzf::io::reader::Reader::new(file))))
    } else if is_gzip_file(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Header, comment and blank lines carry no interval
pub fn is_bed_header(line: &str) -> bool {
    line.trim().is_empty()
        || line.starts_with('#')
        || line.starts_with("track")
        || line.starts_with("browser")
}

/// The columns of a BED line the peak database cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BedRecord {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    /// Raw 7th column, present in database BED files
    pub activity: Option<String>,
}

impl BedRecord {
    pub fn parse(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.trim_end_matches(['\n', '\r']).split('\t').collect();
        if fields.len() < 3 {
            bail!("BED line has fewer than 3 columns");
        }

        let start: u64 = fields[1]
            .trim()
            .parse()
            .with_context(|| format!("Invalid start coordinate '{}'", fields[1]))?;
        let end: u64 = fields[2]
            .trim()
            .parse()
            .with_context(|| format!("Invalid end coordinate '{}'", fields[2]))?;
        if end <= start {
            bail!("Empty or inverted interval {}-{}", start, end);
        }

        Ok(BedRecord {
            chrom: fields[0].to_string(),
            start,
            end,
            strand: Strand::from_bed_column(fields.get(5).copied()),
            activity: fields.get(6).map(|s| s.to_string()),
        })
    }

    /// Parse the 7th column as an activity set; a missing column is an error
    pub fn activity_set(&self) -> Result<ActivitySet> {
        match &self.activity {
            Some(col) => ActivitySet::parse(col),
            None => bail!("BED line has no activity column"),
        }
    }
}

/// Visit every record of a BED file with its 1-based line number
pub fn for_each_record<P, F>(path: P, mut f: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnMut(BedRecord) -> Result<()>,
{
    let path = path.as_ref();
    let reader = open_input(path)?;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        if is_bed_header(&line) {
            continue;
        }
        let record = BedRecord::parse(&line)
            .with_context(|| format!("{}:{}", path.display(), line_no + 1))?;
        f(record).with_context(|| format!("{}:{}", path.display(), line_no + 1))?;
    }

    Ok(())
}

/// Read a whitespace-separated `chrom length` table
pub fn read_chrom_lengths<P: AsRef<Path>>(path: P) -> Result<HashMap<String, u64>> {
    let path = path.as_ref();
    let reader = open_input(path)?;
    let mut lengths = HashMap::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let mut fields = line.split_whitespace();
        let (Some(chrom), Some(len)) = (fields.next(), fields.next()) else {
            if line.trim().is_empty() {
                continue;
            }
            bail!("{}:{}: expected 'chrom length'", path.display(), line_no + 1);
        };
        let len: u64 = len
            .parse()
            .with_context(|| format!("{}:{}: invalid length '{}'", path.display(), line_no + 1, len))?;
        lengths.insert(chrom.to_string(), len);
    }

    Ok(lengths)
}
