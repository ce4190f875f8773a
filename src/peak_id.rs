/// Parsing of `chrom:start-end(strand)` peak identifiers
///
/// These are the row keys of the activity matrix and the sequence headers
/// carried into downstream training sets.
use anyhow::{anyhow, bail, Result};
use nom::{
    bytes::complete::tag,
    character::complete::{digit1, one_of},
    combinator::{all_consuming, map_res},
    sequence::{delimited, separated_pair},
    IResult,
};

use crate::peak::Strand;

/// A peak identifier broken back into BED fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeakId {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
}

impl PeakId {
    /// BED6 rendering with the unified name and score columns
    pub fn bed_str(&self) -> String {
        format!(
            "{}\t{}\t{}\t.\t1\t{}",
            self.chrom, self.start, self.end, self.strand
        )
    }
}

fn coordinate(input: &str) -> IResult<&str, u64> {
    map_res(digit1, str::parse::<u64>)(input)
}

fn strand(input: &str) -> IResult<&str, Strand> {
    let (rest, c) = delimited(tag("("), one_of("+-"), tag(")"))(input)?;
    let strand = if c == '-' { Strand::Reverse } else { Strand::Forward };
    Ok((rest, strand))
}

fn coordinates(input: &str) -> IResult<&str, (u64, u64, Strand)> {
    let (rest, (start, end)) = separated_pair(coordinate, tag("-"), coordinate)(input)?;
    let (rest, strand) = all_consuming(strand)(rest)?;
    Ok((rest, (start, end, strand)))
}

/// Parse an identifier such as `chr1:100-700(+)`
///
/// The chromosome runs up to the last `:`, so contig names containing `:`
/// (e.g. HLA alleles) survive.
pub fn parse_peak_id(id: &str) -> Result<PeakId> {
    let id = id.trim();
    let (chrom, coords) = id
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("Invalid peak identifier '{}': missing ':'", id))?;
    if chrom.is_empty() {
        bail!("Invalid peak identifier '{}': empty chromosome", id);
    }

    let (_, (start, end, strand)) =
        coordinates(coords).map_err(|e| anyhow!("Invalid peak identifier '{}': {}", id, e))?;

    Ok(PeakId {
        chrom: chrom.to_string(),
        start,
        end,
        strand,
    })
}
