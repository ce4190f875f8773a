/// SNP records loaded from VCF files
use anyhow::{bail, Context, Result};
use std::fmt;
use std::io::BufRead;
use std::path::Path;

use crate::bed::open_input;

/// A variant with one reference and one or more alternate alleles
#[derive(Debug, Clone, PartialEq)]
pub struct Snp {
    pub chrom: String,
    /// 1-based position of the first reference base
    pub pos: u64,
    pub rsid: String,
    pub ref_allele: String,
    pub alt_alleles: Vec<String>,
    /// Label of the index SNP this variant is linked to, `.` when not read
    pub index_snp: String,
    pub score: Option<f64>,
}

/// Which optional VCF columns to read
#[derive(Debug, Clone, Copy, Default)]
pub struct VcfColumns {
    pub index_snp: bool, // column 6
    pub score: bool,     // column 7
}

impl Snp {
    /// Parse one whitespace-delimited VCF record
    pub fn from_vcf_line(line: &str, columns: VcfColumns) -> Result<Self> {
        let a: Vec<&str> = line.split_whitespace().collect();
        if a.len() < 5 {
            bail!("VCF line has fewer than 5 columns");
        }

        let chrom = if a[0].starts_with("chr") {
            a[0].to_string()
        } else {
            format!("chr{}", a[0])
        };
        let pos: u64 = a[1]
            .parse()
            .with_context(|| format!("Invalid VCF position '{}'", a[1]))?;
        if pos == 0 {
            bail!("VCF positions are 1-based; got 0");
        }

        let alt_alleles: Vec<String> = a[4].split(',').map(|s| s.to_string()).collect();
        if a[3].is_empty() || alt_alleles.iter().any(|al| al.is_empty()) {
            bail!("Empty allele in VCF line");
        }

        let index_snp = if columns.index_snp {
            match a.get(5) {
                Some(label) => label.to_string(),
                None => bail!("VCF line has no index SNP column"),
            }
        } else {
            ".".to_string()
        };

        let score = if columns.score {
            match a.get(6) {
                Some(s) => Some(s.parse().with_context(|| format!("Invalid SNP score '{s}'"))?),
                None => bail!("VCF line has no score column"),
            }
        } else {
            None
        };

        Ok(Snp {
            chrom,
            pos,
            rsid: a[2].to_string(),
            ref_allele: a[3].to_string(),
            alt_alleles,
            index_snp,
            score,
        })
    }

    /// Reference allele followed by the alternates
    pub fn alleles(&self) -> Vec<&str> {
        std::iter::once(self.ref_allele.as_str())
            .chain(self.alt_alleles.iter().map(|s| s.as_str()))
            .collect()
    }

    /// Length of the longest alternate allele
    pub fn longest_alt(&self) -> usize {
        self.alt_alleles.iter().map(|al| al.len()).max().unwrap_or(0)
    }
}

impl fmt::Display for Snp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SNP({}, {}:{}, {}/{})",
            self.rsid,
            self.chrom,
            self.pos,
            self.ref_allele,
            self.alt_alleles.join(",")
        )
    }
}

/// Shorten an allele for sequence labels: `ACGTACG` -> `ACGTA*`
pub fn cap_allele(allele: &str, cap: usize) -> String {
    if allele.chars().count() > cap {
        let mut capped: String = allele.chars().take(cap).collect();
        capped.push('*');
        capped
    } else {
        allele.to_string()
    }
}

/// Load every record of a VCF file, skipping `#` header lines
pub fn read_vcf_snps<P: AsRef<Path>>(path: P, columns: VcfColumns) -> Result<Vec<Snp>> {
    let path = path.as_ref();
    let reader = open_input(path)?;

    let mut snps = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let snp = Snp::from_vcf_line(&line, columns)
            .with_context(|| format!("{}:{}", path.display(), line_no + 1))?;
        snps.push(snp);
    }

    Ok(snps)
}
