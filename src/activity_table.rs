/// Binary activity matrix: one row per consensus peak, one column per assay
use crate::assay::AssayIndex;
use crate::peak::{Peak, Strand};
use anyhow::{bail, Result};
use std::io::Write;

/// A consensus peak with its partition coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRow {
    pub chrom: String,
    pub strand: Strand,
    pub peak: Peak,
}

impl MergedRow {
    pub fn bed_str(&self) -> String {
        self.peak.bed_str(&self.chrom, self.strand)
    }

    pub fn peak_id(&self) -> String {
        self.peak.peak_id(&self.chrom, self.strand)
    }
}

/// Write the header `<TAB>assay1<TAB>assay2...` followed by 0/1 rows
pub fn write_activity_table<W: Write>(out: &mut W, assays: &AssayIndex, rows: &[MergedRow]) -> Result<()> {
    for name in assays.names() {
        write!(out, "\t{name}")?;
    }
    writeln!(out)?;

    let mut flags = vec![0u8; assays.len()];
    for row in rows {
        if let Some(max) = row.peak.act.max_index() {
            if max >= assays.len() {
                bail!(
                    "Peak {} has activity index {} but only {} assays are known",
                    row.peak_id(),
                    max,
                    assays.len()
                );
            }
        }

        flags.iter_mut().for_each(|f| *f = 0);
        for ai in row.peak.act.iter() {
            flags[ai] = 1;
        }

        write!(out, "{}", row.peak_id())?;
        for f in &flags {
            write!(out, "\t{f}")?;
        }
        writeln!(out)?;
    }

    Ok(())
}
