//! Allele sequences around SNPs
//!
//! Each SNP yields one sequence per allele: the reference window with the
//! allele spliced in at the SNP offset, one-hot encoded at `seq_len`. The
//! window's right edge moves by `len(ref) - longest_alt` so that the longest
//! alternate sequence is exactly `seq_len` long.

use anyhow::{ensure, Context, Result};
use log::warn;

use crate::genome::SequenceSource;
use crate::one_hot::{dna_one_hot, OneHot};
use crate::snp::{cap_allele, Snp};

/// Alleles longer than this are shortened in sequence labels
pub const ALLELE_LABEL_CAP: usize = 5;

/// Encoded allele sequences and the SNPs that produced them
#[derive(Debug, Clone, Default)]
pub struct SnpSequences {
    pub encodings: Vec<OneHot>,
    pub seqs: Vec<String>,
    pub headers: Vec<String>,
    /// SNPs whose reference reconciled with the genome
    pub snps: Vec<Snp>,
}

impl SnpSequences {
    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    fn push(&mut self, rsid: &str, allele: &str, seq: Vec<u8>, seq_len: usize) {
        self.encodings.push(dna_one_hot(&seq, seq_len));
        self.seqs.push(String::from_utf8_lossy(&seq).into_owned());
        self.headers
            .push(format!("{}_{}", rsid, cap_allele(allele, ALLELE_LABEL_CAP)));
    }
}

/// Fetch the window for `snp`, padded with `N` where the genome runs out
fn fetch_window<S: SequenceSource + ?Sized>(genome: &mut S, snp: &Snp, seq_len: usize) -> Result<Vec<u8>> {
    let left_len = (seq_len / 2 - 1) as i64;
    let right_len = (seq_len / 2) as i64;

    // 1-based, inclusive
    let seq_start = snp.pos as i64 - left_len;
    let seq_end = snp.pos as i64 + right_len + snp.ref_allele.len() as i64 - snp.longest_alt() as i64;
    let want = (seq_end - seq_start + 1).max(0) as usize;

    let fetch_start = seq_start - 1;
    let mut seq = Vec::with_capacity(want);
    if fetch_start < 0 {
        seq.resize((-fetch_start) as usize, b'N');
        if seq_end > 0 {
            seq.extend(genome.fetch(&snp.chrom, 0, seq_end as u64)?);
        }
    } else if seq_end > fetch_start {
        seq.extend(genome.fetch(&snp.chrom, fetch_start as u64, seq_end as u64)?);
    }

    if seq.len() < want {
        seq.resize(want, b'N');
    }
    seq.truncate(want);
    Ok(seq)
}

/// Splice `allele` over `span` bases at `offset`
fn splice(seq: &[u8], offset: usize, span: usize, allele: &[u8]) -> Vec<u8> {
    let mut spliced = Vec::with_capacity(seq.len() + allele.len());
    spliced.extend_from_slice(&seq[..offset]);
    spliced.extend_from_slice(allele);
    spliced.extend_from_slice(&seq[(offset + span).min(seq.len())..]);
    spliced
}

/// Build encoded allele sequences for every SNP whose reference reconciles with the genome
pub fn snp_sequences<S: SequenceSource + ?Sized>(
    snps: &[Snp],
    genome: &mut S,
    seq_len: usize,
) -> Result<SnpSequences> {
    ensure!(seq_len >= 2, "Sequence length must be at least 2, got {}", seq_len);
    let left_len = seq_len / 2 - 1;
    let mut out = SnpSequences::default();

    for snp in snps {
        let mut seq = fetch_window(genome, snp, seq_len).with_context(|| format!("Fetching {snp}"))?;

        let ref_allele = snp.ref_allele.to_ascii_uppercase();
        let ref_len = ref_allele.len();
        let seq_ref = match seq.get(left_len..left_len + ref_len) {
            Some(s) => s.to_vec(),
            None => {
                warn!("Skipping {} - window too short for its alleles", snp.rsid);
                continue;
            }
        };

        if seq_ref != ref_allele.as_bytes() {
            let matches_alt = snp
                .alt_alleles
                .iter()
                .any(|al| al.to_ascii_uppercase().as_bytes() == seq_ref.as_slice());
            if !matches_alt {
                warn!(
                    "Skipping {} - neither allele matches reference genome: {} vs {}",
                    snp.rsid,
                    snp.ref_allele,
                    String::from_utf8_lossy(&seq_ref)
                );
                continue;
            }

            warn!(
                "{} - alt (as opposed to ref) allele matches reference genome; changing reference genome to match.",
                snp.rsid
            );
            seq = splice(&seq, left_len, seq_ref.len(), ref_allele.as_bytes());
        }

        let ref_seq = seq[..seq.len().min(seq_len)].to_vec();
        out.push(&snp.rsid, &snp.ref_allele, ref_seq, seq_len);

        for alt_al in &snp.alt_alleles {
            let alt_seq = splice(&seq, left_len, ref_len, alt_al.to_ascii_uppercase().as_bytes());
            out.push(&snp.rsid, alt_al, alt_seq, seq_len);
        }

        out.snps.push(snp.clone());
    }

    Ok(out)
}
