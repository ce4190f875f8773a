/// SNP sequence extraction against a FASTA genome on disk
use anyhow::Result;
use pretty_assertions::assert_eq;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

use peakdb::genome::{fai_path, Genome, IndexedGenome, SequenceSource};
use peakdb::snp::{read_vcf_snps, VcfColumns};
use peakdb::snp_seq::snp_sequences;

const GENOME: &str = ">chr1\nACGTACGTAC\nGTACGTACGT\n>chr2\nTTTTTTTTTT\n";

// offsets of each sequence's first base in GENOME
const GENOME_FAI: &str = "chr1\t20\t6\t10\t11\nchr2\t10\t34\t10\t11\n";

const VCF: &str = "##fileformat=VCFv4.2
#CHROM\tPOS\tID\tREF\tALT
1\t10\trs_ref\tC\tA
chr1\t10\trs_swapped\tG\tC,T
chr2\t5\trs_bad\tA\tG
";

/// A SNP whose declared alt matches the genome is rewritten to carry its ref allele
#[test]
fn test_reference_repair_and_skip() -> Result<()> {
    let dir = TempDir::new()?;
    let fasta = dir.path().join("genome.fa");
    let vcf = dir.path().join("snps.vcf");
    fs::write(&fasta, GENOME)?;
    fs::write(&vcf, VCF)?;

    let mut genome = Genome::from_fasta(&fasta)?;
    assert_eq!(genome.fetch("chr1", 8, 12)?, b"ACGT");

    let snps = read_vcf_snps(&vcf, VcfColumns::default())?;
    assert_eq!(snps.len(), 3);

    let out = snp_sequences(&snps, &mut genome, 6)?;

    let kept: Vec<&str> = out.snps.iter().map(|s| s.rsid.as_str()).collect();
    assert_eq!(kept, vec!["rs_ref", "rs_swapped"]);

    // pos 10 on chr1 is 'C'; seq_len 6 -> two bases left, three right
    assert_eq!(
        out.headers,
        vec!["rs_ref_C", "rs_ref_A", "rs_swapped_G", "rs_swapped_C", "rs_swapped_T"]
    );
    assert_eq!(
        out.seqs,
        vec!["TACGTA", "TAAGTA", "TAGGTA", "TACGTA", "TATGTA"]
    );
    assert!(out.encodings.iter().all(|e| e.len() == 6));
    Ok(())
}

/// Indexed and in-memory genomes yield the same allele sequences
#[test]
fn test_indexed_genome_same_sequences() -> Result<()> {
    let dir = TempDir::new()?;
    let fasta = dir.path().join("genome.fa");
    let vcf = dir.path().join("snps.vcf");
    fs::write(&fasta, GENOME)?;
    fs::write(fai_path(&fasta), GENOME_FAI)?;
    fs::write(&vcf, VCF)?;

    let snps = read_vcf_snps(&vcf, VcfColumns::default())?;
    let mut in_memory = Genome::from_fasta(&fasta)?;
    let mut indexed = IndexedGenome::open(&fasta)?;

    let expected = snp_sequences(&snps, &mut in_memory, 6)?;
    let got = snp_sequences(&snps, &mut indexed, 6)?;
    assert_eq!(got.headers, expected.headers);
    assert_eq!(got.seqs, expected.seqs);
    Ok(())
}

/// The binary writes one FASTA record per allele
#[test]
fn test_snp_seqs_cli() -> Result<()> {
    let dir = TempDir::new()?;
    let fasta = dir.path().join("genome.fa");
    let vcf = dir.path().join("snps.vcf");
    let out_fa = dir.path().join("alleles.fa");
    let out_tsv = dir.path().join("alleles.tsv");
    fs::write(&fasta, GENOME)?;
    fs::write(&vcf, VCF)?;

    let output = Command::new(env!("CARGO_BIN_EXE_snp_seqs"))
        .arg(&vcf)
        .arg(&fasta)
        .args(["-l", "6", "--quiet", "-o"])
        .arg(&out_fa)
        .arg("--one-hot")
        .arg(&out_tsv)
        .output()?;
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let fa = fs::read_to_string(&out_fa)?;
    assert_eq!(fa.lines().filter(|l| l.starts_with('>')).count(), 5);
    assert!(fa.starts_with(">rs_ref_C\nTACGTA\n"));

    let tsv = fs::read_to_string(&out_tsv)?;
    let first = tsv.lines().next().unwrap();
    let fields: Vec<&str> = first.split('\t').collect();
    assert_eq!(fields[0], "rs_ref_C");
    assert_eq!(fields.len(), 1 + 4 * 6);
    Ok(())
}

/// With a `.fai` beside the FASTA the binary reads through the index
#[test]
fn test_snp_seqs_cli_indexed() -> Result<()> {
    let dir = TempDir::new()?;
    let fasta = dir.path().join("genome.fa");
    let vcf = dir.path().join("snps.vcf");
    let out_fa = dir.path().join("alleles.fa");
    fs::write(&fasta, GENOME)?;
    fs::write(fai_path(&fasta), GENOME_FAI)?;
    fs::write(&vcf, VCF)?;

    let output = Command::new(env!("CARGO_BIN_EXE_snp_seqs"))
        .arg(&vcf)
        .arg(&fasta)
        .args(["-l", "6", "-o"])
        .arg(&out_fa)
        .output()?;
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Indexed 2 sequences"));

    let fa = fs::read_to_string(&out_fa)?;
    assert!(fa.starts_with(">rs_ref_C\nTACGTA\n>rs_ref_A\nTAAGTA\n"));
    Ok(())
}
