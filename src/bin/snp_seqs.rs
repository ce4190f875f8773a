/// snp_seqs - Allele sequences around VCF SNPs
///
/// Writes one FASTA record per allele, labelled `{rsid}_{allele}`, and
/// optionally the flattened one-hot encodings as a TSV.
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use peakdb::genome::{fai_path, Genome, IndexedGenome, SequenceSource};
use peakdb::snp::{read_vcf_snps, VcfColumns};
use peakdb::snp_seq::snp_sequences;

#[derive(Parser)]
#[clap(
    name = "snp_seqs",
    about = "Extract allele sequences around VCF SNPs for sequence-activity models"
)]
struct Args {
    /// VCF file of SNPs
    vcf: PathBuf,

    /// Genome FASTA (plain, gzip or bgzip); read through `{path}.fai` when present
    genome_fasta: PathBuf,

    /// Sequence length to extract and encode
    #[clap(short = 'l', long = "seq-len", default_value = "600")]
    seq_len: usize,

    /// Read the index SNP label from VCF column 6
    #[clap(short = 'i', long = "index-snp")]
    index_snp: bool,

    /// Read a score from VCF column 7
    #[clap(short = 's', long = "score")]
    score: bool,

    /// Output FASTA of allele sequences (stdout if not specified)
    #[clap(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Write flattened one-hot encodings (label then A,C,G,T channels) to this TSV
    #[clap(long = "one-hot")]
    one_hot: Option<PathBuf>,

    /// Quiet mode (warnings and errors only)
    #[clap(long = "quiet")]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.quiet { "warn" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    let columns = VcfColumns {
        index_snp: args.index_snp,
        score: args.score,
    };
    let snps = read_vcf_snps(&args.vcf, columns)?;
    info!("Read {} SNPs from {}", snps.len(), args.vcf.display());

    let mut genome: Box<dyn SequenceSource> = if fai_path(&args.genome_fasta).exists() {
        let genome = IndexedGenome::open(&args.genome_fasta)?;
        info!("Indexed {} sequences in {}", genome.len(), args.genome_fasta.display());
        Box::new(genome)
    } else {
        let genome = Genome::from_fasta(&args.genome_fasta)?;
        info!("Loaded {} sequences from {}", genome.len(), args.genome_fasta.display());
        Box::new(genome)
    };

    let seqs = snp_sequences(&snps, genome.as_mut(), args.seq_len)?;
    info!(
        "Encoded {} allele sequences for {} of {} SNPs",
        seqs.len(),
        seqs.snps.len(),
        snps.len()
    );

    let mut output: Box<dyn Write> = if let Some(ref path) = args.output {
        Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        ))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };
    for (header, seq) in seqs.headers.iter().zip(&seqs.seqs) {
        writeln!(output, ">{header}\n{seq}")?;
    }
    output.flush()?;

    if let Some(ref path) = args.one_hot {
        let mut writer = BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        );
        for (header, code) in seqs.headers.iter().zip(&seqs.encodings) {
            write!(writer, "{header}")?;
            for v in code.flatten() {
                write!(writer, "\t{v}")?;
            }
            writeln!(writer)?;
        }
        writer.flush()?;
    }

    Ok(())
}
