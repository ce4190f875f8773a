/// peak_ids_to_bed - Turn `chrom:start-end(strand)` identifiers back into BED
///
/// Reads one identifier per line (e.g. the first column of an activity table
/// or exported test-set headers) and prints BED6.
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;

use peakdb::bed::open_input;
use peakdb::peak_id::parse_peak_id;

#[derive(Parser)]
#[clap(
    name = "peak_ids_to_bed",
    about = "Convert peak identifiers such as chr1:100-700(+) to BED"
)]
struct Args {
    /// File of identifiers, one per line (stdin if not specified)
    input: Option<PathBuf>,

    /// Skip the first line (activity table header)
    #[clap(long = "header")]
    header: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let input: Box<dyn BufRead> = match args.input {
        Some(ref path) => open_input(path)?,
        None => Box::new(io::BufReader::new(io::stdin())),
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for (line_no, line) in input.lines().enumerate().skip(usize::from(args.header)) {
        let line = line?;
        let Some(id) = line.split('\t').next().filter(|s| !s.trim().is_empty()) else {
            continue;
        };
        let peak = parse_peak_id(id).with_context(|| format!("line {}", line_no + 1))?;
        writeln!(out, "{}", peak.bed_str())?;
    }
    out.flush()?;

    Ok(())
}
