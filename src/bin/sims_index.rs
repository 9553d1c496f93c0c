use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use clap::Parser;
use seq_seek_index::sims::{SIMS_BUFFER_LEN, index_sims};
use tracing::info;

/// Reads a sims file on stdin and writes `SeqID \t FileNumber \t Seek \t Length`
/// for each block of lines sharing a query id.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Arguments {
    #[arg(value_name = "SimsFileNumber")]
    file_number: String,
}

fn main() -> Result<()> {
    let args = Arguments::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut buf = vec![0u8; SIMS_BUFFER_LEN];
    let stdin = std::io::stdin().lock();
    let mut output = BufWriter::new(std::io::stdout().lock());
    let n = index_sims(stdin, &args.file_number, &mut buf, &mut output)
        .context("indexing sims file")?;
    output.flush()?;
    info!("indexed {n} sims blocks");
    Ok(())
}
