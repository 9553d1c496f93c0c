use std::io::{BufWriter, Write};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use seq_seek_index::{
    IndexError, Indexer, IndexerConfig,
    config::{DEFAULT_AVG_ID_LEN, DEFAULT_SUFFIX_LEN, READ_BUFFER_LEN},
    driver,
};

/// Reads `FileNum \t FileName [\t IDPrefix]` lines on stdin and writes
/// `SeqId \t FileNum \t StartSeek \t DataBytes \t SeqLen \t Cksum \t SuffixCk`
/// lines on stdout.
#[derive(clap::Parser, Debug)]
#[command(version, about)]
struct Arguments {
    #[arg(
        value_name = "max_ids",
        value_parser = clap::value_parser!(u32).range(1..),
        help = "maximum number of distinct ids in one file."
    )]
    max_ids: u32,
    #[arg(
        value_name = "max_id_len",
        value_parser = clap::value_parser!(u32).range(1..),
        help = "ids longer than this are truncated."
    )]
    max_id_len: u32,
    #[arg(
        value_name = "cksum_suffix_len",
        default_value_t = DEFAULT_SUFFIX_LEN,
        help = "number of trailing residues in the suffix cksum (0 means the default)."
    )]
    suffix_len: usize,
    #[arg(
        long,
        default_value_t = DEFAULT_AVG_ID_LEN,
        help = "average bytes of id text reserved per entry."
    )]
    avg_id_len: usize,
    #[arg(long, default_value_t = READ_BUFFER_LEN, hide = true)]
    buffer_len: usize,
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "more log output (-v info, -vv debug, -vvv trace)."
    )]
    verbose: u8,
}

impl Arguments {
    fn suffix_len(&self) -> usize {
        match self.suffix_len {
            0 => DEFAULT_SUFFIX_LEN,
            n => n,
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Arguments) -> Result<(), IndexError> {
    let config = IndexerConfig::new(args.max_ids as usize, args.max_id_len as usize)
        .with_suffix_len(args.suffix_len())
        .with_avg_id_len(args.avg_id_len)
        .with_read_buffer_len(args.buffer_len);
    let mut indexer = Indexer::new(config)?;

    let stdin = std::io::stdin().lock();
    let mut output = BufWriter::with_capacity(1024 * 1024, std::io::stdout().lock());
    driver::run(&mut indexer, stdin, &mut output)?;
    output.flush()?;
    Ok(())
}

fn main() -> Result<ExitCode> {
    let args = Arguments::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            error!("{e}");
            Ok(ExitCode::from(e.exit_code() as u8))
        }
    }
}

#[test]
fn test_arguments() {
    use clap::CommandFactory;
    Arguments::command().debug_assert();
}

#[test]
fn test_positional_suffix_len() {
    let args = Arguments::try_parse_from(["seq-seek-index", "1000", "40", "32"]).unwrap();
    assert_eq!((args.max_ids, args.max_id_len, args.suffix_len), (1000, 40, 32));
    let args = Arguments::try_parse_from(["seq-seek-index", "1000", "40"]).unwrap();
    assert_eq!(args.suffix_len, DEFAULT_SUFFIX_LEN);
    assert!(Arguments::try_parse_from(["seq-seek-index", "0", "40"]).is_err());
}

#[test]
fn test_zero_suffix_len_uses_default() {
    let args = Arguments::try_parse_from(["seq-seek-index", "1000", "40", "0"]).unwrap();
    assert_eq!(args.suffix_len(), DEFAULT_SUFFIX_LEN);
    let args = Arguments::try_parse_from(["seq-seek-index", "1000", "40", "12"]).unwrap();
    assert_eq!(args.suffix_len(), 12);
}
