//! File-list driver: one `FileNum \t FileName [\t IDPrefix]` line per file to
//! index, one block of index lines per file on the output.

use std::{
    fs::File,
    io::{BufRead, Write},
    path::Path,
};

use tracing::{debug, error, info, warn};

use crate::{error::IndexError, report::write_report, scanner::Indexer, utils::show};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSpec<'a> {
    pub file_number: i64,
    pub path: &'a str,
    pub prefix: Option<&'a [u8]>,
}

/// Parses one file-list line. Fields are separated by tabs; anything below
/// space ends a field. Returns `None` for lines to skip.
pub fn parse_file_list_line(line: &[u8]) -> Option<FileSpec<'_>> {
    let mut fields = line
        .split(|&c| c < b' ')
        .filter(|f| !f.is_empty());
    let number = fields.next()?;
    let Some(path) = fields.next() else {
        warn!("File list line has no file name: {}", show(line.trim_ascii_end()));
        return None;
    };
    let file_number = match atoi_simd::parse::<i64>(number) {
        Ok(n) => n,
        Err(_) => {
            warn!("Bad file number in file list: {}", show(number));
            return None;
        }
    };
    let Ok(path) = std::str::from_utf8(path) else {
        warn!("File name is not valid UTF-8: {}", show(path));
        return None;
    };
    Some(FileSpec {
        file_number,
        path,
        prefix: fields.next(),
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files: u64,
    pub sequences: u64,
}

/// Indexes every file named in `list`, writing index lines to `out`.
///
/// Files that cannot be opened or read are logged and skipped. Capacity
/// errors end the run.
pub fn run<L: BufRead, W: Write>(
    indexer: &mut Indexer,
    mut list: L,
    out: &mut W,
) -> Result<RunSummary, IndexError> {
    let mut summary = RunSummary::default();
    let mut line = Vec::new();
    loop {
        line.clear();
        if list.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        let Some(spec) = parse_file_list_line(&line) else {
            continue;
        };
        let file = match File::open(Path::new(spec.path)) {
            Ok(f) => f,
            Err(e) => {
                error!("Failed to open translations file: {}: {}", spec.path, e);
                continue;
            }
        };
        match indexer.index_reader(file, spec.prefix) {
            Ok(scan) => debug!("{}: {:?}", spec.path, scan),
            Err(IndexError::Io(e)) => {
                error!("Failed reading {}: {}", spec.path, e);
                continue;
            }
            Err(e) => return Err(e),
        }
        summary.sequences += write_report(indexer.arena(), spec.file_number, out)?;
        summary.files += 1;
    }
    out.flush()?;
    info!(
        "indexed {} sequences in {} files",
        summary.sequences, summary.files
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fields() {
        let spec = parse_file_list_line(b"7\t/data/Features/peg/fasta\tfig|83333.1.\n").unwrap();
        assert_eq!(spec.file_number, 7);
        assert_eq!(spec.path, "/data/Features/peg/fasta");
        assert_eq!(spec.prefix, Some(&b"fig|83333.1."[..]));

        let spec = parse_file_list_line(b"12\tgenome.faa\r\n").unwrap();
        assert_eq!(spec.file_number, 12);
        assert_eq!(spec.path, "genome.faa");
        assert_eq!(spec.prefix, None);
    }

    #[test]
    fn skips_bad_lines() {
        assert!(parse_file_list_line(b"\n").is_none());
        assert!(parse_file_list_line(b"7\n").is_none());
        assert!(parse_file_list_line(b"seven\tfile\n").is_none());
    }
}
