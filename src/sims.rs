//! Seek index for similarity files.
//!
//! A sims file is already grouped by query: consecutive lines whose first
//! field (up to the first whitespace byte) is the same identifier form one
//! block. Each block is reported as `id \t file_number \t seek \t length`.

use std::io::{self, Read, Write};

use thiserror::Error;
use tracing::warn;

use crate::{cursor::ByteCursor, utils::show};

/// Identifiers longer than this abort the run.
pub const MAX_SIMS_ID_LEN: usize = 1024;
/// Identifiers at least this long are not reported.
pub const MAX_REPORTED_ID_LEN: usize = 64;
pub const SIMS_BUFFER_LEN: usize = 256 * 1024;

#[derive(Debug, Error)]
pub enum SimsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Identifier at seek of {seek} is > {max} bytes: {id}", max = MAX_SIMS_ID_LEN)]
    IdTooLong { seek: u64, id: String },
}

/// Indexes a sims stream. Returns the number of blocks written.
pub fn index_sims<R: Read, W: Write>(
    input: R,
    file_number: &str,
    buf: &mut [u8],
    out: &mut W,
) -> Result<u64, SimsError> {
    let mut cursor = ByteCursor::new(input, buf);
    let mut current: Vec<u8> = Vec::new();
    let mut line_id: Vec<u8> = Vec::new();
    let mut block_start = 0u64;
    let mut written = 0;

    loop {
        let line_start = cursor.offset();
        line_id.clear();
        let mut terminator = None;
        while let Some(c) = cursor.try_next_byte()? {
            if c.is_ascii_whitespace() {
                terminator = Some(c);
                break;
            }
            if line_id.len() >= MAX_SIMS_ID_LEN {
                return Err(SimsError::IdTooLong {
                    seek: line_start,
                    id: show(&line_id).into_owned(),
                });
            }
            line_id.push(c);
        }

        let Some(terminator) = terminator else {
            // End of input. A partial identifier line is not part of any block.
            if !line_id.is_empty() {
                warn!("End of sims file inside identifier");
            }
            written += report(out, &current, file_number, block_start, line_start)?;
            out.flush()?;
            return Ok(written);
        };

        if line_id != current {
            written += report(out, &current, file_number, block_start, line_start)?;
            current.clone_from(&line_id);
            block_start = line_start;
        }

        if terminator != b'\n' && !cursor.skip_line()? {
            let end = cursor.offset();
            written += report(out, &current, file_number, block_start, end)?;
            out.flush()?;
            return Ok(written);
        }
    }
}

fn report<W: Write>(out: &mut W, id: &[u8], file_number: &str, start: u64, end: u64) -> io::Result<u64> {
    if id.is_empty() || id.len() >= MAX_REPORTED_ID_LEN || file_number.is_empty() || end <= start {
        return Ok(0);
    }
    out.write_all(id)?;
    writeln!(out, "\t{}\t{}\t{}", file_number, start, end - start)?;
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &[u8], cap: usize) -> String {
        let mut buf = vec![0u8; cap];
        let mut out = Vec::new();
        index_sims(input, "3", &mut buf, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    const SIMS: &[u8] = b"fig|1.peg.1\tfig|2.peg.9\t98.5\n\
fig|1.peg.1\tfig|3.peg.4\t71.0\n\
fig|1.peg.2\tfig|2.peg.1\t55.2\n";

    #[test]
    fn groups_consecutive_lines() {
        let out = run(SIMS, SIMS_BUFFER_LEN);
        assert_eq!(out, "fig|1.peg.1\t3\t0\t58\nfig|1.peg.2\t3\t58\t29\n");
    }

    #[test]
    fn buffer_size_does_not_matter() {
        let expected = run(SIMS, SIMS_BUFFER_LEN);
        for cap in 1..=40 {
            assert_eq!(run(SIMS, cap), expected, "buffer of {cap} bytes");
        }
    }

    #[test]
    fn missing_final_newline() {
        let out = run(b"a\tx\nb\ty", 64);
        assert_eq!(out, "a\t3\t0\t4\nb\t3\t4\t3\n");
    }

    #[test]
    fn partial_identifier_line_is_dropped() {
        assert_eq!(run(b"a\tx\nb", 64), "a\t3\t0\t4\n");
        assert_eq!(run(b"ab\tx\na", 64), "ab\t3\t0\t5\n");
        // Same id as the open block: the block still ends at the line start.
        assert_eq!(run(b"ab\tx\nab", 64), "ab\t3\t0\t5\n");
        for cap in 1..=8 {
            assert_eq!(run(b"ab\tx\na", cap), "ab\t3\t0\t5\n", "buffer of {cap} bytes");
        }
    }

    #[test]
    fn long_ids_are_not_reported() {
        let id = "q".repeat(MAX_REPORTED_ID_LEN);
        let input = format!("{id}\tx\nshort\ty\n");
        assert_eq!(run(input.as_bytes(), 64), format!("short\t3\t{}\t8\n", id.len() + 3));
    }

    #[test]
    fn oversized_id_is_fatal() {
        let input = format!("{}\tx\n", "q".repeat(MAX_SIMS_ID_LEN + 1));
        let mut buf = vec![0u8; 64];
        let err = index_sims(input.as_bytes(), "3", &mut buf, &mut Vec::<u8>::new()).unwrap_err();
        assert!(matches!(err, SimsError::IdTooLong { seek: 0, .. }));
    }

    #[test]
    fn empty_input_writes_nothing() {
        assert_eq!(run(b"", 16), "");
    }
}
