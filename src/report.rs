use std::io::{self, Write};

use crate::arena::IndexArena;

/// Writes one line per populated entry, in insertion order:
///
/// `id \t file_number \t offset \t span \t residues \t cksum \t suffix_cksum`
///
/// Checksums are printed as signed 32-bit integers. Returns the number of
/// lines written.
pub fn write_report<W: Write>(arena: &IndexArena, file_number: i64, out: &mut W) -> io::Result<u64> {
    let mut n = 0;
    for (key, e) in arena.iter().filter(|(_, e)| e.is_populated()) {
        out.write_all(key)?;
        writeln!(
            out,
            "\t{}\t{}\t{}\t{}\t{}\t{}",
            file_number,
            e.sequence_offset,
            e.span_bytes,
            e.residue_count,
            e.content_checksum as i32,
            e.suffix_checksum as i32
        )?;
        n += 1;
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_populated_entries_only() {
        let mut arena = IndexArena::with_capacity(4, 64);
        let a = arena.insert(b"fig|1.peg.1").unwrap();
        arena.insert(b"empty").unwrap();
        let e = arena.entry_mut(a);
        e.sequence_offset = 12;
        e.span_bytes = 22;
        e.residue_count = 20;
        e.content_checksum = 3_971_542_173;
        e.suffix_checksum = 7;

        let mut out = Vec::new();
        let n = write_report(&arena, 42, &mut out).unwrap();
        assert_eq!(n, 1);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "fig|1.peg.1\t42\t12\t22\t20\t-323425123\t7\n"
        );
    }
}
