/// Letters accepted as residues without complaint: `A`–`N` and `P`–`Z`, in
/// either case. `O` and `*` are not in the table.
pub const RESIDUE_CHARS: [u8; 25] = *b"ABCDEFGHIJKLMNPQRSTUVWXYZ";

const fn make_residue_table() -> [bool; 256] {
    let mut table = [false; 256];
    let mut i = 0;
    while i < RESIDUE_CHARS.len() {
        let c = RESIDUE_CHARS[i];
        table[c as usize] = true;
        table[c.to_ascii_lowercase() as usize] = true;
        i += 1;
    }
    table
}

static IS_RESIDUE: [bool; 256] = make_residue_table();

/// Role of a byte inside a sequence line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteClass {
    /// Known residue letter.
    Residue,
    /// Non-blank byte outside the residue table. Counted like a residue.
    Unexpected,
    /// Blanks, control bytes and the `*` stop symbol.
    Skip,
    /// `\n` or NUL.
    LineEnd,
}

#[inline(always)]
pub fn classify(c: u8) -> ByteClass {
    if IS_RESIDUE[c as usize] {
        ByteClass::Residue
    } else if c == b'\n' || c == 0 {
        ByteClass::LineEnd
    } else if c > b' ' && c != b'*' {
        ByteClass::Unexpected
    } else {
        ByteClass::Skip
    }
}

#[inline(always)]
pub fn is_line_end(c: u8) -> bool {
    c == b'\n' || c == 0
}

/// Blank for identifier purposes: any byte at or below space.
#[inline(always)]
pub fn is_blank(c: u8) -> bool {
    c <= b' '
}

/// Printable rendering of an identifier for diagnostics.
pub fn show(key: &[u8]) -> std::borrow::Cow<'_, str> {
    String::from_utf8_lossy(key)
}
