//! POSIX `cksum` style CRC.
//!
//! The CRC is MSB-first with polynomial `0x04C11DB7` and a zero initial value.
//! Finalization folds the number of checksummed bytes into the CRC, low byte
//! first, and returns the complement. Downstream consumers compare these values
//! bit for bit, so the length fold is not optional.

const POLY: u32 = 0x04c1_1db7;

const fn make_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut c = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            c = if c & 0x8000_0000 != 0 { (c << 1) ^ POLY } else { c << 1 };
            bit += 1;
        }
        table[i] = c;
        i += 1;
    }
    table
}

pub static CRC_TABLE: [u32; 256] = make_table();

#[inline(always)]
pub fn update(crc: u32, byte: u8) -> u32 {
    (crc << 8) ^ CRC_TABLE[((crc >> 24) ^ byte as u32) as usize]
}

/// Folds `len` into `crc` and complements it.
#[inline]
pub fn finalize(mut crc: u32, mut len: u64) -> u32 {
    while len != 0 {
        crc = update(crc, (len & 0xff) as u8);
        len >>= 8;
    }
    !crc
}

/// One-shot checksum of a byte string, finalized with its own length.
pub fn cksum_bytes(bytes: &[u8]) -> u32 {
    let mut ck = Cksum::new();
    ck.extend(bytes);
    ck.finish()
}

/// Running checksum. The byte count doubles as the residue count of the record
/// being accumulated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cksum {
    crc: u32,
    len: u64,
}

impl Cksum {
    pub const fn new() -> Self {
        Self { crc: 0, len: 0 }
    }

    #[inline(always)]
    pub fn push(&mut self, byte: u8) {
        self.crc = update(self.crc, byte);
        self.len += 1;
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.push(b);
        }
    }

    /// Bytes pushed so far.
    #[inline]
    pub const fn count(&self) -> u64 {
        self.len
    }

    pub fn finish(&self) -> u32 {
        finalize(self.crc, self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crc::{CRC_32_CKSUM, Crc};

    const POSIX_CKSUM: Crc<u32> = Crc::<u32>::new(&CRC_32_CKSUM);

    /// `crc`'s CKSUM digest with the length bytes appended, which is what the
    /// `cksum` utility computes.
    fn oracle(data: &[u8]) -> u32 {
        let mut digest = POSIX_CKSUM.digest();
        digest.update(data);
        let mut len = data.len() as u64;
        while len != 0 {
            digest.update(&[(len & 0xff) as u8]);
            len >>= 8;
        }
        digest.finalize()
    }

    #[test]
    fn table_matches_polynomial() {
        assert_eq!(CRC_TABLE[0], 0);
        assert_eq!(CRC_TABLE[1], 0x04c1_1db7);
        assert_eq!(CRC_TABLE[2], 0x0982_3b6e);
        assert_eq!(CRC_TABLE[255], 0xb1f7_40b4);
    }

    #[test]
    fn known_values() {
        assert_eq!(cksum_bytes(b""), 4_294_967_295);
        assert_eq!(cksum_bytes(b"123456789"), 930_766_865);
    }

    #[test]
    fn agrees_with_crc_crate() {
        let long: Vec<u8> = (0..70_000u32).map(|i| b"ACDEFGHIKLMNPQRSTVWY"[(i % 20) as usize]).collect();
        for data in [&b"M"[..], b"MKTAYIAKQRQISFVKSHFSRQ", &long] {
            assert_eq!(cksum_bytes(data), oracle(data));
        }
    }

    #[test]
    fn running_form_matches_one_shot() {
        let mut ck = Cksum::new();
        ck.extend(b"MKTAYIAK");
        ck.push(b'Q');
        assert_eq!(ck.count(), 9);
        assert_eq!(ck.finish(), cksum_bytes(b"MKTAYIAKQ"));
    }

    #[test]
    fn sensitive_to_content_and_length() {
        let base = cksum_bytes(b"MKTAYIAKQRQ");
        assert_eq!(base, cksum_bytes(b"MKTAYIAKQRQ"));
        assert_ne!(base, cksum_bytes(b"MKTAYIAKQRA"));
        assert_ne!(cksum_bytes(b"A"), cksum_bytes(b"AA"));
    }
}
