use crate::cksum::cksum_bytes;

/// Smallest ring the suffix buffer will use.
pub const SUFFIX_BUFFER_LEN: usize = 1024;

/// Circular store of the most recent residues of the open record.
///
/// Residue `n` of a record (0-based) lives at `n & mask`, so the ring never
/// needs clearing between records: a record only ever reads back the slots it
/// wrote itself.
pub struct SuffixBuffer {
    ring: Box<[u8]>,
    mask: u64,
    scratch: Vec<u8>,
}

impl SuffixBuffer {
    /// Ring large enough (and a power of two) to hold `suffix_len` residues.
    pub fn for_suffix_len(suffix_len: usize) -> Self {
        let cap = suffix_len.next_power_of_two().max(SUFFIX_BUFFER_LEN);
        debug_assert!(cap.is_power_of_two() && cap >= suffix_len);
        Self {
            ring: vec![0u8; cap].into_boxed_slice(),
            mask: (cap - 1) as u64,
            scratch: Vec::with_capacity(suffix_len),
        }
    }

    /// Stores the residue that brings the record to `index + 1` residues.
    #[inline(always)]
    pub fn push(&mut self, index: u64, residue: u8) {
        self.ring[(index & self.mask) as usize] = residue;
    }

    /// Checksum of the last `min(count, suffix_len)` residues, in order.
    pub fn checksum(&mut self, count: u64, suffix_len: usize) -> u32 {
        let window = count.min(suffix_len as u64);
        self.scratch.clear();
        for i in count - window..count {
            self.scratch.push(self.ring[(i & self.mask) as usize]);
        }
        cksum_bytes(&self.scratch)
    }
}
