use crate::error::IndexError;

/// Identifier lines start with this byte.
pub const RECORD_MARKER: u8 = b'>';
/// Reserved separator inside identifiers.
pub const ID_SEPARATOR: u8 = b'|';
/// Separators kept in an identifier; it is cut at the next one.
pub const ALLOWED_SEPARATORS: usize = 4;
/// Records with fewer residues are computed but never reported.
pub const MIN_RESIDUES: u64 = 11;
/// Invalid residue messages per record before a final "Etc.".
pub const MAX_REPORTED_INVALID: u32 = 5;
pub const DEFAULT_SUFFIX_LEN: usize = 64;
/// Average identifier bytes reserved per entry in the text arena.
pub const DEFAULT_AVG_ID_LEN: usize = 32;
pub const READ_BUFFER_LEN: usize = 128 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerConfig {
    pub max_ids: usize,
    pub max_id_len: usize,
    pub suffix_len: usize,
    pub avg_id_len: usize,
    pub read_buffer_len: usize,
}

impl IndexerConfig {
    pub fn new(max_ids: usize, max_id_len: usize) -> Self {
        Self {
            max_ids,
            max_id_len,
            suffix_len: DEFAULT_SUFFIX_LEN,
            avg_id_len: DEFAULT_AVG_ID_LEN,
            read_buffer_len: READ_BUFFER_LEN,
        }
    }

    pub fn with_suffix_len(mut self, suffix_len: usize) -> Self {
        self.suffix_len = suffix_len;
        self
    }

    pub fn with_avg_id_len(mut self, avg_id_len: usize) -> Self {
        self.avg_id_len = avg_id_len;
        self
    }

    pub fn with_read_buffer_len(mut self, read_buffer_len: usize) -> Self {
        self.read_buffer_len = read_buffer_len;
        self
    }

    /// Bytes of identifier text the arena can hold.
    pub fn keyspace(&self) -> usize {
        self.max_ids.saturating_mul(self.avg_id_len)
    }

    pub fn validate(&self) -> Result<(), IndexError> {
        let fields = [
            ("max_ids", self.max_ids),
            ("max_id_len", self.max_id_len),
            ("suffix_len", self.suffix_len),
            ("avg_id_len", self.avg_id_len),
            ("read_buffer_len", self.read_buffer_len),
        ];
        for (name, value) in fields {
            if value == 0 {
                return Err(IndexError::InvalidConfig(format!("{name} must be at least 1")));
            }
        }
        // Arena indices and text offsets are u32.
        if self.max_ids > u32::MAX as usize {
            return Err(IndexError::InvalidConfig(format!(
                "max_ids must not exceed {}",
                u32::MAX
            )));
        }
        if self.keyspace() > u32::MAX as usize {
            return Err(IndexError::InvalidConfig(format!(
                "id text space of {} bytes (max_ids * avg_id_len) exceeds {}",
                self.keyspace(),
                u32::MAX
            )));
        }
        Ok(())
    }
}
