use crate::{
    error::IndexError,
    table::{EntryId, KeySource},
    utils::show,
};

/// Latest index data for one identifier.
///
/// `residue_count == 0` marks an entry that has no reportable record (either
/// none was committed yet, or the last one was too short).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexEntry {
    key_start: u32,
    key_len: u32,
    pub sequence_offset: u64,
    pub span_bytes: u64,
    pub residue_count: u64,
    pub content_checksum: u32,
    pub suffix_checksum: u32,
}

impl IndexEntry {
    pub fn is_populated(&self) -> bool {
        self.residue_count > 0
    }
}

/// Fixed-capacity entry array plus a contiguous text region for identifiers.
///
/// Storage is sized once; [`IndexArena::begin_file`] truncates both regions
/// without giving memory back.
pub struct IndexArena {
    entries: Vec<IndexEntry>,
    keys: Vec<u8>,
    max_ids: usize,
    keyspace: usize,
}

impl IndexArena {
    pub fn with_capacity(max_ids: usize, keyspace: usize) -> Self {
        Self {
            entries: Vec::with_capacity(max_ids),
            keys: Vec::with_capacity(keyspace),
            max_ids,
            keyspace,
        }
    }

    pub fn begin_file(&mut self) {
        self.entries.clear();
        self.keys.clear();
    }

    /// Appends a zeroed entry for `key`.
    pub fn insert(&mut self, key: &[u8]) -> Result<EntryId, IndexError> {
        if self.entries.len() >= self.max_ids {
            return Err(IndexError::TooManyIds {
                max_ids: self.max_ids,
                last: self.last_key(),
            });
        }
        if self.keys.len() + key.len() > self.keyspace {
            return Err(IndexError::KeySpaceExhausted {
                keyspace: self.keyspace,
                max_ids: self.max_ids,
                last: self.last_key(),
            });
        }
        let id = EntryId(self.entries.len() as u32);
        self.entries.push(IndexEntry {
            key_start: self.keys.len() as u32,
            key_len: key.len() as u32,
            ..Default::default()
        });
        self.keys.extend_from_slice(key);
        Ok(id)
    }

    #[inline]
    pub fn entry_mut(&mut self, id: EntryId) -> &mut IndexEntry {
        &mut self.entries[id.index()]
    }

    /// Entries in insertion order with their identifiers.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &IndexEntry)> + '_ {
        self.entries.iter().map(|e| (self.text(e), e))
    }

    fn text(&self, e: &IndexEntry) -> &[u8] {
        let start = e.key_start as usize;
        &self.keys[start..start + e.key_len as usize]
    }

    /// Identifier of the most recently added entry, for diagnostics.
    pub fn last_key(&self) -> Option<String> {
        self.entries.last().map(|e| show(self.text(e)).into_owned())
    }
}

impl KeySource for IndexArena {
    #[inline]
    fn key(&self, id: EntryId) -> &[u8] {
        self.text(&self.entries[id.index()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_read_back() {
        let mut arena = IndexArena::with_capacity(4, 64);
        let a = arena.insert(b"fig|83333.1.peg.1").unwrap();
        let b = arena.insert(b"sp|P69905").unwrap();
        assert_eq!(arena.key(a), b"fig|83333.1.peg.1");
        assert_eq!(arena.key(b), b"sp|P69905");
        assert!(!arena.entries[a.index()].is_populated());
        arena.entry_mut(b).residue_count = 12;
        let populated: Vec<_> = arena.iter().filter(|(_, e)| e.is_populated()).map(|(k, _)| k).collect();
        assert_eq!(populated, vec![&b"sp|P69905"[..]]);
    }

    #[test]
    fn entry_capacity_is_fatal() {
        let mut arena = IndexArena::with_capacity(2, 64);
        arena.insert(b"a").unwrap();
        arena.insert(b"b").unwrap();
        match arena.insert(b"c") {
            Err(IndexError::TooManyIds { max_ids: 2, last }) => assert_eq!(last.as_deref(), Some("b")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn keyspace_is_fatal() {
        let mut arena = IndexArena::with_capacity(10, 8);
        arena.insert(b"abcdef").unwrap();
        assert!(matches!(
            arena.insert(b"xyz"),
            Err(IndexError::KeySpaceExhausted { keyspace: 8, .. })
        ));
    }

    #[test]
    fn begin_file_keeps_storage() {
        let mut arena = IndexArena::with_capacity(3, 32);
        arena.insert(b"one").unwrap();
        let text_cap = arena.keys.capacity();
        let entry_cap = arena.entries.capacity();
        arena.begin_file();
        assert!(arena.entries.is_empty());
        assert!(arena.keys.is_empty());
        assert_eq!(arena.keys.capacity(), text_cap);
        assert_eq!(arena.entries.capacity(), entry_cap);
        let id = arena.insert(b"two").unwrap();
        assert_eq!(id, EntryId(0));
    }
}
