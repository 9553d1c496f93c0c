//! Single-file record scanner.
//!
//! Bytes are pulled one at a time from a [`ByteCursor`]. A `>` at the start of
//! a line opens an identifier; the lines after it are the sequence body, up to
//! the next `>` line or the end of the stream. Each record is committed into
//! the [`IndexArena`] entry that the [`IdTable`] resolves its identifier to,
//! overwriting whatever an earlier record with the same identifier left there.

use std::io::Read;

use tracing::{debug, warn};

use crate::{
    arena::IndexArena,
    cksum::Cksum,
    config::{
        ALLOWED_SEPARATORS, ID_SEPARATOR, IndexerConfig, MAX_REPORTED_INVALID, MIN_RESIDUES,
        RECORD_MARKER,
    },
    cursor::ByteCursor,
    error::IndexError,
    suffix::SuffixBuffer,
    table::{EntryId, IdTable, KeySource, Probe},
    utils::{ByteClass, classify, is_blank, is_line_end, show},
};

/// Counters for one scanned file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Identifier lines that resolved to an entry.
    pub records: u64,
    /// Records with fewer than [`MIN_RESIDUES`] residues.
    pub short_records: u64,
    /// Records that replaced data from an earlier record with the same id.
    pub duplicates: u64,
    /// Identifier lines skipped (empty, or failing the prefix check).
    pub skipped_ids: u64,
    pub truncated_ids: u64,
    pub invalid_residues: u64,
    pub bytes: u64,
}

/// Owns every buffer used to index files. Storage is allocated once and
/// logically reset at the start of each file.
pub struct Indexer {
    config: IndexerConfig,
    arena: IndexArena,
    table: IdTable,
    suffix: SuffixBuffer,
    key: Vec<u8>,
    read_buf: Box<[u8]>,
}

impl Indexer {
    pub fn new(config: IndexerConfig) -> Result<Self, IndexError> {
        config.validate()?;
        Ok(Self {
            arena: IndexArena::with_capacity(config.max_ids, config.keyspace()),
            table: IdTable::for_max_ids(config.max_ids),
            suffix: SuffixBuffer::for_suffix_len(config.suffix_len),
            key: Vec::with_capacity(config.max_id_len),
            read_buf: vec![0u8; config.read_buffer_len].into_boxed_slice(),
            config,
        })
    }

    /// Entries of the most recently indexed file.
    pub fn arena(&self) -> &IndexArena {
        &self.arena
    }

    pub fn begin_file(&mut self) {
        self.arena.begin_file();
        self.table.clear();
    }

    /// Indexes one file. Identifiers not starting with `prefix` (when given
    /// and non-empty) are skipped.
    pub fn index_reader<R: Read>(
        &mut self,
        reader: R,
        prefix: Option<&[u8]>,
    ) -> Result<ScanSummary, IndexError> {
        self.begin_file();
        let scan = Scan {
            cursor: ByteCursor::new(reader, &mut self.read_buf),
            config: &self.config,
            arena: &mut self.arena,
            table: &mut self.table,
            suffix: &mut self.suffix,
            key: &mut self.key,
            prefix: prefix.filter(|p| !p.is_empty()),
            summary: ScanSummary::default(),
        };
        scan.run()
    }
}

/// Record whose sequence body is being read.
#[derive(Debug)]
struct OpenRecord {
    entry: EntryId,
    start: u64,
    cksum: Cksum,
    invalid: u32,
}

impl OpenRecord {
    fn new(entry: EntryId, start: u64) -> Self {
        Self {
            entry,
            start,
            cksum: Cksum::new(),
            invalid: 0,
        }
    }
}

#[derive(Debug)]
enum ScanState {
    /// No open record; non-identifier lines are dropped.
    AwaitingRecord,
    /// The marker has been consumed.
    ReadingIdentifier,
    ReadingSequence(OpenRecord),
}

struct Scan<'a, R> {
    cursor: ByteCursor<'a, R>,
    config: &'a IndexerConfig,
    arena: &'a mut IndexArena,
    table: &'a mut IdTable,
    suffix: &'a mut SuffixBuffer,
    key: &'a mut Vec<u8>,
    prefix: Option<&'a [u8]>,
    summary: ScanSummary,
}

impl<R: Read> Scan<'_, R> {
    fn run(mut self) -> Result<ScanSummary, IndexError> {
        let mut state = ScanState::AwaitingRecord;
        loop {
            let next = match state {
                ScanState::AwaitingRecord => self.line_start(None)?,
                ScanState::ReadingIdentifier => self.read_identifier()?,
                ScanState::ReadingSequence(record) => self.line_start(Some(record))?,
            };
            match next {
                Some(s) => state = s,
                None => {
                    self.summary.bytes = self.cursor.offset();
                    return Ok(self.summary);
                }
            }
        }
    }

    /// Every point where the stream runs out with a record open ends here.
    fn on_end_of_stream(&mut self, open: Option<OpenRecord>) {
        if let Some(record) = open {
            let end = self.cursor.offset();
            self.commit(record, end);
        }
    }

    fn line_start(&mut self, open: Option<OpenRecord>) -> Result<Option<ScanState>, IndexError> {
        let Some(c) = self.cursor.try_next_byte()? else {
            self.on_end_of_stream(open);
            return Ok(None);
        };
        if c == RECORD_MARKER {
            if let Some(record) = open {
                // The body ends just before the marker.
                let end = self.cursor.offset() - 1;
                self.commit(record, end);
            }
            return Ok(Some(ScanState::ReadingIdentifier));
        }
        match open {
            Some(record) => self.read_sequence_line(record, c),
            None => {
                if is_line_end(c) || self.cursor.skip_line()? {
                    Ok(Some(ScanState::AwaitingRecord))
                } else {
                    Ok(None)
                }
            }
        }
    }

    fn read_sequence_line(
        &mut self,
        mut record: OpenRecord,
        mut c: u8,
    ) -> Result<Option<ScanState>, IndexError> {
        loop {
            match classify(c) {
                ByteClass::Residue => self.add_residue(&mut record, c),
                ByteClass::Unexpected => {
                    self.report_invalid(&mut record, c);
                    self.add_residue(&mut record, c);
                }
                ByteClass::Skip => {}
                ByteClass::LineEnd => return Ok(Some(ScanState::ReadingSequence(record))),
            }
            c = match self.cursor.try_next_byte()? {
                Some(c) => c,
                None => {
                    self.on_end_of_stream(Some(record));
                    return Ok(None);
                }
            };
        }
    }

    #[inline(always)]
    fn add_residue(&mut self, record: &mut OpenRecord, c: u8) {
        let c = c.to_ascii_uppercase();
        self.suffix.push(record.cksum.count(), c);
        record.cksum.push(c);
    }

    #[cold]
    fn report_invalid(&mut self, record: &mut OpenRecord, c: u8) {
        record.invalid += 1;
        self.summary.invalid_residues += 1;
        if record.invalid < MAX_REPORTED_INVALID {
            warn!(
                "Invalid amino acid ({}) in translation {}",
                c.escape_ascii(),
                show(self.arena.key(record.entry))
            );
        } else if record.invalid == MAX_REPORTED_INVALID {
            warn!("Etc.");
        }
    }

    /// Reads the identifier line after a marker. `None` means the stream
    /// ended inside the line; nothing is open at that point.
    fn read_identifier(&mut self) -> Result<Option<ScanState>, IndexError> {
        let Some(mut c) = self.cursor.try_next_byte()? else {
            return Ok(None);
        };
        while is_blank(c) && !is_line_end(c) {
            let Some(next) = self.cursor.try_next_byte()? else {
                return Ok(None);
            };
            c = next;
        }

        self.key.clear();
        let mut separators = ALLOWED_SEPARATORS;
        while !is_blank(c) {
            if self.key.len() >= self.config.max_id_len {
                self.summary.truncated_ids += 1;
                warn!(
                    "Truncating id to {} characters: {}",
                    self.config.max_id_len,
                    show(&self.key[..])
                );
                break;
            }
            if c == ID_SEPARATOR {
                if separators == 0 {
                    break;
                }
                separators -= 1;
            }
            self.key.push(c);
            let Some(next) = self.cursor.try_next_byte()? else {
                return Ok(None);
            };
            c = next;
        }

        if !is_line_end(c) && !self.cursor.skip_line()? {
            return Ok(None);
        }

        if self.key.is_empty() {
            self.summary.skipped_ids += 1;
            match self.arena.last_key() {
                Some(prev) => warn!("Null sequence identifier skipped; previous entry was {prev}"),
                None => warn!("Null sequence identifier skipped"),
            }
            return Ok(Some(ScanState::AwaitingRecord));
        }
        if let Some(prefix) = self.prefix {
            if !self.key.starts_with(prefix) {
                self.summary.skipped_ids += 1;
                warn!(
                    "Skipping sequence id \"{}\", which does not match prefix \"{}\"",
                    show(&self.key[..]),
                    show(prefix)
                );
                return Ok(Some(ScanState::AwaitingRecord));
            }
        }

        let entry = match self.table.probe(&self.key[..], &*self.arena)? {
            Probe::Occupied(id) => id,
            Probe::Vacant(slot) => {
                let id = self.arena.insert(&self.key[..])?;
                self.table.occupy(slot, id);
                id
            }
        };
        self.summary.records += 1;
        Ok(Some(ScanState::ReadingSequence(OpenRecord::new(
            entry,
            self.cursor.offset(),
        ))))
    }

    /// Writes a finished record into its entry, replacing any earlier data.
    fn commit(&mut self, record: OpenRecord, end: u64) {
        let residues = record.cksum.count();
        if residues < MIN_RESIDUES {
            self.summary.short_records += 1;
            debug!(
                "Skipping {} residue sequence {}",
                residues,
                show(self.arena.key(record.entry))
            );
            self.arena.entry_mut(record.entry).residue_count = 0;
            return;
        }
        let suffix_checksum = self.suffix.checksum(residues, self.config.suffix_len);
        let entry = self.arena.entry_mut(record.entry);
        if entry.is_populated() {
            self.summary.duplicates += 1;
        }
        entry.sequence_offset = record.start;
        entry.span_bytes = end - record.start;
        entry.residue_count = residues;
        entry.content_checksum = record.cksum.finish();
        entry.suffix_checksum = suffix_checksum;
    }
}
