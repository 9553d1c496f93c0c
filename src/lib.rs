//! Seek and checksum indexes for FASTA-like sequence files.
//!
//! For every record the index gives the identifier, the byte offset and span
//! of the sequence body, the residue count, and two `cksum` values (over the
//! whole uppercased sequence and over its last few residues), so downstream
//! tools can seek straight to a sequence and check what they read.

pub mod arena;
pub mod cksum;
pub mod config;
pub mod cursor;
pub mod driver;
pub mod error;
pub mod report;
pub mod scanner;
pub mod sims;
pub mod suffix;
pub mod table;
pub mod utils;

pub use config::IndexerConfig;
pub use error::IndexError;
pub use scanner::{Indexer, ScanSummary};
