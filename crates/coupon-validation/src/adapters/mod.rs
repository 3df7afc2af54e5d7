//! Adapters Layer
//!
//! Concrete implementations of the outbound ports:
//! - `StreamingSourceReader`: local files and HTTP(S), gzip detected by magic bytes
//! - `SourceLoader`: concurrent all-or-nothing filter construction
//! - `StreamingScanner`: cancellable exact scan

pub mod loader;
pub mod records;
pub mod scanner;
pub mod source_reader;

pub use loader::SourceLoader;
pub use records::{walk_records, RecordWalk, WalkSummary, MAX_RECORD_LEN};
pub use scanner::StreamingScanner;
pub use source_reader::StreamingSourceReader;
