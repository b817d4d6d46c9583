//! # ShoalKV engine
//!
//! An embedded, single-writer, ordered key-value store built on a
//! log-structured merge tree.
//!
//! Every mutation is made durable in a write-ahead log before it lands in
//! the sorted in-memory [`memtable::Memtable`]. When the memtable crosses
//! its byte threshold it is frozen onto an immutable list; when that list
//! reaches its cap the frozen tables are merged and flushed as an immutable
//! on-disk table triple, and the WAL is truncated. Once enough disk tables
//! accumulate, the two oldest adjacent ones are stream-merged pairwise to
//! bound their number and drop overwritten or deleted keys.
//!
//! Reads probe newest-first: the mutable memtable, then the immutable list,
//! then the on-disk tables from the highest index down. The first table
//! that knows the key answers; a tombstone answer reads as "not present".
//!
//! The engine is an owned handle. It assumes serialized access: callers
//! must not overlap operations, and all work (including flush and
//! compaction) happens inline inside the call that triggers it.
//!
//! ## Example
//! ```no_run
//! use engine::{Engine, Options};
//!
//! # fn main() -> engine::Result<()> {
//! let mut db = Engine::open("/tmp/shoal-example", Options::default())?;
//! db.put(b"hello", b"world")?;
//! assert_eq!(db.get(b"hello")?, Some(b"world".to_vec()));
//! db.delete(b"hello")?;
//! assert_eq!(db.get(b"hello")?, None);
//! db.close()?;
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;
mod options;

pub use engine::{Engine, Status, TableStats, MAX_KEY_SIZE, MAX_VALUE_SIZE};
pub use error::{EngineError, Result};
pub use options::Options;
