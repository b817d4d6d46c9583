use std::cmp::Ordering;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::format::{self, DATA_SUFFIX, MERGE_STEM};
use crate::meta::{remove_table, rename_table};
use crate::writer::DiskTableWriter;
use crate::{Result, TableError, TableValue};

/// Streams records out of one table's data file in key order.
///
/// The iterator owns its file handle; dropping it closes the file. The
/// upcoming record is prefetched so callers can look at both merge heads
/// before deciding which side to consume.
pub struct DataFileIter {
    reader: BufReader<File>,
    path: PathBuf,
    next: Option<(Vec<u8>, TableValue)>,
}

impl DataFileIter {
    /// Opens the data file at `path` and prefetches its first record.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(TableError::io_at(path))?;
        let mut iter = Self {
            reader: BufReader::new(file),
            path: path.to_path_buf(),
            next: None,
        };
        iter.advance()?;
        Ok(iter)
    }

    fn advance(&mut self) -> Result<()> {
        self.next = codec::decode(&mut self.reader)
            .map_err(TableError::codec_at(&self.path))?
            .map(|(key, value)| {
                let value = if value.is_empty() { None } else { Some(value) };
                (key, value)
            });
        Ok(())
    }

    /// The record the next [`next_entry`] call will yield, if any.
    ///
    /// [`next_entry`]: DataFileIter::next_entry
    pub fn peek(&self) -> Option<&(Vec<u8>, TableValue)> {
        self.next.as_ref()
    }

    /// Yields the current record and prefetches the one after it.
    pub fn next_entry(&mut self) -> Result<Option<(Vec<u8>, TableValue)>> {
        let current = self.next.take();
        if current.is_some() {
            self.advance()?;
        }
        Ok(current)
    }
}

enum Take {
    A,
    B,
    BothKeepB,
}

/// Merges adjacent tables `a < b` into a single table that keeps `b`'s
/// index.
///
/// The two data files are stream-merged; on a key tie the record from `b`
/// (the newer table) wins and `a`'s is dropped. Tombstones are carried into
/// the output: an even older table further down the ladder may still hold
/// the key they shadow. The merged triple is written under the `merge` stem
/// and only renamed to `b` after both inputs have been deleted, so a crash
/// at any point leaves either the old pair or sweepable `merge-*` debris.
pub fn merge_tables(dir: &Path, a: u64, b: u64, sparse_key_distance: usize) -> Result<()> {
    let a_stem = a.to_string();
    let b_stem = b.to_string();

    let mut a_iter = DataFileIter::open(&format::table_path(dir, &a_stem, DATA_SUFFIX))?;
    let mut b_iter = DataFileIter::open(&format::table_path(dir, &b_stem, DATA_SUFFIX))?;

    let mut writer = DiskTableWriter::create(dir, MERGE_STEM, sparse_key_distance)?;

    loop {
        let take = match (a_iter.peek(), b_iter.peek()) {
            (None, None) => break,
            (Some(_), None) => Take::A,
            (None, Some(_)) => Take::B,
            (Some((a_key, _)), Some((b_key, _))) => match a_key.cmp(b_key) {
                Ordering::Less => Take::A,
                Ordering::Greater => Take::B,
                Ordering::Equal => Take::BothKeepB,
            },
        };

        match take {
            Take::A => {
                if let Some((key, value)) = a_iter.next_entry()? {
                    writer.write(&key, value.as_deref())?;
                }
            }
            Take::B => {
                if let Some((key, value)) = b_iter.next_entry()? {
                    writer.write(&key, value.as_deref())?;
                }
            }
            Take::BothKeepB => {
                a_iter.next_entry()?; // stale duplicate from the older table
                if let Some((key, value)) = b_iter.next_entry()? {
                    writer.write(&key, value.as_deref())?;
                }
            }
        }
    }

    let merged_records = writer.len();
    writer.sync()?;
    writer.close()?;

    drop(a_iter);
    drop(b_iter);

    remove_table(dir, &a_stem)?;
    remove_table(dir, &b_stem)?;
    rename_table(dir, MERGE_STEM, &b_stem)?;

    tracing::info!(
        from = a,
        into = b,
        records = merged_records,
        "merged adjacent disk tables"
    );

    Ok(())
}
