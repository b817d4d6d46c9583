use std::cmp::Ordering;
use std::fs::File;
use std::io::{self, BufReader, Seek, SeekFrom};
use std::path::Path;

use crate::format::{self, DATA_SUFFIX, INDEX_SUFFIX, SPARSE_SUFFIX};
use crate::{Result, TableError, TableValue};

/// Byte range of the dense index to scan. `to: None` means to end of file;
/// `to == from` means the sparse index hit the key exactly.
struct IndexRange {
    from: u64,
    to: Option<u64>,
}

/// Looks a key up across the whole table ladder, newest (highest index)
/// first.
///
/// Returns the first table's verdict: `Some(Some(v))` live value,
/// `Some(None)` tombstone, `None` when no table knows the key. Tables
/// merged away leave gaps in the index sequence; those are skipped.
pub fn search(dir: &Path, max_index: Option<u64>, key: &[u8]) -> Result<Option<TableValue>> {
    let Some(max_index) = max_index else {
        return Ok(None);
    };

    for index in (0..=max_index).rev() {
        if let Some(hit) = search_table(dir, index, key)? {
            return Ok(Some(hit));
        }
    }

    Ok(None)
}

/// Point lookup in a single table.
///
/// The three-step narrowing of the lookup ladder:
/// 1. scan `i-sparse` for the dense-index byte range that can hold the key;
/// 2. scan that slice of `i-index` for the exact data-file offset;
/// 3. decode `i-data` from the offset until the key matches or overshoots.
///
/// A missing triple (the index was merged away) is "not present".
pub fn search_table(dir: &Path, index: u64, key: &[u8]) -> Result<Option<TableValue>> {
    let stem = index.to_string();

    let sparse_path = format::table_path(dir, &stem, SPARSE_SUFFIX);
    let sparse_file = match File::open(&sparse_path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(TableError::io_at(&sparse_path)(e)),
    };

    let Some(range) = search_in_sparse(sparse_file, &sparse_path, key)? else {
        return Ok(None);
    };

    let index_path = format::table_path(dir, &stem, INDEX_SUFFIX);
    let index_file = File::open(&index_path).map_err(TableError::io_at(&index_path))?;
    let Some(data_offset) = search_in_index(index_file, &index_path, &range, key)? else {
        return Ok(None);
    };

    let data_path = format::table_path(dir, &stem, DATA_SUFFIX);
    let data_file = File::open(&data_path).map_err(TableError::io_at(&data_path))?;
    search_in_data(data_file, &data_path, data_offset, key)
}

/// Scans the sparse index for the dense-index range that can hold `key`.
///
/// Sparse records are `(sampled key, dense-index offset)` in ascending key
/// order. The last sampled key below the target opens the range; the first
/// one above it closes the range. `None` means the target is smaller than
/// every sampled key, so it cannot be in this table at all.
fn search_in_sparse(file: File, path: &Path, key: &[u8]) -> Result<Option<IndexRange>> {
    let mut reader = BufReader::new(file);
    let mut from: Option<u64> = None;

    loop {
        let Some((k, v)) = codec::decode(&mut reader).map_err(TableError::codec_at(path))? else {
            // ran off the end: scan from the last bracket to EOF
            return Ok(from.map(|f| IndexRange { from: f, to: None }));
        };
        let offset = codec::decode_int(&v).map_err(TableError::codec_at(path))?;

        match k.as_slice().cmp(key) {
            Ordering::Equal => {
                return Ok(Some(IndexRange {
                    from: offset,
                    to: Some(offset),
                }));
            }
            Ordering::Less => from = Some(offset),
            Ordering::Greater => {
                return Ok(from.map(|f| IndexRange {
                    from: f,
                    to: Some(offset),
                }));
            }
        }
    }
}

/// Scans the dense index inside `range` for the key's data-file offset.
fn search_in_index(
    mut file: File,
    path: &Path,
    range: &IndexRange,
    key: &[u8],
) -> Result<Option<u64>> {
    file.seek(SeekFrom::Start(range.from))
        .map_err(TableError::io_at(path))?;

    loop {
        let Some((k, v)) = codec::decode(&mut file).map_err(TableError::codec_at(path))? else {
            return Ok(None);
        };

        if k.as_slice() == key {
            let offset = codec::decode_int(&v).map_err(TableError::codec_at(path))?;
            return Ok(Some(offset));
        }

        // a bounded range ends once the cursor passes its close; the record
        // starting exactly at `to` has been read by then
        if let Some(to) = range.to {
            if to > range.from {
                let position = file
                    .stream_position()
                    .map_err(TableError::io_at(path))?;
                if position > to {
                    return Ok(None);
                }
            }
        }
    }
}

/// Decodes data records from `offset` until the key matches or the scan
/// overshoots it (records are key-ascending, so past the key means absent).
fn search_in_data(
    mut file: File,
    path: &Path,
    offset: u64,
    key: &[u8],
) -> Result<Option<TableValue>> {
    file.seek(SeekFrom::Start(offset))
        .map_err(TableError::io_at(path))?;
    let mut reader = BufReader::new(file);

    loop {
        let Some((k, v)) = codec::decode(&mut reader).map_err(TableError::codec_at(path))? else {
            return Ok(None);
        };

        match k.as_slice().cmp(key) {
            Ordering::Equal => {
                let value = if v.is_empty() { None } else { Some(v) };
                return Ok(Some(value));
            }
            Ordering::Greater => return Ok(None),
            Ordering::Less => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::create_table;
    use tempfile::tempdir;

    fn numbered_entries(range: std::ops::Range<u32>) -> Vec<(Vec<u8>, TableValue)> {
        range
            .map(|i| {
                (
                    format!("{:02}", i).into_bytes(),
                    Some(format!("v{}", i).into_bytes()),
                )
            })
            .collect()
    }

    // -------------------- Single-table lookups --------------------

    #[test]
    fn finds_live_values() {
        let dir = tempdir().unwrap();
        create_table(dir.path(), 0, 16, numbered_entries(1..100)).unwrap();

        for i in [1u32, 15, 16, 17, 50, 98, 99] {
            let key = format!("{:02}", i).into_bytes();
            let hit = search_table(dir.path(), 0, &key).unwrap();
            assert_eq!(hit, Some(Some(format!("v{}", i).into_bytes())), "key {}", i);
        }
    }

    #[test]
    fn reports_tombstones_as_present() {
        let dir = tempdir().unwrap();
        let entries = vec![
            (b"a".to_vec(), Some(b"1".to_vec())),
            (b"b".to_vec(), None),
            (b"c".to_vec(), Some(b"3".to_vec())),
        ];
        create_table(dir.path(), 0, 128, entries).unwrap();

        assert_eq!(search_table(dir.path(), 0, b"b").unwrap(), Some(None));
    }

    #[test]
    fn key_below_smallest_short_circuits_in_sparse() {
        let dir = tempdir().unwrap();
        create_table(dir.path(), 0, 16, numbered_entries(1..100)).unwrap();

        // "00" sorts before the first sparse sample "01": the sparse scan
        // alone proves absence
        assert_eq!(search_table(dir.path(), 0, b"00").unwrap(), None);
    }

    #[test]
    fn last_key_found_through_open_ended_range() {
        let dir = tempdir().unwrap();
        create_table(dir.path(), 0, 16, numbered_entries(1..100)).unwrap();

        // "99" is past every sparse sample: the range runs to EOF
        assert_eq!(
            search_table(dir.path(), 0, b"99").unwrap(),
            Some(Some(b"v99".to_vec()))
        );
    }

    #[test]
    fn key_between_records_is_absent() {
        let dir = tempdir().unwrap();
        let entries = vec![
            (b"10".to_vec(), Some(b"a".to_vec())),
            (b"30".to_vec(), Some(b"b".to_vec())),
            (b"50".to_vec(), Some(b"c".to_vec())),
        ];
        create_table(dir.path(), 0, 2, entries).unwrap();

        assert_eq!(search_table(dir.path(), 0, b"20").unwrap(), None);
        assert_eq!(search_table(dir.path(), 0, b"40").unwrap(), None);
        assert_eq!(search_table(dir.path(), 0, b"60").unwrap(), None);
    }

    #[test]
    fn sparse_exact_hit_narrows_to_single_entry() {
        let dir = tempdir().unwrap();
        create_table(dir.path(), 0, 8, numbered_entries(0..64)).unwrap();

        // key "08" is the second sparse sample (stride 8)
        assert_eq!(
            search_table(dir.path(), 0, b"08").unwrap(),
            Some(Some(b"v8".to_vec()))
        );
    }

    #[test]
    fn missing_table_is_absent_not_an_error() {
        let dir = tempdir().unwrap();
        assert_eq!(search_table(dir.path(), 42, b"k").unwrap(), None);
    }

    // -------------------- Ladder descent --------------------

    #[test]
    fn newest_table_wins() {
        let dir = tempdir().unwrap();
        create_table(
            dir.path(),
            0,
            128,
            vec![(b"k".to_vec(), Some(b"old".to_vec()))],
        )
        .unwrap();
        create_table(
            dir.path(),
            1,
            128,
            vec![(b"k".to_vec(), Some(b"new".to_vec()))],
        )
        .unwrap();

        assert_eq!(
            search(dir.path(), Some(1), b"k").unwrap(),
            Some(Some(b"new".to_vec()))
        );
    }

    #[test]
    fn tombstone_in_newer_table_shadows_older_value() {
        let dir = tempdir().unwrap();
        create_table(
            dir.path(),
            0,
            128,
            vec![(b"k".to_vec(), Some(b"old".to_vec()))],
        )
        .unwrap();
        create_table(dir.path(), 1, 128, vec![(b"k".to_vec(), None)]).unwrap();

        assert_eq!(search(dir.path(), Some(1), b"k").unwrap(), Some(None));
    }

    #[test]
    fn descent_skips_gaps_from_merged_tables() {
        let dir = tempdir().unwrap();
        // only tables 1 and 3 exist; 0 and 2 were merged away
        create_table(
            dir.path(),
            1,
            128,
            vec![(b"a".to_vec(), Some(b"1".to_vec()))],
        )
        .unwrap();
        create_table(
            dir.path(),
            3,
            128,
            vec![(b"b".to_vec(), Some(b"2".to_vec()))],
        )
        .unwrap();

        assert_eq!(
            search(dir.path(), Some(3), b"a").unwrap(),
            Some(Some(b"1".to_vec()))
        );
        assert_eq!(
            search(dir.path(), Some(3), b"b").unwrap(),
            Some(Some(b"2".to_vec()))
        );
        assert_eq!(search(dir.path(), Some(3), b"c").unwrap(), None);
    }

    #[test]
    fn empty_ladder_knows_nothing() {
        let dir = tempdir().unwrap();
        assert_eq!(search(dir.path(), None, b"k").unwrap(), None);
    }
}
