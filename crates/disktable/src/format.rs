//! Table file naming: stems, suffixes, and the metadata file.
//!
//! A table triple shares a stem (the decimal table index) joined to one
//! of the three suffixes with a dash: `3-data`, `3-index`, `3-sparse`.
//! A merge in progress writes under the reserved stem `merge`.

use std::path::{Path, PathBuf};

/// Singleton metadata file at the database directory root.
pub const META_FILE_NAME: &str = "maxdisktable";

/// Suffix of the records file.
pub const DATA_SUFFIX: &str = "data";
/// Suffix of the dense index file.
pub const INDEX_SUFFIX: &str = "index";
/// Suffix of the sparse index file.
pub const SPARSE_SUFFIX: &str = "sparse";

/// The three suffixes making up one table triple.
pub const TABLE_SUFFIXES: [&str; 3] = [DATA_SUFFIX, INDEX_SUFFIX, SPARSE_SUFFIX];

/// Reserved stem for the output of an in-progress pairwise merge.
pub const MERGE_STEM: &str = "merge";

/// Path of `<stem>-<suffix>` inside the database directory.
pub fn table_path(dir: &Path, stem: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{stem}-{suffix}"))
}

/// Path of the metadata file inside the database directory.
pub fn meta_path(dir: &Path) -> PathBuf {
    dir.join(META_FILE_NAME)
}

/// Parses a directory entry name as `<index>-<suffix>` for one of the three
/// table suffixes. Returns `None` for anything else (including `merge-*`).
pub fn parse_table_file(name: &str) -> Option<(u64, &str)> {
    let (stem, suffix) = name.split_once('-')?;
    if !TABLE_SUFFIXES.contains(&suffix) {
        return None;
    }
    let index = stem.parse::<u64>().ok()?;
    Some((index, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_path_joins_stem_and_suffix() {
        let p = table_path(Path::new("/db"), "7", DATA_SUFFIX);
        assert_eq!(p, Path::new("/db/7-data"));
        let p = table_path(Path::new("/db"), MERGE_STEM, SPARSE_SUFFIX);
        assert_eq!(p, Path::new("/db/merge-sparse"));
    }

    #[test]
    fn parse_accepts_table_files() {
        assert_eq!(parse_table_file("0-data"), Some((0, "data")));
        assert_eq!(parse_table_file("12-index"), Some((12, "index")));
        assert_eq!(parse_table_file("3-sparse"), Some((3, "sparse")));
    }

    #[test]
    fn parse_rejects_everything_else() {
        assert_eq!(parse_table_file("maxdisktable"), None);
        assert_eq!(parse_table_file("wal.db"), None);
        assert_eq!(parse_table_file("merge-data"), None);
        assert_eq!(parse_table_file("3-bloom"), None);
        assert_eq!(parse_table_file("x-data"), None);
    }
}
