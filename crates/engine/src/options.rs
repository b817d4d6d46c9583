/// Tuning knobs for the engine.
///
/// All knobs have workable defaults; construct with `Options::default()`
/// and chain the setters for anything that needs to differ.
#[derive(Debug, Clone)]
pub struct Options {
    /// Byte size at which the mutable memtable is frozen onto the
    /// immutable list (default: 16 000).
    pub memtable_threshold_bytes: usize,

    /// Number of frozen memtables that triggers a flush to disk
    /// (default: 4).
    pub immutable_memtable_cap: usize,

    /// Number of on-disk tables that triggers pairwise compaction
    /// (default: 3).
    pub disk_table_count_threshold: u64,

    /// Distance between sampled keys in the sparse index (default: 128).
    pub sparse_key_distance: usize,

    /// Adjacent table pairs whose combined data-file size exceeds this are
    /// skipped when picking a pair to merge (default: 2 MiB).
    pub merge_size_ceiling_bytes: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            memtable_threshold_bytes: 16_000,
            immutable_memtable_cap: 4,
            disk_table_count_threshold: 3,
            sparse_key_distance: 128,
            merge_size_ceiling_bytes: 2 * 1024 * 1024,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the memtable freeze threshold in bytes.
    pub fn memtable_threshold_bytes(mut self, bytes: usize) -> Self {
        self.memtable_threshold_bytes = bytes;
        self
    }

    /// Set the immutable-memtable flush cap.
    pub fn immutable_memtable_cap(mut self, cap: usize) -> Self {
        self.immutable_memtable_cap = cap;
        self
    }

    /// Set the disk-table compaction threshold.
    pub fn disk_table_count_threshold(mut self, count: u64) -> Self {
        self.disk_table_count_threshold = count;
        self
    }

    /// Set the sparse-index sampling distance.
    pub fn sparse_key_distance(mut self, distance: usize) -> Self {
        self.sparse_key_distance = distance;
        self
    }

    /// Set the combined-size ceiling for merge candidates.
    pub fn merge_size_ceiling_bytes(mut self, bytes: u64) -> Self {
        self.merge_size_ceiling_bytes = bytes;
        self
    }
}
