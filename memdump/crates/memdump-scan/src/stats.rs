//! Scan statistics.

/// Counters accumulated by a [`Scanner`](crate::Scanner)
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScanStats {
    /// Records written, roots and leaves
    pub objects_scanned: u64,
    /// Records written inline as leaves of another record
    pub leaf_records: u64,
    /// Total entries across all `refs` lists
    pub references_found: u64,
    /// Average refs per record
    pub avg_refs_per_object: f64,
    /// Maximum refs in one record
    pub max_refs_in_object: usize,
    /// Minimum refs in one record
    pub min_refs_in_object: usize,
    /// Sum of `size` over written records
    pub bytes_accounted: u64,
    /// Objects skipped because of an exclusion set
    pub excluded: u64,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one written record
    pub fn record(&mut self, ref_count: usize, size: u64) {
        self.objects_scanned += 1;
        self.references_found += ref_count as u64;
        self.bytes_accounted = self.bytes_accounted.saturating_add(size);
        self.avg_refs_per_object = self.references_found as f64 / self.objects_scanned as f64;

        if ref_count > self.max_refs_in_object {
            self.max_refs_in_object = ref_count;
        }

        if self.objects_scanned == 1 || ref_count < self.min_refs_in_object {
            self.min_refs_in_object = ref_count;
        }
    }

    /// Record one inline leaf record
    pub fn record_leaf(&mut self, size: u64) {
        self.leaf_records += 1;
        self.record(0, size);
    }

    /// Merge with other stats
    pub fn merge(&mut self, other: &ScanStats) {
        self.excluded += other.excluded;
        if other.objects_scanned == 0 {
            return;
        }

        let had_records = self.objects_scanned > 0;
        self.objects_scanned += other.objects_scanned;
        self.leaf_records += other.leaf_records;
        self.references_found += other.references_found;
        self.bytes_accounted = self.bytes_accounted.saturating_add(other.bytes_accounted);
        self.avg_refs_per_object = self.references_found as f64 / self.objects_scanned as f64;
        self.max_refs_in_object = self.max_refs_in_object.max(other.max_refs_in_object);
        self.min_refs_in_object = if had_records {
            self.min_refs_in_object.min(other.min_refs_in_object)
        } else {
            other.min_refs_in_object
        };
    }
}
