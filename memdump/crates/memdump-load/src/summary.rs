//! Per-type aggregates and the summary table.
//!
//! ```text
//! Total 1204 objects, 14 types, Total size = 0.1MiB (104416 bytes)
//!  Index   Count   %      Size   % Cum     Max Kind
//!      0     310  25     48160  46  46    1600 dict
//!      1     420  34     26880  25  71      64 str
//! ```
//!
//! Types are ranked by total size, then count, then name. Percentages are
//! truncated to whole numbers.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use memdump_util::{Address, ObjectRecord};

/// Rows shown when a summary is displayed without an explicit limit
pub const DEFAULT_TOP: usize = 20;

/// Count and size statistics of one type
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSummary {
    pub type_name: Arc<str>,
    pub count: u64,
    pub total_size: u64,
    /// Sum of squared sizes, for the standard deviation
    pub sq_sum: u128,
    pub max_size: u64,
    /// Address of the first record of `max_size` bytes
    pub max_address: Option<Address>,
}

impl TypeSummary {
    pub fn new(type_name: Arc<str>) -> Self {
        Self {
            type_name,
            count: 0,
            total_size: 0,
            sq_sum: 0,
            max_size: 0,
            max_address: None,
        }
    }

    pub fn add(&mut self, record: &ObjectRecord) {
        self.count += 1;
        self.total_size = self.total_size.saturating_add(record.size);
        self.sq_sum = self
            .sq_sum
            .saturating_add(u128::from(record.size) * u128::from(record.size));
        if self.max_address.is_none() || record.size > self.max_size {
            self.max_size = record.size;
            self.max_address = Some(record.address);
        }
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.total_size as f64 / self.count as f64
    }

    pub fn std_dev(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let mean = self.mean();
        let mean_sq = self.sq_sum as f64 / self.count as f64;
        (mean_sq - mean * mean).max(0.0).sqrt()
    }
}

impl fmt::Display for TypeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}, {} bytes, {:.3} avg bytes, {:.3} std dev, {} max @ {}",
            self.type_name,
            self.count,
            self.total_size,
            self.mean(),
            self.std_dev(),
            self.max_size,
            self.max_address.unwrap_or_default()
        )
    }
}

/// Aggregates over every record of a graph
#[derive(Debug, Clone, Default)]
pub struct HeapSummary {
    types: FxHashMap<Arc<str>, TypeSummary>,
    total_count: u64,
    total_size: u64,
}

impl HeapSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: &ObjectRecord) {
        self.types
            .entry(Arc::clone(&record.type_name))
            .or_insert_with(|| TypeSummary::new(Arc::clone(&record.type_name)))
            .add(record);
        self.total_count += 1;
        self.total_size = self.total_size.saturating_add(record.size);
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Number of distinct types
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn get(&self, type_name: &str) -> Option<&TypeSummary> {
        self.types.get(type_name)
    }

    /// All types, largest total size first
    pub fn by_size(&self) -> Vec<&TypeSummary> {
        let mut ranked: Vec<&TypeSummary> = self.types.values().collect();
        ranked.sort_by(|a, b| {
            b.total_size
                .cmp(&a.total_size)
                .then(b.count.cmp(&a.count))
                .then_with(|| a.type_name.cmp(&b.type_name))
        });
        ranked
    }

    /// Table of the `rows` largest types
    pub fn table(&self, rows: usize) -> SummaryTable<'_> {
        SummaryTable {
            summary: self,
            rows,
        }
    }
}

impl fmt::Display for HeapSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.table(DEFAULT_TOP).fmt(f)
    }
}

/// Formatted view of a [`HeapSummary`]
pub struct SummaryTable<'a> {
    summary: &'a HeapSummary,
    rows: usize,
}

impl fmt::Display for SummaryTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.summary;
        write!(
            f,
            "Total {} objects, {} types, Total size = {:.1}MiB ({} bytes)",
            summary.total_count,
            summary.type_count(),
            summary.total_size as f64 / 1024.0 / 1024.0,
            summary.total_size
        )?;
        write!(f, "\n Index   Count   %      Size   % Cum     Max Kind")?;

        let mut cumulative = 0u64;
        for (i, ts) in summary.by_size().into_iter().take(self.rows).enumerate() {
            cumulative = cumulative.saturating_add(ts.total_size);
            write!(
                f,
                "\n{:6}{:8}{:4}{:10}{:4}{:4}{:8} {}",
                i,
                ts.count,
                percent(ts.count, summary.total_count),
                ts.total_size,
                percent(ts.total_size, summary.total_size),
                percent(cumulative, summary.total_size),
                ts.max_size,
                ts.type_name
            )?;
        }
        Ok(())
    }
}

fn percent(part: u64, whole: u64) -> u64 {
    if whole == 0 {
        return 0;
    }
    (u128::from(part) * 100 / u128::from(whole)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(address: Address, type_name: &str, size: u64) -> ObjectRecord {
        ObjectRecord::new(address, type_name, size)
    }

    #[test]
    fn test_type_summary_statistics() {
        let mut ts = TypeSummary::new("str".into());
        for (addr, size) in [(1, 10), (2, 30), (3, 30)] {
            ts.add(&rec(addr, "str", size));
        }
        assert_eq!(ts.count, 3);
        assert_eq!(ts.total_size, 70);
        assert_eq!(ts.sq_sum, 100 + 900 + 900);
        assert_eq!(ts.max_size, 30);
        assert_eq!(ts.max_address, Some(2));
        assert!((ts.mean() - 70.0 / 3.0).abs() < 1e-9);
        assert!((ts.std_dev() - 9.428).abs() < 1e-3);
    }

    #[test]
    fn test_type_summary_display() {
        let mut ts = TypeSummary::new("int".into());
        ts.add(&rec(100, "int", 24));
        ts.add(&rec(200, "int", 24));
        assert_eq!(
            ts.to_string(),
            "int: 2, 48 bytes, 24.000 avg bytes, 0.000 std dev, 24 max @ 100"
        );
    }

    #[test]
    fn test_ranking_by_size_then_count() {
        let mut summary = HeapSummary::new();
        summary.add(&rec(1, "dict", 100));
        summary.add(&rec(2, "str", 50));
        summary.add(&rec(3, "str", 50));
        summary.add(&rec(4, "list", 100));
        summary.add(&rec(5, "tuple", 10));

        let names: Vec<&str> = summary.by_size().iter().map(|t| &*t.type_name).collect();
        assert_eq!(names, ["str", "dict", "list", "tuple"]);
        assert_eq!(summary.total_count(), 5);
        assert_eq!(summary.total_size(), 310);
    }

    #[test]
    fn test_table_layout() {
        let mut summary = HeapSummary::new();
        summary.add(&rec(1, "dict", 300));
        summary.add(&rec(2, "str", 50));
        summary.add(&rec(3, "str", 50));

        let text = summary.table(5).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Total 3 objects, 2 types, Total size = 0.0MiB (400 bytes)"
        );
        assert_eq!(lines[1], " Index   Count   %      Size   % Cum     Max Kind");
        assert_eq!(lines[2], "     0       1  33       300  75  75     300 dict");
        assert_eq!(lines[3], "     1       2  66       100  25 100      50 str");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_table_row_limit_and_empty() {
        let mut summary = HeapSummary::new();
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            summary.add(&rec(i as u64, name, 8));
        }
        assert_eq!(summary.table(1).to_string().lines().count(), 3);
        assert_eq!(HeapSummary::new().to_string().lines().count(), 2);
    }
}
