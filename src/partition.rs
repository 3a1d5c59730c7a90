//! Splitting a table into contiguous row ranges that fit a spreadsheet.

use crate::error::{Error, Result};
use std::ops::Range;

/// Google Sheets allows 10 million cells per spreadsheet. The margin
/// includes the header row written at the top of every part.
pub const DEFAULT_MAX_CELLS: usize = 9_500_000;

/// Data rows that fit in one spreadsheet once a header row is added.
pub fn rows_per_partition(max_cells: usize, columns: usize) -> Result<usize> {
    if columns == 0 {
        return Err(Error::Partition("table has no columns".to_string()));
    }
    let rows = (max_cells / columns).saturating_sub(1);
    if rows == 0 {
        return Err(Error::Partition(format!(
            "{columns} columns leave no room for data rows under a ceiling of {max_cells} cells"
        )));
    }
    Ok(rows)
}

/// A half-open range of source rows destined for one spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl Partition {
    /// 1-based part number used in titles and the output file.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan {
    pub total_rows: usize,
    pub columns: usize,
    pub max_cells: usize,
    pub rows_per_partition: usize,
}

impl PartitionPlan {
    pub fn new(total_rows: usize, columns: usize, max_cells: usize) -> Result<Self> {
        let rows_per_partition = rows_per_partition(max_cells, columns)?;
        Ok(Self {
            total_rows,
            columns,
            max_cells,
            rows_per_partition,
        })
    }

    pub fn partition_count(&self) -> usize {
        self.total_rows.div_ceil(self.rows_per_partition)
    }

    pub fn partitions(&self) -> impl Iterator<Item = Partition> + '_ {
        (0..self.partition_count()).map(move |index| {
            let start = index * self.rows_per_partition;
            let end = (start + self.rows_per_partition).min(self.total_rows);
            Partition { index, start, end }
        })
    }
}
