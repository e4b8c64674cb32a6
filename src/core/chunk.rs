// Copyright 2025 Gneiss Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Columnar chunks and chunk collections
//!
//! A [`Chunk`] is a fixed-capacity columnar slab of values; a
//! [`ChunkCollection`] is an append-only ordered sequence of chunks sharing
//! one column schema, with random access, row extraction, lexicographic
//! multi-column sort returning a permutation, and destructive reorder.

use std::cmp::Ordering;

use smallvec::SmallVec;

use super::error::{Error, Result};
use super::types::{DataType, SortDirection};
use super::value::Value;

/// Number of rows per chunk
pub const CHUNK_CAPACITY: usize = 1024;

/// Sort key storage - stack-allocated for the common case (up to 4 columns)
type SortKey = SmallVec<[Value; 4]>;

/// One sort column: which column to order by and in which direction
#[derive(Debug, Clone, Copy)]
pub struct OrderByColumn {
    /// Index of the column within the collection
    pub column_index: usize,
    /// ASC or DESC
    pub direction: SortDirection,
}

/// A fixed-capacity columnar slab of values
///
/// All columns hold the same number of rows; a chunk never exceeds
/// [`CHUNK_CAPACITY`] rows.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    columns: Vec<Vec<Value>>,
}

impl Chunk {
    /// Create an empty chunk with the given number of columns
    pub fn new(column_count: usize) -> Self {
        Self {
            columns: vec![Vec::new(); column_count],
        }
    }

    /// Create a chunk from pre-built columns
    pub fn from_columns(columns: Vec<Vec<Value>>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let len = first.len();
            if columns.iter().any(|c| c.len() != len) {
                return Err(Error::internal("chunk columns have unequal lengths"));
            }
        }
        Ok(Self { columns })
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Returns true if the chunk holds no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Access one cell
    pub fn value(&self, column: usize, row: usize) -> &Value {
        &self.columns[column][row]
    }

    /// Access one column
    pub fn column(&self, column: usize) -> &[Value] {
        &self.columns[column]
    }

    /// Append one row of values
    pub fn push_row(&mut self, row: &[Value]) {
        debug_assert_eq!(row.len(), self.columns.len());
        debug_assert!(self.len() < CHUNK_CAPACITY);
        for (column, value) in self.columns.iter_mut().zip(row.iter()) {
            column.push(value.clone());
        }
    }
}

/// Append-only ordered sequence of chunks with one shared column schema
///
/// Rows are re-packed on append so that every chunk except the last is full;
/// the chunk layout of two collections with the same row count is therefore
/// identical, which lets parallel collections be zipped chunk by chunk.
#[derive(Debug, Clone)]
pub struct ChunkCollection {
    types: Vec<DataType>,
    chunks: Vec<Chunk>,
    count: usize,
}

impl ChunkCollection {
    /// Create an empty collection with the given column schema
    pub fn new(types: Vec<DataType>) -> Self {
        Self {
            types,
            chunks: Vec::new(),
            count: 0,
        }
    }

    /// The column schema
    pub fn types(&self) -> &[DataType] {
        &self.types
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.types.len()
    }

    /// Total number of rows across all chunks
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns true if the collection holds no rows
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The underlying chunks
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Append all rows of a chunk, re-packing at chunk capacity
    pub fn append_chunk(&mut self, chunk: Chunk) -> Result<()> {
        if chunk.column_count() != self.types.len() {
            return Err(Error::internal(format!(
                "appended chunk has {} columns, collection has {}",
                chunk.column_count(),
                self.types.len()
            )));
        }
        let mut row: Vec<Value> = Vec::with_capacity(self.types.len());
        for row_idx in 0..chunk.len() {
            row.clear();
            for col_idx in 0..chunk.column_count() {
                row.push(chunk.value(col_idx, row_idx).clone());
            }
            self.push_row_unchecked(&row);
        }
        Ok(())
    }

    /// Append pre-built columns as rows
    pub fn append_columns(&mut self, columns: Vec<Vec<Value>>) -> Result<()> {
        self.append_chunk(Chunk::from_columns(columns)?)
    }

    /// Append one row
    pub fn push_row(&mut self, row: &[Value]) -> Result<()> {
        if row.len() != self.types.len() {
            return Err(Error::internal(format!(
                "appended row has {} values, collection has {} columns",
                row.len(),
                self.types.len()
            )));
        }
        self.push_row_unchecked(row);
        Ok(())
    }

    fn push_row_unchecked(&mut self, row: &[Value]) {
        let needs_chunk = self
            .chunks
            .last()
            .map_or(true, |c| c.len() >= CHUNK_CAPACITY);
        if needs_chunk {
            self.chunks.push(Chunk::new(self.types.len()));
        }
        let last = self
            .chunks
            .last_mut()
            .unwrap_or_else(|| unreachable!("a chunk was just pushed"));
        last.push_row(row);
        self.count += 1;
    }

    /// Random access to one cell by global row index
    pub fn get_value(&self, column: usize, row: usize) -> &Value {
        debug_assert!(row < self.count);
        self.chunks[row / CHUNK_CAPACITY].value(column, row % CHUNK_CAPACITY)
    }

    /// Overwrite one cell by global row index
    pub fn set_value(&mut self, column: usize, row: usize, value: Value) {
        debug_assert!(row < self.count);
        self.chunks[row / CHUNK_CAPACITY].columns[column][row % CHUNK_CAPACITY] = value;
    }

    /// Extract one row as an owned vector of values
    pub fn get_row(&self, row: usize) -> Vec<Value> {
        (0..self.types.len())
            .map(|col| self.get_value(col, row).clone())
            .collect()
    }

    /// Lexicographic multi-column sort
    ///
    /// Returns a permutation with `perm[new_pos] = old_pos`; the collection
    /// itself is not modified (apply the permutation with [`reorder`]).
    /// NULLs sort first under ASC and last under DESC.
    ///
    /// [`reorder`]: ChunkCollection::reorder
    pub fn sort(&self, order: &[OrderByColumn]) -> Vec<usize> {
        debug_assert!(order.iter().all(|o| o.column_index < self.types.len()));

        // extract the key columns once; comparing through get_value would
        // re-divide the row index on every probe
        let keys: Vec<SortKey> = (0..self.count)
            .map(|row| {
                order
                    .iter()
                    .map(|o| self.get_value(o.column_index, row).clone())
                    .collect()
            })
            .collect();

        let mut perm: Vec<usize> = (0..self.count).collect();
        perm.sort_by(|&a, &b| compare_sort_keys(&keys[a], &keys[b], order));
        perm
    }

    /// Apply a permutation produced by [`sort`](ChunkCollection::sort)
    /// destructively: row `new_pos` of the result is row `perm[new_pos]` of
    /// the current contents
    pub fn reorder(&mut self, perm: &[usize]) {
        debug_assert_eq!(perm.len(), self.count);
        let mut reordered = ChunkCollection::new(self.types.clone());
        for &old_pos in perm {
            let row = self.get_row(old_pos);
            reordered.push_row_unchecked(&row);
        }
        self.chunks = reordered.chunks;
    }
}

fn compare_sort_keys(a: &SortKey, b: &SortKey, order: &[OrderByColumn]) -> Ordering {
    for (idx, o) in order.iter().enumerate() {
        let cmp = a[idx].total_cmp(&b[idx]);
        let cmp = match o.direction {
            SortDirection::Ascending => cmp,
            SortDirection::Descending => cmp.reverse(),
        };
        if cmp != Ordering::Equal {
            return cmp;
        }
    }
    Ordering::Equal
}
