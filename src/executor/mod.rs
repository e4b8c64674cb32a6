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

//! Volcano-style operator interface for chunked query execution.
//!
//! Operators pull chunks on demand following the open-next-close pattern:
//!
//! 1. `open()` - initialize the operator (called once)
//! 2. `next_chunk()` - get the next chunk (called repeatedly until None)
//! 3. `close()` - release resources (called once at end)
//!
//! After returning `None`, subsequent `next_chunk` calls keep returning
//! `None`.

pub mod segment_tree;
pub mod window;

use crate::core::chunk::{Chunk, ChunkCollection};
use crate::core::{DataType, Result};

pub use segment_tree::WindowSegmentTree;
pub use window::{FrameBoundary, OrderByExpr, WindowExpr, WindowFunctionKind, WindowOperator};

/// Pull-based chunk iterator implemented by every physical operator
pub trait ChunkOperator {
    /// Initialize the operator; called once before the first `next_chunk`
    fn open(&mut self) -> Result<()>;

    /// Produce the next output chunk, or `None` when exhausted
    fn next_chunk(&mut self) -> Result<Option<Chunk>>;

    /// Release resources; called once after the consumer is done
    fn close(&mut self) -> Result<()>;

    /// Column types of the chunks this operator produces
    fn output_types(&self) -> &[DataType];
}

/// Operator serving chunks out of a pre-built collection
///
/// Used as the leaf of operator trees in tests and as the adapter between
/// materialized intermediate results and chunk-pulling parents.
pub struct MemorySource {
    collection: ChunkCollection,
    position: usize,
}

impl MemorySource {
    /// Create a source over an existing collection
    pub fn new(collection: ChunkCollection) -> Self {
        Self {
            collection,
            position: 0,
        }
    }
}

impl ChunkOperator for MemorySource {
    fn open(&mut self) -> Result<()> {
        self.position = 0;
        Ok(())
    }

    fn next_chunk(&mut self) -> Result<Option<Chunk>> {
        let chunk = self.collection.chunks().get(self.position).cloned();
        if chunk.is_some() {
            self.position += 1;
        }
        Ok(chunk)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn output_types(&self) -> &[DataType] {
        self.collection.types()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;

    #[test]
    fn test_memory_source_drains_and_stays_exhausted() {
        let mut collection = ChunkCollection::new(vec![DataType::Integer]);
        collection
            .append_columns(vec![(0..3).map(Value::integer).collect()])
            .unwrap();
        let mut source = MemorySource::new(collection);
        source.open().unwrap();
        let chunk = source.next_chunk().unwrap().unwrap();
        assert_eq!(chunk.len(), 3);
        assert!(source.next_chunk().unwrap().is_none());
        assert!(source.next_chunk().unwrap().is_none());
        source.close().unwrap();
    }
}
