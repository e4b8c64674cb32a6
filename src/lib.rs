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

//! # Gneiss - embedded columnar analytical engine core
//!
//! Gneiss is the analytical heart of a columnar, vectorized SQL engine: the
//! physical window-function operator and the predicate-pushdown optimizer,
//! together with the chunked value substrate they run on.
//!
//! ## Key Features
//!
//! - **Window Functions** - SUM, MIN, MAX, AVG, COUNT(*), ROW_NUMBER, RANK,
//!   DENSE_RANK, FIRST_VALUE, LAST_VALUE over partitioned, ordered input
//!   with arbitrary ROWS/RANGE frame boundaries
//! - **Segment-Tree Aggregation** - framed aggregates answered in
//!   O(fanout * log(n)) per row instead of re-scanning the frame
//! - **Filter Combiner** - equivalence-class canonicalization, constant
//!   bound pruning, unsatisfiability detection, and transitive filter
//!   derivation over predicate conjunctions
//! - **Scan Pushdown** - column/constant predicates, LIKE and prefix range
//!   rewrites, consecutive IN-list collapsing, and zonemap min/max checks
//!   for the storage layer
//!
//! ## Quick Start
//!
//! ```rust
//! use gneiss::core::chunk::ChunkCollection;
//! use gneiss::core::{DataType, SortDirection, Value};
//! use gneiss::executor::{
//!     ChunkOperator, MemorySource, WindowExpr, WindowFunctionKind, WindowOperator,
//! };
//! use gneiss::expr::Expr;
//!
//! // one integer column: 30, 10, 20
//! let mut input = ChunkCollection::new(vec![DataType::Integer]);
//! input
//!     .append_columns(vec![vec![
//!         Value::integer(30),
//!         Value::integer(10),
//!         Value::integer(20),
//!     ]])
//!     .unwrap();
//!
//! // RANK() OVER (ORDER BY #0)
//! let rank = WindowExpr::new(WindowFunctionKind::Rank, DataType::Integer)
//!     .with_order(Expr::column(0, DataType::Integer), SortDirection::Ascending);
//!
//! let mut operator = WindowOperator::new(Box::new(MemorySource::new(input)), vec![rank]);
//! operator.open().unwrap();
//! let chunk = operator.next_chunk().unwrap().unwrap();
//! assert_eq!(chunk.value(1, 0).as_integer(), Some(1));
//! operator.close().unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`core`] - core types ([`DataType`], [`Value`], chunks, [`Error`])
//! - [`expr`] - bound expression trees and the scalar/vector evaluator
//! - [`executor`] - chunk operators, the window operator, the segment tree
//! - [`optimizer`] - the filter combiner
//! - [`storage`] - storage-facing filter records

pub mod core;
pub mod executor;
pub mod expr;
pub mod optimizer;
pub mod storage;

// Re-export main types for convenience
pub use crate::core::{
    Chunk, ChunkCollection, ComparisonOp, DataType, Error, OrderByColumn, Result, SortDirection,
    Value,
};

pub use crate::expr::Expr;

pub use crate::executor::{
    ChunkOperator, FrameBoundary, MemorySource, OrderByExpr, WindowExpr, WindowFunctionKind,
    WindowOperator, WindowSegmentTree,
};

pub use crate::optimizer::{FilterCombiner, FilterResult};

pub use crate::storage::{TableFilter, ROW_ID_COLUMN};
