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

//! Storage-facing scan filters
//!
//! The optimizer pushes simple `column op constant` predicates down to the
//! scan layer as [`TableFilter`] records; the same shape carries zonemap
//! min/max range checks consumed by block pruning.

use std::fmt;

use crate::core::{ComparisonOp, Value};

/// Sentinel column id for the implicit row-id column; never pushed down
pub const ROW_ID_COLUMN: usize = usize::MAX;

/// One pushed-down scan predicate: `column <cmp> constant`
#[derive(Debug, Clone, PartialEq)]
pub struct TableFilter {
    pub constant: Value,
    pub cmp: ComparisonOp,
    pub column_index: usize,
}

impl TableFilter {
    /// Create a scan filter
    pub fn new(constant: Value, cmp: ComparisonOp, column_index: usize) -> Self {
        Self {
            constant,
            cmp,
            column_index,
        }
    }
}

impl fmt::Display for TableFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} {}", self.column_index, self.cmp, self.constant)
    }
}
