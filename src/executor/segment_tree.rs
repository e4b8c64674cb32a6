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

//! Segment tree of partial window aggregates
//!
//! A bottom-up k-ary tree over one materialized payload column. Level 0 is
//! the payload itself; each higher level holds the aggregate of `fanout`
//! entries of the level below, with a short last group. A frame query
//! `compute(begin, end)` accumulates the unaligned head and tail of the
//! range at each level and ascends, touching O(fanout * log_fanout(n))
//! entries instead of the whole frame.
//!
//! Only the reducible aggregates (SUM, MIN, MAX, AVG) are backed by the
//! tree; ranking functions never need one.

use tracing::debug;

use crate::core::chunk::ChunkCollection;
use crate::core::{DataType, Error, Result, Value};

use super::window::WindowFunctionKind;

/// Default tree fanout
pub const DEFAULT_FANOUT: usize = 16;

/// Running aggregate state: init / accumulate / finalize
struct AggregateState {
    kind: WindowFunctionKind,
    payload_type: DataType,
    aggregate: Value,
    n_aggregated: u64,
}

impl AggregateState {
    fn init(kind: WindowFunctionKind, payload_type: DataType) -> Result<Self> {
        let aggregate = match kind {
            WindowFunctionKind::Sum | WindowFunctionKind::Avg => {
                Value::integer(0).cast_to(payload_type)?
            }
            WindowFunctionKind::Min => Value::maximum_value(payload_type)?,
            WindowFunctionKind::Max => Value::minimum_value(payload_type)?,
            other => {
                return Err(Error::UnsupportedWindowFunction(format!(
                    "{:?} is not a framed aggregate",
                    other
                )))
            }
        };
        Ok(Self {
            kind,
            payload_type,
            aggregate,
            n_aggregated: 0,
        })
    }

    fn accumulate(&mut self, value: &Value) -> Result<()> {
        match self.kind {
            WindowFunctionKind::Sum | WindowFunctionKind::Avg => {
                // a NULL payload poisons the running sum to NULL
                self.aggregate = self.aggregate.add(value)?;
                self.n_aggregated += 1;
            }
            WindowFunctionKind::Min => {
                // NULLs are incomparable: they never become the minimum and
                // do not count, so an all-NULL frame finalizes to NULL
                if !value.is_null() {
                    if value.compare(&self.aggregate)? == std::cmp::Ordering::Less {
                        self.aggregate = value.clone();
                    }
                    self.n_aggregated += 1;
                }
            }
            WindowFunctionKind::Max => {
                if !value.is_null() {
                    if value.compare(&self.aggregate)? == std::cmp::Ordering::Greater {
                        self.aggregate = value.clone();
                    }
                    self.n_aggregated += 1;
                }
            }
            _ => return Err(Error::internal("accumulate on non-aggregate state")),
        }
        Ok(())
    }

    fn finalize(&self) -> Result<Value> {
        if self.n_aggregated == 0 {
            return Ok(Value::Null(self.payload_type));
        }
        match self.kind {
            WindowFunctionKind::Sum | WindowFunctionKind::Min | WindowFunctionKind::Max => {
                Ok(self.aggregate.clone())
            }
            WindowFunctionKind::Avg => self.aggregate.divide_by_count(self.n_aggregated),
            _ => Err(Error::internal("finalize on non-aggregate state")),
        }
    }
}

/// Bottom-up k-ary segment tree over one payload column
///
/// Built once per window expression and consulted read-only afterwards; the
/// tree owns its level vectors and borrows the payload collection.
pub struct WindowSegmentTree<'a> {
    kind: WindowFunctionKind,
    payload_type: DataType,
    fanout: usize,
    levels: Vec<Vec<Value>>,
    input: &'a ChunkCollection,
}

impl<'a> WindowSegmentTree<'a> {
    /// Build a tree with the default fanout
    pub fn build(
        kind: WindowFunctionKind,
        payload_type: DataType,
        input: &'a ChunkCollection,
    ) -> Result<Self> {
        Self::with_fanout(kind, payload_type, input, DEFAULT_FANOUT)
    }

    /// Build a tree with an explicit fanout
    pub fn with_fanout(
        kind: WindowFunctionKind,
        payload_type: DataType,
        input: &'a ChunkCollection,
        fanout: usize,
    ) -> Result<Self> {
        if input.column_count() != 1 {
            return Err(Error::internal(format!(
                "segment tree payload must be one column, got {}",
                input.column_count()
            )));
        }
        if fanout < 2 {
            return Err(Error::internal("segment tree fanout must be at least 2"));
        }
        let mut tree = Self {
            kind,
            payload_type,
            fanout,
            levels: Vec::new(),
            input,
        };
        tree.construct()?;
        Ok(tree)
    }

    fn construct(&mut self) -> Result<()> {
        // level 0 is the payload itself; build levels until one fits in a
        // single entry
        loop {
            let level_size = match self.levels.last() {
                None => self.input.count(),
                Some(level) => level.len(),
            };
            if level_size <= 1 {
                break;
            }
            let mut next = Vec::with_capacity(level_size / self.fanout + 1);
            let mut state = AggregateState::init(self.kind, self.payload_type)?;
            let mut fanout_count = 0;
            for pos in 0..level_size {
                let value = match self.levels.last() {
                    None => self.input.get_value(0, pos),
                    Some(level) => &level[pos],
                };
                state.accumulate(value)?;
                fanout_count += 1;
                if fanout_count == self.fanout {
                    next.push(state.finalize()?);
                    state = AggregateState::init(self.kind, self.payload_type)?;
                    fanout_count = 0;
                }
            }
            if fanout_count > 0 {
                next.push(state.finalize()?);
            }
            self.levels.push(next);
        }
        debug!(
            rows = self.input.count(),
            levels = self.levels.len(),
            fanout = self.fanout,
            "constructed window segment tree"
        );
        Ok(())
    }

    /// Aggregate the half-open range `[begin, end)` of the payload
    pub fn compute(&self, begin: usize, end: usize) -> Result<Value> {
        debug_assert!(begin <= end && end <= self.input.count());
        let mut state = AggregateState::init(self.kind, self.payload_type)?;
        let mut begin = begin;
        let mut end = end;
        // one extra iteration past the stored levels covers the implicit root
        for l_idx in 0..=self.levels.len() {
            let mut parent_begin = begin / self.fanout;
            let parent_end = end / self.fanout;
            if parent_begin == parent_end {
                self.accumulate_range(&mut state, l_idx, begin, end)?;
                return state.finalize();
            }
            let group_begin = parent_begin * self.fanout;
            if begin != group_begin {
                self.accumulate_range(&mut state, l_idx, begin, group_begin + self.fanout)?;
                parent_begin += 1;
            }
            let group_end = parent_end * self.fanout;
            if end != group_end {
                self.accumulate_range(&mut state, l_idx, group_end, end)?;
            }
            begin = parent_begin;
            end = parent_end;
        }
        state.finalize()
    }

    /// Accumulate a flat range of one level into the running state
    fn accumulate_range(
        &self,
        state: &mut AggregateState,
        l_idx: usize,
        begin: usize,
        end: usize,
    ) -> Result<()> {
        debug_assert!(begin <= end);
        for pos in begin..end {
            let value = if l_idx == 0 {
                self.input.get_value(0, pos)
            } else {
                &self.levels[l_idx - 1][pos]
            };
            state.accumulate(value)?;
        }
        Ok(())
    }
}
