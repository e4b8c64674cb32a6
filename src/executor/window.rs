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

//! Window function execution
//!
//! A blocking, fully-materializing operator: the child is drained into a
//! chunk collection, the input is sorted by PARTITION BY ++ ORDER BY per
//! window expression, and one output column per window expression is
//! computed in a single sweep that tracks partition and peer-group
//! boundaries. Framed aggregates (SUM, MIN, MAX, AVG) are answered by a
//! [segment tree](super::segment_tree) over the materialized payload;
//! ranking functions are computed from the sweep state directly.
//!
//! Frames are half-open `[window_start, window_end)` row ranges, clamped to
//! the containing partition. An empty frame produces NULL.

use std::cmp::Ordering;

use tracing::debug;

use crate::core::chunk::{Chunk, ChunkCollection, OrderByColumn};
use crate::core::{DataType, Error, Result, SortDirection, Value};
use crate::expr::eval::{execute_expression, materialize_expression};
use crate::expr::Expr;

use super::segment_tree::WindowSegmentTree;
use super::ChunkOperator;

/// Window function variants the operator dispatches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowFunctionKind {
    Sum,
    Min,
    Max,
    Avg,
    CountStar,
    RowNumber,
    Rank,
    DenseRank,
    FirstValue,
    LastValue,
}

impl WindowFunctionKind {
    /// Aggregates evaluated through the segment tree
    pub fn is_framed_aggregate(&self) -> bool {
        matches!(
            self,
            WindowFunctionKind::Sum
                | WindowFunctionKind::Min
                | WindowFunctionKind::Max
                | WindowFunctionKind::Avg
        )
    }

    /// Functions that read a payload column
    pub fn needs_payload(&self) -> bool {
        matches!(
            self,
            WindowFunctionKind::Sum
                | WindowFunctionKind::Min
                | WindowFunctionKind::Max
                | WindowFunctionKind::Avg
                | WindowFunctionKind::FirstValue
                | WindowFunctionKind::LastValue
        )
    }
}

/// Frame boundary kinds
///
/// `UnboundedFollowing` is illegal as a frame start and
/// `UnboundedPreceding` as a frame end; [`WindowExpr::validate`] rejects
/// both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameBoundary {
    UnboundedPreceding,
    CurrentRowRows,
    CurrentRowRange,
    UnboundedFollowing,
    ExprPreceding,
    ExprFollowing,
}

/// One ORDER BY item of a window definition
#[derive(Debug, Clone)]
pub struct OrderByExpr {
    pub expr: Expr,
    pub direction: SortDirection,
}

/// A bound window function expression
#[derive(Debug, Clone)]
pub struct WindowExpr {
    pub kind: WindowFunctionKind,
    pub partitions: Vec<Expr>,
    pub ordering: Vec<OrderByExpr>,
    /// Payload expression (the aggregate input); at most one
    pub payload: Option<Expr>,
    pub start: FrameBoundary,
    pub start_expr: Option<Expr>,
    pub end: FrameBoundary,
    pub end_expr: Option<Expr>,
    pub return_type: DataType,
}

impl WindowExpr {
    /// Create a window expression with the default frame
    /// (RANGE BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW)
    pub fn new(kind: WindowFunctionKind, return_type: DataType) -> Self {
        Self {
            kind,
            partitions: Vec::new(),
            ordering: Vec::new(),
            payload: None,
            start: FrameBoundary::UnboundedPreceding,
            start_expr: None,
            end: FrameBoundary::CurrentRowRange,
            end_expr: None,
            return_type,
        }
    }

    /// Add a PARTITION BY expression
    pub fn with_partition(mut self, expr: Expr) -> Self {
        self.partitions.push(expr);
        self
    }

    /// Add an ORDER BY expression
    pub fn with_order(mut self, expr: Expr, direction: SortDirection) -> Self {
        self.ordering.push(OrderByExpr { expr, direction });
        self
    }

    /// Set the payload (aggregate input) expression
    pub fn with_payload(mut self, expr: Expr) -> Self {
        self.payload = Some(expr);
        self
    }

    /// Set explicit frame boundaries
    pub fn with_frame(
        mut self,
        start: FrameBoundary,
        start_expr: Option<Expr>,
        end: FrameBoundary,
        end_expr: Option<Expr>,
    ) -> Self {
        self.start = start;
        self.start_expr = start_expr;
        self.end = end;
        self.end_expr = end_expr;
        self
    }

    /// Check frame boundary legality and payload presence
    pub fn validate(&self) -> Result<()> {
        if self.start == FrameBoundary::UnboundedFollowing {
            return Err(Error::UnsupportedWindowBoundary(
                "UNBOUNDED FOLLOWING cannot start a frame",
            ));
        }
        if self.end == FrameBoundary::UnboundedPreceding {
            return Err(Error::UnsupportedWindowBoundary(
                "UNBOUNDED PRECEDING cannot end a frame",
            ));
        }
        if matches!(
            self.start,
            FrameBoundary::ExprPreceding | FrameBoundary::ExprFollowing
        ) && self.start_expr.is_none()
        {
            return Err(Error::UnsupportedWindowBoundary(
                "frame start requires an offset expression",
            ));
        }
        if matches!(
            self.end,
            FrameBoundary::ExprPreceding | FrameBoundary::ExprFollowing
        ) && self.end_expr.is_none()
        {
            return Err(Error::UnsupportedWindowBoundary(
                "frame end requires an offset expression",
            ));
        }
        if self.kind.needs_payload() && self.payload.is_none() {
            return Err(Error::internal(format!(
                "window function {:?} requires a payload expression",
                self.kind
            )));
        }
        Ok(())
    }
}

/// Per-sweep partition, peer-group, and frame state
///
/// `peer_end` is maintained only while the frame end is `CurrentRowRange`;
/// nothing else may read it.
#[derive(Debug, Default)]
struct WindowBoundariesState {
    partition_start: usize,
    partition_end: usize,
    peer_start: usize,
    peer_end: usize,
    window_start: i64,
    window_end: i64,
    is_same_partition: bool,
    is_peer: bool,
    row_prev: Vec<Value>,
}

/// Blocking window operator
///
/// Output schema is the child schema followed by one column per window
/// expression, in declaration order. The whole input is materialized on the
/// first `next_chunk` call; output rows are emitted in the sorted
/// partition + order of the last computed window expression.
pub struct WindowOperator {
    child: Box<dyn ChunkOperator>,
    window_exprs: Vec<WindowExpr>,
    output_types: Vec<DataType>,
    big_data: ChunkCollection,
    window_results: ChunkCollection,
    position: usize,
    computed: bool,
}

impl WindowOperator {
    /// Create a window operator over a child operator
    pub fn new(child: Box<dyn ChunkOperator>, window_exprs: Vec<WindowExpr>) -> Self {
        let child_types = child.output_types().to_vec();
        let window_types: Vec<DataType> = window_exprs.iter().map(|w| w.return_type).collect();
        let mut output_types = child_types.clone();
        output_types.extend(window_types.iter().copied());
        Self {
            child,
            window_exprs,
            output_types,
            big_data: ChunkCollection::new(child_types),
            window_results: ChunkCollection::new(window_types),
            position: 0,
            computed: false,
        }
    }

    /// Drain the child and compute every window column
    fn compute_all(&mut self) -> Result<()> {
        loop {
            match self.child.next_chunk()? {
                Some(chunk) => self.big_data.append_chunk(chunk)?,
                None => break,
            }
        }
        if self.big_data.is_empty() {
            return Ok(());
        }
        debug!(
            rows = self.big_data.count(),
            expressions = self.window_exprs.len(),
            "materialized window input"
        );

        if !self.window_exprs.is_empty() {
            let null_row: Vec<Value> = self
                .window_exprs
                .iter()
                .map(|w| Value::Null(w.return_type))
                .collect();
            for _ in 0..self.big_data.count() {
                self.window_results.push_row(&null_row)?;
            }
        }

        let Self {
            window_exprs,
            big_data,
            window_results,
            ..
        } = self;
        for (output_idx, wexpr) in window_exprs.iter().enumerate() {
            compute_window_expression(wexpr, big_data, window_results, output_idx)?;
        }
        Ok(())
    }
}

impl ChunkOperator for WindowOperator {
    fn open(&mut self) -> Result<()> {
        for wexpr in &self.window_exprs {
            wexpr.validate()?;
        }
        self.child.open()
    }

    fn next_chunk(&mut self) -> Result<Option<Chunk>> {
        if !self.computed {
            self.compute_all()?;
            self.computed = true;
        }
        let Some(data_chunk) = self.big_data.chunks().get(self.position) else {
            return Ok(None);
        };
        let mut columns: Vec<Vec<Value>> = Vec::with_capacity(self.output_types.len());
        for col in 0..data_chunk.column_count() {
            columns.push(data_chunk.column(col).to_vec());
        }
        if let Some(result_chunk) = self.window_results.chunks().get(self.position) {
            for col in 0..result_chunk.column_count() {
                columns.push(result_chunk.column(col).to_vec());
            }
        }
        self.position += 1;
        Ok(Some(Chunk::from_columns(columns)?))
    }

    fn close(&mut self) -> Result<()> {
        self.child.close()
    }

    fn output_types(&self) -> &[DataType] {
        &self.output_types
    }
}

/// Compute one window expression into `results[output_idx]`
///
/// Sorts `input` (and `results`, keeping previously computed columns
/// aligned) by the expression's partition and order keys, materializes the
/// payload and boundary collections, then sweeps all rows updating the
/// boundary state machine.
fn compute_window_expression(
    wexpr: &WindowExpr,
    input: &mut ChunkCollection,
    results: &mut ChunkCollection,
    output_idx: usize,
) -> Result<()> {
    let sort_col_count = wexpr.partitions.len() + wexpr.ordering.len();
    let sort_collection = if sort_col_count > 0 {
        sort_collection_for_window(wexpr, input, results)?
    } else {
        // no partition or order keys: the whole input is one partition and
        // one peer group, no sort needed
        ChunkCollection::new(Vec::new())
    };

    let payload_collection = match &wexpr.payload {
        Some(expr) => Some(materialize_expression(expr, input, false)?),
        None => None,
    };
    let boundary_start = materialize_boundary(wexpr.start, wexpr.start_expr.as_ref(), input)?;
    let boundary_end = materialize_boundary(wexpr.end, wexpr.end_expr.as_ref(), input)?;

    let segment_tree = if wexpr.kind.is_framed_aggregate() {
        let payload = payload_collection
            .as_ref()
            .ok_or_else(|| Error::internal("framed aggregate without payload collection"))?;
        Some(WindowSegmentTree::build(
            wexpr.kind,
            payload.types()[0],
            payload,
        )?)
    } else {
        None
    };

    let total_count = input.count();
    let mut bounds = WindowBoundariesState {
        row_prev: if sort_col_count > 0 {
            sort_collection.get_row(0)
        } else {
            Vec::new()
        },
        ..Default::default()
    };
    let (mut dense_rank, mut rank, mut rank_equal) = (1u64, 1u64, 0u64);

    for row_idx in 0..total_count {
        update_window_boundaries(
            wexpr,
            &sort_collection,
            total_count,
            row_idx,
            boundary_start.as_ref(),
            boundary_end.as_ref(),
            &mut bounds,
        )?;

        if !bounds.is_same_partition || row_idx == 0 {
            dense_rank = 1;
            rank = 1;
            rank_equal = 0;
        } else if !bounds.is_peer {
            dense_rank += 1;
            rank += rank_equal;
            rank_equal = 0;
        }

        // empty frame: no values read for this window, result is NULL
        if bounds.window_start >= bounds.window_end {
            results.set_value(output_idx, row_idx, Value::Null(wexpr.return_type));
            continue;
        }
        let window_start = bounds.window_start as usize;
        let window_end = bounds.window_end as usize;

        let result = match wexpr.kind {
            WindowFunctionKind::Sum
            | WindowFunctionKind::Min
            | WindowFunctionKind::Max
            | WindowFunctionKind::Avg => segment_tree
                .as_ref()
                .ok_or_else(|| Error::internal("framed aggregate without segment tree"))?
                .compute(window_start, window_end)?,
            WindowFunctionKind::CountStar => {
                Value::integer((window_end - window_start) as i64).cast_to(wexpr.return_type)?
            }
            WindowFunctionKind::RowNumber => {
                Value::integer((row_idx - window_start + 1) as i64).cast_to(wexpr.return_type)?
            }
            WindowFunctionKind::DenseRank => {
                Value::integer(dense_rank as i64).cast_to(wexpr.return_type)?
            }
            WindowFunctionKind::Rank => {
                let value = Value::integer(rank as i64).cast_to(wexpr.return_type)?;
                rank_equal += 1;
                value
            }
            WindowFunctionKind::FirstValue => payload_collection
                .as_ref()
                .ok_or_else(|| Error::internal("FIRST_VALUE without payload collection"))?
                .get_value(0, window_start)
                .clone(),
            WindowFunctionKind::LastValue => payload_collection
                .as_ref()
                .ok_or_else(|| Error::internal("LAST_VALUE without payload collection"))?
                .get_value(0, window_end - 1)
                .clone(),
        };
        results.set_value(output_idx, row_idx, result);
    }
    Ok(())
}

/// Materialize a frame offset expression when the boundary kind needs one
///
/// Returns the materialized collection and whether it is a scalar to be
/// broadcast (a foldable offset is evaluated once and read at row 0).
fn materialize_boundary(
    boundary: FrameBoundary,
    expr: Option<&Expr>,
    input: &ChunkCollection,
) -> Result<Option<(ChunkCollection, bool)>> {
    if !matches!(
        boundary,
        FrameBoundary::ExprPreceding | FrameBoundary::ExprFollowing
    ) {
        return Ok(None);
    }
    let expr = expr.ok_or(Error::UnsupportedWindowBoundary(
        "frame boundary requires an offset expression",
    ))?;
    let scalar = expr.is_foldable();
    let collection = materialize_expression(expr, input, scalar)?;
    Ok(Some((collection, scalar)))
}

/// Materialize partition + order key columns, sort them, and apply the
/// permutation to the input, the result columns, and the keys themselves
fn sort_collection_for_window(
    wexpr: &WindowExpr,
    input: &mut ChunkCollection,
    results: &mut ChunkCollection,
) -> Result<ChunkCollection> {
    let mut sort_types: Vec<DataType> = Vec::new();
    let mut exprs: Vec<&Expr> = Vec::new();
    let mut order: Vec<OrderByColumn> = Vec::new();

    // sort by 1) partition expressions (always ascending) and 2) order
    // expressions with their declared direction
    for pexpr in &wexpr.partitions {
        sort_types.push(pexpr.return_type());
        order.push(OrderByColumn {
            column_index: exprs.len(),
            direction: SortDirection::Ascending,
        });
        exprs.push(pexpr);
    }
    for oexpr in &wexpr.ordering {
        sort_types.push(oexpr.expr.return_type());
        order.push(OrderByColumn {
            column_index: exprs.len(),
            direction: oexpr.direction,
        });
        exprs.push(&oexpr.expr);
    }

    let mut sort_collection = ChunkCollection::new(sort_types);
    for chunk in input.chunks() {
        let mut columns = Vec::with_capacity(exprs.len());
        for expr in &exprs {
            columns.push(execute_expression(expr, chunk)?);
        }
        sort_collection.append_columns(columns)?;
    }
    if sort_collection.count() != input.count() {
        return Err(Error::internal("sort collection row count mismatch"));
    }

    let perm = sort_collection.sort(&order);
    input.reorder(&perm);
    if !results.types().is_empty() {
        results.reorder(&perm);
    }
    sort_collection.reorder(&perm);
    Ok(sort_collection)
}

/// Advance the boundary state machine to `row_idx` and resolve the frame
fn update_window_boundaries(
    wexpr: &WindowExpr,
    sort_collection: &ChunkCollection,
    total_count: usize,
    row_idx: usize,
    boundary_start: Option<&(ChunkCollection, bool)>,
    boundary_end: Option<&(ChunkCollection, bool)>,
    bounds: &mut WindowBoundariesState,
) -> Result<()> {
    let partition_cols = wexpr.partitions.len();
    let sort_col_count = partition_cols + wexpr.ordering.len();
    let row_cur = sort_collection.get_row(row_idx);

    bounds.is_same_partition = equals_subset(&bounds.row_prev, &row_cur, 0, partition_cols);
    bounds.is_peer = bounds.is_same_partition
        && equals_subset(&bounds.row_prev, &row_cur, partition_cols, sort_col_count);

    // when the partition changes (or on the first row), recompute the
    // partition extent; when only the peer group changes, just advance it
    if !bounds.is_same_partition || row_idx == 0 {
        bounds.partition_start = row_idx;
        bounds.peer_start = row_idx;
        bounds.partition_end = binary_search_rightmost(
            sort_collection,
            &row_cur,
            bounds.partition_start,
            total_count,
            partition_cols,
        ) + 1;
    } else if !bounds.is_peer {
        bounds.peer_start = row_idx;
    }
    if wexpr.end == FrameBoundary::CurrentRowRange {
        bounds.peer_end = binary_search_rightmost(
            sort_collection,
            &row_cur,
            row_idx,
            bounds.partition_end,
            sort_col_count,
        ) + 1;
    }
    bounds.row_prev = row_cur;

    let window_start: i64 = match wexpr.start {
        FrameBoundary::UnboundedPreceding => bounds.partition_start as i64,
        FrameBoundary::CurrentRowRows => row_idx as i64,
        FrameBoundary::CurrentRowRange => bounds.peer_start as i64,
        FrameBoundary::ExprPreceding => {
            row_idx as i64 - boundary_offset(boundary_start, row_idx)?
        }
        FrameBoundary::ExprFollowing => {
            row_idx as i64 + boundary_offset(boundary_start, row_idx)?
        }
        FrameBoundary::UnboundedFollowing => {
            return Err(Error::UnsupportedWindowBoundary(
                "UNBOUNDED FOLLOWING cannot start a frame",
            ))
        }
    };
    let window_end: i64 = match wexpr.end {
        FrameBoundary::CurrentRowRows => row_idx as i64 + 1,
        FrameBoundary::CurrentRowRange => bounds.peer_end as i64,
        FrameBoundary::UnboundedFollowing => bounds.partition_end as i64,
        FrameBoundary::ExprPreceding => {
            row_idx as i64 - boundary_offset(boundary_end, row_idx)? + 1
        }
        FrameBoundary::ExprFollowing => {
            row_idx as i64 + boundary_offset(boundary_end, row_idx)? + 1
        }
        FrameBoundary::UnboundedPreceding => {
            return Err(Error::UnsupportedWindowBoundary(
                "UNBOUNDED PRECEDING cannot end a frame",
            ))
        }
    };

    // clamp the frame to the containing partition
    bounds.window_start = window_start.max(bounds.partition_start as i64);
    bounds.window_end = window_end.min(bounds.partition_end as i64);
    if bounds.window_start < 0 || bounds.window_end < 0 {
        return Err(Error::InvalidWindowBoundary(format!(
            "frame [{}, {}) at row {} is out of range",
            bounds.window_start, bounds.window_end, row_idx
        )));
    }
    Ok(())
}

/// Read one frame offset; scalar offsets broadcast from row 0
fn boundary_offset(boundary: Option<&(ChunkCollection, bool)>, row_idx: usize) -> Result<i64> {
    let (collection, scalar) = boundary
        .ok_or_else(|| Error::internal("frame offset collection was not materialized"))?;
    let value = collection.get_value(0, if *scalar { 0 } else { row_idx });
    if value.is_null() {
        return Err(Error::InvalidWindowBoundary("frame offset is NULL".into()));
    }
    let offset = value
        .cast_to(DataType::Integer)?
        .as_integer()
        .ok_or_else(|| Error::internal("integer cast produced a non-integer"))?;
    // negative offsets would invert the frame; they are rejected outright
    if offset < 0 {
        return Err(Error::InvalidWindowBoundary(format!(
            "negative frame offset {}",
            offset
        )));
    }
    Ok(offset)
}

/// Row equality on the column range `[start, end)`
fn equals_subset(a: &[Value], b: &[Value], start: usize, end: usize) -> bool {
    debug_assert!(start <= end);
    (start..end).all(|idx| a[idx] == b[idx])
}

/// Largest index in `[l, r)` whose first `comp_cols` columns are <= `row`'s,
/// assuming the collection is sorted on those columns; `r - 1` when
/// `comp_cols` is zero
fn binary_search_rightmost(
    input: &ChunkCollection,
    row: &[Value],
    l: usize,
    r: usize,
    comp_cols: usize,
) -> usize {
    if comp_cols == 0 {
        return r - 1;
    }
    let (mut l, mut r) = (l, r);
    while l < r {
        let m = (l + r) / 2;
        let mut less_than_equals = true;
        for col in 0..comp_cols {
            if input.get_value(col, m).total_cmp(&row[col]) == Ordering::Greater {
                less_than_equals = false;
                break;
            }
        }
        if less_than_equals {
            l = m + 1;
        } else {
            r = m;
        }
    }
    l - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::MemorySource;

    fn int_source(values: &[i64]) -> Box<MemorySource> {
        let mut collection = ChunkCollection::new(vec![DataType::Integer]);
        collection
            .append_columns(vec![values.iter().map(|v| Value::integer(*v)).collect()])
            .unwrap();
        Box::new(MemorySource::new(collection))
    }

    fn drain(operator: &mut WindowOperator) -> Vec<Vec<Value>> {
        let mut rows = Vec::new();
        while let Some(chunk) = operator.next_chunk().unwrap() {
            for row_idx in 0..chunk.len() {
                rows.push(
                    (0..chunk.column_count())
                        .map(|col| chunk.value(col, row_idx).clone())
                        .collect(),
                );
            }
        }
        rows
    }

    #[test]
    fn test_validate_rejects_illegal_boundaries() {
        let wexpr = WindowExpr::new(WindowFunctionKind::CountStar, DataType::Integer).with_frame(
            FrameBoundary::UnboundedFollowing,
            None,
            FrameBoundary::CurrentRowRows,
            None,
        );
        assert!(matches!(
            wexpr.validate(),
            Err(Error::UnsupportedWindowBoundary(_))
        ));

        let wexpr = WindowExpr::new(WindowFunctionKind::CountStar, DataType::Integer).with_frame(
            FrameBoundary::UnboundedPreceding,
            None,
            FrameBoundary::UnboundedPreceding,
            None,
        );
        assert!(matches!(
            wexpr.validate(),
            Err(Error::UnsupportedWindowBoundary(_))
        ));

        let wexpr = WindowExpr::new(WindowFunctionKind::CountStar, DataType::Integer).with_frame(
            FrameBoundary::ExprPreceding,
            None,
            FrameBoundary::CurrentRowRows,
            None,
        );
        assert!(wexpr.validate().is_err());
    }

    #[test]
    fn test_empty_input_produces_no_output() {
        let source = int_source(&[]);
        let wexpr = WindowExpr::new(WindowFunctionKind::RowNumber, DataType::Integer)
            .with_order(Expr::column(0, DataType::Integer), SortDirection::Ascending);
        let mut operator = WindowOperator::new(source, vec![wexpr]);
        operator.open().unwrap();
        assert!(operator.next_chunk().unwrap().is_none());
        operator.close().unwrap();
    }

    #[test]
    fn test_negative_offset_rejected() {
        let source = int_source(&[1, 2, 3]);
        let wexpr = WindowExpr::new(WindowFunctionKind::CountStar, DataType::Integer)
            .with_order(Expr::column(0, DataType::Integer), SortDirection::Ascending)
            .with_frame(
                FrameBoundary::ExprPreceding,
                Some(Expr::constant(Value::integer(-1))),
                FrameBoundary::CurrentRowRows,
                None,
            );
        let mut operator = WindowOperator::new(source, vec![wexpr]);
        operator.open().unwrap();
        assert!(matches!(
            operator.next_chunk(),
            Err(Error::InvalidWindowBoundary(_))
        ));
    }

    #[test]
    fn test_binary_search_rightmost() {
        let mut collection = ChunkCollection::new(vec![DataType::Integer]);
        collection
            .append_columns(vec![vec![
                Value::integer(1),
                Value::integer(2),
                Value::integer(2),
                Value::integer(3),
            ]])
            .unwrap();
        let row = vec![Value::integer(2)];
        assert_eq!(binary_search_rightmost(&collection, &row, 0, 4, 1), 2);
        // zero comparison columns: the whole range qualifies
        assert_eq!(binary_search_rightmost(&collection, &row, 0, 4, 0), 3);
    }

    #[test]
    fn test_output_schema_appends_window_columns() {
        let source = int_source(&[10, 20]);
        let wexpr = WindowExpr::new(WindowFunctionKind::RowNumber, DataType::Integer);
        let operator = WindowOperator::new(source, vec![wexpr]);
        assert_eq!(
            operator.output_types(),
            &[DataType::Integer, DataType::Integer]
        );
    }

    #[test]
    fn test_row_number_without_sort_keys() {
        let source = int_source(&[7, 7, 7]);
        let wexpr = WindowExpr::new(WindowFunctionKind::RowNumber, DataType::Integer);
        let mut operator = WindowOperator::new(source, vec![wexpr]);
        operator.open().unwrap();
        let rows = drain(&mut operator);
        let row_numbers: Vec<i64> = rows.iter().map(|r| r[1].as_integer().unwrap()).collect();
        assert_eq!(row_numbers, vec![1, 2, 3]);
    }
}
