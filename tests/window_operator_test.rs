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

//! Window Operator Tests
//!
//! End-to-end tests of the blocking window operator: partitioning, peer
//! groups, ROWS/RANGE frames, ranking functions, and framed aggregates.

use gneiss::core::chunk::ChunkCollection;
use gneiss::{
    ChunkOperator, DataType, Expr, FrameBoundary, MemorySource, SortDirection, Value, WindowExpr,
    WindowFunctionKind, WindowOperator,
};

/// Input from the partition scenarios: (p TEXT, k INTEGER) rows
/// (A,10), (A,20), (A,20), (B,5)
fn partition_input() -> ChunkCollection {
    let mut collection = ChunkCollection::new(vec![DataType::Text, DataType::Integer]);
    collection
        .append_columns(vec![
            vec![
                Value::text("A"),
                Value::text("A"),
                Value::text("A"),
                Value::text("B"),
            ],
            vec![
                Value::integer(10),
                Value::integer(20),
                Value::integer(20),
                Value::integer(5),
            ],
        ])
        .expect("Failed to build input");
    collection
}

fn single_column_input(values: &[i64]) -> ChunkCollection {
    let mut collection = ChunkCollection::new(vec![DataType::Integer]);
    collection
        .append_columns(vec![values.iter().map(|v| Value::integer(*v)).collect()])
        .expect("Failed to build input");
    collection
}

/// Run the operator to completion and gather all output rows
fn run_window(input: ChunkCollection, exprs: Vec<WindowExpr>) -> Vec<Vec<Value>> {
    let mut operator = WindowOperator::new(Box::new(MemorySource::new(input)), exprs);
    operator.open().expect("Failed to open operator");
    let mut rows = Vec::new();
    while let Some(chunk) = operator.next_chunk().expect("Failed to pull chunk") {
        for row_idx in 0..chunk.len() {
            rows.push(
                (0..chunk.column_count())
                    .map(|col| chunk.value(col, row_idx).clone())
                    .collect(),
            );
        }
    }
    operator.close().expect("Failed to close operator");
    rows
}

fn last_column_integers(rows: &[Vec<Value>]) -> Vec<i64> {
    rows.iter()
        .map(|row| {
            row.last()
                .expect("row has no columns")
                .as_integer()
                .expect("expected integer result")
        })
        .collect()
}

/// SUM(k) OVER (PARTITION BY p ORDER BY k
///              RANGE BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW)
#[test]
fn test_sum_range_unbounded_to_current() {
    let wexpr = WindowExpr::new(WindowFunctionKind::Sum, DataType::Integer)
        .with_partition(Expr::column(0, DataType::Text))
        .with_order(Expr::column(1, DataType::Integer), SortDirection::Ascending)
        .with_payload(Expr::column(1, DataType::Integer));

    let rows = run_window(partition_input(), vec![wexpr]);
    // peers share the running sum: both (A,20) rows see 10+20+20
    assert_eq!(last_column_integers(&rows), vec![10, 50, 50, 5]);
}

/// DENSE_RANK() and RANK() OVER (PARTITION BY p ORDER BY k)
#[test]
fn test_dense_rank_and_rank() {
    let dense = WindowExpr::new(WindowFunctionKind::DenseRank, DataType::Integer)
        .with_partition(Expr::column(0, DataType::Text))
        .with_order(Expr::column(1, DataType::Integer), SortDirection::Ascending);
    let rows = run_window(partition_input(), vec![dense]);
    assert_eq!(last_column_integers(&rows), vec![1, 2, 2, 1]);

    let rank = WindowExpr::new(WindowFunctionKind::Rank, DataType::Integer)
        .with_partition(Expr::column(0, DataType::Text))
        .with_order(Expr::column(1, DataType::Integer), SortDirection::Ascending);
    let rows = run_window(partition_input(), vec![rank]);
    assert_eq!(last_column_integers(&rows), vec![1, 2, 2, 1]);
}

/// RANK() leaves a gap after a tie: 10, 20, 20, 30 ranks as 1, 2, 2, 4
#[test]
fn test_rank_gap_after_tie() {
    let input = single_column_input(&[10, 20, 20, 30]);
    let rank = WindowExpr::new(WindowFunctionKind::Rank, DataType::Integer)
        .with_order(Expr::column(0, DataType::Integer), SortDirection::Ascending);
    let rows = run_window(input, vec![rank]);
    assert_eq!(last_column_integers(&rows), vec![1, 2, 2, 4]);

    let input = single_column_input(&[10, 20, 20, 30]);
    let dense = WindowExpr::new(WindowFunctionKind::DenseRank, DataType::Integer)
        .with_order(Expr::column(0, DataType::Integer), SortDirection::Ascending);
    let rows = run_window(input, vec![dense]);
    assert_eq!(last_column_integers(&rows), vec![1, 2, 2, 3]);
}

/// SUM(v) OVER (ORDER BY v ROWS BETWEEN 1 PRECEDING AND 1 FOLLOWING)
#[test]
fn test_sum_rows_frame() {
    let input = single_column_input(&[1, 2, 3, 4, 5]);
    let wexpr = WindowExpr::new(WindowFunctionKind::Sum, DataType::Integer)
        .with_order(Expr::column(0, DataType::Integer), SortDirection::Ascending)
        .with_payload(Expr::column(0, DataType::Integer))
        .with_frame(
            FrameBoundary::ExprPreceding,
            Some(Expr::constant(Value::integer(1))),
            FrameBoundary::ExprFollowing,
            Some(Expr::constant(Value::integer(1))),
        );
    let rows = run_window(input, vec![wexpr]);
    assert_eq!(last_column_integers(&rows), vec![3, 6, 9, 12, 9]);
}

/// An unbounded frame gives every row of a partition the same aggregate
#[test]
fn test_unbounded_frame_uniform_within_partition() {
    let wexpr = WindowExpr::new(WindowFunctionKind::Sum, DataType::Integer)
        .with_partition(Expr::column(0, DataType::Text))
        .with_order(Expr::column(1, DataType::Integer), SortDirection::Ascending)
        .with_payload(Expr::column(1, DataType::Integer))
        .with_frame(
            FrameBoundary::UnboundedPreceding,
            None,
            FrameBoundary::UnboundedFollowing,
            None,
        );
    let rows = run_window(partition_input(), vec![wexpr]);
    assert_eq!(last_column_integers(&rows), vec![50, 50, 50, 5]);
}

/// ROW_NUMBER() yields 1..n per partition in sort order
#[test]
fn test_row_number_per_partition() {
    let wexpr = WindowExpr::new(WindowFunctionKind::RowNumber, DataType::Integer)
        .with_partition(Expr::column(0, DataType::Text))
        .with_order(Expr::column(1, DataType::Integer), SortDirection::Ascending);
    let rows = run_window(partition_input(), vec![wexpr]);
    assert_eq!(last_column_integers(&rows), vec![1, 2, 3, 1]);
}

/// COUNT(*) equals the clamped frame width
#[test]
fn test_count_star_rows_frame() {
    let input = single_column_input(&[1, 2, 3, 4]);
    let wexpr = WindowExpr::new(WindowFunctionKind::CountStar, DataType::Integer)
        .with_order(Expr::column(0, DataType::Integer), SortDirection::Ascending)
        .with_frame(
            FrameBoundary::ExprPreceding,
            Some(Expr::constant(Value::integer(1))),
            FrameBoundary::ExprFollowing,
            Some(Expr::constant(Value::integer(1))),
        );
    let rows = run_window(input, vec![wexpr]);
    assert_eq!(last_column_integers(&rows), vec![2, 3, 3, 2]);
}

/// FIRST_VALUE / LAST_VALUE over the default frame
#[test]
fn test_first_and_last_value() {
    let first = WindowExpr::new(WindowFunctionKind::FirstValue, DataType::Integer)
        .with_partition(Expr::column(0, DataType::Text))
        .with_order(Expr::column(1, DataType::Integer), SortDirection::Ascending)
        .with_payload(Expr::column(1, DataType::Integer));
    let rows = run_window(partition_input(), vec![first]);
    assert_eq!(last_column_integers(&rows), vec![10, 10, 10, 5]);

    // default frame ends at the current peer group, so LAST_VALUE sees the
    // last peer of the current row
    let last = WindowExpr::new(WindowFunctionKind::LastValue, DataType::Integer)
        .with_partition(Expr::column(0, DataType::Text))
        .with_order(Expr::column(1, DataType::Integer), SortDirection::Ascending)
        .with_payload(Expr::column(1, DataType::Integer));
    let rows = run_window(partition_input(), vec![last]);
    assert_eq!(last_column_integers(&rows), vec![10, 20, 20, 5]);
}

/// AVG over a ROWS frame with an integer payload divides as integers
#[test]
fn test_avg_rows_frame() {
    let input = single_column_input(&[2, 4, 6, 8]);
    let wexpr = WindowExpr::new(WindowFunctionKind::Avg, DataType::Integer)
        .with_order(Expr::column(0, DataType::Integer), SortDirection::Ascending)
        .with_payload(Expr::column(0, DataType::Integer))
        .with_frame(
            FrameBoundary::ExprPreceding,
            Some(Expr::constant(Value::integer(1))),
            FrameBoundary::CurrentRowRows,
            None,
        );
    let rows = run_window(input, vec![wexpr]);
    assert_eq!(last_column_integers(&rows), vec![2, 3, 5, 7]);
}

/// A per-row (non-scalar) frame offset reads the offset column at each row
#[test]
fn test_per_row_frame_offset() {
    // offset column: how many preceding rows each row's frame covers
    let mut input = ChunkCollection::new(vec![DataType::Integer, DataType::Integer]);
    input
        .append_columns(vec![
            vec![
                Value::integer(1),
                Value::integer(2),
                Value::integer(3),
                Value::integer(4),
            ],
            vec![
                Value::integer(0),
                Value::integer(0),
                Value::integer(2),
                Value::integer(1),
            ],
        ])
        .expect("Failed to build input");
    let wexpr = WindowExpr::new(WindowFunctionKind::Sum, DataType::Integer)
        .with_order(Expr::column(0, DataType::Integer), SortDirection::Ascending)
        .with_payload(Expr::column(0, DataType::Integer))
        .with_frame(
            FrameBoundary::ExprPreceding,
            Some(Expr::column(1, DataType::Integer)),
            FrameBoundary::CurrentRowRows,
            None,
        );
    let rows = run_window(input, vec![wexpr]);
    // frames: [1], [2], [1+2+3], [3+4]
    assert_eq!(last_column_integers(&rows), vec![1, 2, 6, 7]);
}

/// Descending ORDER BY reverses the sweep
#[test]
fn test_descending_order() {
    let input = single_column_input(&[1, 2, 3]);
    let wexpr = WindowExpr::new(WindowFunctionKind::RowNumber, DataType::Integer)
        .with_order(
            Expr::column(0, DataType::Integer),
            SortDirection::Descending,
        );
    let rows = run_window(input, vec![wexpr]);
    let values: Vec<i64> = rows
        .iter()
        .map(|row| row[0].as_integer().expect("integer key"))
        .collect();
    assert_eq!(values, vec![3, 2, 1]);
    assert_eq!(last_column_integers(&rows), vec![1, 2, 3]);
}

/// Multiple window expressions with different sort orders stay aligned
#[test]
fn test_multiple_window_expressions_stay_aligned() {
    let input = single_column_input(&[30, 10, 20]);
    let ascending = WindowExpr::new(WindowFunctionKind::RowNumber, DataType::Integer)
        .with_order(Expr::column(0, DataType::Integer), SortDirection::Ascending);
    let descending = WindowExpr::new(WindowFunctionKind::RowNumber, DataType::Integer)
        .with_order(
            Expr::column(0, DataType::Integer),
            SortDirection::Descending,
        );
    let rows = run_window(input, vec![ascending, descending]);
    assert_eq!(rows.len(), 3);
    for row in &rows {
        let ascending_number = row[1].as_integer().expect("integer result");
        let descending_number = row[2].as_integer().expect("integer result");
        // distinct keys: the two numberings are mirror images
        assert_eq!(
            ascending_number + descending_number,
            4,
            "row numbers {} and {} do not mirror",
            ascending_number,
            descending_number
        );
    }
}

/// Output schema is the input schema plus one column per window expression
#[test]
fn test_output_schema() {
    let wexpr = WindowExpr::new(WindowFunctionKind::CountStar, DataType::Integer)
        .with_partition(Expr::column(0, DataType::Text));
    let operator = WindowOperator::new(Box::new(MemorySource::new(partition_input())), vec![wexpr]);
    assert_eq!(
        operator.output_types(),
        &[DataType::Text, DataType::Integer, DataType::Integer]
    );
}

/// An empty child produces no output chunks at all
#[test]
fn test_empty_input() {
    let input = ChunkCollection::new(vec![DataType::Integer]);
    let wexpr = WindowExpr::new(WindowFunctionKind::RowNumber, DataType::Integer)
        .with_order(Expr::column(0, DataType::Integer), SortDirection::Ascending);
    let rows = run_window(input, vec![wexpr]);
    assert!(rows.is_empty(), "expected no output rows, got {:?}", rows);
}

/// A frame that never intersects its partition yields NULL
#[test]
fn test_empty_frame_is_null() {
    let input = single_column_input(&[1, 2, 3]);
    // frame entirely behind the partition start for the first row
    let wexpr = WindowExpr::new(WindowFunctionKind::Sum, DataType::Integer)
        .with_order(Expr::column(0, DataType::Integer), SortDirection::Ascending)
        .with_payload(Expr::column(0, DataType::Integer))
        .with_frame(
            FrameBoundary::ExprPreceding,
            Some(Expr::constant(Value::integer(2))),
            FrameBoundary::ExprPreceding,
            Some(Expr::constant(Value::integer(1))),
        );
    let rows = run_window(input, vec![wexpr]);
    assert!(rows[0].last().expect("result column").is_null());
    // row 2 sees exactly its predecessor's predecessor .. predecessor
    assert_eq!(rows[2].last().and_then(|v| v.as_integer()), Some(3));
}
