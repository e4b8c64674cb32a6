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

//! Expression evaluation
//!
//! The narrow evaluator surface the operator and optimizer cores consume:
//! scalar folding of constant expressions, per-row vectorized evaluation
//! over a chunk, and materialization of an expression into a one-column
//! chunk collection.
//!
//! NULL handling follows SQL conventions: a NULL operand makes comparisons
//! and arithmetic yield NULL, AND/OR use the usual three-valued shortcuts.

use std::cmp::Ordering;

use crate::core::chunk::{Chunk, ChunkCollection};
use crate::core::{ComparisonOp, DataType, Error, Result, Value};

use super::{ArithmeticOp, ConjunctionKind, Expr};

/// Evaluate a foldable expression to a single value
///
/// Calling this on an expression containing column references or parameters
/// is a caller bug and reported as an internal error.
pub fn evaluate_scalar(expr: &Expr) -> Result<Value> {
    eval(expr, None)
}

/// Evaluate an expression once per row of a chunk
pub fn execute_expression(expr: &Expr, chunk: &Chunk) -> Result<Vec<Value>> {
    (0..chunk.len()).map(|row| eval(expr, Some((chunk, row)))).collect()
}

/// Materialize an expression over a collection into a one-column collection
///
/// With `scalar` set only the first chunk is evaluated; callers broadcast
/// the value at row 0.
pub fn materialize_expression(
    expr: &Expr,
    input: &ChunkCollection,
    scalar: bool,
) -> Result<ChunkCollection> {
    let mut output = ChunkCollection::new(vec![expr.return_type()]);
    for chunk in input.chunks() {
        let column = execute_expression(expr, chunk)?;
        output.append_columns(vec![column])?;
        if scalar {
            break;
        }
    }
    Ok(output)
}

fn eval(expr: &Expr, ctx: Option<(&Chunk, usize)>) -> Result<Value> {
    match expr {
        Expr::ColumnRef { index, .. } => {
            let (chunk, row) = ctx.ok_or_else(|| {
                Error::internal("column reference evaluated outside a row context")
            })?;
            Ok(chunk.value(*index, row).clone())
        }
        Expr::Constant(value) => Ok(value.clone()),
        Expr::Comparison { op, left, right } => {
            let l = eval(left, ctx)?;
            let r = eval(right, ctx)?;
            apply_comparison(*op, &l, &r)
        }
        Expr::Between {
            input,
            lower,
            upper,
            lower_inclusive,
            upper_inclusive,
        } => {
            let v = eval(input, ctx)?;
            let lo = eval(lower, ctx)?;
            let hi = eval(upper, ctx)?;
            let lower_op = if *lower_inclusive {
                ComparisonOp::GtEq
            } else {
                ComparisonOp::Gt
            };
            let upper_op = if *upper_inclusive {
                ComparisonOp::LtEq
            } else {
                ComparisonOp::Lt
            };
            let above = apply_comparison(lower_op, &v, &lo)?;
            let below = apply_comparison(upper_op, &v, &hi)?;
            combine_and(&[above, below])
        }
        Expr::Conjunction { conj, children } => {
            let values = children
                .iter()
                .map(|child| eval(child, ctx))
                .collect::<Result<Vec<_>>>()?;
            match conj {
                ConjunctionKind::And => combine_and(&values),
                ConjunctionKind::Or => combine_or(&values),
            }
        }
        Expr::InList { children } => {
            let probe = eval(&children[0], ctx)?;
            if probe.is_null() {
                return Ok(Value::Null(DataType::Boolean));
            }
            let mut saw_null = false;
            for child in &children[1..] {
                let v = eval(child, ctx)?;
                if v.is_null() {
                    saw_null = true;
                } else if probe == v {
                    return Ok(Value::Boolean(true));
                }
            }
            if saw_null {
                Ok(Value::Null(DataType::Boolean))
            } else {
                Ok(Value::Boolean(false))
            }
        }
        Expr::Function { name, children, .. } => eval_function(name, children, ctx),
        Expr::Arithmetic { op, left, right } => {
            let l = eval(left, ctx)?;
            let r = eval(right, ctx)?;
            apply_arithmetic(*op, &l, &r)
        }
        Expr::Parameter { .. } => Err(Error::UnsupportedExpression(
            "unbound parameter in evaluation".to_string(),
        )),
    }
}

fn eval_function(name: &str, children: &[Expr], ctx: Option<(&Chunk, usize)>) -> Result<Value> {
    match name {
        // SQL LIKE
        "~~" => {
            let (input, pattern) = binary_text_args(name, children, ctx)?;
            match (input, pattern) {
                (Some(input), Some(pattern)) => Ok(Value::Boolean(like_match(&input, &pattern))),
                _ => Ok(Value::Null(DataType::Boolean)),
            }
        }
        "prefix" => {
            let (input, prefix) = binary_text_args(name, children, ctx)?;
            match (input, prefix) {
                (Some(input), Some(prefix)) => Ok(Value::Boolean(input.starts_with(&prefix))),
                _ => Ok(Value::Null(DataType::Boolean)),
            }
        }
        _ => Err(Error::UnsupportedExpression(format!(
            "function '{}' is not known to the evaluator",
            name
        ))),
    }
}

fn binary_text_args(
    name: &str,
    children: &[Expr],
    ctx: Option<(&Chunk, usize)>,
) -> Result<(Option<String>, Option<String>)> {
    if children.len() != 2 {
        return Err(Error::UnsupportedExpression(format!(
            "function '{}' expects 2 arguments, got {}",
            name,
            children.len()
        )));
    }
    let extract = |v: Value| -> Result<Option<String>> {
        if v.is_null() {
            return Ok(None);
        }
        match v {
            Value::Text(s) => Ok(Some(s.to_string())),
            other => Err(Error::TypeMismatch {
                expected: DataType::Text,
                got: other.data_type(),
            }),
        }
    };
    let input = extract(eval(&children[0], ctx)?)?;
    let pattern = extract(eval(&children[1], ctx)?)?;
    Ok((input, pattern))
}

/// SQL comparison with NULL propagation
fn apply_comparison(op: ComparisonOp, left: &Value, right: &Value) -> Result<Value> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null(DataType::Boolean));
    }
    let ordering = left.compare(right)?;
    let result = match op {
        ComparisonOp::Eq => ordering == Ordering::Equal,
        ComparisonOp::NotEq => ordering != Ordering::Equal,
        ComparisonOp::Lt => ordering == Ordering::Less,
        ComparisonOp::LtEq => ordering != Ordering::Greater,
        ComparisonOp::Gt => ordering == Ordering::Greater,
        ComparisonOp::GtEq => ordering != Ordering::Less,
    };
    Ok(Value::Boolean(result))
}

fn apply_arithmetic(op: ArithmeticOp, left: &Value, right: &Value) -> Result<Value> {
    let result_type =
        if left.data_type() == DataType::Float || right.data_type() == DataType::Float {
            DataType::Float
        } else {
            DataType::Integer
        };
    if left.is_null() || right.is_null() {
        return Ok(Value::Null(result_type));
    }
    if result_type == DataType::Float {
        let l = left.as_float64().ok_or(Error::TypeMismatch {
            expected: DataType::Float,
            got: left.data_type(),
        })?;
        let r = right.as_float64().ok_or(Error::TypeMismatch {
            expected: DataType::Float,
            got: right.data_type(),
        })?;
        let out = match op {
            ArithmeticOp::Add => l + r,
            ArithmeticOp::Sub => l - r,
            ArithmeticOp::Mul => l * r,
            ArithmeticOp::Div => l / r,
        };
        return Ok(Value::Float(out));
    }
    let l = left.as_integer().ok_or(Error::TypeMismatch {
        expected: DataType::Integer,
        got: left.data_type(),
    })?;
    let r = right.as_integer().ok_or(Error::TypeMismatch {
        expected: DataType::Integer,
        got: right.data_type(),
    })?;
    let out = match op {
        ArithmeticOp::Add => l.checked_add(r).ok_or(Error::NumericOverflow("addition"))?,
        ArithmeticOp::Sub => l
            .checked_sub(r)
            .ok_or(Error::NumericOverflow("subtraction"))?,
        ArithmeticOp::Mul => l
            .checked_mul(r)
            .ok_or(Error::NumericOverflow("multiplication"))?,
        // division by zero yields NULL
        ArithmeticOp::Div => match l.checked_div(r) {
            Some(v) => v,
            None => return Ok(Value::Null(DataType::Integer)),
        },
    };
    Ok(Value::Integer(out))
}

fn combine_and(values: &[Value]) -> Result<Value> {
    let mut saw_null = false;
    for v in values {
        if v.is_null() {
            saw_null = true;
        } else if v.as_boolean() == Some(false) {
            return Ok(Value::Boolean(false));
        } else if v.as_boolean().is_none() {
            return Err(Error::TypeMismatch {
                expected: DataType::Boolean,
                got: v.data_type(),
            });
        }
    }
    if saw_null {
        Ok(Value::Null(DataType::Boolean))
    } else {
        Ok(Value::Boolean(true))
    }
}

fn combine_or(values: &[Value]) -> Result<Value> {
    let mut saw_null = false;
    for v in values {
        if v.is_null() {
            saw_null = true;
        } else if v.as_boolean() == Some(true) {
            return Ok(Value::Boolean(true));
        } else if v.as_boolean().is_none() {
            return Err(Error::TypeMismatch {
                expected: DataType::Boolean,
                got: v.data_type(),
            });
        }
    }
    if saw_null {
        Ok(Value::Null(DataType::Boolean))
    } else {
        Ok(Value::Boolean(false))
    }
}

/// Byte-level LIKE matching: `%` matches any run, `_` matches one byte
fn like_match(text: &str, pattern: &str) -> bool {
    fn rec(t: &[u8], p: &[u8]) -> bool {
        match p.first() {
            None => t.is_empty(),
            Some(b'%') => rec(t, &p[1..]) || (!t.is_empty() && rec(&t[1..], p)),
            Some(b'_') => !t.is_empty() && rec(&t[1..], &p[1..]),
            Some(c) => t.first() == Some(c) && rec(&t[1..], &p[1..]),
        }
    }
    rec(text.as_bytes(), pattern.as_bytes())
}
