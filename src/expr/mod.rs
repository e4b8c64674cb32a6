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

//! Bound expression trees
//!
//! Expressions arrive at the engine core already bound: column references
//! carry column indexes, constants carry values. The filter combiner reasons
//! about the variants it recognizes (comparisons, BETWEEN, conjunctions, IN
//! lists, the `~~` and `prefix` functions) and treats everything else as
//! opaque. Structural equality and hashing drive expression interning.

pub mod eval;

use std::fmt;

use crate::core::{ComparisonOp, DataType, Value};

/// AND/OR conjunction kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConjunctionKind {
    And,
    Or,
}

/// Binary arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// A bound expression tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Reference to a column of the input by index
    ColumnRef {
        index: usize,
        return_type: DataType,
    },

    /// Literal value
    Constant(Value),

    /// Binary comparison
    Comparison {
        op: ComparisonOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `input BETWEEN lower AND upper` with explicit bound inclusivity
    Between {
        input: Box<Expr>,
        lower: Box<Expr>,
        upper: Box<Expr>,
        lower_inclusive: bool,
        upper_inclusive: bool,
    },

    /// AND/OR over two or more children
    Conjunction {
        conj: ConjunctionKind,
        children: Vec<Expr>,
    },

    /// `children[0] IN (children[1..])`
    InList { children: Vec<Expr> },

    /// Named function call; the combiner recognizes `~~` (LIKE) and `prefix`
    Function {
        name: String,
        children: Vec<Expr>,
        return_type: DataType,
    },

    /// Binary arithmetic
    Arithmetic {
        op: ArithmeticOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Prepared-statement parameter placeholder
    Parameter { index: usize },
}

impl Expr {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Column reference
    pub fn column(index: usize, return_type: DataType) -> Self {
        Expr::ColumnRef { index, return_type }
    }

    /// Literal constant
    pub fn constant(value: Value) -> Self {
        Expr::Constant(value)
    }

    /// Binary comparison
    pub fn comparison(op: ComparisonOp, left: Expr, right: Expr) -> Self {
        Expr::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Inclusive-bounds BETWEEN
    pub fn between(input: Expr, lower: Expr, upper: Expr) -> Self {
        Expr::Between {
            input: Box::new(input),
            lower: Box::new(lower),
            upper: Box::new(upper),
            lower_inclusive: true,
            upper_inclusive: true,
        }
    }

    /// AND conjunction
    pub fn and(children: Vec<Expr>) -> Self {
        Expr::Conjunction {
            conj: ConjunctionKind::And,
            children,
        }
    }

    /// OR conjunction
    pub fn or(children: Vec<Expr>) -> Self {
        Expr::Conjunction {
            conj: ConjunctionKind::Or,
            children,
        }
    }

    /// `probe IN (values...)`
    pub fn in_list(probe: Expr, values: Vec<Expr>) -> Self {
        let mut children = Vec::with_capacity(values.len() + 1);
        children.push(probe);
        children.extend(values);
        Expr::InList { children }
    }

    /// Named function call
    pub fn function(name: impl Into<String>, children: Vec<Expr>, return_type: DataType) -> Self {
        Expr::Function {
            name: name.into(),
            children,
            return_type,
        }
    }

    /// Binary arithmetic
    pub fn arithmetic(op: ArithmeticOp, left: Expr, right: Expr) -> Self {
        Expr::Arithmetic {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Prepared-statement parameter
    pub fn parameter(index: usize) -> Self {
        Expr::Parameter { index }
    }

    // =========================================================================
    // Capabilities
    // =========================================================================

    /// The type this expression evaluates to
    pub fn return_type(&self) -> DataType {
        match self {
            Expr::ColumnRef { return_type, .. } => *return_type,
            Expr::Constant(value) => value.data_type(),
            Expr::Comparison { .. }
            | Expr::Between { .. }
            | Expr::Conjunction { .. }
            | Expr::InList { .. } => DataType::Boolean,
            Expr::Function { return_type, .. } => *return_type,
            Expr::Arithmetic { left, right, .. } => {
                if left.return_type() == DataType::Float || right.return_type() == DataType::Float {
                    DataType::Float
                } else {
                    DataType::Integer
                }
            }
            Expr::Parameter { .. } => DataType::Null,
        }
    }

    /// Returns true if the expression is constant at planning time
    /// (contains no column references or parameters)
    pub fn is_foldable(&self) -> bool {
        match self {
            Expr::ColumnRef { .. } | Expr::Parameter { .. } => false,
            Expr::Constant(_) => true,
            Expr::Comparison { left, right, .. } | Expr::Arithmetic { left, right, .. } => {
                left.is_foldable() && right.is_foldable()
            }
            Expr::Between {
                input,
                lower,
                upper,
                ..
            } => input.is_foldable() && lower.is_foldable() && upper.is_foldable(),
            Expr::Conjunction { children, .. }
            | Expr::InList { children }
            | Expr::Function { children, .. } => children.iter().all(Expr::is_foldable),
        }
    }

    /// Returns true if the expression contains a parameter placeholder
    pub fn has_parameter(&self) -> bool {
        match self {
            Expr::Parameter { .. } => true,
            Expr::ColumnRef { .. } | Expr::Constant(_) => false,
            Expr::Comparison { left, right, .. } | Expr::Arithmetic { left, right, .. } => {
                left.has_parameter() || right.has_parameter()
            }
            Expr::Between {
                input,
                lower,
                upper,
                ..
            } => input.has_parameter() || lower.has_parameter() || upper.has_parameter(),
            Expr::Conjunction { children, .. }
            | Expr::InList { children }
            | Expr::Function { children, .. } => children.iter().any(Expr::has_parameter),
        }
    }

    /// The column index if this is a bare column reference
    pub fn column_index(&self) -> Option<usize> {
        match self {
            Expr::ColumnRef { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::ColumnRef { index, .. } => write!(f, "#{}", index),
            Expr::Constant(value) => write!(f, "{}", value),
            Expr::Comparison { op, left, right } => write!(f, "({} {} {})", left, op, right),
            Expr::Between {
                input,
                lower,
                upper,
                ..
            } => write!(f, "({} BETWEEN {} AND {})", input, lower, upper),
            Expr::Conjunction { conj, children } => {
                let sep = match conj {
                    ConjunctionKind::And => " AND ",
                    ConjunctionKind::Or => " OR ",
                };
                write!(f, "(")?;
                for (idx, child) in children.iter().enumerate() {
                    if idx > 0 {
                        write!(f, "{}", sep)?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
            Expr::InList { children } => {
                write!(f, "({} IN (", children[0])?;
                for (idx, child) in children[1..].iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, "))")
            }
            Expr::Function { name, children, .. } => {
                write!(f, "{}(", name)?;
                for (idx, child) in children.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
            Expr::Arithmetic { op, left, right } => {
                let sym = match op {
                    ArithmeticOp::Add => "+",
                    ArithmeticOp::Sub => "-",
                    ArithmeticOp::Mul => "*",
                    ArithmeticOp::Div => "/",
                };
                write!(f, "({} {} {})", left, sym, right)
            }
            Expr::Parameter { index } => write!(f, "${}", index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foldable() {
        assert!(Expr::constant(Value::integer(1)).is_foldable());
        assert!(!Expr::column(0, DataType::Integer).is_foldable());
        assert!(Expr::comparison(
            ComparisonOp::Lt,
            Expr::constant(Value::integer(1)),
            Expr::constant(Value::integer(2)),
        )
        .is_foldable());
        assert!(!Expr::comparison(
            ComparisonOp::Lt,
            Expr::column(0, DataType::Integer),
            Expr::constant(Value::integer(2)),
        )
        .is_foldable());
        assert!(!Expr::parameter(1).is_foldable());
    }

    #[test]
    fn test_has_parameter() {
        let expr = Expr::comparison(
            ComparisonOp::Eq,
            Expr::column(0, DataType::Integer),
            Expr::parameter(1),
        );
        assert!(expr.has_parameter());
        assert!(!Expr::column(0, DataType::Integer).has_parameter());
    }

    #[test]
    fn test_structural_equality() {
        let a = Expr::comparison(
            ComparisonOp::Gt,
            Expr::column(0, DataType::Integer),
            Expr::constant(Value::integer(5)),
        );
        let b = Expr::comparison(
            ComparisonOp::Gt,
            Expr::column(0, DataType::Integer),
            Expr::constant(Value::integer(5)),
        );
        assert_eq!(a, b);
        let c = Expr::comparison(
            ComparisonOp::Gt,
            Expr::column(1, DataType::Integer),
            Expr::constant(Value::integer(5)),
        );
        assert_ne!(a, c);
    }

    #[test]
    fn test_return_types() {
        assert_eq!(
            Expr::column(0, DataType::Text).return_type(),
            DataType::Text
        );
        assert_eq!(
            Expr::comparison(
                ComparisonOp::Eq,
                Expr::column(0, DataType::Integer),
                Expr::constant(Value::integer(1)),
            )
            .return_type(),
            DataType::Boolean
        );
        assert_eq!(
            Expr::arithmetic(
                ArithmeticOp::Add,
                Expr::column(0, DataType::Integer),
                Expr::constant(Value::float(1.0)),
            )
            .return_type(),
            DataType::Float
        );
    }

    #[test]
    fn test_display() {
        let expr = Expr::comparison(
            ComparisonOp::GtEq,
            Expr::column(2, DataType::Integer),
            Expr::constant(Value::integer(10)),
        );
        assert_eq!(expr.to_string(), "(#2 >= 10)");
    }
}
