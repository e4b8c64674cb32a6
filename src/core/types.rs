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

//! Core type definitions for Gneiss
//!
//! This module defines the fundamental enums: DataType, ComparisonOp, SortDirection

use std::fmt;
use std::str::FromStr;

use super::error::Error;

/// Logical data types carried by [`Value`](super::value::Value)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum DataType {
    /// NULL data type, used for unknown/unspecified types
    #[default]
    Null = 0,

    /// 64-bit signed integer
    Integer = 1,

    /// 64-bit floating point number
    Float = 2,

    /// UTF-8 text string
    Text = 3,

    /// Boolean true/false
    Boolean = 4,

    /// Timestamp with timezone (stored as UTC)
    Timestamp = 5,
}

impl DataType {
    /// Returns true if this type is numeric (INTEGER or FLOAT)
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Float)
    }

    /// Returns true if MIN/MAX sentinel values exist for this type
    pub fn has_sentinels(&self) -> bool {
        matches!(
            self,
            DataType::Integer | DataType::Float | DataType::Boolean | DataType::Timestamp
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Null => write!(f, "NULL"),
            DataType::Integer => write!(f, "INTEGER"),
            DataType::Float => write!(f, "FLOAT"),
            DataType::Text => write!(f, "TEXT"),
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::Timestamp => write!(f, "TIMESTAMP"),
        }
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NULL" => Ok(DataType::Null),
            "INTEGER" | "INT" | "BIGINT" | "SMALLINT" | "TINYINT" => Ok(DataType::Integer),
            "FLOAT" | "DOUBLE" | "REAL" | "DECIMAL" | "NUMERIC" => Ok(DataType::Float),
            "TEXT" | "VARCHAR" | "CHAR" | "STRING" => Ok(DataType::Text),
            "BOOLEAN" | "BOOL" => Ok(DataType::Boolean),
            "TIMESTAMP" | "DATETIME" | "DATE" | "TIME" => Ok(DataType::Timestamp),
            _ => Err(Error::internal(format!("unknown data type: {}", s))),
        }
    }
}

/// Comparison operators understood by the filter combiner and the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ComparisonOp {
    /// Equality (=)
    Eq = 0,

    /// Inequality (!=)
    NotEq = 1,

    /// Greater than (>)
    Gt = 2,

    /// Greater than or equal (>=)
    GtEq = 3,

    /// Less than (<)
    Lt = 4,

    /// Less than or equal (<=)
    LtEq = 5,
}

impl ComparisonOp {
    /// Returns the operator with its operand sides swapped
    /// (`a < b` is the same filter as `b > a`)
    pub fn flip(&self) -> Self {
        match self {
            ComparisonOp::Eq => ComparisonOp::Eq,
            ComparisonOp::NotEq => ComparisonOp::NotEq,
            ComparisonOp::Gt => ComparisonOp::Lt,
            ComparisonOp::GtEq => ComparisonOp::LtEq,
            ComparisonOp::Lt => ComparisonOp::Gt,
            ComparisonOp::LtEq => ComparisonOp::GtEq,
        }
    }

    /// Returns the logical negation of this operator
    pub fn negate(&self) -> Self {
        match self {
            ComparisonOp::Eq => ComparisonOp::NotEq,
            ComparisonOp::NotEq => ComparisonOp::Eq,
            ComparisonOp::Gt => ComparisonOp::LtEq,
            ComparisonOp::GtEq => ComparisonOp::Lt,
            ComparisonOp::Lt => ComparisonOp::GtEq,
            ComparisonOp::LtEq => ComparisonOp::Gt,
        }
    }

    /// Returns true for `>` and `>=`
    pub fn is_greater(&self) -> bool {
        matches!(self, ComparisonOp::Gt | ComparisonOp::GtEq)
    }

    /// Returns true for `<` and `<=`
    pub fn is_less(&self) -> bool {
        matches!(self, ComparisonOp::Lt | ComparisonOp::LtEq)
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOp::Eq => write!(f, "="),
            ComparisonOp::NotEq => write!(f, "!="),
            ComparisonOp::Gt => write!(f, ">"),
            ComparisonOp::GtEq => write!(f, ">="),
            ComparisonOp::Lt => write!(f, "<"),
            ComparisonOp::LtEq => write!(f, "<="),
        }
    }
}

/// Sort direction for ORDER BY columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    /// Ascending order; NULLs sort first
    #[default]
    Ascending,

    /// Descending order; NULLs sort last
    Descending,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "ASC"),
            SortDirection::Descending => write!(f, "DESC"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datatype_display() {
        assert_eq!(DataType::Null.to_string(), "NULL");
        assert_eq!(DataType::Integer.to_string(), "INTEGER");
        assert_eq!(DataType::Float.to_string(), "FLOAT");
        assert_eq!(DataType::Text.to_string(), "TEXT");
        assert_eq!(DataType::Boolean.to_string(), "BOOLEAN");
        assert_eq!(DataType::Timestamp.to_string(), "TIMESTAMP");
    }

    #[test]
    fn test_datatype_from_str() {
        assert_eq!("INTEGER".parse::<DataType>().unwrap(), DataType::Integer);
        assert_eq!("BIGINT".parse::<DataType>().unwrap(), DataType::Integer);
        assert_eq!("double".parse::<DataType>().unwrap(), DataType::Float);
        assert_eq!("VARCHAR".parse::<DataType>().unwrap(), DataType::Text);
        assert_eq!("BOOL".parse::<DataType>().unwrap(), DataType::Boolean);
        assert!("UNKNOWN".parse::<DataType>().is_err());
    }

    #[test]
    fn test_datatype_is_numeric() {
        assert!(DataType::Integer.is_numeric());
        assert!(DataType::Float.is_numeric());
        assert!(!DataType::Text.is_numeric());
        assert!(!DataType::Boolean.is_numeric());
        assert!(!DataType::Null.is_numeric());
    }

    #[test]
    fn test_comparison_flip() {
        assert_eq!(ComparisonOp::Eq.flip(), ComparisonOp::Eq);
        assert_eq!(ComparisonOp::NotEq.flip(), ComparisonOp::NotEq);
        assert_eq!(ComparisonOp::Gt.flip(), ComparisonOp::Lt);
        assert_eq!(ComparisonOp::GtEq.flip(), ComparisonOp::LtEq);
        assert_eq!(ComparisonOp::Lt.flip(), ComparisonOp::Gt);
        assert_eq!(ComparisonOp::LtEq.flip(), ComparisonOp::GtEq);
    }

    #[test]
    fn test_comparison_negate() {
        assert_eq!(ComparisonOp::Eq.negate(), ComparisonOp::NotEq);
        assert_eq!(ComparisonOp::Gt.negate(), ComparisonOp::LtEq);
        assert_eq!(ComparisonOp::LtEq.negate(), ComparisonOp::Gt);
    }

    #[test]
    fn test_comparison_families() {
        assert!(ComparisonOp::Gt.is_greater());
        assert!(ComparisonOp::GtEq.is_greater());
        assert!(!ComparisonOp::Lt.is_greater());
        assert!(ComparisonOp::Lt.is_less());
        assert!(ComparisonOp::LtEq.is_less());
        assert!(!ComparisonOp::Eq.is_less());
        assert!(!ComparisonOp::Eq.is_greater());
    }
}
