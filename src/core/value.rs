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

//! Value type for Gneiss - runtime values with type information
//!
//! This module provides a unified Value enum representing scalar values with
//! full type information, plus the comparison and arithmetic surface the
//! window aggregates and the filter combiner build on. Three distinct
//! equality/ordering notions coexist on purpose:
//!
//! - [`Value::compare`] - SQL comparison; NULL is incomparable and returns
//!   an error, mixed non-numeric types are an error.
//! - [`Value::total_cmp`] - total order for sorting and binary search;
//!   NULL sorts before every non-NULL value.
//! - `PartialEq` - grouping equality; NULLs equal each other regardless of
//!   their type hint, integers and floats cross-compare numerically.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::error::{Error, Result};
use super::types::DataType;

/// A runtime value with type information
///
/// Text uses `Arc<str>` for cheap cloning during chunk reordering and row
/// extraction, where values are cloned frequently.
#[derive(Debug, Clone)]
pub enum Value {
    /// NULL value with optional type hint
    Null(DataType),

    /// 64-bit signed integer
    Integer(i64),

    /// 64-bit floating point
    Float(f64),

    /// UTF-8 text string (Arc for cheap cloning)
    Text(Arc<str>),

    /// Boolean value
    Boolean(bool),

    /// Timestamp (UTC)
    Timestamp(DateTime<Utc>),
}

impl Value {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a NULL value with a type hint
    pub fn null(data_type: DataType) -> Self {
        Value::Null(data_type)
    }

    /// Create a NULL value with unknown type
    pub fn null_unknown() -> Self {
        Value::Null(DataType::Null)
    }

    /// Create an integer value
    pub fn integer(value: i64) -> Self {
        Value::Integer(value)
    }

    /// Create a float value
    pub fn float(value: f64) -> Self {
        Value::Float(value)
    }

    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(Arc::from(value.into().as_str()))
    }

    /// Create a boolean value
    pub fn boolean(value: bool) -> Self {
        Value::Boolean(value)
    }

    /// Create a timestamp value
    pub fn timestamp(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }

    // =========================================================================
    // Type accessors
    // =========================================================================

    /// Returns the data type of this value
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null(dt) => *dt,
            Value::Integer(_) => DataType::Integer,
            Value::Float(_) => DataType::Float,
            Value::Text(_) => DataType::Text,
            Value::Boolean(_) => DataType::Boolean,
            Value::Timestamp(_) => DataType::Timestamp,
        }
    }

    /// Returns true if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    /// Extract an i64 if this value is an integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract the numeric content as f64 (integers widen)
    pub fn as_float64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract the text content
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Extract a boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    // =========================================================================
    // Comparison
    // =========================================================================

    /// Compare two values for ordering under SQL semantics
    ///
    /// Returns an error when either side is NULL (NULLs are incomparable in
    /// the aggregate and predicate paths) or when the types cannot be
    /// compared.
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        if self.is_null() || other.is_null() {
            return Err(Error::NullComparison);
        }

        // Same type comparison (most efficient path)
        if self.data_type() == other.data_type() {
            return self.compare_same_type(other);
        }

        // Cross-type numeric comparison (integer vs float)
        if self.data_type().is_numeric() && other.data_type().is_numeric() {
            let v1 = self.as_float64().ok_or(Error::IncomparableTypes)?;
            let v2 = other.as_float64().ok_or(Error::IncomparableTypes)?;
            return Ok(compare_floats(v1, v2));
        }

        Err(Error::IncomparableTypes)
    }

    /// Compare values of the same type
    fn compare_same_type(&self, other: &Value) -> Result<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Ok(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => Ok(compare_floats(*a, *b)),
            (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Ok(a.cmp(b)),
            _ => Err(Error::IncomparableTypes),
        }
    }

    /// Total order used by sorting and binary search
    ///
    /// NULL sorts before every non-NULL value; incomparable pairs fall back
    /// to ordering by type tag so the order is total.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        self.compare(other)
            .unwrap_or_else(|_| (self.data_type() as u8).cmp(&(other.data_type() as u8)))
    }

    // =========================================================================
    // Arithmetic (aggregate path)
    // =========================================================================

    /// Numeric addition for the running-sum aggregate path
    ///
    /// NULL on either side yields NULL; this is what makes SUM and AVG over
    /// a NULL payload produce NULL. Integer overflow is a checked error.
    pub fn add(&self, other: &Value) -> Result<Value> {
        match (self, other) {
            (Value::Null(dt), _) => Ok(Value::Null(*dt)),
            (_, Value::Null(_)) => Ok(Value::Null(self.data_type())),
            (Value::Integer(a), Value::Integer(b)) => a
                .checked_add(*b)
                .map(Value::Integer)
                .ok_or(Error::NumericOverflow("addition")),
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
            (Value::Integer(a), Value::Float(b)) => Ok(Value::Float(*a as f64 + b)),
            (Value::Float(a), Value::Integer(b)) => Ok(Value::Float(a + *b as f64)),
            _ => Err(Error::TypeMismatch {
                expected: self.data_type(),
                got: other.data_type(),
            }),
        }
    }

    /// Divide a running sum by the number of aggregated rows (AVG finalize)
    ///
    /// Integer sums divide as integers, matching the payload type; NULL
    /// propagates.
    pub fn divide_by_count(&self, count: u64) -> Result<Value> {
        if count == 0 {
            return Err(Error::internal("division of aggregate by zero count"));
        }
        match self {
            Value::Null(dt) => Ok(Value::Null(*dt)),
            Value::Integer(v) => Ok(Value::Integer(v / count as i64)),
            Value::Float(v) => Ok(Value::Float(v / count as f64)),
            _ => Err(Error::TypeMismatch {
                expected: DataType::Integer,
                got: self.data_type(),
            }),
        }
    }

    // =========================================================================
    // Sentinels
    // =========================================================================

    /// The smallest value of the given type (MAX aggregate seed)
    pub fn minimum_value(data_type: DataType) -> Result<Value> {
        match data_type {
            DataType::Integer => Ok(Value::Integer(i64::MIN)),
            DataType::Float => Ok(Value::Float(f64::NEG_INFINITY)),
            DataType::Boolean => Ok(Value::Boolean(false)),
            DataType::Timestamp => Ok(Value::Timestamp(DateTime::<Utc>::MIN_UTC)),
            _ => Err(Error::NoSentinelForType(data_type)),
        }
    }

    /// The largest value of the given type (MIN aggregate seed)
    pub fn maximum_value(data_type: DataType) -> Result<Value> {
        match data_type {
            DataType::Integer => Ok(Value::Integer(i64::MAX)),
            DataType::Float => Ok(Value::Float(f64::INFINITY)),
            DataType::Boolean => Ok(Value::Boolean(true)),
            DataType::Timestamp => Ok(Value::Timestamp(DateTime::<Utc>::MAX_UTC)),
            _ => Err(Error::NoSentinelForType(data_type)),
        }
    }

    // =========================================================================
    // Casts
    // =========================================================================

    /// Cast this value to the target type
    ///
    /// NULL casts to NULL of the target type; numeric casts truncate;
    /// text parses. Undefined conversions are an error.
    pub fn cast_to(&self, target: DataType) -> Result<Value> {
        if self.is_null() {
            return Ok(Value::Null(target));
        }
        if self.data_type() == target {
            return Ok(self.clone());
        }
        let fail = || Error::InvalidCast {
            from: self.data_type(),
            to: target,
        };
        match target {
            DataType::Integer => match self {
                Value::Float(v) => Ok(Value::Integer(*v as i64)),
                Value::Boolean(b) => Ok(Value::Integer(i64::from(*b))),
                Value::Text(s) => s.parse::<i64>().map(Value::Integer).map_err(|_| fail()),
                _ => Err(fail()),
            },
            DataType::Float => match self {
                Value::Integer(v) => Ok(Value::Float(*v as f64)),
                Value::Boolean(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
                Value::Text(s) => s.parse::<f64>().map(Value::Float).map_err(|_| fail()),
                _ => Err(fail()),
            },
            DataType::Text => Ok(Value::text(self.to_string())),
            DataType::Boolean => match self {
                Value::Integer(v) => Ok(Value::Boolean(*v != 0)),
                Value::Text(s) => match s.to_lowercase().as_str() {
                    "true" | "t" | "1" => Ok(Value::Boolean(true)),
                    "false" | "f" | "0" => Ok(Value::Boolean(false)),
                    _ => Err(fail()),
                },
                _ => Err(fail()),
            },
            DataType::Timestamp | DataType::Null => Err(fail()),
        }
    }
}

/// NaN-aware float ordering: NaN sorts after every other float
fn compare_floats(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b)
        .unwrap_or_else(|| match (a.is_nan(), b.is_nan()) {
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            _ => Ordering::Equal,
        })
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // grouping semantics: NULLs are equal regardless of type hint
            (Value::Null(_), Value::Null(_)) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                (*a as f64) == *b
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            // all NULLs hash alike, matching the equality above
            Value::Null(_) => state.write_u8(0),
            // integers and floats share a tag and hash through normalized
            // f64 bits so cross-type equal values hash equal
            Value::Integer(v) => {
                state.write_u8(1);
                state.write_u64(normalized_float_bits(*v as f64));
            }
            Value::Float(v) => {
                state.write_u8(1);
                state.write_u64(normalized_float_bits(*v));
            }
            Value::Text(s) => {
                state.write_u8(2);
                s.hash(state);
            }
            Value::Boolean(b) => {
                state.write_u8(3);
                b.hash(state);
            }
            Value::Timestamp(t) => {
                state.write_u8(4);
                t.hash(state);
            }
        }
    }
}

/// Bit pattern of a float with -0.0 and NaN canonicalized, so the Hash impl
/// agrees with PartialEq
fn normalized_float_bits(v: f64) -> u64 {
    if v == 0.0 {
        0
    } else if v.is_nan() {
        f64::NAN.to_bits()
    } else {
        v.to_bits()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null(_) => write!(f, "NULL"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_same_type() {
        assert_eq!(
            Value::integer(1).compare(&Value::integer(2)).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            Value::text("b").compare(&Value::text("a")).unwrap(),
            Ordering::Greater
        );
        assert_eq!(
            Value::boolean(true).compare(&Value::boolean(true)).unwrap(),
            Ordering::Equal
        );
    }

    #[test]
    fn test_compare_cross_numeric() {
        assert_eq!(
            Value::integer(2).compare(&Value::float(2.5)).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            Value::float(3.0).compare(&Value::integer(3)).unwrap(),
            Ordering::Equal
        );
    }

    #[test]
    fn test_compare_null_is_error() {
        assert_eq!(
            Value::null_unknown().compare(&Value::integer(1)),
            Err(Error::NullComparison)
        );
        assert_eq!(
            Value::integer(1).compare(&Value::null(DataType::Integer)),
            Err(Error::NullComparison)
        );
    }

    #[test]
    fn test_compare_incomparable() {
        assert_eq!(
            Value::integer(1).compare(&Value::text("1")),
            Err(Error::IncomparableTypes)
        );
    }

    #[test]
    fn test_total_cmp_nulls_first() {
        assert_eq!(
            Value::null_unknown().total_cmp(&Value::integer(i64::MIN)),
            Ordering::Less
        );
        assert_eq!(
            Value::integer(0).total_cmp(&Value::null(DataType::Integer)),
            Ordering::Greater
        );
        assert_eq!(
            Value::null(DataType::Text).total_cmp(&Value::null(DataType::Integer)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_grouping_equality() {
        assert_eq!(Value::null(DataType::Text), Value::null(DataType::Integer));
        assert_eq!(Value::integer(1), Value::float(1.0));
        assert_ne!(Value::integer(1), Value::text("1"));
    }

    #[test]
    fn test_add() {
        assert_eq!(
            Value::integer(2).add(&Value::integer(3)).unwrap(),
            Value::integer(5)
        );
        assert_eq!(
            Value::float(1.5).add(&Value::integer(1)).unwrap(),
            Value::float(2.5)
        );
        // NULL poisons the running sum
        assert!(Value::integer(2)
            .add(&Value::null(DataType::Integer))
            .unwrap()
            .is_null());
        assert_eq!(
            Value::integer(i64::MAX).add(&Value::integer(1)),
            Err(Error::NumericOverflow("addition"))
        );
    }

    #[test]
    fn test_divide_by_count() {
        assert_eq!(
            Value::integer(10).divide_by_count(4).unwrap(),
            Value::integer(2)
        );
        assert_eq!(
            Value::float(10.0).divide_by_count(4).unwrap(),
            Value::float(2.5)
        );
        assert!(Value::null(DataType::Integer)
            .divide_by_count(3)
            .unwrap()
            .is_null());
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(
            Value::minimum_value(DataType::Integer).unwrap(),
            Value::integer(i64::MIN)
        );
        assert_eq!(
            Value::maximum_value(DataType::Integer).unwrap(),
            Value::integer(i64::MAX)
        );
        assert_eq!(
            Value::maximum_value(DataType::Float).unwrap(),
            Value::float(f64::INFINITY)
        );
        assert_eq!(
            Value::minimum_value(DataType::Text),
            Err(Error::NoSentinelForType(DataType::Text))
        );
    }

    #[test]
    fn test_cast() {
        assert_eq!(
            Value::float(3.9).cast_to(DataType::Integer).unwrap(),
            Value::integer(3)
        );
        assert_eq!(
            Value::text("42").cast_to(DataType::Integer).unwrap(),
            Value::integer(42)
        );
        assert_eq!(
            Value::integer(0).cast_to(DataType::Boolean).unwrap(),
            Value::boolean(false)
        );
        assert!(Value::null_unknown()
            .cast_to(DataType::Integer)
            .unwrap()
            .is_null());
        assert!(Value::text("nope").cast_to(DataType::Integer).is_err());
    }

    #[test]
    fn test_hash_consistent_with_eq() {
        use std::collections::hash_map::DefaultHasher;

        fn hash_of(v: &Value) -> u64 {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        }

        assert_eq!(hash_of(&Value::integer(1)), hash_of(&Value::float(1.0)));
        assert_eq!(hash_of(&Value::float(0.0)), hash_of(&Value::float(-0.0)));
        assert_eq!(
            hash_of(&Value::null(DataType::Text)),
            hash_of(&Value::null(DataType::Integer))
        );
    }
}
