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

//! Error types for Gneiss
//!
//! This module defines all error types used throughout the engine core.

use thiserror::Error;

use super::types::DataType;

/// Result type alias for Gneiss operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Gneiss engine operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // =========================================================================
    // Value errors
    // =========================================================================
    /// Comparison involving a NULL value
    #[error("cannot compare NULL values")]
    NullComparison,

    /// Values of incompatible types were compared
    #[error("cannot compare values of incompatible types")]
    IncomparableTypes,

    /// Arithmetic overflowed the value's type
    #[error("numeric overflow in {0}")]
    NumericOverflow(&'static str),

    /// A value of an unexpected type was supplied
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: DataType, got: DataType },

    /// Cast between the two types is not defined or the value does not fit
    #[error("cannot cast value from {from} to {to}")]
    InvalidCast { from: DataType, to: DataType },

    /// The type has no minimum/maximum sentinel value
    #[error("type {0} has no minimum/maximum sentinel")]
    NoSentinelForType(DataType),

    // =========================================================================
    // Expression errors
    // =========================================================================
    /// Expression form the evaluator does not handle
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),

    // =========================================================================
    // Window operator errors
    // =========================================================================
    /// A frame boundary kind that is illegal in its position
    #[error("unsupported window boundary: {0}")]
    UnsupportedWindowBoundary(&'static str),

    /// Dispatch hit a window function the operator does not implement
    #[error("unsupported window function: {0}")]
    UnsupportedWindowFunction(String),

    /// A computed frame edge fell outside the valid row range
    #[error("invalid window boundary: {0}")]
    InvalidWindowBoundary(String),

    // =========================================================================
    // Internal errors
    // =========================================================================
    /// Broken internal invariant; indicates a bug in the engine
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an internal invariant error
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }
}
