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

//! Core types for Gneiss: values, chunks, errors

pub mod chunk;
pub mod error;
pub mod types;
pub mod value;

pub use chunk::{Chunk, ChunkCollection, OrderByColumn, CHUNK_CAPACITY};
pub use error::{Error, Result};
pub use types::{ComparisonOp, DataType, SortDirection};
pub use value::Value;
