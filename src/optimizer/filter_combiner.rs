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

//! Filter combiner
//!
//! Ingests a conjunction of predicates and canonicalizes it: structurally
//! equal expressions are interned once, expressions proved equal are merged
//! into equivalence sets, and each set carries a pruned list of constant
//! bounds. Contradictory bounds surface as [`FilterResult::Unsatisfiable`].
//! Inequalities between set members derive transitive constant bounds
//! (`j >= i` and `i > 10` imply `j > 10`).
//!
//! On request the combiner emits a normalized filter set
//! ([`FilterCombiner::generate_filters`]), scan pushdown predicates over
//! bound columns including LIKE/prefix/IN range rewrites
//! ([`FilterCombiner::generate_table_scan_filters`]), and min/max zonemap
//! checks derived from the residual filters
//! ([`FilterCombiner::generate_zonemap_checks`]).

use std::cmp::Ordering;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::core::{ComparisonOp, DataType, Error, Result, Value};
use crate::expr::eval::evaluate_scalar;
use crate::expr::Expr;
use crate::storage::{TableFilter, ROW_ID_COLUMN};

/// Handle into the combiner's expression arena; stands in for the
/// pointer-identity keys of classic combiner implementations
type ExprId = usize;

/// Opaque equivalence set id
type SetId = usize;

/// Outcome of absorbing one predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResult {
    /// Predicate absorbed (or proved redundant)
    Success,
    /// Predicate contradicts earlier ones; no row can satisfy the
    /// conjunction
    Unsatisfiable,
    /// Predicate shape not understood; kept verbatim in the residual set
    Unsupported,
}

/// One constant bound on an equivalence set: `member <cmp> constant`
#[derive(Debug, Clone)]
pub struct ExprValueInfo {
    pub cmp: ComparisonOp,
    pub constant: Value,
}

/// Result of weighing two constant bounds on the same value against each
/// other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueComparisonResult {
    PruneLeft,
    PruneRight,
    Unsatisfiable,
    PruneNothing,
}

/// Predicate canonicalizer with equivalence sets and constant-bound pruning
#[derive(Debug, Default)]
pub struct FilterCombiner {
    /// Arena of canonical expressions; ids index into it
    stored_expressions: Vec<Expr>,
    /// Structural interning: expression -> arena id
    interned: FxHashMap<Expr, ExprId>,
    equivalence_set_map: FxHashMap<ExprId, SetId>,
    equivalence_map: FxHashMap<SetId, Vec<ExprId>>,
    constant_values: FxHashMap<SetId, Vec<ExprValueInfo>>,
    remaining_filters: Vec<Expr>,
    set_index: SetId,
}

impl FilterCombiner {
    /// Create an empty combiner
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb one predicate of the conjunction
    ///
    /// Unsupported predicate shapes are kept verbatim in the residual set
    /// and reported as success. On `Unsatisfiable` the caller should replace
    /// the subplan with an empty result and discard the combiner.
    pub fn add_filter(&mut self, expr: Expr) -> Result<FilterResult> {
        let result = self.try_add_filter(&expr)?;
        if result == FilterResult::Unsupported {
            self.remaining_filters.push(expr);
            return Ok(FilterResult::Success);
        }
        if result == FilterResult::Unsatisfiable {
            debug!(filter = %expr, "conjunction became unsatisfiable");
        }
        Ok(result)
    }

    /// Returns true if any filter would be emitted by `generate_filters`
    pub fn has_filters(&self) -> bool {
        !self.remaining_filters.is_empty()
            || self.equivalence_map.values().any(|members| members.len() > 1)
            || self.constant_values.values().any(|list| !list.is_empty())
    }

    fn try_add_filter(&mut self, expr: &Expr) -> Result<FilterResult> {
        if expr.has_parameter() {
            return Ok(FilterResult::Unsupported);
        }
        if expr.is_foldable() {
            // constant condition: evaluate it and either drop it or prove
            // the conjunction empty
            let value = evaluate_scalar(expr)?.cast_to(DataType::Boolean)?;
            return if value.is_null() || value == Value::Boolean(false) {
                Ok(FilterResult::Unsatisfiable)
            } else {
                Ok(FilterResult::Success)
            };
        }
        match expr {
            Expr::Between {
                input,
                lower,
                upper,
                lower_inclusive,
                upper_inclusive,
            } if lower.is_foldable() || upper.is_foldable() => {
                // decompose into constant comparisons against the input; a
                // non-foldable bound stays behind as a plain comparison
                let node = self.get_node(input);
                let set = self.get_equivalence_set(node);
                if lower.is_foldable() {
                    let cmp = if *lower_inclusive {
                        ComparisonOp::GtEq
                    } else {
                        ComparisonOp::Gt
                    };
                    let info = ExprValueInfo {
                        cmp,
                        constant: evaluate_scalar(lower)?,
                    };
                    let list = self.constants_mut(set)?;
                    if add_constant_comparison(list, info) == FilterResult::Unsatisfiable {
                        return Ok(FilterResult::Unsatisfiable);
                    }
                } else {
                    let cmp = if *lower_inclusive {
                        ComparisonOp::GtEq
                    } else {
                        ComparisonOp::Gt
                    };
                    self.remaining_filters.push(Expr::comparison(
                        cmp,
                        (**input).clone(),
                        (**lower).clone(),
                    ));
                }
                if upper.is_foldable() {
                    let cmp = if *upper_inclusive {
                        ComparisonOp::LtEq
                    } else {
                        ComparisonOp::Lt
                    };
                    let info = ExprValueInfo {
                        cmp,
                        constant: evaluate_scalar(upper)?,
                    };
                    let list = self.constants_mut(set)?;
                    if add_constant_comparison(list, info) == FilterResult::Unsatisfiable {
                        return Ok(FilterResult::Unsatisfiable);
                    }
                } else {
                    let cmp = if *upper_inclusive {
                        ComparisonOp::LtEq
                    } else {
                        ComparisonOp::Lt
                    };
                    self.remaining_filters.push(Expr::comparison(
                        cmp,
                        (**input).clone(),
                        (**upper).clone(),
                    ));
                }
                Ok(FilterResult::Success)
            }
            Expr::Comparison { .. } => self.add_bound_comparison_filter(expr),
            _ => Ok(FilterResult::Unsupported),
        }
    }

    fn add_bound_comparison_filter(&mut self, expr: &Expr) -> Result<FilterResult> {
        let Expr::Comparison { op, left, right } = expr else {
            return Err(Error::internal("expected a comparison expression"));
        };
        let left_is_scalar = left.is_foldable();
        let right_is_scalar = right.is_foldable();

        if left_is_scalar || right_is_scalar {
            // comparison against a constant: canonicalize the non-scalar
            // side and fold the constant into its bound list, flipping the
            // operator when the constant is on the left
            let (scalar, non_scalar, cmp) = if left_is_scalar {
                (left, right, op.flip())
            } else {
                (right, left, *op)
            };
            let node = self.get_node(non_scalar);
            let set = self.get_equivalence_set(node);
            let info = ExprValueInfo {
                cmp,
                constant: evaluate_scalar(scalar)?,
            };
            let list = self.constants_mut(set)?;
            let result = add_constant_comparison(list, info);

            // a residual inequality whose right side is this expression may
            // now derive transitive bounds
            if let Some(transitive) = self.find_transitive_filter(non_scalar) {
                if self.add_transitive_filters(&transitive)? == FilterResult::Unsupported {
                    self.remaining_filters.push(transitive);
                }
            }
            return Ok(result);
        }

        // comparison between two non-scalars
        if *op != ComparisonOp::Eq {
            if op.is_greater() || op.is_less() {
                return self.add_transitive_filters(expr);
            }
            return Ok(FilterResult::Unsupported);
        }
        let left_node = self.get_node(left);
        let right_node = self.get_node(right);
        if left_node == right_node {
            // x = x carries no information
            return Ok(FilterResult::Unsupported);
        }
        let left_set = self.get_equivalence_set(left_node);
        let right_set = self.get_equivalence_set(right_node);
        if left_set == right_set {
            // equality already known, prune it
            return Ok(FilterResult::Success);
        }

        // merge the right set into the left set
        let right_members = self.equivalence_map.remove(&right_set).unwrap_or_default();
        for member in &right_members {
            self.equivalence_set_map.insert(*member, left_set);
        }
        self.equivalence_map
            .get_mut(&left_set)
            .ok_or_else(|| Error::internal("missing equivalence set members"))?
            .extend(right_members);
        let right_constants = self.constant_values.remove(&right_set).unwrap_or_default();
        let left_constants = self.constants_mut(left_set)?;
        for info in right_constants {
            if add_constant_comparison(left_constants, info) == FilterResult::Unsatisfiable {
                return Ok(FilterResult::Unsatisfiable);
            }
        }
        Ok(FilterResult::Success)
    }

    /// Derive constant bounds for the left side of a two-column inequality
    /// from the bounds already known on the right side
    ///
    /// With `j >= i` and a bound `i = 10` the new bound is `j >= 10` and the
    /// inequality itself is pruned; with `i > 10` the bound is `j > 10` and
    /// the inequality is kept in the residual set exactly once.
    fn add_transitive_filters(&mut self, comparison: &Expr) -> Result<FilterResult> {
        let Expr::Comparison { op, left, right } = comparison else {
            return Err(Error::internal("expected a comparison expression"));
        };
        if !op.is_greater() && !op.is_less() {
            return Err(Error::internal(
                "transitive derivation requires an inequality",
            ));
        }
        let left_node = self.get_node(left);
        let right_node = self.get_node(right);
        if left_node == right_node {
            return Ok(FilterResult::Unsupported);
        }
        let left_set = self.get_equivalence_set(left_node);
        let right_set = self.get_equivalence_set(right_node);
        if left_set == right_set {
            return Ok(FilterResult::Success);
        }

        let right_constants = self
            .constant_values
            .get(&right_set)
            .cloned()
            .unwrap_or_default();
        let mut derived_any = false;
        let mut retained_original = false;
        for right_constant in &right_constants {
            let derived_cmp = if right_constant.cmp == ComparisonOp::Eq {
                // equality on the right: the left inherits the inequality
                // itself, and the original filter is fully subsumed
                Some(*op)
            } else if (*op == ComparisonOp::GtEq && right_constant.cmp.is_greater())
                || (*op == ComparisonOp::LtEq && right_constant.cmp.is_less())
            {
                // j >= i with i [>, >=] c: the right bound's strictness wins
                Some(right_constant.cmp)
            } else if (*op == ComparisonOp::Gt && right_constant.cmp.is_greater())
                || (*op == ComparisonOp::Lt && right_constant.cmp.is_less())
            {
                // j > i with i [>, >=] c: the strict inequality wins
                Some(*op)
            } else {
                None
            };
            let Some(cmp) = derived_cmp else { continue };
            if right_constant.cmp != ComparisonOp::Eq && !retained_original {
                // the inequality is not subsumed by the derived bound
                self.remaining_filters.push(comparison.clone());
                retained_original = true;
            }
            let info = ExprValueInfo {
                cmp,
                constant: right_constant.constant.clone(),
            };
            let left_constants = self.constants_mut(left_set)?;
            if add_constant_comparison(left_constants, info) == FilterResult::Unsatisfiable {
                return Ok(FilterResult::Unsatisfiable);
            }
            derived_any = true;
        }
        if derived_any {
            // the left side gained bounds; its own residual transitives may
            // now fire as well
            if let Some(transitive) = self.find_transitive_filter(left) {
                if self.add_transitive_filters(&transitive)? == FilterResult::Unsupported {
                    self.remaining_filters.push(transitive);
                }
            }
            return Ok(FilterResult::Success);
        }
        Ok(FilterResult::Unsupported)
    }

    /// Remove and return a residual comparison whose right operand equals
    /// the given expression (column references only)
    fn find_transitive_filter(&mut self, expr: &Expr) -> Option<Expr> {
        if !matches!(expr, Expr::ColumnRef { .. }) {
            return None;
        }
        let position = self.remaining_filters.iter().position(|filter| {
            matches!(
                filter,
                Expr::Comparison { op, right, .. }
                    if *op != ComparisonOp::NotEq && **right == *expr
            )
        })?;
        Some(self.remaining_filters.remove(position))
    }

    /// Emit the normalized conjunction and clear all state
    ///
    /// Per equivalence set: all pairwise member equalities, then for each
    /// member its constant bounds. A lower + upper pair fuses into one
    /// BETWEEN, a lone bound becomes a plain comparison, equality and
    /// inequality bounds emit directly. Residual filters are emitted first.
    pub fn generate_filters(&mut self, mut callback: impl FnMut(Expr)) {
        for filter in std::mem::take(&mut self.remaining_filters) {
            callback(filter);
        }
        let mut set_ids: Vec<SetId> = self.equivalence_map.keys().copied().collect();
        set_ids.sort_unstable();
        for set in set_ids {
            let members = &self.equivalence_map[&set];
            let empty = Vec::new();
            let constant_list = self.constant_values.get(&set).unwrap_or(&empty);
            for i in 0..members.len() {
                let member = &self.stored_expressions[members[i]];
                for k in i + 1..members.len() {
                    callback(Expr::comparison(
                        ComparisonOp::Eq,
                        member.clone(),
                        self.stored_expressions[members[k]].clone(),
                    ));
                }
                let mut lower: Option<&ExprValueInfo> = None;
                let mut upper: Option<&ExprValueInfo> = None;
                for info in constant_list {
                    if info.cmp.is_greater() {
                        lower = Some(info);
                    } else if info.cmp.is_less() {
                        upper = Some(info);
                    } else {
                        callback(Expr::comparison(
                            info.cmp,
                            member.clone(),
                            Expr::constant(info.constant.clone()),
                        ));
                    }
                }
                match (lower, upper) {
                    (Some(lower), Some(upper)) => callback(Expr::Between {
                        input: Box::new(member.clone()),
                        lower: Box::new(Expr::constant(lower.constant.clone())),
                        upper: Box::new(Expr::constant(upper.constant.clone())),
                        lower_inclusive: lower.cmp == ComparisonOp::GtEq,
                        upper_inclusive: upper.cmp == ComparisonOp::LtEq,
                    }),
                    (Some(lower), None) => callback(Expr::comparison(
                        lower.cmp,
                        member.clone(),
                        Expr::constant(lower.constant.clone()),
                    )),
                    (None, Some(upper)) => callback(Expr::comparison(
                        upper.cmp,
                        member.clone(),
                        Expr::constant(upper.constant.clone()),
                    )),
                    (None, None) => {}
                }
            }
        }
        self.stored_expressions.clear();
        self.interned.clear();
        self.equivalence_set_map.clear();
        self.equivalence_map.clear();
        self.constant_values.clear();
    }

    /// Emit pushdown predicates over base-table columns
    ///
    /// Single-member equivalence sets over a bound column with numeric or
    /// string constant bounds become [`TableFilter`] records and are erased.
    /// Residual `prefix`/LIKE filters with a literal prefix are rewritten to
    /// byte-range filters (the residual predicate stays for exactness);
    /// consecutive-integer IN lists become a min/max pair and are dropped
    /// from the residual set.
    pub fn generate_table_scan_filters(&mut self, column_ids: &[usize]) -> Vec<TableFilter> {
        let mut table_filters = Vec::new();

        let mut set_ids: Vec<SetId> = self.constant_values.keys().copied().collect();
        set_ids.sort_unstable();
        for set in set_ids {
            let Some(constant_list) = self.constant_values.get(&set) else {
                continue;
            };
            let Some(first) = constant_list.first() else {
                continue;
            };
            let pushable_cmp = matches!(
                first.cmp,
                ComparisonOp::Eq
                    | ComparisonOp::Gt
                    | ComparisonOp::GtEq
                    | ComparisonOp::Lt
                    | ComparisonOp::LtEq
            );
            let constant_type = first.constant.data_type();
            if !pushable_cmp || !(constant_type.is_numeric() || constant_type == DataType::Text) {
                continue;
            }
            let Some(members) = self.equivalence_map.get(&set) else {
                continue;
            };
            if members.len() != 1 {
                continue;
            }
            let Expr::ColumnRef { index, .. } = &self.stored_expressions[members[0]] else {
                continue;
            };
            let index = *index;
            if column_ids.get(index).copied().unwrap_or(ROW_ID_COLUMN) == ROW_ID_COLUMN {
                continue;
            }
            for info in constant_list {
                table_filters.push(TableFilter::new(info.constant.clone(), info.cmp, index));
            }
            self.equivalence_map.remove(&set);
            self.constant_values.remove(&set);
        }

        // LIKE / prefix / IN rewrites over the residual filters
        let mut idx = 0;
        while idx < self.remaining_filters.len() {
            let mut drop_filter = false;
            match &self.remaining_filters[idx] {
                Expr::Function { name, children, .. } if name == "prefix" => {
                    if let (Some(column), Some(literal)) = function_column_and_text(children) {
                        if !literal.is_empty() {
                            table_filters.push(TableFilter::new(
                                Value::text(literal),
                                ComparisonOp::GtEq,
                                column,
                            ));
                            table_filters.push(TableFilter::new(
                                Value::text(increment_last(literal)),
                                ComparisonOp::Lt,
                                column,
                            ));
                        }
                    }
                }
                Expr::Function { name, children, .. } if name == "~~" => {
                    if let (Some(column), Some(literal)) = function_column_and_text(children) {
                        // a leading wildcard leaves nothing to push down
                        if !literal.is_empty() && !literal.starts_with(['%', '_']) {
                            match literal.find(['%', '_']) {
                                None => {
                                    // no wildcard at all: plain equality
                                    table_filters.push(TableFilter::new(
                                        Value::text(literal),
                                        ComparisonOp::Eq,
                                        column,
                                    ));
                                }
                                Some(split) => {
                                    let prefix = &literal[..split];
                                    table_filters.push(TableFilter::new(
                                        Value::text(prefix),
                                        ComparisonOp::GtEq,
                                        column,
                                    ));
                                    table_filters.push(TableFilter::new(
                                        Value::text(increment_last(prefix)),
                                        ComparisonOp::Lt,
                                        column,
                                    ));
                                }
                            }
                        }
                    }
                }
                Expr::InList { children } => {
                    if let Some(column) = children[0].column_index() {
                        if column_ids.get(column).copied().unwrap_or(ROW_ID_COLUMN)
                            != ROW_ID_COLUMN
                        {
                            if let Some(range) = consecutive_integer_range(&children[1..]) {
                                table_filters.push(TableFilter::new(
                                    Value::integer(range.0),
                                    ComparisonOp::GtEq,
                                    column,
                                ));
                                table_filters.push(TableFilter::new(
                                    Value::integer(range.1),
                                    ComparisonOp::LtEq,
                                    column,
                                ));
                                drop_filter = true;
                            }
                        }
                    }
                }
                _ => {}
            }
            if drop_filter {
                self.remaining_filters.remove(idx);
            } else {
                idx += 1;
            }
        }
        table_filters
    }

    /// Derive min/max zonemap checks from the residual filters
    ///
    /// AND and OR both merge child ranges by widening; a column compared
    /// against anything non-constant is excluded, as are columns already
    /// covered by pushed filters. Column ids in the result are table column
    /// ids (`column_ids` applied).
    pub fn generate_zonemap_checks(
        &self,
        column_ids: &[usize],
        pushed_filters: &[TableFilter],
    ) -> Vec<TableFilter> {
        let mut checks: FxHashMap<usize, (Value, Value)> = FxHashMap::default();
        let mut not_constants: FxHashSet<usize> = FxHashSet::default();
        for filter in &self.remaining_filters {
            find_zonemap_checks(column_ids, &mut checks, &mut not_constants, filter);
        }
        for column in &not_constants {
            checks.remove(column);
        }
        for pushed in pushed_filters {
            if let Some(column) = column_ids.get(pushed.column_index) {
                checks.remove(column);
            }
        }
        let mut columns: Vec<usize> = checks.keys().copied().collect();
        columns.sort_unstable();
        let mut zonemap_checks = Vec::with_capacity(columns.len() * 2);
        for column in columns {
            let (min, max) = &checks[&column];
            zonemap_checks.push(TableFilter::new(min.clone(), ComparisonOp::GtEq, column));
            zonemap_checks.push(TableFilter::new(max.clone(), ComparisonOp::LtEq, column));
        }
        zonemap_checks
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Intern an expression and return its canonical id
    fn get_node(&mut self, expr: &Expr) -> ExprId {
        if let Some(id) = self.interned.get(expr) {
            return *id;
        }
        let id = self.stored_expressions.len();
        self.stored_expressions.push(expr.clone());
        self.interned.insert(expr.clone(), id);
        id
    }

    /// The equivalence set of a canonical expression, created on demand
    fn get_equivalence_set(&mut self, node: ExprId) -> SetId {
        if let Some(set) = self.equivalence_set_map.get(&node) {
            return *set;
        }
        let set = self.set_index;
        self.set_index += 1;
        self.equivalence_set_map.insert(node, set);
        self.equivalence_map.insert(set, vec![node]);
        self.constant_values.insert(set, Vec::new());
        set
    }

    fn constants_mut(&mut self, set: SetId) -> Result<&mut Vec<ExprValueInfo>> {
        self.constant_values
            .get_mut(&set)
            .ok_or_else(|| Error::internal("missing constant bucket for equivalence set"))
    }
}

/// Fold a new constant bound into a list, pruning dominated bounds
fn add_constant_comparison(
    info_list: &mut Vec<ExprValueInfo>,
    info: ExprValueInfo,
) -> FilterResult {
    let mut idx = 0;
    while idx < info_list.len() {
        match compare_value_info(&info_list[idx], &info) {
            ValueComparisonResult::PruneLeft => {
                info_list.remove(idx);
            }
            ValueComparisonResult::PruneRight => return FilterResult::Success,
            ValueComparisonResult::Unsatisfiable => return FilterResult::Unsatisfiable,
            ValueComparisonResult::PruneNothing => idx += 1,
        }
    }
    info_list.push(info);
    FilterResult::Success
}

fn invert(result: ValueComparisonResult) -> ValueComparisonResult {
    match result {
        ValueComparisonResult::PruneLeft => ValueComparisonResult::PruneRight,
        ValueComparisonResult::PruneRight => ValueComparisonResult::PruneLeft,
        other => other,
    }
}

/// Does `left <cmp> right` hold? None when the constants cannot be compared
fn satisfies(left: &Value, cmp: ComparisonOp, right: &Value) -> Option<bool> {
    let ordering = left.compare(right).ok()?;
    Some(match cmp {
        ComparisonOp::Eq => ordering == Ordering::Equal,
        ComparisonOp::NotEq => ordering != Ordering::Equal,
        ComparisonOp::Lt => ordering == Ordering::Less,
        ComparisonOp::LtEq => ordering != Ordering::Greater,
        ComparisonOp::Gt => ordering == Ordering::Greater,
        ComparisonOp::GtEq => ordering != Ordering::Less,
    })
}

/// The bound-vs-bound truth table
///
/// Two bounds on the same value either prune one another, prove the
/// conjunction unsatisfiable, or coexist. Incomparable constants prune
/// nothing.
fn compare_value_info(
    left: &ExprValueInfo,
    right: &ExprValueInfo,
) -> ValueComparisonResult {
    if left.cmp == ComparisonOp::Eq {
        // the equality pins the value: the other bound is either implied or
        // contradicted
        return match satisfies(&left.constant, right.cmp, &right.constant) {
            Some(true) => ValueComparisonResult::PruneRight,
            Some(false) => ValueComparisonResult::Unsatisfiable,
            None => ValueComparisonResult::PruneNothing,
        };
    }
    if right.cmp == ComparisonOp::Eq {
        return invert(compare_value_info(right, left));
    }
    if left.cmp == ComparisonOp::NotEq {
        // x != a is implied when the other bound already excludes a
        let excluded = match right.cmp {
            ComparisonOp::Lt => satisfies(&left.constant, ComparisonOp::GtEq, &right.constant),
            ComparisonOp::LtEq => satisfies(&left.constant, ComparisonOp::Gt, &right.constant),
            ComparisonOp::Gt => satisfies(&left.constant, ComparisonOp::LtEq, &right.constant),
            ComparisonOp::GtEq => satisfies(&left.constant, ComparisonOp::Lt, &right.constant),
            _ => satisfies(&left.constant, ComparisonOp::Eq, &right.constant),
        };
        return match excluded {
            Some(true) => ValueComparisonResult::PruneLeft,
            _ => ValueComparisonResult::PruneNothing,
        };
    }
    if right.cmp == ComparisonOp::NotEq {
        return invert(compare_value_info(right, left));
    }
    if left.cmp.is_greater() && right.cmp.is_greater() {
        // keep the tighter lower bound; on a tie the strict one wins
        return match left.constant.compare(&right.constant) {
            Ok(Ordering::Greater) => ValueComparisonResult::PruneRight,
            Ok(Ordering::Less) => ValueComparisonResult::PruneLeft,
            Ok(Ordering::Equal) => {
                if left.cmp == ComparisonOp::GtEq {
                    ValueComparisonResult::PruneLeft
                } else {
                    ValueComparisonResult::PruneRight
                }
            }
            Err(_) => ValueComparisonResult::PruneNothing,
        };
    }
    if left.cmp.is_less() && right.cmp.is_less() {
        // keep the tighter upper bound; on a tie the strict one wins
        return match left.constant.compare(&right.constant) {
            Ok(Ordering::Less) => ValueComparisonResult::PruneRight,
            Ok(Ordering::Greater) => ValueComparisonResult::PruneLeft,
            Ok(Ordering::Equal) => {
                if left.cmp == ComparisonOp::LtEq {
                    ValueComparisonResult::PruneLeft
                } else {
                    ValueComparisonResult::PruneRight
                }
            }
            Err(_) => ValueComparisonResult::PruneNothing,
        };
    }
    if left.cmp.is_less() {
        // an upper and a lower bound: contradictory when the interval is
        // empty (equal constants with any side strict count as empty)
        return match satisfies(&left.constant, ComparisonOp::GtEq, &right.constant) {
            Some(true) => ValueComparisonResult::PruneNothing,
            Some(false) => ValueComparisonResult::Unsatisfiable,
            None => ValueComparisonResult::PruneNothing,
        };
    }
    invert(compare_value_info(right, left))
}

/// Extract `(column_index, text literal)` from a two-child function call
fn function_column_and_text(children: &[Expr]) -> (Option<usize>, Option<&str>) {
    if children.len() != 2 {
        return (None, None);
    }
    let column = children[0].column_index();
    let literal = match &children[1] {
        Expr::Constant(Value::Text(text)) => Some(text.as_ref()),
        _ => None,
    };
    match (column, literal) {
        (Some(column), Some(literal)) => (Some(column), Some(literal)),
        _ => (None, None),
    }
}

/// Min and max of an all-integer constant list whose sorted values are
/// consecutive (successive difference <= 1); None otherwise
fn consecutive_integer_range(values: &[Expr]) -> Option<(i64, i64)> {
    if values.is_empty() {
        return None;
    }
    let mut integers = Vec::with_capacity(values.len());
    for value in values {
        match value {
            Expr::Constant(Value::Integer(v)) => integers.push(*v),
            _ => return None,
        }
    }
    integers.sort_unstable();
    for pair in integers.windows(2) {
        if pair[1] - pair[0] > 1 {
            return None;
        }
    }
    Some((integers[0], integers[integers.len() - 1]))
}

/// Byte-level increment of the last byte of a prefix; with multi-byte UTF-8
/// the resulting range may over-select, which is fine because the residual
/// predicate is still applied
fn increment_last(s: &str) -> String {
    let mut bytes = s.as_bytes().to_vec();
    if let Some(last) = bytes.last_mut() {
        *last = last.wrapping_add(1);
    }
    String::from_utf8(bytes)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}

fn widen_check(checks: &mut FxHashMap<usize, (Value, Value)>, column: usize, value: &Value) {
    if value.is_null() {
        return;
    }
    match checks.get_mut(&column) {
        None => {
            checks.insert(column, (value.clone(), value.clone()));
        }
        Some((min, max)) => {
            if min.total_cmp(value) == Ordering::Greater {
                *min = value.clone();
            }
            if max.total_cmp(value) == Ordering::Less {
                *max = value.clone();
            }
        }
    }
}

/// Walk one residual filter accumulating per-column min/max
fn find_zonemap_checks(
    column_ids: &[usize],
    checks: &mut FxHashMap<usize, (Value, Value)>,
    not_constants: &mut FxHashSet<usize>,
    filter: &Expr,
) {
    match filter {
        // both AND and OR merge child ranges by widening
        Expr::Conjunction { children, .. } => {
            for child in children {
                find_zonemap_checks(column_ids, checks, not_constants, child);
            }
        }
        Expr::InList { children } => {
            let Some(index) = children[0].column_index() else {
                return;
            };
            let Some(column) = column_ids.get(index).copied() else {
                return;
            };
            for child in &children[1..] {
                match child {
                    Expr::Constant(value) => widen_check(checks, column, value),
                    _ => {
                        // a non-constant element disqualifies the column
                        not_constants.insert(column);
                        break;
                    }
                }
            }
        }
        Expr::Comparison { op, left, right }
            if matches!(
                op,
                ComparisonOp::Eq
                    | ComparisonOp::Lt
                    | ComparisonOp::LtEq
                    | ComparisonOp::Gt
                    | ComparisonOp::GtEq
            ) =>
        {
            let Some(index) = left.column_index() else {
                return;
            };
            let Some(column) = column_ids.get(index).copied() else {
                return;
            };
            match right.as_ref() {
                Expr::Constant(value) => widen_check(checks, column, value),
                _ => {
                    not_constants.insert(column);
                }
            }
        }
        _ => {}
    }
}
