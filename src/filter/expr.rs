//! Expression-based filtering for onboarding tables
//!
//! This module provides an expression-based filtering system that
//! allows filtering Arrow record batches based on column values.

use std::collections::HashSet;

use arrow::array::{Array, ArrayRef, BooleanArray, Datum, Date32Array, StringArray};
use arrow::compute::kernels::cmp;
use arrow::compute::{and, not};
use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashSet;

use crate::error::{DashboardError, Result};
use crate::filter::core::{BatchFilter, filter_record_batch};

/// Represents a filter expression over an onboarding table
#[derive(Debug, Clone)]
pub enum Expr {
    /// Column is greater than or equal to a literal value
    GtEq(String, LiteralValue),

    /// Column is less than or equal to a literal value
    LtEq(String, LiteralValue),

    /// Column is in a set of values
    In(String, Vec<LiteralValue>),

    /// Column value contains a substring, ignoring case
    ContainsIgnoreCase(String, String),

    /// Logical AND of expressions
    And(Vec<Expr>),

    /// Logical NOT of an expression
    Not(Box<Expr>),

    /// Always evaluates to true
    AlwaysTrue,

    /// Always evaluates to false
    AlwaysFalse,
}

/// Represents a literal value that can be used in filter expressions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralValue {
    /// String value
    String(String),

    /// Date value (days since epoch)
    Date(i32),
}

impl Expr {
    /// Returns a set of all column names required by this expression
    #[must_use]
    pub fn required_columns(&self) -> HashSet<String> {
        let mut columns = HashSet::new();
        self.collect_required_columns(&mut columns);
        columns
    }

    /// Helper method to collect column names
    fn collect_required_columns(&self, columns: &mut HashSet<String>) {
        match self {
            Self::GtEq(col, _)
            | Self::LtEq(col, _)
            | Self::In(col, _)
            | Self::ContainsIgnoreCase(col, _) => {
                columns.insert(col.clone());
            }
            Self::And(exprs) => {
                for expr in exprs {
                    expr.collect_required_columns(columns);
                }
            }
            Self::Not(expr) => {
                expr.collect_required_columns(columns);
            }
            Self::AlwaysTrue | Self::AlwaysFalse => {}
        }
    }
}

/// A filter that evaluates an expression against a record batch
#[derive(Debug, Clone)]
pub struct ExpressionFilter {
    /// The expression to evaluate
    expr: Expr,
}

impl ExpressionFilter {
    /// Create a new expression filter
    #[must_use]
    pub fn new(expr: Expr) -> Self {
        Self { expr }
    }

    /// Evaluate the expression to a row mask
    ///
    /// Null entries in the mask mean "unknown" and are dropped by
    /// [`filter_record_batch`].
    pub fn evaluate(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        evaluate_expr(batch, &self.expr)
    }
}

/// Evaluate an expression against a record batch
///
/// # Returns
/// A boolean array indicating which rows match the expression
fn evaluate_expr(batch: &RecordBatch, expr: &Expr) -> Result<BooleanArray> {
    match expr {
        Expr::AlwaysTrue => Ok(BooleanArray::from(vec![true; batch.num_rows()])),

        Expr::AlwaysFalse => Ok(BooleanArray::from(vec![false; batch.num_rows()])),

        Expr::And(exprs) => evaluate_and_expression(batch, exprs),

        Expr::Not(expr) => {
            let mask = evaluate_expr(batch, expr)?;
            Ok(not(&mask)?)
        }

        Expr::GtEq(col_name, literal_value) => {
            evaluate_comparison(batch, col_name, literal_value, Comparison::GtEq)
        }

        Expr::LtEq(col_name, literal_value) => {
            evaluate_comparison(batch, col_name, literal_value, Comparison::LtEq)
        }

        Expr::In(col_name, values) => evaluate_in_expression(batch, col_name, values),

        Expr::ContainsIgnoreCase(col_name, substring) => {
            evaluate_contains_expression(batch, col_name, substring)
        }
    }
}

/// Evaluates a logical AND expression
fn evaluate_and_expression(batch: &RecordBatch, exprs: &[Expr]) -> Result<BooleanArray> {
    let Some((first, rest)) = exprs.split_first() else {
        return Ok(BooleanArray::from(vec![true; batch.num_rows()]));
    };

    let mut result = evaluate_expr(batch, first)?;
    for expr in rest {
        let mask = evaluate_expr(batch, expr)?;
        result = and(&result, &mask)?;
    }

    Ok(result)
}

#[derive(Debug, Clone, Copy)]
enum Comparison {
    GtEq,
    LtEq,
}

impl Comparison {
    fn apply(self, lhs: &dyn Datum, rhs: &dyn Datum) -> Result<BooleanArray> {
        let result = match self {
            Self::GtEq => cmp::gt_eq(lhs, rhs),
            Self::LtEq => cmp::lt_eq(lhs, rhs),
        };
        Ok(result?)
    }
}

fn column<'a>(batch: &'a RecordBatch, col_name: &str) -> Result<&'a ArrayRef> {
    let col_idx = batch
        .schema()
        .index_of(col_name)
        .map_err(|_| DashboardError::filter(format!("Column '{col_name}' not found")))?;
    Ok(batch.column(col_idx))
}

/// Evaluates an ordering comparison against a literal
fn evaluate_comparison(
    batch: &RecordBatch,
    col_name: &str,
    literal_value: &LiteralValue,
    comparison: Comparison,
) -> Result<BooleanArray> {
    let column = column(batch, col_name)?;

    match literal_value {
        LiteralValue::Date(days) => {
            let dates = column
                .as_any()
                .downcast_ref::<Date32Array>()
                .ok_or_else(|| {
                    DashboardError::filter(format!("Column '{col_name}' is not a Date32 array"))
                })?;
            comparison.apply(dates, &Date32Array::new_scalar(*days))
        }
        LiteralValue::String(s) => Err(DashboardError::filter(format!(
            "Comparison on column '{col_name}' only supports date values, got '{s}'"
        ))),
    }
}

/// Evaluates IN expression; nulls never match
fn evaluate_in_expression(
    batch: &RecordBatch,
    col_name: &str,
    values: &[LiteralValue],
) -> Result<BooleanArray> {
    let column = column(batch, col_name)?;

    let str_values = values
        .iter()
        .map(|v| match v {
            LiteralValue::String(s) => Ok(s.as_str()),
            LiteralValue::Date(_) => Err(DashboardError::filter(format!(
                "IN on column '{col_name}' only supports string values: {values:?}"
            ))),
        })
        .collect::<Result<FxHashSet<&str>>>()?;

    let str_array = column
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| DashboardError::filter(format!("Column '{col_name}' is not a string array")))?;

    Ok(str_array
        .iter()
        .map(|value| Some(value.is_some_and(|s| str_values.contains(s))))
        .collect())
}

/// Evaluates case-insensitive CONTAINS; nulls never match
fn evaluate_contains_expression(
    batch: &RecordBatch,
    col_name: &str,
    substring: &str,
) -> Result<BooleanArray> {
    let column = column(batch, col_name)?;
    let needle = substring.to_lowercase();

    let str_array = column
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| DashboardError::filter(format!("Column '{col_name}' is not a string array")))?;

    Ok(str_array
        .iter()
        .map(|value| Some(value.is_some_and(|s| s.to_lowercase().contains(&needle))))
        .collect())
}

impl BatchFilter for ExpressionFilter {
    fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let mask = self.evaluate(batch)?;
        filter_record_batch(batch, &mask)
    }

    fn required_columns(&self) -> HashSet<String> {
        self.expr.required_columns()
    }
}

/// Helper function to create an IN filter over string values
#[must_use]
pub fn in_filter<I, S>(column: &str, values: I) -> Expr
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Expr::In(
        column.to_string(),
        values
            .into_iter()
            .map(|v| LiteralValue::String(v.into()))
            .collect(),
    )
}
