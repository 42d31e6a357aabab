//! Filtering capabilities for onboarding tables
//!
//! Every sidebar widget becomes an independent boolean mask over the loaded
//! record batch. The masks are combined conjunctively and applied with
//! Arrow's `filter` kernel, so the source table is never modified.

pub mod core;
pub mod date;
pub mod expr;
pub mod selection;

pub use self::core::{AndFilter, BatchFilter, filter_record_batch};
pub use self::date::DateRangeFilter;
pub use self::expr::{Expr, ExpressionFilter, LiteralValue, in_filter};
pub use self::selection::{ALL_SENTINEL, FilterOptions, FilterState, Selection, apply_filters};
