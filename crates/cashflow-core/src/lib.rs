#![forbid(unsafe_code)]

//! Record model and configuration for cash-flow Sankey diagrams.
//!
//! - [`records`]: income/expense records and the fixed type/category sets
//! - [`CashFlow`]: a month of records, loadable from JSON or YAML
//! - [`LayoutConfig`]: geometry constants shared by the layout engine and drag controller

pub mod config;
pub mod dataset;
pub mod error;
pub mod records;

pub use config::{COLUMN_COUNT, LayoutConfig};
pub use dataset::{CashFlow, Totals, validate_records};
pub use error::{Error, Result};
pub use records::{ExpenseCategory, ExpenseRecord, IncomeKind, IncomeRecord, new_record_id};
