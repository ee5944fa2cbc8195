//! Raw income and expense records as edited by the user.

use serde::{Deserialize, Serialize};

/// Generates an opaque, unique record id for records supplied without one.
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeKind {
    Active,
    Passive,
}

impl IncomeKind {
    /// Fixed stacking order of the income-type aggregates.
    pub const ALL: [IncomeKind; 2] = [IncomeKind::Active, IncomeKind::Passive];

    pub fn as_str(self) -> &'static str {
        match self {
            IncomeKind::Active => "active",
            IncomeKind::Passive => "passive",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IncomeKind::Active => "Active Income",
            IncomeKind::Passive => "Passive Income",
        }
    }
}

/// The closed set of expense categories, in the order they are stacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    Payroll,
    Living,
    #[serde(rename = "Long-Term")]
    LongTerm,
    Flexible,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 4] = [
        ExpenseCategory::Payroll,
        ExpenseCategory::Living,
        ExpenseCategory::LongTerm,
        ExpenseCategory::Flexible,
    ];

    /// The tag used in serialized records (`"Long-Term"` for [`ExpenseCategory::LongTerm`]).
    pub fn as_str(self) -> &'static str {
        match self {
            ExpenseCategory::Payroll => "Payroll",
            ExpenseCategory::Living => "Living",
            ExpenseCategory::LongTerm => "Long-Term",
            ExpenseCategory::Flexible => "Flexible",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExpenseCategory::Payroll => "Payroll Deductions",
            ExpenseCategory::Living => "Living Costs",
            ExpenseCategory::LongTerm => "Long-Term Planning",
            ExpenseCategory::Flexible => "Flexible Spending",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeRecord {
    #[serde(default = "new_record_id")]
    pub id: String,
    pub label: String,
    pub value: f64,
    #[serde(rename = "type")]
    pub kind: IncomeKind,
}

impl IncomeRecord {
    pub fn new(label: impl Into<String>, value: f64, kind: IncomeKind) -> Self {
        Self {
            id: new_record_id(),
            label: label.into(),
            value,
            kind,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    #[serde(default = "new_record_id")]
    pub id: String,
    pub label: String,
    pub value: f64,
    pub category: ExpenseCategory,
}

impl ExpenseRecord {
    pub fn new(label: impl Into<String>, value: f64, category: ExpenseCategory) -> Self {
        Self {
            id: new_record_id(),
            label: label.into(),
            value,
            category,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}
