use crate::records::{ExpenseCategory, ExpenseRecord, IncomeKind, IncomeRecord};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One month of income and expense records, in the order the user entered them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    #[serde(default)]
    pub income: Vec<IncomeRecord>,
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_income: f64,
    pub total_expense: f64,
    /// `total_income - total_expense`; negative means deficit.
    pub surplus: f64,
}

impl Totals {
    pub fn compute(income: &[IncomeRecord], expenses: &[ExpenseRecord]) -> Self {
        let total_income: f64 = income.iter().map(|r| r.value).sum();
        let total_expense: f64 = expenses.iter().map(|r| r.value).sum();
        Self {
            total_income,
            total_expense,
            surplus: total_income - total_expense,
        }
    }

    pub fn deficit(&self) -> f64 {
        (-self.surplus).max(0.0)
    }
}

impl CashFlow {
    pub fn new(income: Vec<IncomeRecord>, expenses: Vec<ExpenseRecord>) -> Self {
        Self { income, expenses }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parses either JSON (when the document is an object literal) or YAML.
    pub fn from_text(text: &str) -> Result<Self> {
        if text.trim_start().starts_with('{') {
            Self::from_json_str(text)
        } else {
            Self::from_yaml_str(text)
        }
    }

    pub fn totals(&self) -> Totals {
        Totals::compute(&self.income, &self.expenses)
    }

    pub fn validate(&self) -> Result<()> {
        validate_records(&self.income, &self.expenses)
    }

    pub fn is_empty(&self) -> bool {
        self.income.is_empty() && self.expenses.is_empty()
    }

    /// The starter month shown to first-time users.
    pub fn sample() -> Self {
        let income = [
            ("Monthly Wage", 5300.0, IncomeKind::Active),
            ("Cashback Reward", 287.0, IncomeKind::Passive),
            ("Stock Dividends", 262.0, IncomeKind::Passive),
            ("Bank Interest", 147.0, IncomeKind::Passive),
        ]
        .into_iter()
        .map(|(label, value, kind)| IncomeRecord::new(label, value, kind))
        .collect();

        let expenses = [
            ("Federal Tax", 494.0, ExpenseCategory::Payroll),
            ("Public Welfare", 677.0, ExpenseCategory::Payroll),
            ("Utilities & Bills", 758.0, ExpenseCategory::Living),
            ("Groceries", 933.0, ExpenseCategory::Living),
            ("Personal Hygiene", 649.0, ExpenseCategory::Living),
            ("Commuting", 825.0, ExpenseCategory::Living),
            ("Retirement Savings", 536.0, ExpenseCategory::LongTerm),
            ("Investment Contributions", 392.0, ExpenseCategory::LongTerm),
            ("Real Estate Fund", 287.0, ExpenseCategory::LongTerm),
            ("Flexible Spending", 409.0, ExpenseCategory::Flexible),
        ]
        .into_iter()
        .map(|(label, value, category)| ExpenseRecord::new(label, value, category))
        .collect();

        Self { income, expenses }
    }
}

fn check_value(id: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::InvalidRecord {
            id: id.to_string(),
            message: "value must be a finite number".to_string(),
        });
    }
    if value < 0.0 {
        return Err(Error::InvalidRecord {
            id: id.to_string(),
            message: format!("value must be non-negative, got {value}"),
        });
    }
    Ok(())
}

/// Rejects empty or duplicate ids, negative or non-finite values, and totals that overflow.
///
/// Ids share one namespace across both lists.
pub fn validate_records(income: &[IncomeRecord], expenses: &[ExpenseRecord]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(income.len() + expenses.len());
    let entries = income
        .iter()
        .map(|r| (r.id.as_str(), r.value))
        .chain(expenses.iter().map(|r| (r.id.as_str(), r.value)));
    for (id, value) in entries {
        if id.trim().is_empty() {
            return Err(Error::InvalidRecord {
                id: id.to_string(),
                message: "id must not be empty".to_string(),
            });
        }
        if !seen.insert(id) {
            return Err(Error::DuplicateId { id: id.to_string() });
        }
        check_value(id, value)?;
    }

    // Finite values can still sum past f64::MAX.
    let totals = Totals::compute(income, expenses);
    for (which, value) in [
        ("total income", totals.total_income),
        ("total expense", totals.total_expense),
        ("surplus", totals.surplus),
    ] {
        if !value.is_finite() {
            return Err(Error::TotalOverflow { which, value });
        }
    }
    Ok(())
}
