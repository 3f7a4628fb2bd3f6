// 🧾 Billing Model - Bills, Person, and the monthly aggregate
// Field names are serialized in PascalCase to keep billing_data.json stable

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};

use crate::error::BillingError;
use crate::totals::calculate_total;

// ============================================================================
// BILL
// ============================================================================

/// A single dated expense entry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Bill {
    pub label: String,

    pub price: f64,

    /// Free text, nominally YYYY-MM-DD (never validated)
    pub date: String,

    // Installment fields are persisted but nothing populates them yet
    pub paid_in_credit_card: bool,
    pub total_installments: i32,
    pub current_installment: i32,
}

impl Bill {
    pub fn new(label: &str, price: f64, date: &str) -> Self {
        Self {
            label: label.to_string(),
            price,
            date: date.to_string(),
            ..Default::default()
        }
    }

    /// Build a bill from raw form text, rejecting a non-numeric price.
    /// `inf` and `NaN` parse as floats but cannot be stored as JSON numbers.
    pub fn parse(label: &str, price_text: &str, date: &str) -> Result<Self, BillingError> {
        let price = price_text
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite())
            .ok_or_else(|| BillingError::InvalidPrice(price_text.to_string()))?;

        Ok(Self::new(label, price, date))
    }
}

// ============================================================================
// PERSON
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Person {
    pub full_name: String,
    pub salary: f64,
}

impl Person {
    /// Salary text that does not parse counts as zero
    pub fn from_inputs(full_name: &str, salary_text: &str) -> Self {
        let salary = match salary_text.parse::<f64>() {
            Ok(salary) if salary.is_finite() => salary,
            _ => {
                if !salary_text.is_empty() {
                    tracing::warn!(salary = salary_text, "salary is not a number, using 0");
                }
                0.0
            }
        };

        Self {
            full_name: full_name.to_string(),
            salary,
        }
    }
}

// ============================================================================
// BILLING DATA (one person, one period)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BillingData {
    pub person: Person,
    pub month_number: i32,
    pub month_name: String,
    pub year: i32,
    pub bills: Vec<Bill>,

    /// Stored, not derived. Call `recompute_total` after touching `bills`.
    pub total: f64,

    pub paid: bool,
}

impl BillingData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh data stamped with the current month and year
    pub fn for_current_month() -> Self {
        let today = Local::now();

        Self {
            month_number: today.month() as i32,
            month_name: today.format("%B").to_string(),
            year: today.year(),
            ..Default::default()
        }
    }

    pub fn add_bill(&mut self, bill: Bill) {
        self.bills.push(bill);
        self.recompute_total();
    }

    pub fn recompute_total(&mut self) {
        self.total = calculate_total(&self.bills);
    }

    pub fn available(&self) -> f64 {
        crate::totals::available_balance(&self.person, &self.bills)
    }
}
