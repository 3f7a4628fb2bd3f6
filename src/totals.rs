// ➕ Totals - summing bills and what is left of the salary

use crate::model::{Bill, Person};

/// Sum of every bill price (0.0 for no bills)
pub fn calculate_total(bills: &[Bill]) -> f64 {
    bills.iter().map(|bill| bill.price).sum()
}

/// Salary minus everything spent
pub fn available_balance(person: &Person, bills: &[Bill]) -> f64 {
    person.salary - calculate_total(bills)
}

/// "R$12.50" style amount for table cells and the total line
pub fn format_money(currency: &str, amount: f64) -> String {
    format!("{}{:.2}", currency, amount)
}

/// Cut `text` to `max_chars` characters and append "..." when it was longer
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}
