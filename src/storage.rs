// 💾 Storage - billing_data.json round-trip and billing_data.csv export
// CSV is write-only: there is no import path back into BillingData

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::model::BillingData;

pub const JSON_FILE_NAME: &str = "billing_data.json";
pub const CSV_FILE_NAME: &str = "billing_data.csv";

pub const CSV_HEADER: [&str; 6] = [
    "Label",
    "Price",
    "Date",
    "PaidInCreditCard",
    "TotalInstallments",
    "CurrentInstallment",
];

/// Where the JSON snapshot and the CSV export live
#[derive(Debug, Clone)]
pub struct Storage {
    json_path: PathBuf,
    csv_path: PathBuf,
}

impl Storage {
    /// Both files side by side inside `data_dir`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self {
            json_path: data_dir.join(JSON_FILE_NAME),
            csv_path: data_dir.join(CSV_FILE_NAME),
        }
    }

    pub fn json_path(&self) -> &Path {
        &self.json_path
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    pub fn save_json(&self, data: &BillingData) -> Result<(), StorageError> {
        save_json(data, &self.json_path)
    }

    pub fn load_json(&self) -> Result<BillingData, StorageError> {
        load_json(&self.json_path)
    }

    pub fn save_csv(&self, data: &BillingData) -> Result<(), StorageError> {
        save_csv(data, &self.csv_path)
    }
}

// ============================================================================
// JSON
// ============================================================================

pub fn save_json(data: &BillingData, path: &Path) -> Result<(), StorageError> {
    // serde_json writes NaN/inf as null, which would not load back
    if let Some(field) = first_non_finite(data) {
        return Err(StorageError::NotFinite {
            path: path.to_path_buf(),
            field,
        });
    }

    let file = File::create(path).map_err(|source| StorageError::Create {
        path: path.to_path_buf(),
        source,
    })?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let write_err = |source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };
    writer.write_all(b"\n").map_err(write_err)?;
    writer.flush().map_err(write_err)?;

    tracing::info!(path = %path.display(), bills = data.bills.len(), "saved billing data as JSON");
    Ok(())
}

fn first_non_finite(data: &BillingData) -> Option<String> {
    if !data.total.is_finite() {
        return Some("Total".to_string());
    }
    if !data.person.salary.is_finite() {
        return Some("Person.Salary".to_string());
    }
    data.bills
        .iter()
        .position(|bill| !bill.price.is_finite())
        .map(|i| format!("Bills[{}].Price", i))
}

/// Read `path` fully and parse it. Never touches any in-memory state.
pub fn load_json(path: &Path) -> Result<BillingData, StorageError> {
    let bytes = fs::read(path).map_err(|source| StorageError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let data: BillingData = serde_json::from_slice(&bytes).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), bills = data.bills.len(), "loaded billing data from JSON");
    Ok(data)
}

// ============================================================================
// CSV
// ============================================================================

pub fn save_csv(data: &BillingData, path: &Path) -> Result<(), StorageError> {
    let file = File::create(path).map_err(|source| StorageError::Create {
        path: path.to_path_buf(),
        source,
    })?;

    write_csv(data, file).map_err(|source| StorageError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), rows = data.bills.len(), "exported bills as CSV");
    Ok(())
}

/// Header first, then one row per bill with the price at two decimals
pub fn write_csv<W: Write>(data: &BillingData, out: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(CSV_HEADER)?;

    for bill in &data.bills {
        wtr.write_record([
            bill.label.clone(),
            format!("{:.2}", bill.price),
            bill.date.clone(),
            bill.paid_in_credit_card.to_string(),
            bill.total_installments.to_string(),
            bill.current_installment.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
