// ⚠️ Error types for the billing core
// Save failures are fatal at the binary edge, load failures are recoverable

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot write {path}: {field} is not a finite number")]
    NotFinite { path: PathBuf, field: String },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Invalid price format: {0:?}")]
    InvalidPrice(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
