// Billing Manager - Core Library
// Exposes the billing model, totals, storage and controller for the binary and tests

pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod storage;
pub mod totals;

// Re-export commonly used types
pub use config::{Command, Config};
pub use controller::{Controller, FormInput, Handler, UiUpdate};
pub use error::{BillingError, StorageError};
pub use model::{Bill, BillingData, Person};
pub use storage::{load_json, save_csv, save_json, write_csv, Storage, CSV_HEADER};
pub use totals::{available_balance, calculate_total, format_money, truncate_text};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
