// 🎛️ Controller - owns the billing state and routes named actions to handlers
// Handlers never touch widgets; they return UiUpdate instructions instead

use std::collections::HashMap;

use crate::error::BillingError;
use crate::model::{Bill, BillingData, Person};
use crate::storage::Storage;

// ============================================================================
// INPUTS & OUTPUTS
// ============================================================================

/// Raw text currently typed into the form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormInput {
    pub label: String,
    pub price: String,
    pub date: String,
    pub full_name: String,
    pub salary: String,
}

/// What the front-end should change after an action
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    ClearBillInputs,
    SetTotal(f64),
    SetPerson { full_name: String, salary: String },
    ShowExpenses,
    HideExpenses,
    Status(String),
    /// Same as `Status`, but the action did not go through
    Error(String),
}

pub type Handler = fn(&mut BillingData, &FormInput, &Storage) -> Result<Vec<UiUpdate>, BillingError>;

pub const ADD_BILL: &str = "add_bill";
pub const SAVE_JSON: &str = "save_json";
pub const SAVE_CSV: &str = "save_csv";
pub const LOAD_JSON: &str = "load_json";
pub const SHOW_EXPENSES: &str = "show_expenses";
pub const HIDE_EXPENSES: &str = "hide_expenses";

// ============================================================================
// CONTROLLER
// ============================================================================

pub struct Controller {
    data: BillingData,
    storage: Storage,
    handlers: HashMap<&'static str, Handler>,
}

impl Controller {
    pub fn new(data: BillingData, storage: Storage) -> Self {
        let mut handlers: HashMap<&'static str, Handler> = HashMap::new();
        handlers.insert(ADD_BILL, add_bill);
        handlers.insert(SAVE_JSON, save_json);
        handlers.insert(SAVE_CSV, save_csv);
        handlers.insert(LOAD_JSON, load_json);
        handlers.insert(SHOW_EXPENSES, show_expenses);
        handlers.insert(HIDE_EXPENSES, hide_expenses);

        Self {
            data,
            storage,
            handlers,
        }
    }

    pub fn data(&self) -> &BillingData {
        &self.data
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn actions(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Run the handler registered under `action`.
    /// Storage errors from saves come back as `Err` and are meant to be fatal.
    pub fn dispatch(&mut self, action: &str, input: &FormInput) -> Result<Vec<UiUpdate>, BillingError> {
        let handler = self
            .handlers
            .get(action)
            .ok_or_else(|| BillingError::UnknownAction(action.to_string()))?;

        tracing::debug!(action, "dispatching");
        handler(&mut self.data, input, &self.storage)
    }

    /// Pick up the previous session if a JSON file is already there
    pub fn load_startup(&mut self) -> Vec<UiUpdate> {
        if !self.storage.json_path().exists() {
            tracing::debug!(path = %self.storage.json_path().display(), "no saved data, starting fresh");
            return Vec::new();
        }

        match self.storage.load_json() {
            Ok(data) => {
                self.data = data;
                self.data.recompute_total();
                loaded_updates(&self.data)
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not load saved data, starting fresh");
                vec![UiUpdate::Error(format!("Could not load saved data: {}", err))]
            }
        }
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

fn add_bill(data: &mut BillingData, input: &FormInput, _: &Storage) -> Result<Vec<UiUpdate>, BillingError> {
    let bill = match Bill::parse(&input.label, &input.price, &input.date) {
        Ok(bill) => bill,
        Err(err) => {
            tracing::warn!(error = %err, "bill not added");
            return Ok(vec![UiUpdate::Error("Invalid price format".to_string())]);
        }
    };

    let status = format!("Added {}", bill.label);
    data.add_bill(bill);

    Ok(vec![
        UiUpdate::ClearBillInputs,
        UiUpdate::SetTotal(data.total),
        UiUpdate::Status(status),
    ])
}

fn save_json(data: &mut BillingData, input: &FormInput, storage: &Storage) -> Result<Vec<UiUpdate>, BillingError> {
    data.person = Person::from_inputs(&input.full_name, &input.salary);
    data.recompute_total();

    storage.save_json(data)?;

    Ok(vec![UiUpdate::Status(format!(
        "Saved {}",
        storage.json_path().display()
    ))])
}

fn save_csv(data: &mut BillingData, input: &FormInput, storage: &Storage) -> Result<Vec<UiUpdate>, BillingError> {
    data.person = Person::from_inputs(&input.full_name, &input.salary);
    data.recompute_total();

    storage.save_csv(data)?;

    Ok(vec![UiUpdate::Status(format!(
        "Exported {}",
        storage.csv_path().display()
    ))])
}

fn load_json(data: &mut BillingData, _: &FormInput, storage: &Storage) -> Result<Vec<UiUpdate>, BillingError> {
    match storage.load_json() {
        Ok(loaded) => {
            *data = loaded;
            // The stored Total may be stale or missing in the file
            data.recompute_total();
            Ok(loaded_updates(data))
        }
        Err(err) => {
            tracing::warn!(error = %err, "load failed, keeping current data");
            Ok(vec![UiUpdate::Error(format!("Load failed: {}", err))])
        }
    }
}

fn show_expenses(_: &mut BillingData, _: &FormInput, _: &Storage) -> Result<Vec<UiUpdate>, BillingError> {
    Ok(vec![UiUpdate::ShowExpenses])
}

fn hide_expenses(_: &mut BillingData, _: &FormInput, _: &Storage) -> Result<Vec<UiUpdate>, BillingError> {
    Ok(vec![UiUpdate::HideExpenses])
}

fn loaded_updates(data: &BillingData) -> Vec<UiUpdate> {
    vec![
        UiUpdate::SetPerson {
            full_name: data.person.full_name.clone(),
            salary: format!("{}", data.person.salary),
        },
        UiUpdate::SetTotal(data.total),
        UiUpdate::Status(format!("Loaded {} bills", data.bills.len())),
    ]
}
