// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::Parser;

use billing_manager::{calculate_total, format_money, logging, truncate_text, Command, Config};

fn main() -> Result<()> {
    let config = Config::parse();

    match config.command() {
        Command::Ui => run_ui_mode(&config)?,
        Command::Summary => {
            logging::init_cli_logger(config.verbose);
            run_summary(&config)?;
        }
        Command::ExportCsv => {
            logging::init_cli_logger(config.verbose);
            run_export_csv(&config)?;
        }
    }

    Ok(())
}

fn run_summary(config: &Config) -> Result<()> {
    let storage = config.storage();
    let data = storage
        .load_json()
        .with_context(|| format!("Failed to load {}", storage.json_path().display()))?;

    println!("🧾 {}'s expenses | {} {}", data.person.full_name, data.month_name, data.year);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{:<18} {:>14} {:<12} {}", "Label", "Price", "Date", "Paid In Credit Card");

    for bill in &data.bills {
        println!(
            "{:<18} {:>14} {:<12} {}",
            truncate_text(&bill.label, 15),
            format_money(&config.currency, bill.price),
            bill.date,
            bill.paid_in_credit_card
        );
    }

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{} {:.2} of total expenses", config.currency, calculate_total(&data.bills));
    println!("{} {:.2} available", config.currency, data.available());

    Ok(())
}

fn run_export_csv(config: &Config) -> Result<()> {
    let storage = config.storage();
    let data = storage
        .load_json()
        .with_context(|| format!("Failed to load {}", storage.json_path().display()))?;

    storage.save_csv(&data).context("Cannot write CSV file")?;

    println!("✓ Exported {} bills to {}", data.bills.len(), storage.csv_path().display());
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    use billing_manager::{BillingData, Controller};

    let log_path = config.log_path();
    logging::init_file_logger(&log_path, config.verbose)
        .with_context(|| format!("Cannot open log file {}", log_path.display()))?;

    tracing::info!(version = billing_manager::VERSION, data_dir = %config.data_dir.display(), "starting billing manager");

    let mut controller = Controller::new(BillingData::for_current_month(), config.storage());
    let startup = controller.load_startup();

    let mut app = ui::App::new(controller, config.currency.clone());
    app.apply(startup);

    // Save failures end the session here with a non-zero exit
    ui::run_ui(&mut app).context("Billing manager stopped")?;

    tracing::info!("billing manager closed");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: billing-manager summary");
    std::process::exit(1);
}
