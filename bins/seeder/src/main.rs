//! Seeds the default chart of accounts.
//!
//! Creates one account per type used in reporting, plus the cash, bank,
//! receivable and payable accounts that payment entries post to. The codes
//! for those four come from `accounts.*` in the configuration. Accounts whose
//! code already exists are left alone, so the seeder can be re-run.
//!
//! Usage: cargo run --bin seeder

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bahi_core::ledger::{AccountType, NewAccount};
use bahi_db::{AccountRepository, connect_with};
use bahi_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bahi=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    let codes = &config.accounts;
    let defaults = [
        (codes.cash_code.as_str(), "Cash", AccountType::Asset),
        (codes.bank_code.as_str(), "Bank", AccountType::Asset),
        (codes.receivable_code.as_str(), "Accounts Receivable", AccountType::Asset),
        (codes.payable_code.as_str(), "Accounts Payable", AccountType::Liability),
        ("2210", "CGST Payable", AccountType::Liability),
        ("2220", "SGST Payable", AccountType::Liability),
        ("2230", "IGST Payable", AccountType::Liability),
        ("3000", "Capital", AccountType::Equity),
        ("4000", "Sales", AccountType::Revenue),
        ("5000", "Purchases", AccountType::Expense),
        ("5100", "General Expenses", AccountType::Expense),
    ];

    let repo = AccountRepository::new(db);
    let chart = repo.load_chart().await?;

    let mut created = 0;
    for (code, name, account_type) in defaults {
        if chart.find_by_code(code).is_ok() {
            info!(code, "account already exists, skipping");
            continue;
        }
        repo.create_account(NewAccount {
            code: code.to_string(),
            name: name.to_string(),
            account_type,
            parent_id: None,
        })
        .await?;
        created += 1;
    }

    info!(created, "seeding complete");
    Ok(())
}
