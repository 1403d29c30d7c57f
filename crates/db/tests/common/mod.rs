//! Shared setup for database integration tests.
//!
//! Tests connect to `DATABASE_URL` (falling back to `BAHI__DATABASE__URL`) and
//! skip themselves when no database is reachable. Every test creates its own
//! accounts and parties with random codes and phone numbers, so tests can run
//! side by side against one database.

#![allow(dead_code)]

use std::env;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tokio::sync::OnceCell;
use uuid::Uuid;

use bahi_core::documents::{CreditDocument, DocumentKind};
use bahi_core::ledger::{Account, AccountType, NewAccount};
use bahi_db::AccountRepository;
use bahi_db::migration::Migrator;

static MIGRATED: OnceCell<bool> = OnceCell::const_new();

pub fn database_url() -> Option<String> {
    env::var("DATABASE_URL")
        .or_else(|_| env::var("BAHI__DATABASE__URL"))
        .ok()
}

/// Connects and applies migrations once per test binary.
pub async fn connect() -> Option<DatabaseConnection> {
    let Some(url) = database_url() else {
        eprintln!("Skipping test - DATABASE_URL not set");
        return None;
    };
    let db = match Database::connect(&url).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Skipping test - database not available: {e}");
            return None;
        }
    };

    let migrated = *MIGRATED
        .get_or_init(|| async {
            match Migrator::up(&db, None).await {
                Ok(()) => true,
                Err(e) => {
                    eprintln!("Skipping test - migration failed: {e}");
                    false
                }
            }
        })
        .await;

    migrated.then_some(db)
}

/// Random numeric suffix for codes and references.
pub fn unique_suffix() -> String {
    let n = Uuid::new_v4().as_u128() % 1_000_000_000;
    format!("{n:09}")
}

/// Random 10-digit mobile number.
pub fn unique_phone() -> String {
    format!("9{}", unique_suffix())
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn timestamp(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
}

pub async fn create_account(
    db: &DatabaseConnection,
    prefix: &str,
    name: &str,
    account_type: AccountType,
) -> Account {
    AccountRepository::new(db.clone())
        .create_account(NewAccount {
            code: format!("{prefix}-{}", unique_suffix()),
            name: name.to_string(),
            account_type,
            parent_id: None,
        })
        .await
        .unwrap()
}

/// Confirmed credit sale to `phone`, due 30 days after `created_at`.
pub fn sales_order(phone: &str, total: Decimal, created_at: DateTime<Utc>) -> CreditDocument {
    let id = unique_suffix();
    CreditDocument {
        kind: DocumentKind::SalesOrder,
        number: format!("SO-{id}"),
        id,
        total,
        party_name: "Mehta Traders".to_string(),
        party_phone: Some(phone.to_string()),
        party_state: Some("Rajasthan".to_string()),
        created_at,
        confirmed: true,
        credit_days: 30,
    }
}
