//! Transaction-scoped advisory locks.
//!
//! Payments for one party must not interleave, otherwise two allocations can
//! read the same remaining amount. Every unit of work that reads and then
//! updates a party's outstanding items takes the party lock first. The lock is
//! released automatically when the surrounding transaction ends.
//!
//! # Usage
//!
//! ```ignore
//! use bahi_db::lock::lock_party;
//!
//! let txn = db.begin().await?;
//! lock_party(&txn, Direction::Receivable, "9829012345").await?;
//! // read and update the party's items
//! txn.commit().await?;
//! ```

use sea_orm::{ConnectionTrait, DbBackend, DbErr, Statement};

use bahi_core::outstanding::Direction;

/// Takes `pg_advisory_xact_lock` on an arbitrary key.
///
/// # Errors
///
/// Returns an error if the lock statement fails.
pub async fn lock_key<C>(conn: &C, key: &str) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    conn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT pg_advisory_xact_lock(hashtext($1))",
        [key.into()],
    ))
    .await?;
    Ok(())
}

/// Serializes allocation for one party on one side of the books.
///
/// # Errors
///
/// Returns an error if the lock statement fails.
pub async fn lock_party<C>(conn: &C, direction: Direction, party_key: &str) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    lock_key(conn, &direction.lock_key(party_key)).await
}

/// Serializes chart of accounts edits.
///
/// # Errors
///
/// Returns an error if the lock statement fails.
pub async fn lock_chart<C>(conn: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    lock_key(conn, "chart_of_accounts").await
}
