//! Durable document number sequences.

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, FromQueryResult, Statement,
};

use bahi_core::sequence::DocumentNumber;

const NEXT_VALUE_SQL: &str = r"
INSERT INTO document_sequences (prefix, year, last_value, updated_at)
VALUES ($1, $2, 1, now())
ON CONFLICT (prefix, year)
DO UPDATE SET last_value = document_sequences.last_value + 1, updated_at = now()
RETURNING last_value
";

#[derive(Debug, FromQueryResult)]
struct NextValue {
    last_value: i64,
}

/// Repository issuing document numbers.
#[derive(Debug, Clone)]
pub struct SequenceRepository {
    db: DatabaseConnection,
}

impl SequenceRepository {
    /// Creates a new sequence repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Issues the next number for `prefix` in `year`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database statement fails.
    pub async fn next_number(&self, prefix: &str, year: i32) -> Result<DocumentNumber, DbErr> {
        Self::next_number_in(&self.db, prefix, year).await
    }

    /// Issues the next number on an existing connection or transaction.
    ///
    /// The row lock taken by the upsert is held until the caller's transaction
    /// ends, so numbers are gap-free per committed transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database statement fails.
    pub async fn next_number_in<C>(
        conn: &C,
        prefix: &str,
        year: i32,
    ) -> Result<DocumentNumber, DbErr>
    where
        C: ConnectionTrait,
    {
        let number = DocumentNumber::new(prefix, year, 0);
        let row = NextValue::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            NEXT_VALUE_SQL,
            [number.prefix.clone().into(), year.into()],
        ))
        .one(conn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("sequence {}/{year}", number.prefix)))?;

        Ok(DocumentNumber {
            sequence: row.last_value,
            ..number
        })
    }
}
