//! Postgres-backed store (sqlx, runtime-checked queries).
//!
//! ## Error mapping
//!
//! | SQLx error | Code | StoreError |
//! |------------|------|------------|
//! | unique violation | `23505` | `Conflict` |
//! | foreign key violation | `23503` | `Domain(Validation)` |
//! | anything else | | `Database` |
//!
//! Cascading deletes run as explicit statement sequences inside one
//! transaction, so the removed-row counts can be reported back.

use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::instrument;

use osdesk_core::{DomainError, Money};

use crate::{StoreError, StoreResult};

mod clients;
mod company;
mod orders;
mod products;
mod users;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    #[instrument(skip(url), err)]
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the bundled schema migrations.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&*self.pool).await?;
        Ok(())
    }
}

pub(crate) fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => {
                return StoreError::Conflict(format!("{operation}: {}", db_err.message()));
            }
            Some("23503") => {
                return DomainError::validation("referenced record does not exist").into();
            }
            _ => {}
        }
    }
    StoreError::Database { operation, source: err }
}

pub(crate) fn money_from_cents(cents: i64, column: &str) -> StoreResult<Money> {
    u64::try_from(cents)
        .map(Money::from_cents)
        .map_err(|_| StoreError::Corrupt(format!("negative amount in {column}")))
}

pub(crate) fn cents_of(amount: Money) -> StoreResult<i64> {
    i64::try_from(amount.cents())
        .map_err(|_| DomainError::validation("amount is too large").into())
}

/// `%term%` with LIKE metacharacters escaped.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn negative_cents_are_corrupt() {
        assert!(matches!(money_from_cents(-1, "discount_cents"), Err(StoreError::Corrupt(_))));
        assert_eq!(money_from_cents(250, "x").unwrap(), Money::from_cents(250));
    }
}
