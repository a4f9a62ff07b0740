//! Data access for users, serieses, movies and episodes.
//!
//! A single [`Repository`] exposes every table operation. It is generic over
//! the sea-orm connection so the same methods run either directly on the pool
//! or inside a transaction opened with [`Repository::transaction`].

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, SqlErr};

pub mod episode;
mod film;
pub mod movie;
pub mod series;
mod transaction;
pub mod user;

pub use transaction::TxFuture;

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// The lookup, update or delete matched zero rows.
    #[error("no matching record")]
    NoRecord,

    /// A stored row violates the shape its table promises.
    #[error("malformed row: {0}")]
    MalformedRow(String),

    #[error(transparent)]
    Database(#[from] DbErr),
}

impl RepoError {
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Database(err) => matches!(
                err.sql_err(),
                Some(SqlErr::UniqueConstraintViolation(_))
            ),
            _ => false,
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Page window for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u64,
    pub limit: u64,
}

impl Page {
    #[must_use]
    pub const fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }
}

#[derive(Debug, Clone)]
pub struct Repository<C = DatabaseConnection> {
    conn: C,
}

impl<C: ConnectionTrait> Repository<C> {
    #[must_use]
    pub const fn new(conn: C) -> Self {
        Self { conn }
    }

    #[must_use]
    pub const fn connection(&self) -> &C {
        &self.conn
    }
}

/// Maps an affected-row count to `NoRecord` when nothing matched.
const fn expect_rows(rows_affected: u64) -> RepoResult<u64> {
    if rows_affected == 0 {
        Err(RepoError::NoRecord)
    } else {
        Ok(rows_affected)
    }
}
