use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;

use futures::FutureExt;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{debug, warn};

use super::{RepoError, Repository};

/// Future returned by a transaction callback, borrowing the scoped repository.
pub type TxFuture<'t, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 't>>;

impl Repository<DatabaseConnection> {
    /// Runs `f` against a repository bound to a fresh transaction.
    ///
    /// The transaction commits when `f` returns `Ok` and rolls back when it
    /// returns `Err`. If `f` panics the transaction is rolled back before the
    /// panic is resumed.
    pub async fn transaction<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: for<'t> FnOnce(&'t Repository<DatabaseTransaction>) -> TxFuture<'t, T, E> + Send,
        T: Send,
        E: From<RepoError> + Send,
    {
        let txn = self.conn.begin().await.map_err(RepoError::from)?;
        let scoped = Repository::new(txn);

        let outcome = AssertUnwindSafe(f(&scoped)).catch_unwind().await;
        let txn = scoped.conn;

        match outcome {
            Ok(Ok(value)) => {
                txn.commit().await.map_err(RepoError::from)?;
                Ok(value)
            }
            Ok(Err(err)) => {
                if let Err(e) = txn.rollback().await {
                    warn!(error = %e, "Rollback after failed transaction did not complete");
                }
                debug!("Transaction rolled back");
                Err(err)
            }
            Err(panic) => {
                if let Err(e) = txn.rollback().await {
                    warn!(error = %e, "Rollback after panic did not complete");
                }
                std::panic::resume_unwind(panic)
            }
        }
    }
}

impl Repository<DatabaseTransaction> {
    /// Already inside a transaction: `f` runs on the same session and the
    /// outermost caller keeps ownership of commit and rollback.
    pub async fn transaction<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: for<'t> FnOnce(&'t Self) -> TxFuture<'t, T, E> + Send,
        T: Send,
        E: From<RepoError> + Send,
    {
        f(self).await
    }
}
