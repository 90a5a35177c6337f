use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use super::descriptor::TransactionMode;
use crate::context::MigrationContext;
use crate::errors::{ErrorKind, RookeryError, RookeryResult};
use crate::store::{DbHandle, TxHandle};

/// A migration procedure in the current, context-aware shape.
pub type ContextMigrationFn<T> =
    Arc<dyn Fn(&MigrationContext, &mut T) -> RookeryResult<()> + Send + Sync>;

/// A migration procedure in the pre-context shape, kept for the deprecated
/// entry points.
pub type PlainMigrationFn<T> = Arc<dyn Fn(&mut T) -> RookeryResult<()> + Send + Sync>;

/// A procedure that runs inside a runner-managed transaction.
pub type TxMigration = ContextMigrationFn<TxHandle>;

/// A procedure that runs outside a transaction, against a raw database handle.
pub type DbMigration = ContextMigrationFn<DbHandle>;

/// Deprecated shape of [`TxMigration`] without a context parameter.
pub type TxMigrationNoContext = PlainMigrationFn<TxHandle>;

/// Deprecated shape of [`DbMigration`] without a context parameter.
pub type DbMigrationNoContext = PlainMigrationFn<DbHandle>;

/// Wraps a closure as a [`TxMigration`].
pub fn tx_migration(
    f: impl Fn(&MigrationContext, &mut TxHandle) -> RookeryResult<()> + Send + Sync + 'static,
) -> TxMigration {
    Arc::new(f)
}

/// Wraps a closure as a [`DbMigration`].
pub fn db_migration(
    f: impl Fn(&MigrationContext, &mut DbHandle) -> RookeryResult<()> + Send + Sync + 'static,
) -> DbMigration {
    Arc::new(f)
}

/// Wraps a closure as a [`TxMigrationNoContext`].
pub fn tx_migration_no_context(
    f: impl Fn(&mut TxHandle) -> RookeryResult<()> + Send + Sync + 'static,
) -> TxMigrationNoContext {
    Arc::new(f)
}

/// Wraps a closure as a [`DbMigrationNoContext`].
pub fn db_migration_no_context(
    f: impl Fn(&mut DbHandle) -> RookeryResult<()> + Send + Sync + 'static,
) -> DbMigrationNoContext {
    Arc::new(f)
}

/// Lifts a context-free procedure into the context-aware shape.
///
/// The supplied context is ignored by the wrapped procedure. `None` maps to
/// `None`, so absent directions survive the transform.
pub fn with_context<T: 'static>(f: Option<PlainMigrationFn<T>>) -> Option<ContextMigrationFn<T>> {
    f.map(|f| {
        let lifted: ContextMigrationFn<T> = Arc::new(move |_ctx, t| f(t));
        lifted
    })
}

/// Lowers a context-aware procedure into the context-free shape.
///
/// The wrapped procedure always receives [`MigrationContext::background`].
/// `None` maps to `None`.
pub fn without_context<T: 'static>(
    f: Option<ContextMigrationFn<T>>,
) -> Option<PlainMigrationFn<T>> {
    f.map(|f| {
        let lowered: PlainMigrationFn<T> = Arc::new(move |t| f(&MigrationContext::background(), t));
        lowered
    })
}

/// One direction of a migration, in one of the two capability shapes.
///
/// The shape always matches the migration's [`TransactionMode`]; the typed
/// registration entry points guarantee this, and the registry rejects direct
/// registrations that violate it.
#[derive(Clone)]
pub enum Procedure {
    /// Runs inside a transaction the runner opens and commits around the call.
    Tx(TxMigration),
    /// Runs against a raw database handle and manages its own atomicity.
    Db(DbMigration),
}

impl Procedure {
    /// Builds a transactional procedure from a closure.
    pub fn tx(
        f: impl Fn(&MigrationContext, &mut TxHandle) -> RookeryResult<()> + Send + Sync + 'static,
    ) -> Self {
        Procedure::Tx(Arc::new(f))
    }

    /// Builds a no-transaction procedure from a closure.
    pub fn db(
        f: impl Fn(&MigrationContext, &mut DbHandle) -> RookeryResult<()> + Send + Sync + 'static,
    ) -> Self {
        Procedure::Db(Arc::new(f))
    }

    /// The transaction mode this procedure's shape requires.
    pub fn required_mode(&self) -> TransactionMode {
        match self {
            Procedure::Tx(_) => TransactionMode::TransactionEnabled,
            Procedure::Db(_) => TransactionMode::TransactionDisabled,
        }
    }

    /// Returns the transactional shape of this procedure.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ProcedureMismatch`] if the procedure runs outside
    /// a transaction.
    pub fn as_tx(&self) -> RookeryResult<&TxMigration> {
        match self {
            Procedure::Tx(f) => Ok(f),
            Procedure::Db(_) => Err(RookeryError::new(
                "expected a transactional procedure",
                ErrorKind::ProcedureMismatch,
            )),
        }
    }

    /// Returns the no-transaction shape of this procedure.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ProcedureMismatch`] if the procedure runs inside
    /// a transaction.
    pub fn as_db(&self) -> RookeryResult<&DbMigration> {
        match self {
            Procedure::Db(f) => Ok(f),
            Procedure::Tx(_) => Err(RookeryError::new(
                "expected a no-transaction procedure",
                ErrorKind::ProcedureMismatch,
            )),
        }
    }
}

impl Debug for Procedure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Procedure::Tx(_) => write!(f, "Tx(<procedure>)"),
            Procedure::Db(_) => write!(f, "Db(<procedure>)"),
        }
    }
}
