//! Handle seams between migration procedures and the database.
//!
//! The registry has no database dialect of its own. The migration runner
//! implements [`SqlTransaction`] and [`SqlConnection`] for whatever driver it
//! uses and wraps them in [`TxHandle`] / [`DbHandle`] before invoking the
//! registered procedures. Which of the two shapes a procedure receives is
//! decided by the migration's [`crate::migration::TransactionMode`]:
//!
//! - `TransactionEnabled` procedures receive a [`TxHandle`]; the runner opens
//!   the transaction before the call and commits or rolls back after it.
//! - `TransactionDisabled` procedures receive a [`DbHandle`] and must manage
//!   their own atomicity, e.g. for statements that cannot run inside a
//!   transaction.

use std::fmt::{Debug, Formatter};

use crate::errors::RookeryResult;

/// A runner-managed database transaction.
///
/// The implementation owns begin/commit/rollback; procedures only issue
/// statements through it.
pub trait SqlTransaction: Send {
    /// Executes a single SQL statement, returning the affected row count.
    fn execute(&mut self, statement: &str) -> RookeryResult<u64>;
}

/// A direct database handle without transaction management.
pub trait SqlConnection: Send {
    /// Executes a single SQL statement, returning the affected row count.
    fn execute(&mut self, statement: &str) -> RookeryResult<u64>;
}

/// Handle passed to procedures that run inside a runner-managed transaction.
pub struct TxHandle {
    inner: Box<dyn SqlTransaction>,
}

impl TxHandle {
    pub fn new(inner: impl SqlTransaction + 'static) -> Self {
        TxHandle {
            inner: Box::new(inner),
        }
    }

    /// Executes a single SQL statement inside the enclosing transaction.
    pub fn execute(&mut self, statement: &str) -> RookeryResult<u64> {
        self.inner.execute(statement)
    }
}

impl Debug for TxHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxHandle").field("inner", &"<transaction>").finish()
    }
}

/// Handle passed to procedures that run outside any transaction.
pub struct DbHandle {
    inner: Box<dyn SqlConnection>,
}

impl DbHandle {
    pub fn new(inner: impl SqlConnection + 'static) -> Self {
        DbHandle {
            inner: Box::new(inner),
        }
    }

    /// Executes a single SQL statement directly against the database.
    pub fn execute(&mut self, statement: &str) -> RookeryResult<u64> {
        self.inner.execute(statement)
    }
}

impl Debug for DbHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbHandle").field("inner", &"<connection>").finish()
    }
}
