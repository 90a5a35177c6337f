//! Shared helpers for registry integration tests.
//!
//! Provides recording stand-ins for the runner-side handle seams so tests can
//! observe which statements a registered procedure would execute.

use rookery::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use rookery::errors::RookeryResult;
use rookery::store::{DbHandle, SqlConnection, SqlTransaction, TxHandle};

/// Statements executed through a recording handle, shared with the test body.
pub type StatementLog = Atomic<Vec<String>>;

pub fn statement_log() -> StatementLog {
    atomic(Vec::new())
}

/// Snapshot of everything executed through handles sharing `log`.
pub fn logged_statements(log: &StatementLog) -> Vec<String> {
    log.read_with(|statements| statements.clone())
}

/// [`SqlTransaction`] stub that records every statement instead of running it.
pub struct RecordingTransaction {
    log: StatementLog,
}

impl RecordingTransaction {
    pub fn new(log: &StatementLog) -> Self {
        RecordingTransaction { log: log.clone() }
    }
}

impl SqlTransaction for RecordingTransaction {
    fn execute(&mut self, statement: &str) -> RookeryResult<u64> {
        self.log
            .write_with(|statements| statements.push(statement.to_string()));
        Ok(1)
    }
}

/// [`SqlConnection`] stub that records every statement instead of running it.
pub struct RecordingConnection {
    log: StatementLog,
}

impl RecordingConnection {
    pub fn new(log: &StatementLog) -> Self {
        RecordingConnection { log: log.clone() }
    }
}

impl SqlConnection for RecordingConnection {
    fn execute(&mut self, statement: &str) -> RookeryResult<u64> {
        self.log
            .write_with(|statements| statements.push(statement.to_string()));
        Ok(1)
    }
}

/// Builds a [`TxHandle`] whose executions land in `log`.
pub fn recording_tx_handle(log: &StatementLog) -> TxHandle {
    TxHandle::new(RecordingTransaction::new(log))
}

/// Builds a [`DbHandle`] whose executions land in `log`.
pub fn recording_db_handle(log: &StatementLog) -> DbHandle {
    DbHandle::new(RecordingConnection::new(log))
}
