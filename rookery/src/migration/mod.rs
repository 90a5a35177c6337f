//! Migration definitions: version extraction, procedures, and descriptors.
//!
//! A migration is defined by:
//! 1. A source identifier (conventionally a file path) whose basename's
//!    leading digit run yields the migration's version
//! 2. An up/down pair of procedures, either of which may be absent
//! 3. A [`TransactionMode`] shared by both directions
//!
//! The components here only build values; uniqueness enforcement lives in
//! [`crate::registry`].
//!
//! # Two API Generations
//!
//! Procedures come in a context-aware shape (current) and a context-free
//! shape (kept for callers of the deprecated entry points). The adapters
//! [`with_context`] and [`without_context`] convert between the two so that
//! the registry and the runner only ever see the context-aware shape.

mod descriptor;
mod procedure;
mod version;

pub use descriptor::{MigrationDescriptor, TransactionMode};
pub use procedure::{
    db_migration, db_migration_no_context, tx_migration, tx_migration_no_context, with_context,
    without_context, ContextMigrationFn, DbMigration, DbMigrationNoContext, PlainMigrationFn,
    Procedure, TxMigration, TxMigrationNoContext,
};
pub use version::numeric_component;
