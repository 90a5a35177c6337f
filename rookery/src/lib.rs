//! # Rookery - Migration Registry
//!
//! Rookery is the registration core of a database schema-migration tool. It
//! accepts caller-supplied migration definitions (pairs of up/down
//! procedures), derives a stable integer version for each from its source
//! identifier, rejects duplicate versions within a scope, and records every
//! definition in a process-wide table together with the transactional mode it
//! must run under.
//!
//! Rookery deliberately does **not** execute migrations. A separate runner
//! component reads the registry, sorts descriptors by version, and applies
//! them through the [`store`] handle seams; Rookery only curates *what* is
//! runnable and *how* (inside or outside a transaction).
//!
//! ## Quick Start
//!
//! ```rust
//! use rookery::{add_named_migration_context, tx_migration, with_scope};
//!
//! # fn main() -> rookery::errors::RookeryResult<()> {
//! let up = tx_migration(|_ctx, tx| {
//!     tx.execute("CREATE TABLE users (id BIGINT PRIMARY KEY)")?;
//!     Ok(())
//! });
//! let down = tx_migration(|_ctx, tx| {
//!     tx.execute("DROP TABLE users")?;
//!     Ok(())
//! });
//!
//! add_named_migration_context(
//!     "0001_create_users.sql",
//!     Some(up),
//!     Some(down),
//!     vec![with_scope("billing")],
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Design Pattern
//!
//! Public handle types ([`registry::MigrationRegistry`],
//! [`context::MigrationContext`], [`store::TxHandle`]) follow the PIMPL
//! pattern: a cheap-to-clone wrapper over shared inner state, so the public
//! surface stays stable while internals evolve.
//!
//! ## Module Organization
//!
//! - [`common`] - Shared synchronization helpers
//! - [`context`] - Cancellation/deadline token passed to procedures
//! - [`errors`] - Error types and result definitions
//! - [`migration`] - Version extraction, procedures, descriptors
//! - [`registry`] - The registry itself and the registration entry points
//! - [`store`] - Handle seams implemented by the migration runner

use std::sync::LazyLock;

pub mod common;
pub mod context;
pub mod errors;
pub mod migration;
pub mod registry;
pub mod store;

pub use context::MigrationContext;
pub use migration::{
    db_migration, db_migration_no_context, numeric_component, tx_migration,
    tx_migration_no_context, DbMigration, DbMigrationNoContext, MigrationDescriptor, Procedure,
    TransactionMode, TxMigration, TxMigrationNoContext,
};
pub use registry::{
    add_migration_context, add_migration_no_tx_context, add_named_migration_context,
    add_named_migration_no_tx_context, global_registry, with_scope, MigrationRegistry,
    RegistrationConfig, RegistrationOption,
};
#[allow(deprecated)]
pub use registry::{
    add_migration, add_migration_no_tx, add_named_migration, add_named_migration_no_tx,
};

/// The process-wide registry behind the `add_*` registration functions.
///
/// Created empty at first use and never torn down. Population is expected to
/// happen during program initialization, before any runner reads it.
pub(crate) static GLOBAL_REGISTRY: LazyLock<registry::MigrationRegistry> =
    LazyLock::new(registry::MigrationRegistry::new);
