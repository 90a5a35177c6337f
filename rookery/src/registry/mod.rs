//! The migration registry and its registration entry points.
//!
//! The registry is the only shared mutable state in the crate: a
//! scope-partitioned table mapping version numbers to descriptors. It is
//! populated during program initialization and treated as read-only by the
//! runner afterwards. Re-registering a `(scope, version)` pair is always a
//! hard error, never an overwrite.

mod config;
#[allow(clippy::module_inception)]
mod registry;

pub use config::{with_scope, RegistrationConfig, RegistrationOption};
pub use registry::{
    add_migration_context, add_migration_no_tx_context, add_named_migration_context,
    add_named_migration_no_tx_context, global_registry, MigrationRegistry,
};
#[allow(deprecated)]
pub use registry::{
    add_migration, add_migration_no_tx, add_named_migration, add_named_migration_no_tx,
};
