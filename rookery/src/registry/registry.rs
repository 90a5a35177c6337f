use std::collections::BTreeMap;
use std::panic::Location;
use std::sync::Arc;

use dashmap::DashMap;

use crate::errors::{ErrorKind, RookeryError, RookeryResult};
use crate::migration::{
    numeric_component, with_context, DbMigration, DbMigrationNoContext, MigrationDescriptor,
    Procedure, TransactionMode, TxMigration, TxMigrationNoContext,
};
use crate::registry::config::{RegistrationConfig, RegistrationOption};

/// Process-wide migration registry, partitioned by scope.
///
/// `MigrationRegistry` follows the PIMPL pattern: clones are cheap and share
/// the same underlying table. The global instance behind the `add_*`
/// functions covers the common case; tests and embedders that want isolation
/// construct their own with [`MigrationRegistry::new`].
///
/// # Concurrency
///
/// Registration is expected to complete during program initialization, before
/// the runner reads the registry. The check-and-insert is nevertheless
/// atomic, so concurrent registrations of the same version cannot both
/// observe "no conflict".
///
/// # Examples
///
/// ```rust
/// use rookery::{MigrationRegistry, Procedure, TransactionMode};
///
/// # fn main() -> rookery::errors::RookeryResult<()> {
/// let registry = MigrationRegistry::new();
/// registry.register(
///     "",
///     "1_create_users.sql",
///     TransactionMode::TransactionEnabled,
///     Some(Procedure::tx(|_ctx, tx| {
///         tx.execute("CREATE TABLE users (id BIGINT PRIMARY KEY)")?;
///         Ok(())
///     })),
///     None,
/// )?;
///
/// let migrations = registry.migrations("");
/// assert_eq!(migrations.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct MigrationRegistry {
    inner: Arc<MigrationRegistryInner>,
}

#[derive(Default)]
struct MigrationRegistryInner {
    /// Map of descriptors indexed by scope -> version -> descriptor
    scopes: DashMap<String, BTreeMap<i64, MigrationDescriptor>>,
}

impl MigrationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        MigrationRegistry::default()
    }

    /// Records a migration under `scope`, deriving its version from `source`.
    ///
    /// Either direction may be `None` for a one-directional migration. Both
    /// procedures must match `mode`: a transactional procedure cannot be
    /// registered as no-tx, and vice versa.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::UnversionedSource`] if `source` yields no version
    /// - [`ErrorKind::ProcedureMismatch`] if a procedure's shape contradicts
    ///   `mode`
    /// - [`ErrorKind::VersionConflict`] if the scope already holds a
    ///   migration at the derived version; the registry is never silently
    ///   overwritten
    pub fn register(
        &self,
        scope: &str,
        source: &str,
        mode: TransactionMode,
        up: Option<Procedure>,
        down: Option<Procedure>,
    ) -> RookeryResult<()> {
        let version = numeric_component(source)?;

        for procedure in up.iter().chain(down.iter()) {
            if procedure.required_mode() != mode {
                log::error!(
                    "Migration {:?} declares {:?} but carries a {:?} procedure",
                    source,
                    mode,
                    procedure.required_mode()
                );
                return Err(RookeryError::new(
                    &format!(
                        "migration {:?} declares {:?} but carries a {:?} procedure",
                        source,
                        mode,
                        procedure.required_mode()
                    ),
                    ErrorKind::ProcedureMismatch,
                ));
            }
        }

        // The entry guard holds the shard lock across both the lookup and
        // the insert, keeping the check-and-insert atomic.
        let mut versions = self.inner.scopes.entry(scope.to_string()).or_default();
        if let Some(existing) = versions.get(&version) {
            log::error!(
                "Failed to add migration {:?}: version {} conflicts with {:?}",
                source,
                version,
                existing.source()
            );
            return Err(RookeryError::new(
                &format!(
                    "failed to add migration {:?}: version {} conflicts with {:?}",
                    source,
                    version,
                    existing.source()
                ),
                ErrorKind::VersionConflict {
                    version,
                    existing_source: existing.source().to_string(),
                    new_source: source.to_string(),
                },
            ));
        }

        versions.insert(
            version,
            MigrationDescriptor::new(version, up, down, mode, source),
        );
        log::debug!(
            "Registered migration {:?} at version {} in scope {:?}",
            source,
            version,
            scope
        );
        Ok(())
    }

    /// Returns the full version-to-descriptor mapping for `scope`, sorted by
    /// version.
    ///
    /// The mapping is a read-only snapshot; the runner decides execution
    /// order and direction from it. An unknown scope yields an empty map.
    pub fn migrations(&self, scope: &str) -> BTreeMap<i64, MigrationDescriptor> {
        self.inner
            .scopes
            .get(scope)
            .map(|versions| versions.value().clone())
            .unwrap_or_default()
    }

    /// Whether `scope` already holds a migration at `version`.
    pub fn contains(&self, scope: &str, version: i64) -> bool {
        self.inner
            .scopes
            .get(scope)
            .map(|versions| versions.contains_key(&version))
            .unwrap_or(false)
    }

    /// All scopes with at least one registered migration, sorted by name.
    ///
    /// A scope only comes into existence through a successful registration,
    /// so every reported scope is non-empty.
    pub fn scopes(&self) -> Vec<String> {
        let mut scopes: Vec<String> = self
            .inner
            .scopes
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        scopes.sort();
        scopes
    }

    /// Whether no migration has been registered in any scope.
    pub fn is_empty(&self) -> bool {
        self.inner.scopes.is_empty()
    }
}

/// Returns the process-wide registry the `add_*` functions register into.
pub fn global_registry() -> MigrationRegistry {
    crate::GLOBAL_REGISTRY.clone()
}

/// Registers a transactional migration against the global registry, deriving
/// its source from the caller's file.
///
/// The caller's source file name must carry a leading version number, e.g.
/// `0003_add_email.rs`. Use [`add_named_migration_context`] to supply an
/// explicit identifier instead.
#[track_caller]
pub fn add_migration_context(
    up: Option<TxMigration>,
    down: Option<TxMigration>,
    options: Vec<RegistrationOption>,
) -> RookeryResult<()> {
    let source = Location::caller().file();
    add_named_migration_context(source, up, down, options)
}

/// Registers a transactional migration against the global registry under an
/// explicit source identifier.
pub fn add_named_migration_context(
    source: &str,
    up: Option<TxMigration>,
    down: Option<TxMigration>,
    options: Vec<RegistrationOption>,
) -> RookeryResult<()> {
    let config = RegistrationConfig::resolve(options);
    global_registry().register(
        &config.scope,
        source,
        TransactionMode::TransactionEnabled,
        up.map(Procedure::Tx),
        down.map(Procedure::Tx),
    )
}

/// Registers a no-transaction migration against the global registry, deriving
/// its source from the caller's file.
#[track_caller]
pub fn add_migration_no_tx_context(
    up: Option<DbMigration>,
    down: Option<DbMigration>,
    options: Vec<RegistrationOption>,
) -> RookeryResult<()> {
    let source = Location::caller().file();
    add_named_migration_no_tx_context(source, up, down, options)
}

/// Registers a no-transaction migration against the global registry under an
/// explicit source identifier.
pub fn add_named_migration_no_tx_context(
    source: &str,
    up: Option<DbMigration>,
    down: Option<DbMigration>,
    options: Vec<RegistrationOption>,
) -> RookeryResult<()> {
    let config = RegistrationConfig::resolve(options);
    global_registry().register(
        &config.scope,
        source,
        TransactionMode::TransactionDisabled,
        up.map(Procedure::Db),
        down.map(Procedure::Db),
    )
}

/// Registers a transactional migration whose procedures predate the context
/// parameter.
#[deprecated(note = "use `add_migration_context`")]
#[track_caller]
pub fn add_migration(
    up: Option<TxMigrationNoContext>,
    down: Option<TxMigrationNoContext>,
    options: Vec<RegistrationOption>,
) -> RookeryResult<()> {
    let source = Location::caller().file();
    add_named_migration_context(source, with_context(up), with_context(down), options)
}

/// Registers a named transactional migration whose procedures predate the
/// context parameter.
#[deprecated(note = "use `add_named_migration_context`")]
pub fn add_named_migration(
    source: &str,
    up: Option<TxMigrationNoContext>,
    down: Option<TxMigrationNoContext>,
    options: Vec<RegistrationOption>,
) -> RookeryResult<()> {
    add_named_migration_context(source, with_context(up), with_context(down), options)
}

/// Registers a no-transaction migration whose procedures predate the context
/// parameter.
#[deprecated(note = "use `add_migration_no_tx_context`")]
#[track_caller]
pub fn add_migration_no_tx(
    up: Option<DbMigrationNoContext>,
    down: Option<DbMigrationNoContext>,
    options: Vec<RegistrationOption>,
) -> RookeryResult<()> {
    let source = Location::caller().file();
    add_named_migration_no_tx_context(source, with_context(up), with_context(down), options)
}

/// Registers a named no-transaction migration whose procedures predate the
/// context parameter.
#[deprecated(note = "use `add_named_migration_no_tx_context`")]
pub fn add_named_migration_no_tx(
    source: &str,
    up: Option<DbMigrationNoContext>,
    down: Option<DbMigrationNoContext>,
    options: Vec<RegistrationOption>,
) -> RookeryResult<()> {
    add_named_migration_no_tx_context(source, with_context(up), with_context(down), options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[ctor::ctor]
    fn init() {
        colog::init();
    }

    fn noop_tx() -> Option<Procedure> {
        Some(Procedure::tx(|_ctx, _tx| Ok(())))
    }

    fn noop_db() -> Option<Procedure> {
        Some(Procedure::db(|_ctx, _db| Ok(())))
    }

    #[test]
    fn test_register_and_read_back() {
        let registry = MigrationRegistry::new();
        registry
            .register(
                "",
                "1_create_users.go",
                TransactionMode::TransactionEnabled,
                noop_tx(),
                noop_tx(),
            )
            .expect("registration failed");

        let migrations = registry.migrations("");
        assert_eq!(migrations.len(), 1);
        let descriptor = migrations.get(&1).expect("version 1 missing");
        assert_eq!(descriptor.source(), "1_create_users.go");
        assert_eq!(descriptor.mode(), TransactionMode::TransactionEnabled);
        assert!(registry.contains("", 1));
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_duplicate_version_in_scope_is_rejected() {
        let registry = MigrationRegistry::new();
        registry
            .register(
                "",
                "1_create_users.go",
                TransactionMode::TransactionEnabled,
                noop_tx(),
                noop_tx(),
            )
            .expect("first registration failed");

        let err = registry
            .register(
                "",
                "1_create_orders.go",
                TransactionMode::TransactionEnabled,
                noop_tx(),
                noop_tx(),
            )
            .unwrap_err();

        assert_eq!(
            *err.kind(),
            ErrorKind::VersionConflict {
                version: 1,
                existing_source: "1_create_users.go".to_string(),
                new_source: "1_create_orders.go".to_string(),
            }
        );
        // the first registration is untouched
        assert_eq!(
            registry.migrations("").get(&1).map(|d| d.source().to_string()),
            Some("1_create_users.go".to_string())
        );
    }

    #[test]
    fn test_conflict_resolved_by_renumbering() {
        let registry = MigrationRegistry::new();
        registry
            .register(
                "",
                "1_create_users.go",
                TransactionMode::TransactionEnabled,
                noop_tx(),
                noop_tx(),
            )
            .expect("first registration failed");
        registry
            .register(
                "",
                "2_create_orders.go",
                TransactionMode::TransactionEnabled,
                noop_tx(),
                noop_tx(),
            )
            .expect("renumbered registration failed");

        let versions: Vec<i64> = registry.migrations("").keys().copied().collect();
        assert_eq!(versions, vec![1, 2]);
    }

    #[test]
    fn test_scopes_are_isolated() {
        let registry = MigrationRegistry::new();
        registry
            .register("a", "5_init.sql", TransactionMode::TransactionEnabled, noop_tx(), None)
            .expect("scope a registration failed");
        registry
            .register("b", "5_init.sql", TransactionMode::TransactionEnabled, noop_tx(), None)
            .expect("scope b registration failed");

        assert!(registry.contains("a", 5));
        assert!(registry.contains("b", 5));
        assert_eq!(registry.scopes(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_unversioned_source_is_rejected() {
        let registry = MigrationRegistry::new();
        let err = registry
            .register(
                "",
                "create_users.go",
                TransactionMode::TransactionEnabled,
                noop_tx(),
                None,
            )
            .unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::UnversionedSource);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unversioned_sources_never_collide_at_zero() {
        let registry = MigrationRegistry::new();
        let first = registry.register(
            "",
            "create_users.go",
            TransactionMode::TransactionEnabled,
            noop_tx(),
            None,
        );
        let second = registry.register(
            "",
            "create_orders.go",
            TransactionMode::TransactionEnabled,
            noop_tx(),
            None,
        );
        assert_eq!(*first.unwrap_err().kind(), ErrorKind::UnversionedSource);
        assert_eq!(*second.unwrap_err().kind(), ErrorKind::UnversionedSource);
        assert!(!registry.contains("", 0));
    }

    #[test]
    fn test_mode_and_shape_must_agree() {
        let registry = MigrationRegistry::new();
        let err = registry
            .register(
                "",
                "1_vacuum.sql",
                TransactionMode::TransactionEnabled,
                noop_db(),
                None,
            )
            .unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::ProcedureMismatch);
    }

    #[test]
    fn test_one_directional_and_empty_migrations_are_allowed() {
        let registry = MigrationRegistry::new();
        registry
            .register("", "1_up_only.sql", TransactionMode::TransactionEnabled, noop_tx(), None)
            .expect("up-only registration failed");
        registry
            .register("", "2_recorded.sql", TransactionMode::TransactionDisabled, None, None)
            .expect("pair-less registration failed");

        let migrations = registry.migrations("");
        assert!(migrations.get(&1).expect("version 1 missing").down().is_none());
        let recorded = migrations.get(&2).expect("version 2 missing");
        assert_eq!(recorded.mode(), TransactionMode::TransactionDisabled);
        assert!(recorded.up().is_none());
    }

    #[test]
    fn test_unknown_scope_reads_empty() {
        let registry = MigrationRegistry::new();
        assert!(registry.migrations("nowhere").is_empty());
        assert!(!registry.contains("nowhere", 1));
        assert!(registry.scopes().is_empty());
    }

    #[test]
    fn test_migrations_are_sorted_by_version() {
        let registry = MigrationRegistry::new();
        for source in ["20230915_c.sql", "20230101_a.sql", "20230501_b.sql"] {
            registry
                .register("", source, TransactionMode::TransactionEnabled, noop_tx(), None)
                .expect("registration failed");
        }
        let versions: Vec<i64> = registry.migrations("").keys().copied().collect();
        assert_eq!(versions, vec![20230101, 20230501, 20230915]);
    }

    #[test]
    fn test_concurrent_registration_admits_exactly_one() {
        use std::thread;

        let registry = MigrationRegistry::new();
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let registry = registry.clone();
                thread::spawn(move || {
                    registry.register(
                        "",
                        &format!("3_worker_{}.sql", worker),
                        TransactionMode::TransactionEnabled,
                        Some(Procedure::tx(|_ctx, _tx| Ok(()))),
                        None,
                    )
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(succeeded, 1);
        assert_eq!(registry.migrations("").len(), 1);
    }
}
