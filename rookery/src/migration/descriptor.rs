use super::procedure::Procedure;

/// Whether a migration's procedures run inside a runner-managed transaction.
///
/// Exactly one mode applies to both the up and the down procedure of a
/// migration; they are registered as a pair and share it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionMode {
    /// The runner opens a single transaction around the procedure and
    /// commits or rolls it back on the procedure's behalf.
    TransactionEnabled,
    /// The procedure receives direct database access and manages its own
    /// atomicity, e.g. for statements that cannot run inside a transaction.
    TransactionDisabled,
}

/// The unit of record stored per (scope, version).
///
/// Constructed once, immutable thereafter, and owned by the registry after
/// insertion. Cloning shares the underlying procedures, so a descriptor is
/// safe to hand to the runner without further synchronization.
#[derive(Clone, Debug)]
pub struct MigrationDescriptor {
    version: i64,
    source: String,
    up: Option<Procedure>,
    down: Option<Procedure>,
    mode: TransactionMode,
}

impl MigrationDescriptor {
    /// Assembles a descriptor.
    ///
    /// Structural assembly only; version collisions are the registry's
    /// responsibility. Either direction may be absent for a one-directional
    /// migration.
    pub fn new(
        version: i64,
        up: Option<Procedure>,
        down: Option<Procedure>,
        mode: TransactionMode,
        source: &str,
    ) -> Self {
        MigrationDescriptor {
            version,
            source: source.to_string(),
            up,
            down,
            mode,
        }
    }

    /// The migration's ordering key within its scope.
    pub fn version(&self) -> i64 {
        self.version
    }

    /// The identifying string the version was derived from. Used only for
    /// diagnostics.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The up procedure, if present.
    pub fn up(&self) -> Option<&Procedure> {
        self.up.as_ref()
    }

    /// The down procedure, if present.
    pub fn down(&self) -> Option<&Procedure> {
        self.down.as_ref()
    }

    /// The transaction mode the runner must honor for both directions.
    pub fn mode(&self) -> TransactionMode {
        self.mode
    }
}
