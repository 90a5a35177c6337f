use std::path::Path;

use crate::errors::{ErrorKind, RookeryError, RookeryResult};

/// Extracts the migration version from a source identifier.
///
/// Only the basename of `source` is inspected; its leading maximal run of
/// decimal digits becomes the version. The identifier has no filesystem
/// semantics beyond this parse.
///
/// # Errors
///
/// Returns [`ErrorKind::UnversionedSource`] when the basename has no leading
/// digits, or when the digit run does not fit in an `i64`. The failure is
/// surfaced explicitly rather than defaulting to version `0`, which would
/// make every unversioned migration in a scope collide with the next.
///
/// # Examples
///
/// ```rust
/// use rookery::numeric_component;
///
/// assert_eq!(numeric_component("20230101_init.go").unwrap(), 20230101);
/// assert_eq!(numeric_component("db/migrations/007_seed.sql").unwrap(), 7);
/// assert!(numeric_component("nonumeric.go").is_err());
/// ```
pub fn numeric_component(source: &str) -> RookeryResult<i64> {
    let base = Path::new(source)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(source);

    let digit_run = base
        .as_bytes()
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(base.len());

    if digit_run == 0 {
        log::error!("No version number found in migration source {:?}", source);
        return Err(RookeryError::new(
            &format!("no version number found in {:?}", source),
            ErrorKind::UnversionedSource,
        ));
    }

    base[..digit_run].parse::<i64>().map_err(|_| {
        log::error!("Version number in migration source {:?} is out of range", source);
        RookeryError::new(
            &format!("version number in {:?} is out of range", source),
            ErrorKind::UnversionedSource,
        )
    })
}
