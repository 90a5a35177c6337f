/// Per-registration configuration, resolved before a migration is recorded.
///
/// Starts zero-valued and is shaped by the [`RegistrationOption`]s passed to
/// a registration call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistrationConfig {
    /// Namespace the migration is registered under. The empty string is the
    /// default scope.
    pub scope: String,
}

impl RegistrationConfig {
    /// Resolves a configuration by applying `options` in the order given.
    ///
    /// Options are order-sensitive only insofar as a later option overwrites
    /// an earlier one for the same field; the last write wins.
    pub fn resolve(options: Vec<RegistrationOption>) -> Self {
        let mut config = RegistrationConfig::default();
        for option in options {
            option.apply(&mut config);
        }
        config
    }
}

/// A single mutation applied to a [`RegistrationConfig`].
pub struct RegistrationOption(Box<dyn FnOnce(&mut RegistrationConfig) + Send>);

impl RegistrationOption {
    fn new(f: impl FnOnce(&mut RegistrationConfig) + Send + 'static) -> Self {
        RegistrationOption(Box::new(f))
    }

    fn apply(self, config: &mut RegistrationConfig) {
        (self.0)(config)
    }
}

/// Registers the migration under the named scope instead of the default
/// (empty) one.
///
/// Two migrations in different scopes may share a version number; two in the
/// same scope may not.
pub fn with_scope(scope: impl Into<String>) -> RegistrationOption {
    let scope = scope.into();
    RegistrationOption::new(move |config| config.scope = scope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_valued_without_options() {
        let config = RegistrationConfig::resolve(vec![]);
        assert_eq!(config, RegistrationConfig { scope: String::new() });
    }

    #[test]
    fn test_with_scope_sets_the_scope() {
        let config = RegistrationConfig::resolve(vec![with_scope("billing")]);
        assert_eq!(config.scope, "billing");
    }

    #[test]
    fn test_last_option_wins() {
        let config =
            RegistrationConfig::resolve(vec![with_scope("billing"), with_scope("inventory")]);
        assert_eq!(config.scope, "inventory");
    }
}
