use dataveil_config::{AnonymizerConfig, EntityConfig};
use dataveil_core::ConfigurationError;

/// Looks up the policy declared for `entity`.
pub fn resolve<'c>(
    config: Option<&'c AnonymizerConfig>,
    entity: &str,
) -> Result<&'c EntityConfig, ConfigurationError> {
    let config = config
        .filter(|config| !config.entities.is_empty())
        .ok_or(ConfigurationError::NotLoaded)?;
    config
        .entity(entity)
        .ok_or_else(|| ConfigurationError::UnknownEntity(entity.to_string()))
}

#[cfg(test)]
mod tests {
    use dataveil_config::{AnonymizerConfig, EntityConfig};
    use dataveil_core::ConfigurationError;

    use super::resolve;

    #[test]
    fn missing_or_empty_configuration_is_not_loaded() {
        assert_eq!(
            resolve(None, "guestbook").unwrap_err(),
            ConfigurationError::NotLoaded
        );
        let empty = AnonymizerConfig::default();
        assert_eq!(
            resolve(Some(&empty), "guestbook").unwrap_err(),
            ConfigurationError::NotLoaded
        );
    }

    #[test]
    fn unknown_entities_are_named() {
        let mut config = AnonymizerConfig::default();
        config
            .entities
            .insert("guestbook".to_string(), EntityConfig::default().with_delete(""));

        assert!(resolve(Some(&config), "guestbook").is_ok());
        let err = resolve(Some(&config), "people").unwrap_err();
        assert_eq!(err.to_string(), "No configuration for that entity (people)");
    }
}
