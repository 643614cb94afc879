//! Validation tests for configuration

#[cfg(test)]
mod validation_tests {
    use crate::config::Config;
    use crate::Error;

    #[test]
    fn test_empty_filter_rejected() {
        let config = Config {
            filename_filter: "  ".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_zero_wait_is_allowed() {
        let config = Config {
            max_wait_seconds: 0,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_wait_above_limit_rejected() {
        let config = Config {
            max_wait_seconds: 3601,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_capacity_bounds() {
        let mut config = Config::default();
        config.log.capacity = 0;
        assert!(config.validate().is_err());

        config.log.capacity = 100_001;
        assert!(config.validate().is_err());

        config.log.capacity = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_id_rules() {
        let mut config = Config::default();
        config.instance.app_id = String::new();
        assert!(config.validate().is_err());

        config.instance.app_id = "../escape".to_string();
        assert!(config.validate().is_err());

        config.instance.app_id = "scanwatch-work".to_string();
        assert!(config.validate().is_ok());
    }
}
