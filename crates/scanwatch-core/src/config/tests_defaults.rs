//! Default-value and merge tests for configuration

#[cfg(test)]
mod default_tests {
    use std::path::PathBuf;

    use crate::config::{
        Config, ConfigLayer, InstanceLayer, DEFAULT_APP_ID, DEFAULT_FILENAME_FILTER,
        DEFAULT_MAX_WAIT_SECONDS,
    };
    use crate::Result;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.filename_filter, DEFAULT_FILENAME_FILTER);
        assert_eq!(config.max_wait_seconds, DEFAULT_MAX_WAIT_SECONDS);
        assert!(!config.attempt_open_on_create);
        assert_eq!(config.instance.app_id, DEFAULT_APP_ID);
        assert_eq!(config.log.capacity, 500);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_merge_applies_present_keys() {
        let layer = ConfigLayer {
            filename_filter: Some("*.pdf".to_string()),
            max_wait_seconds: Some(5),
            ..ConfigLayer::default()
        };

        let merged = Config::default().merge(layer);
        assert_eq!(merged.filename_filter, "*.pdf");
        assert_eq!(merged.max_wait_seconds, 5);
    }

    #[test]
    fn test_merge_empty_layer_keeps_base() {
        let base = Config {
            scan_directory: PathBuf::from("/scans"),
            max_wait_seconds: 12,
            attempt_open_on_create: true,
            ..Config::default()
        };

        let merged = base.clone().merge(ConfigLayer::default());
        assert_eq!(merged, base);
    }

    #[test]
    fn test_merge_layer_can_restore_defaults() -> Result<()> {
        let global = Config {
            max_wait_seconds: 60,
            attempt_open_on_create: true,
            ..Config::default()
        };
        let explicit: ConfigLayer = toml::from_str(
            "max_wait_seconds = 30\nattempt_open_on_create = false\n\n[log]\ncapacity = 500\n",
        )?;

        let merged = global.merge(explicit);
        assert_eq!(merged.max_wait_seconds, DEFAULT_MAX_WAIT_SECONDS);
        assert!(!merged.attempt_open_on_create);
        assert_eq!(merged.log.capacity, 500);
        Ok(())
    }

    #[test]
    fn test_merge_nested_tables() {
        let layer = ConfigLayer {
            instance: InstanceLayer {
                app_id: Some("scanwatch-office".to_string()),
                ..InstanceLayer::default()
            },
            ..ConfigLayer::default()
        };

        let base = Config::default();
        let lock_dir = base.instance.lock_dir.clone();
        let merged = base.merge(layer);
        assert_eq!(merged.instance.app_id, "scanwatch-office");
        assert_eq!(merged.instance.lock_dir, lock_dir);
    }

    #[test]
    fn test_watch_config_projection() {
        let config = Config {
            scan_directory: PathBuf::from("/scans"),
            filename_filter: "*.tif".to_string(),
            ..Config::default()
        };
        let watch = config.watch_config();
        assert_eq!(watch.directory, PathBuf::from("/scans"));
        assert_eq!(watch.filename_filter, "*.tif");
    }
}
