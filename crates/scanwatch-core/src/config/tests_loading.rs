//! Loading-focused tests for configuration
//!
//! File parsing, environment overrides and CLI overrides.

#[cfg(test)]
mod loading_tests {
    use std::{collections::HashMap, io::Write, path::PathBuf};

    use serial_test::serial;

    use crate::config::{load_config, load_toml_file, Config, ConfigOverrides};
    use crate::{Error, Result};

    fn write_config(dir: &tempfile::TempDir, body: &str) -> Result<PathBuf> {
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path)
            .map_err(|e| Error::io_error(format!("Failed to create test file: {e}")))?;
        file.write_all(body.as_bytes())
            .map_err(|e| Error::io_error(format!("Failed to write test file: {e}")))?;
        Ok(path)
    }

    #[test]
    fn test_load_toml_file_partial_leaves_rest_unset() -> Result<()> {
        let temp_dir = tempfile::tempdir()
            .map_err(|e| Error::io_error(format!("Failed to create temp dir: {e}")))?;
        let path = write_config(&temp_dir, "filename_filter = \"*.pdf\"\n")?;

        let layer = load_toml_file(&path)?;
        assert_eq!(layer.filename_filter.as_deref(), Some("*.pdf"));
        assert_eq!(layer.max_wait_seconds, None);
        assert_eq!(layer.instance.app_id, None);

        let config = Config::default().merge(layer);
        assert_eq!(config.max_wait_seconds, Config::default().max_wait_seconds);
        Ok(())
    }

    #[test]
    fn test_malformed_toml_returns_parse_error() -> Result<()> {
        let temp_dir = tempfile::tempdir()
            .map_err(|e| Error::io_error(format!("Failed to create temp dir: {e}")))?;
        let path = write_config(&temp_dir, "max_wait_seconds = \n invalid toml [[[")?;

        let result = load_toml_file(&path);
        assert!(matches!(result, Err(Error::Validation(_))));
        Ok(())
    }

    #[test]
    fn test_directory_as_config_path_rejected() -> Result<()> {
        let temp_dir = tempfile::tempdir()
            .map_err(|e| Error::io_error(format!("Failed to create temp dir: {e}")))?;
        let result = load_toml_file(temp_dir.path());
        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("directory"));
        }
        Ok(())
    }

    #[test]
    #[serial]
    fn test_missing_explicit_config_is_error() {
        let result = load_config(
            Some(std::path::Path::new("/definitely/not/here/config.toml")),
            &ConfigOverrides::default(),
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    #[serial]
    fn test_explicit_config_then_cli_overrides() -> Result<()> {
        let temp_dir = tempfile::tempdir()
            .map_err(|e| Error::io_error(format!("Failed to create temp dir: {e}")))?;
        let path = write_config(
            &temp_dir,
            "filename_filter = \"*.tif\"\nmax_wait_seconds = 9\n",
        )?;

        let overrides = ConfigOverrides {
            max_wait_seconds: Some(3),
            ..ConfigOverrides::default()
        };
        let config = load_config(Some(&path), &overrides)?;
        assert_eq!(config.filename_filter, "*.tif");
        assert_eq!(config.max_wait_seconds, 3);
        Ok(())
    }

    #[test]
    fn test_env_lookup_overrides() -> Result<()> {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SCANWATCH_SCAN_DIRECTORY", "/srv/scans"),
            ("SCANWATCH_FILENAME_FILTER", "*.jpg"),
            ("SCANWATCH_MAX_WAIT_SECONDS", "7"),
            ("SCANWATCH_ATTEMPT_OPEN_ON_CREATE", "true"),
            ("SCANWATCH_LOCK_DIR", "/run/scanwatch"),
        ]);

        let config = Config::default()
            .apply_env_from(|key| env.get(key).map(|v| (*v).to_string()))?;
        assert_eq!(config.scan_directory, PathBuf::from("/srv/scans"));
        assert_eq!(config.filename_filter, "*.jpg");
        assert_eq!(config.max_wait_seconds, 7);
        assert!(config.attempt_open_on_create);
        assert_eq!(config.instance.lock_dir, PathBuf::from("/run/scanwatch"));
        Ok(())
    }

    #[test]
    fn test_env_invalid_number_rejected() {
        let result = Config::default().apply_env_from(|key| {
            (key == "SCANWATCH_MAX_WAIT_SECONDS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    #[serial]
    fn test_process_env_override() -> Result<()> {
        std::env::set_var("SCANWATCH_FILENAME_FILTER", "*.png");
        let result = Config::default().apply_env_vars();
        std::env::remove_var("SCANWATCH_FILENAME_FILTER");

        assert_eq!(result?.filename_filter, "*.png");
        Ok(())
    }
}
