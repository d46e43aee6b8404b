//! YAML configuration file for the terminal host

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{WrapErr, eyre};
use debtclock_core::WidgetConfig;

pub const CONFIG_FILE_NAME: &str = "config.yaml";

pub fn default_config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE_NAME)
}

/// Load and validate the configuration at `path`.
///
/// A missing file yields the built-in defaults, which are also written to
/// `path` so they can be edited.
pub fn load_or_init(path: &Path) -> color_eyre::Result<WidgetConfig> {
    if !path.exists() {
        let config = WidgetConfig::default();
        match save(path, &config) {
            Ok(()) => tracing::info!(path = %path.display(), "Wrote default configuration"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Could not write default configuration"),
        }
        return Ok(config);
    }

    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    let config = from_yaml(&content).wrap_err_with(|| format!("Invalid configuration in {}", path.display()))?;
    tracing::info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

pub fn from_yaml(yaml: &str) -> color_eyre::Result<WidgetConfig> {
    let config: WidgetConfig = serde_saphyr::from_str(yaml).map_err(|e| eyre!("{e}"))?;
    config.validate()?;
    Ok(config)
}

/// Write the configuration with write-then-rename so a crash never leaves a
/// half-written file behind.
pub fn save(path: &Path, config: &WidgetConfig) -> color_eyre::Result<()> {
    let yaml = serde_saphyr::to_string(config).map_err(|e| eyre!("Failed to serialize configuration: {e}"))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    atomic_write(path, &yaml)?;
    Ok(())
}

fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let temp_path = path.with_extension("yaml.tmp");
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use debtclock_core::{Easing, SourceKind};
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_writes_and_returns_defaults() {
        let dir = tempdir().unwrap();
        let path = default_config_path(dir.path());

        let config = load_or_init(&path).unwrap();
        assert_eq!(config, WidgetConfig::default());
        assert!(path.exists());
        assert!(!path.with_extension("yaml.tmp").exists());

        let reloaded = load_or_init(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_partial_yaml_fills_in_defaults() {
        let yaml = r#"
source_order: [live, cached]
snapshot:
  enabled: true
  url: https://example.org/debt.json
animation:
  easing: easeInOutCubic
  duration_ms: 1500
emergency_fallback:
  amount: 35000000000000.0
  as_of: 2025-01-01
  source_label: Manual entry
"#;
        let config = from_yaml(yaml).unwrap();

        assert_eq!(config.source_order, vec![SourceKind::Live, SourceKind::Cached]);
        assert_eq!(config.animation.easing(), Easing::EaseInOutCubic);
        assert_eq!(config.animation.duration_ms, 1500);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.fallback().unwrap().source_label, "Manual entry");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        fs::write(&path, "animation:\n  reduction_fraction: 2.0\n").unwrap();
        assert!(load_or_init(&path).is_err());

        fs::write(&path, "emergency_fallback: [not, a, record]\n").unwrap();
        assert!(load_or_init(&path).is_err());
    }
}
