//! Configuration loading and management.

use std::path::{Path, PathBuf};

use bt_core::LayoutConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Timeline scale and column limits.
    #[serde(default)]
    pub layout: LayoutConfig,
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources override earlier ones: defaults, the user config file,
    /// the file given on the command line, then `BT_*` environment variables
    /// (nested keys separated by `__`, e.g. `BT_LAYOUT__PIXELS_PER_HOUR`).
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("BT_").split("__"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for bt.
///
/// On Linux: `~/.config/bt`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("bt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use figment::Jail;

    #[test]
    fn test_dirs_config_path_ends_with_bt() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "bt");
    }

    #[test]
    fn test_defaults_without_sources() {
        Jail::expect_with(|jail| {
            jail.set_env("HOME", jail.directory().display().to_string());
            jail.set_env("XDG_CONFIG_HOME", jail.directory().join("cfg").display().to_string());
            let config = Config::load()?;
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("XDG_CONFIG_HOME", jail.directory().join("cfg").display().to_string());
            jail.create_file(
                "custom.toml",
                r"
                [layout]
                pixels_per_hour = 48
                session_max_columns = 2
                ",
            )?;
            let config = Config::load_from(Some(Path::new("custom.toml")))?;
            assert_eq!(config.layout.pixels_per_hour, 48);
            assert_eq!(config.layout.session_max_columns, 2);
            assert_eq!(config.layout.top_level_max_columns, 6);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.set_env("XDG_CONFIG_HOME", jail.directory().join("cfg").display().to_string());
            jail.create_file("custom.toml", "[layout]\npixels_per_hour = 48\n")?;
            jail.set_env("BT_LAYOUT__PIXELS_PER_HOUR", "60");
            let config = Config::load_from(Some(Path::new("custom.toml")))?;
            assert_eq!(config.layout.pixels_per_hour, 60);
            Ok(())
        });
    }
}
