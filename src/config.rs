use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Config file read when `DASHBOARD_CONFIG` is not set.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

// ---------------------------------------------------------------------------
// Application configuration
// ---------------------------------------------------------------------------

/// Where the two tables live and a few presentation knobs.
///
/// Layered: built-in defaults → TOML file → `DASHBOARD_*` environment
/// variables (e.g. `DASHBOARD_FACULTIES_PATH`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub faculties_path: PathBuf,
    pub faculties_sheet: Option<String>,
    pub programs_path: PathBuf,
    pub programs_sheet: Option<String>,
    /// Text shown for the "no constraint" choice of every selector.
    pub wildcard_label: String,
    /// Institutes whose name contains this (case-insensitive) are emphasised.
    pub highlight: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            faculties_path: PathBuf::from("FACUL123.xlsx"),
            faculties_sheet: Some("Hoja1".to_string()),
            programs_path: PathBuf::from("CARRERAS.xlsx"),
            programs_sheet: None,
            wildcard_label: "Todos".to_string(),
            highlight: "UNIVERSIDAD DE LAS AMERICAS".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the default locations.
    pub fn load() -> Result<Self, figment::Error> {
        let file = std::env::var_os("DASHBOARD_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::figment(&file).extract()
    }

    /// The provider stack; a missing TOML file is simply skipped.
    pub fn figment(file: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed("DASHBOARD_").ignore(&["config"]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file_or_env() {
        figment::Jail::expect_with(|_jail| {
            let config: AppConfig = AppConfig::figment(Path::new("missing.toml")).extract()?;
            assert_eq!(config, AppConfig::default());
            assert_eq!(config.wildcard_label, "Todos");
            Ok(())
        });
    }

    #[test]
    fn file_then_env_override_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "dashboard.toml",
                r#"
                    faculties_path = "data/facultades.parquet"
                    programs_path = "data/carreras.csv"
                    highlight = "UNIVERSIDAD DE CHILE"
                "#,
            )?;
            jail.set_env("DASHBOARD_WILDCARD_LABEL", "All");

            let config: AppConfig = AppConfig::figment(Path::new("dashboard.toml")).extract()?;
            assert_eq!(config.faculties_path, PathBuf::from("data/facultades.parquet"));
            assert_eq!(config.programs_path, PathBuf::from("data/carreras.csv"));
            assert_eq!(config.highlight, "UNIVERSIDAD DE CHILE");
            assert_eq!(config.wildcard_label, "All");
            assert_eq!(config.faculties_sheet.as_deref(), Some("Hoja1"));
            Ok(())
        });
    }
}
