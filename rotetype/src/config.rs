use std::path::{Path, PathBuf};

use derive_more::From;
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use rote::{OptionError, OptionSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::library::{Template, TemplateError};

pub mod stats;
pub mod theme;

pub const ENV_PREFIX: &str = "ROTETYPE_";

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "Rote", "rotetype")
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    pub theme: theme::Theme,
    pub statistics: stats::StatisticsConfig,
    pub templates_dir: Option<PathBuf>,
    /// Options enabled when the app starts
    pub default_options: Vec<String>,
    pub particles: ParticleSettings,
    /// Show untyped spaces as a dim `·`
    pub ghost_space: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: theme::Theme::default(),
            statistics: stats::StatisticsConfig::default(),
            templates_dir: None,
            default_options: vec!["power-mode".to_string(), "repeat".to_string()],
            particles: ParticleSettings::default(),
            ghost_space: true,
        }
    }
}

/// Scale between particle pixels and terminal cells
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct ParticleSettings {
    pub cell_width: f64,
    pub cell_height: f64,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            cell_width: 8.0,
            cell_height: 16.0,
        }
    }
}

#[derive(Debug, From, Error)]
pub enum ConfigError {
    #[error(
        "Failed to get configuration directory. Please specify the location using the `--config <path>` flag"
    )]
    NoDirectory,

    #[error("Failed to create config directory: {0}")]
    CreateDirectory(std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(Box<figment::Error>),

    #[error("Invalid default options: {0}")]
    Options(OptionError),

    #[error("Failed to load templates: {0}")]
    Templates(TemplateError),
}

/// Values given on the command line, taking precedence over the settings file
#[derive(Debug, Default)]
pub struct Overrides {
    pub directory: Option<PathBuf>,
    pub options: Option<OptionSet>,
    pub category: Option<u32>,
}

#[derive(Debug)]
pub struct Config {
    pub settings: Settings,
    /// Options enabled at startup
    pub options: OptionSet,
    /// Category shown first in the menu
    pub category: u32,
    pub templates: Vec<Template>,
    pub stats_dir: PathBuf,
}

impl Config {
    pub fn get(overrides: Overrides) -> Result<Self, ConfigError> {
        // Check for toml file location
        let config_dir = overrides
            .directory
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.config_dir().to_path_buf()))
            .ok_or(ConfigError::NoDirectory)?;

        let data_dir = project_dirs().map(|dirs| dirs.data_dir().to_path_buf());

        Self::load(&config_dir, data_dir, overrides)
    }

    /// Loads the configuration from `config_dir`.
    ///
    /// `data_dir` is where statistics go unless the settings say otherwise. Without one they are
    /// kept next to the configuration.
    pub fn load(
        config_dir: &Path,
        data_dir: Option<PathBuf>,
        overrides: Overrides,
    ) -> Result<Self, ConfigError> {
        // Ensure path exists
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir)?;
        }

        // Grab default configuration
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        let settings_toml = config_dir.join("settings.toml");
        if settings_toml.exists() {
            tracing::debug!(path = %settings_toml.display(), "merging settings file");
            figment = figment.merge(Toml::file(settings_toml));
        }

        let mut settings: Settings = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;

        let options = match overrides.options {
            Some(options) => options,
            None => settings
                .default_options
                .iter()
                .map(|name| name.parse())
                .collect::<Result<OptionSet, _>>()?,
        };

        if let Some((winner, shadowed)) = options.shadowed() {
            tracing::warn!(%winner, %shadowed, "both enabled, {winner} takes precedence");
        }

        let templates_dir = settings
            .templates_dir
            .clone()
            .unwrap_or_else(|| config_dir.join("templates"));
        let templates = crate::library::load_templates(&templates_dir)?;
        settings.templates_dir = Some(templates_dir);

        let stats_dir = settings
            .statistics
            .directory
            .clone()
            .or(data_dir)
            .unwrap_or_else(|| config_dir.to_path_buf());

        tracing::info!(
            config_dir = %config_dir.display(),
            templates = templates.len(),
            %options,
            "configuration loaded"
        );

        Ok(Self {
            settings,
            options,
            category: overrides.category.unwrap_or(crate::library::DEFAULT_CATEGORY),
            templates,
            stats_dir,
        })
    }

    pub fn stats_path(&self) -> PathBuf {
        self.stats_dir.join(crate::stats::STATS_FILE)
    }
}

#[cfg(test)]
impl Config {
    /// Defaults with two small templates in category 1 and one in category 2
    pub fn for_tests() -> Self {
        let template = |id: &str, text: &str, category| Template {
            id: id.to_string(),
            title: id.to_string(),
            template: text.to_string(),
            category,
        };

        Self {
            settings: Settings::default(),
            options: OptionSet::empty(),
            category: crate::library::DEFAULT_CATEGORY,
            templates: vec![
                template("t/0", "ab", 1),
                template("t/1", "cd", 1),
                template("u/0", "ef", 2),
            ],
            stats_dir: std::env::temp_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use figment::Jail;
    use rote::TypingOption;

    #[test]
    fn test_defaults() {
        Jail::expect_with(|jail| {
            let dir = jail.directory();
            let config = Config::load(dir, None, Overrides::default())
                .map_err(|error| error.to_string())?;

            assert_eq!(
                config.options,
                OptionSet::empty()
                    .with(TypingOption::PowerMode)
                    .with(TypingOption::Repeat)
            );
            assert_eq!(config.category, 1);
            assert!(config.settings.ghost_space);
            assert!(config.settings.statistics.save_enabled);
            assert_eq!(config.stats_dir, dir);
            assert_eq!(config.settings.templates_dir, Some(dir.join("templates")));
            // Samples are written on first run
            assert!(dir.join("templates").join("samples.toml").exists());
            assert!(!config.templates.is_empty());
            Ok(())
        });
    }

    #[test]
    fn test_settings_file_and_overrides() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "settings.toml",
                r#"
default_options = ["instant-death"]
ghost_space = false

[statistics]
save_enabled = false
directory = "/tmp/rotetype-stats"

[particles]
cell_width = 10.0
"#,
            )?;

            let config = Config::load(jail.directory(), None, Overrides::default())
                .map_err(|error| error.to_string())?;
            assert_eq!(config.options, OptionSet::empty().with(TypingOption::InstantDeath));
            assert!(!config.settings.ghost_space);
            assert!(!config.settings.statistics.save_enabled);
            assert_eq!(config.stats_dir, PathBuf::from("/tmp/rotetype-stats"));
            assert_eq!(config.settings.particles.cell_width, 10.0);
            assert_eq!(config.settings.particles.cell_height, 16.0);

            let options: OptionSet = "repeat,randomization"
                .parse()
                .map_err(|error: OptionError| error.to_string())?;
            let overrides = Overrides {
                options: Some(options),
                category: Some(3),
                ..Overrides::default()
            };
            let config = Config::load(jail.directory(), None, overrides)
                .map_err(|error| error.to_string())?;
            assert!(config.options.contains(TypingOption::Randomization));
            assert!(!config.options.contains(TypingOption::InstantDeath));
            assert_eq!(config.category, 3);
            Ok(())
        });
    }

    #[test]
    fn test_unknown_default_option() {
        Jail::expect_with(|jail| {
            jail.create_file("settings.toml", "default_options = [\"turbo\"]")?;

            let result = Config::load(jail.directory(), None, Overrides::default());
            assert_matches!(result, Err(ConfigError::Options(OptionError::Unknown(name))) if name == "turbo");
            Ok(())
        });
    }

    #[test]
    fn test_environment_overrides() {
        Jail::expect_with(|jail| {
            jail.set_env("ROTETYPE_GHOST_SPACE", "false");
            jail.set_env("ROTETYPE_STATISTICS__SAVE_ENABLED", "false");

            let config = Config::load(jail.directory(), None, Overrides::default())
                .map_err(|error| error.to_string())?;
            assert!(!config.settings.ghost_space);
            assert!(!config.settings.statistics.save_enabled);
            Ok(())
        });
    }
}
