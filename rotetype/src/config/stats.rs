use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct StatisticsConfig {
    pub save_enabled: bool,
    /// Where `stats.json` lives. Defaults to the platform data directory.
    pub directory: Option<PathBuf>,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            save_enabled: true,
            directory: None,
        }
    }
}
