use std::path::PathBuf;

use serde::Deserialize;

/// Where client configuration records are read from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientsConfig {
    /// Directory holding one JSON file per client. Created on first load if missing.
    pub config_dir: PathBuf,
}

impl Default for ClientsConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("app/clients/configs"),
        }
    }
}
