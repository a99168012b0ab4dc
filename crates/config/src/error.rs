#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to open configuration file: {0}")]
    ConfigOpen(#[from] std::io::Error),
    #[error("Failed to parse configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("Invalid value in environment variable {name}: {reason}")]
    EnvVar { name: &'static str, reason: String },
    #[error("{0}")]
    Validation(String),
}
