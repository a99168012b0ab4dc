use std::{path::Path, str::FromStr};

use indoc::formatdoc;
use secrecy::SecretString;

use crate::{Config, Error, ProviderId};

pub(crate) fn load<P: AsRef<Path>>(path: P) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let config: Config = toml::from_str(&content)?;

    finalize(config)
}

pub(crate) fn from_env() -> crate::Result<Config> {
    finalize(Config::default())
}

fn finalize(mut config: Config) -> crate::Result<Config> {
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate(&config)?;

    for warning in warnings(&config) {
        log::warn!("{warning}");
    }

    log::info!("Loaded settings with provider: {}", config.llm.default_provider);

    for id in ProviderId::ALL {
        let present = config.llm.providers.get(id).api_key.is_some();
        log::info!("{id} API key present: {present}");
    }

    log::info!("Default model: {}", config.llm.default_model);
    log::info!("Client config directory: {}", config.clients.config_dir.display());

    Ok(config)
}

/// Overlays the environment variables the gateway has always honored on top of the file values.
/// Empty values count as unset.
pub(crate) fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> crate::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    if let Some(key) = var("OPENAI_API_KEY") {
        config.llm.providers.get_mut(ProviderId::OpenAI).api_key = Some(SecretString::from(key));
    }

    if let Some(key) = var("GROQ_API_KEY") {
        config.llm.providers.get_mut(ProviderId::Groq).api_key = Some(SecretString::from(key));
    }

    if let Some(provider) = var("DEFAULT_PROVIDER") {
        config.llm.default_provider = ProviderId::from_str(provider.trim()).map_err(|_| Error::EnvVar {
            name: "DEFAULT_PROVIDER",
            reason: format!("Invalid provider: {provider}. Must be one of: openai, groq"),
        })?;
    }

    if let Some(model) = var("DEFAULT_MODEL") {
        config.llm.default_model = model;
    }

    if let Some(dir) = var("CLIENT_CONFIG_DIR") {
        config.clients.config_dir = dir.into();
    }

    if let Some(prefix) = var("API_V1_STR") {
        config.server.api_prefix = prefix;
    }

    if let Some(name) = var("PROJECT_NAME") {
        config.server.project_name = name;
    }

    Ok(())
}

pub(crate) fn validate(config: &Config) -> crate::Result<()> {
    let prefix = &config.server.api_prefix;

    if !prefix.starts_with('/') || prefix == "/" || prefix.ends_with('/') {
        return Err(Error::Validation(format!(
            "Invalid API prefix '{prefix}': it must start with '/', must not end with '/' and cannot be the root path"
        )));
    }

    if config.llm.providers.enabled().next().is_none() {
        return Err(Error::Validation(formatdoc! {r#"
            No LLM providers are enabled. At least one provider must be enabled, for example:

              [llm.providers.groq]
              enabled = true
              api_key = "gsk_..."
        "#}));
    }

    let default_provider = config.llm.default_provider;

    if !config.llm.providers.get(default_provider).enabled {
        return Err(Error::Validation(format!(
            "The default provider '{default_provider}' is disabled in [llm.providers.{default_provider}]"
        )));
    }

    Ok(())
}

fn warnings(config: &Config) -> Vec<String> {
    config
        .llm
        .providers
        .enabled()
        .filter(|(_, provider)| provider.api_key.is_none())
        .map(|(id, _)| format!("Provider '{id}' is enabled but has no API key configured"))
        .collect()
}
