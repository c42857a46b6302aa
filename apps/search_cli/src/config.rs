use std::{fs, path::Path};

use anyhow::{anyhow, Context};
use serde::Deserialize;
use ui_core::{HistoryMode, UiConfig};

pub const DEFAULT_CONFIG_FILE: &str = "search_ui.toml";
const ENV_PREFIX: &str = "SEARCH_UI__";

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    endpoint: Option<String>,
    app_id: Option<String>,
    index_id: Option<String>,
    token: Option<String>,
    user_id: Option<String>,
    timeout_ms: Option<u64>,
    history: Option<HistoryMode>,
    locale: Option<String>,
    page_size: Option<u32>,
}

/// Defaults, then the TOML file, then `SEARCH_UI__*` variables.
///
/// An explicitly given `path` must exist; the default file is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<UiConfig> {
    let mut config = UiConfig::default();

    let raw = match path {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?,
        ),
        None => fs::read_to_string(DEFAULT_CONFIG_FILE).ok(),
    };
    if let Some(raw) = raw {
        let file: FileSettings = toml::from_str(&raw).context("failed to parse config file")?;
        apply_file(&mut config, file);
    }

    apply_env(&mut config, |key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())?;
    Ok(config)
}

fn apply_file(config: &mut UiConfig, file: FileSettings) {
    let repository = &mut config.repository;
    if let Some(v) = file.endpoint {
        repository.endpoint = v;
    }
    if let Some(v) = file.app_id {
        repository.app_id = v;
    }
    if let Some(v) = file.index_id {
        repository.index_id = v;
    }
    if let Some(v) = file.token {
        repository.token = v;
    }
    if file.user_id.is_some() {
        repository.user_id = file.user_id;
    }
    if let Some(v) = file.timeout_ms {
        repository.timeout_ms = v;
    }
    if let Some(v) = file.history {
        config.history = v;
    }
    if file.locale.is_some() {
        config.options.locale = file.locale;
    }
    if let Some(v) = file.page_size {
        config.options.default_page_size = v;
    }
}

fn apply_env(
    config: &mut UiConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    let repository = &mut config.repository;
    if let Some(v) = lookup("ENDPOINT") {
        repository.endpoint = v;
    }
    if let Some(v) = lookup("APP_ID") {
        repository.app_id = v;
    }
    if let Some(v) = lookup("INDEX_ID") {
        repository.index_id = v;
    }
    if let Some(v) = lookup("TOKEN") {
        repository.token = v;
    }
    if let Some(v) = lookup("USER_ID") {
        repository.user_id = Some(v);
    }
    if let Some(v) = lookup("HISTORY") {
        config.history = parse_history(&v)?;
    }
    if let Some(v) = lookup("LOCALE") {
        config.options.locale = Some(v);
    }
    if let Some(v) = lookup("PAGE_SIZE") {
        config.options.default_page_size = v
            .parse()
            .with_context(|| format!("{ENV_PREFIX}PAGE_SIZE is not a number: '{v}'"))?;
    }
    Ok(())
}

pub fn parse_history(raw: &str) -> anyhow::Result<HistoryMode> {
    HistoryMode::parse(raw).ok_or_else(|| anyhow!("unknown history mode '{raw}'"))
}
