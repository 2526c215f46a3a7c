use std::{collections::HashMap, fs, path::Path};

use anyhow::Context;
use client_core::{ReconcilePolicy, SyncPolicy};
use tracing::warn;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub policy: SyncPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            policy: SyncPolicy::default(),
        }
    }
}

/// Defaults, then `config_path` if it exists, then the environment, then
/// `base_url_override` from the command line.
pub fn load_settings(
    config_path: &Path,
    base_url_override: Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", config_path.display()))?;
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());
    if let Some(base_url) = base_url_override {
        settings.base_url = base_url;
    }

    settings.base_url = validate_base_url(&settings.base_url)?;
    Ok(settings)
}

pub(crate) fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: HashMap<String, String> = toml::from_str(raw)?;
    if let Some(v) = file_cfg.get("base_url") {
        settings.base_url = v.clone();
    }
    apply_policy(&mut settings.policy.update, "update_policy", file_cfg.get("update_policy"));
    apply_policy(&mut settings.policy.create, "create_policy", file_cfg.get("create_policy"));
    apply_policy(&mut settings.policy.delete, "delete_policy", file_cfg.get("delete_policy"));
    Ok(())
}

pub(crate) fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("USERS_BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = lookup("APP__BASE_URL") {
        settings.base_url = v;
    }

    apply_policy(
        &mut settings.policy.update,
        "APP__UPDATE_POLICY",
        lookup("APP__UPDATE_POLICY").as_ref(),
    );
    apply_policy(
        &mut settings.policy.create,
        "APP__CREATE_POLICY",
        lookup("APP__CREATE_POLICY").as_ref(),
    );
    apply_policy(
        &mut settings.policy.delete,
        "APP__DELETE_POLICY",
        lookup("APP__DELETE_POLICY").as_ref(),
    );
}

fn apply_policy(slot: &mut ReconcilePolicy, key: &str, raw: Option<&String>) {
    let Some(raw) = raw else {
        return;
    };
    match raw.parse() {
        Ok(policy) => *slot = policy,
        Err(err) => warn!(key, error = %err, "ignoring reconcile policy"),
    }
}

pub(crate) fn validate_base_url(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    let url = Url::parse(raw).with_context(|| format!("invalid base url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("base url '{raw}' must use http or https");
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
