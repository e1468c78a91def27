//! Persistent user settings and API key resolution.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{GitguyError, Result};
use crate::output;

pub const APP_NAME: &str = "gitguy";
pub const CONFIG_FILE: &str = "config.json";
pub const CONFIG_DIR_ENV: &str = "GITGUY_CONFIG_DIR";
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";
pub const DEFAULT_OUT_PR: &str = "PR_{{ID}}.md";
const ID_PLACEHOLDERS: [&str; 2] = ["{{ID}}", "{{id}}"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_pr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_template: Option<PathBuf>,
}

impl Config {
    /// Load `config.json` from `dir`. A missing file yields defaults.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        serde_json::from_str(&contents).map_err(|e| {
            GitguyError::Config(format!("invalid config file {}: {}", path.display(), e))
        })
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&config_dir()?)
    }

    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(CONFIG_FILE);
        let contents = serde_json::to_string_pretty(self)?;
        output::write_atomic(&path, &contents)?;
        info!(path = %path.display(), "saved config");
        Ok(path)
    }

    /// The key from the flag, the environment or the config file, in that
    /// order. Blank values are skipped.
    pub fn resolve_api_key(&self, flag: Option<&str>) -> Result<String> {
        let env = std::env::var(API_KEY_ENV).ok();
        resolve_key(flag, env.as_deref(), self.api_key.as_deref())
    }

    pub fn out_pr(&self) -> &str {
        self.out_pr.as_deref().unwrap_or(DEFAULT_OUT_PR)
    }
}

fn resolve_key(flag: Option<&str>, env: Option<&str>, file: Option<&str>) -> Result<String> {
    [flag, env, file]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|key| !key.is_empty())
        .map(str::to_string)
        .ok_or(GitguyError::MissingApiKey)
}

/// `$GITGUY_CONFIG_DIR`, or the platform config directory for gitguy.
pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| GitguyError::Config("could not determine config directory".into()))
}

/// Store `key` in the config file under `dir`, keeping other settings.
pub fn save_api_key_in(dir: &Path, key: &str) -> Result<PathBuf> {
    let key = key.trim();
    if key.is_empty() {
        return Err(GitguyError::Config("API key cannot be empty".into()));
    }
    let mut config = Config::load_from(dir)?;
    config.api_key = Some(key.to_string());
    config.save_to(dir)
}

pub fn save_api_key(key: &str) -> Result<PathBuf> {
    save_api_key_in(&config_dir()?, key)
}

/// Replace every `{{ID}}` in a PR file name with one random number in
/// `0..=255`.
pub fn expand_pr_template(name: &str) -> String {
    if !ID_PLACEHOLDERS.iter().any(|p| name.contains(p)) {
        return name.to_string();
    }
    let id = Uuid::new_v4().as_bytes()[0].to_string();
    ID_PLACEHOLDERS
        .iter()
        .fold(name.to_string(), |acc, p| acc.replace(p, &id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn should_default_when_file_missing() {
        // given
        let dir = TempDir::new().unwrap();

        // when
        let config = Config::load_from(dir.path()).unwrap();

        // then
        assert_eq!(config, Config::default());
        assert_eq!(config.out_pr(), DEFAULT_OUT_PR);
    }

    #[test]
    fn should_save_key_and_keep_other_settings() {
        // given
        let dir = TempDir::new().unwrap();
        let existing = Config {
            model: Some("kimi-k2".into()),
            ..Default::default()
        };
        existing.save_to(dir.path()).unwrap();

        // when
        save_api_key_in(dir.path(), "  sk-or-123  ").unwrap();

        // then
        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-or-123"));
        assert_eq!(config.model.as_deref(), Some("kimi-k2"));
        assert!(!dir.path().join("config.json.tmp").exists());
    }

    #[test]
    fn should_reject_empty_key() {
        let dir = TempDir::new().unwrap();
        let result = save_api_key_in(dir.path(), "   ");
        assert!(matches!(result, Err(GitguyError::Config(m)) if m == "API key cannot be empty"));
        assert!(!dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn should_report_invalid_config_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{not json").unwrap();
        assert!(matches!(
            Config::load_from(dir.path()),
            Err(GitguyError::Config(_))
        ));
    }

    #[test]
    fn should_prefer_flag_then_env_then_file() {
        assert_eq!(
            resolve_key(Some("flag"), Some("env"), Some("file")).unwrap(),
            "flag"
        );
        assert_eq!(resolve_key(None, Some("env"), Some("file")).unwrap(), "env");
        assert_eq!(resolve_key(Some(""), Some(" "), Some("file")).unwrap(), "file");
        assert!(matches!(
            resolve_key(None, None, None),
            Err(GitguyError::MissingApiKey)
        ));
    }

    #[test]
    fn should_expand_id_placeholder() {
        // when
        let name = expand_pr_template("PR_{{ID}}.md");

        // then
        let id: u16 = name
            .strip_prefix("PR_")
            .and_then(|rest| rest.strip_suffix(".md"))
            .unwrap()
            .parse()
            .unwrap();
        assert!(id <= 255);
    }

    #[test]
    fn should_use_one_id_for_every_placeholder() {
        let name = expand_pr_template("{{ID}}_PR_{{id}}.md");
        let (first, rest) = name.split_once("_PR_").unwrap();
        assert_eq!(rest, format!("{}.md", first));
    }

    #[test]
    fn should_leave_plain_names_alone() {
        assert_eq!(expand_pr_template("notes.md"), "notes.md");
        assert_eq!(expand_pr_template(""), "");
    }
}
