//! Runtime configuration.
//!
//! Precedence: CLI > env (`FORUMQ_*`) > config file > defaults. The file is the
//! first that exists of `--config`, `$FORUMQ_CONFIG`, `~/.config/forumq.toml`,
//! `./forumq.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::ForumError;
use crate::query::{DEFAULT_LIMIT, MAX_LIMIT, TranslateOptions};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForumConfig {
    /// Page size when the request has no `limit` key.
    pub default_limit: usize,
    /// Upper bound a requested `limit` is clamped to.
    pub max_limit: usize,
    /// Concurrent store handles.
    pub max_connections: usize,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_retention: Option<usize>,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
            max_connections: 10,
            log_dir: None,
            log_level: None,
            log_retention: None,
        }
    }
}

impl ForumConfig {
    /// # Errors
    /// Returns `ForumError::Config` on malformed TOML or out-of-range values.
    pub fn from_toml_str(s: &str) -> Result<Self, ForumError> {
        let cfg: Self = toml::from_str(s).map_err(|e| ForumError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ForumError> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s).map_err(|e| ForumError::Config(format!("{}: {e}", path.display())))
    }

    /// Candidate config files, highest priority first.
    #[must_use]
    pub fn config_paths(cli_cfg: Option<&Path>) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = vec![];
        if let Some(p) = cli_cfg {
            paths.push(p.to_path_buf());
        }
        if let Ok(p) = std::env::var("FORUMQ_CONFIG") {
            paths.push(PathBuf::from(p));
        }
        if let Ok(home) = std::env::var("USERPROFILE").or_else(|_| std::env::var("HOME")) {
            paths.push(PathBuf::from(home).join(".config").join("forumq.toml"));
        }
        if let Ok(cur) = std::env::current_dir() {
            paths.push(cur.join("forumq.toml"));
        }
        paths
    }

    /// Defaults, then the first config file found, then the environment.
    ///
    /// # Errors
    /// An explicit `cli_cfg` that does not exist is an error, as is any malformed
    /// file or environment value.
    pub fn load(cli_cfg: Option<&Path>) -> Result<Self, ForumError> {
        if let Some(p) = cli_cfg
            && !p.exists()
        {
            return Err(ForumError::Config(format!("config file not found: {}", p.display())));
        }
        let mut cfg = match Self::config_paths(cli_cfg).into_iter().find(|p| p.is_file()) {
            Some(p) => {
                log::debug!("loading config from {}", p.display());
                Self::from_file(&p)?
            }
            None => Self::default(),
        };
        cfg.apply_env()?;
        Ok(cfg)
    }

    /// # Errors
    /// Returns `ForumError::Config` if a variable is set but unparsable.
    pub fn apply_env(&mut self) -> Result<(), ForumError> {
        self.apply_env_with(|k| std::env::var(k).ok())
    }

    /// Overlays `FORUMQ_DEFAULT_LIMIT`, `FORUMQ_MAX_LIMIT`, `FORUMQ_MAX_CONNECTIONS`,
    /// `FORUMQ_LOG_DIR`, `FORUMQ_LOG_LEVEL`, `FORUMQ_LOG_RETENTION`.
    ///
    /// # Errors
    /// Returns `ForumError::Config` if a variable is set but unparsable.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ForumError> {
        let num = |key: &str| -> Result<Option<usize>, ForumError> {
            lookup(key)
                .map(|v| {
                    v.trim()
                        .parse::<usize>()
                        .map_err(|e| ForumError::Config(format!("{key}={v}: {e}")))
                })
                .transpose()
        };
        if let Some(n) = num("FORUMQ_DEFAULT_LIMIT")? {
            self.default_limit = n;
        }
        if let Some(n) = num("FORUMQ_MAX_LIMIT")? {
            self.max_limit = n;
        }
        if let Some(n) = num("FORUMQ_MAX_CONNECTIONS")? {
            self.max_connections = n;
        }
        if let Some(n) = num("FORUMQ_LOG_RETENTION")? {
            self.log_retention = Some(n);
        }
        if let Some(d) = lookup("FORUMQ_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(d));
        }
        if let Some(l) = lookup("FORUMQ_LOG_LEVEL") {
            self.log_level = Some(l);
        }
        self.validate()
    }

    /// # Errors
    /// Returns `ForumError::Config` when limits or pool size are out of range.
    pub fn validate(&self) -> Result<(), ForumError> {
        if self.max_limit == 0 {
            return Err(ForumError::Config("max_limit must be at least 1".into()));
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(ForumError::Config(format!(
                "default_limit must be between 1 and max_limit ({})",
                self.max_limit
            )));
        }
        if self.max_connections == 0 {
            return Err(ForumError::Config("max_connections must be at least 1".into()));
        }
        Ok(())
    }

    #[must_use]
    pub const fn translate_options(&self) -> TranslateOptions {
        TranslateOptions { default_limit: self.default_limit, max_limit: self.max_limit }
    }
}
