use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable checked before the credentials file.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const APP_DIR: &str = "gemtalk";
const LOCAL_RC: &str = ".gemtalkrc";
const CREDENTIALS_FILE: &str = "config.json";

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Auto,
    Light,
    Dark,
}

impl ThemeMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {flag}: {reason}")]
    InvalidValue {
        flag: &'static str,
        value: String,
        reason: &'static str,
    },
    #[error("{flag} needs a value")]
    MissingValue { flag: &'static str },
    #[error("malformed credentials file {}: {source}", path.display())]
    Credentials {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Settings that can come from rc files or the command line.
///
/// `None` means "not given here" so later sources can fill it in.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub model: Option<String>,
    pub history: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub theme: Option<ThemeMode>,
    pub log_file: Option<PathBuf>,
    pub no_welcome: bool,
}

impl ConfigFlags {
    /// Merge `other` over `self`: options in `other` win, booleans accumulate.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            model: other.model.clone().or_else(|| self.model.clone()),
            history: other.history.or(self.history),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            theme: other.theme.or(self.theme),
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
            no_welcome: self.no_welcome || other.no_welcome,
        }
    }
}

pub fn global_config_path() -> PathBuf {
    config_dir().map_or_else(|| PathBuf::from(LOCAL_RC), |dir| dir.join("config"))
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(LOCAL_RC)
}

/// `config.json` holding `{"ApiKey": "..."}`, next to the global rc file.
pub fn credentials_path() -> PathBuf {
    config_dir().map_or_else(|| PathBuf::from(CREDENTIALS_FILE), |dir| dir.join(CREDENTIALS_FILE))
}

fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return Some(PathBuf::from(appdata).join(APP_DIR));
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join(APP_DIR),
            );
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg).join(APP_DIR));
        }
        if let Some(home) = std::env::var_os("HOME") {
            return Some(PathBuf::from(home).join(".config").join(APP_DIR));
        }
    }

    None
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    parse_flag_tokens(&tokens).with_context(|| format!("Invalid config {}", path.display()))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# gemtalk defaults (saved with --save)".to_string()];
    if let Some(model) = &flags.model {
        lines.push(format!("--model {model}"));
    }
    if let Some(history) = flags.history {
        lines.push(format!("--history {history}"));
    }
    if let Some(timeout) = flags.timeout_secs {
        lines.push(format!("--timeout {timeout}"));
    }
    if let Some(theme) = flags.theme {
        lines.push(format!("--theme {}", theme.as_str()));
    }
    if let Some(path) = &flags.log_file {
        lines.push(format!("--log-file {}", path.display()));
    }
    if flags.no_welcome {
        lines.push("--no-welcome".to_string());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Extract known flags from a token list; unknown tokens are skipped.
///
/// # Errors
///
/// Returns [`ConfigError`] for a known flag with a missing or malformed value.
pub fn parse_flag_tokens(tokens: &[String]) -> Result<ConfigFlags, ConfigError> {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        if token == "--no-welcome" {
            flags.no_welcome = true;
            i += 1;
            continue;
        }
        let Some((flag, value, consumed)) = split_valued_flag(tokens, i)? else {
            i += 1;
            continue;
        };
        match flag {
            "--model" => flags.model = Some(parse_model(value)?),
            "--history" => flags.history = Some(parse_history(value)?),
            "--timeout" => flags.timeout_secs = Some(parse_timeout(value)?),
            "--theme" => flags.theme = Some(parse_theme(value)?),
            "--log-file" => flags.log_file = Some(PathBuf::from(value)),
            _ => {}
        }
        i += consumed;
    }
    Ok(flags)
}

const VALUED_FLAGS: &[&str] = &["--model", "--history", "--timeout", "--theme", "--log-file"];

/// Recognize `--flag value` and `--flag=value` at `tokens[i]`.
fn split_valued_flag(
    tokens: &[String],
    i: usize,
) -> Result<Option<(&'static str, &str, usize)>, ConfigError> {
    let token = tokens[i].as_str();
    for &flag in VALUED_FLAGS {
        if token == flag {
            let value = tokens
                .get(i + 1)
                .ok_or(ConfigError::MissingValue { flag })?;
            return Ok(Some((flag, value.as_str(), 2)));
        }
        if let Some(value) = token.strip_prefix(flag).and_then(|rest| rest.strip_prefix('=')) {
            return Ok(Some((flag, value, 1)));
        }
    }
    Ok(None)
}

fn parse_model(value: &str) -> Result<String, ConfigError> {
    if value.is_empty() || value.contains('/') {
        return Err(ConfigError::InvalidValue {
            flag: "--model",
            value: value.to_string(),
            reason: "expected a model name such as gemini-2.5-flash",
        });
    }
    Ok(value.to_string())
}

/// Window size: a positive whole number.
///
/// Negative and non-numeric text is rejected here, before a window is built.
pub fn parse_history(value: &str) -> Result<usize, ConfigError> {
    let invalid = |reason| ConfigError::InvalidValue {
        flag: "--history",
        value: value.to_string(),
        reason,
    };
    if value.trim_start().starts_with('-') {
        return Err(invalid("must not be negative"));
    }
    match value.trim().parse::<usize>() {
        Ok(0) => Err(invalid("must be at least 1")),
        Ok(n) => Ok(n),
        Err(_) => Err(invalid("expected a whole number")),
    }
}

pub fn parse_timeout(value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidValue {
            flag: "--timeout",
            value: value.to_string(),
            reason: "expected a positive number of seconds",
        }),
    }
}

fn parse_theme(value: &str) -> Result<ThemeMode, ConfigError> {
    match value {
        "auto" => Ok(ThemeMode::Auto),
        "light" => Ok(ThemeMode::Light),
        "dark" => Ok(ThemeMode::Dark),
        _ => Err(ConfigError::InvalidValue {
            flag: "--theme",
            value: value.to_string(),
            reason: "expected auto, light or dark",
        }),
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Credentials {
    #[serde(rename = "ApiKey", default)]
    api_key: Option<String>,
}

/// Read the API key from a credentials file; a missing file is not an error.
///
/// # Errors
///
/// Fails when the file exists but cannot be read or is not valid JSON.
pub fn load_api_key(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read credentials {}", path.display()))?;
    let credentials: Credentials =
        serde_json::from_str(&content).map_err(|source| ConfigError::Credentials {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(credentials
        .api_key
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty()))
}

/// Prefer the environment value, then the credentials file.
pub fn resolve_api_key(env_value: Option<String>, path: &Path) -> Result<Option<String>> {
    if let Some(key) = env_value
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
    {
        return Ok(Some(key));
    }
    load_api_key(path)
}

pub fn save_api_key(path: &Path, api_key: &str) -> Result<()> {
    let credentials = Credentials {
        api_key: Some(api_key.trim().to_string()),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&credentials)?;
    fs::write(path, format!("{json}\n"))
        .with_context(|| format!("Failed to write credentials {}", path.display()))
}
