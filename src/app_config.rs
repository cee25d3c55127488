//! Application configuration loading for CLI defaults.
//!
//! Precedence: CLI flag > config file > built-in default.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use remote_size::size::constants::CONNECT_TIMEOUT_SECS;
use remote_size::{DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT_MS, DEFAULT_UNIT, SizeUnit};

use crate::cli::Args;

/// Key/value file configuration for CLI defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Default unit name.
    pub unit: Option<String>,
    /// Default overall deadline in milliseconds.
    pub timeout_ms: Option<i64>,
    /// Default attempt budget.
    pub max_attempts: Option<i64>,
    /// HTTP client connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Validates config values against the constraints the core enforces.
    pub fn validate(&self) -> Result<()> {
        if let Some(unit) = &self.unit {
            SizeUnit::parse(unit)
                .with_context(|| format!("Invalid config value for `unit`: {unit}"))?;
        }
        if let Some(timeout_ms) = self.timeout_ms
            && timeout_ms < 0
        {
            bail!("Invalid config value for `timeout_ms`: {timeout_ms}. Expected 0 or more");
        }
        if let Some(max_attempts) = self.max_attempts
            && max_attempts < 1
        {
            bail!("Invalid config value for `max_attempts`: {max_attempts}. Expected at least 1");
        }
        if let Some(secs) = self.connect_timeout_secs
            && !(1..=3600).contains(&secs)
        {
            bail!(
                "Invalid config value for `connect_timeout_secs`: {secs}. Expected range: 1..=3600"
            );
        }
        Ok(())
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Settings after merging CLI flags, file config and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub unit: String,
    pub timeout_ms: i64,
    pub max_attempts: i64,
    pub connect_timeout_secs: u64,
}

/// Merges CLI flags over file config over defaults.
#[must_use]
pub fn resolve_settings(args: &Args, file: Option<&FileConfig>) -> Settings {
    let file = file.cloned().unwrap_or_default();
    Settings {
        unit: args
            .unit
            .clone()
            .or(file.unit)
            .unwrap_or_else(|| DEFAULT_UNIT.to_string()),
        timeout_ms: args.timeout_ms.or(file.timeout_ms).unwrap_or(DEFAULT_TIMEOUT_MS),
        max_attempts: args
            .max_attempts
            .or(file.max_attempts)
            .unwrap_or(DEFAULT_MAX_ATTEMPTS),
        connect_timeout_secs: file.connect_timeout_secs.unwrap_or(CONNECT_TIMEOUT_SECS),
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/remote-size/config.toml`
/// 2. `$HOME/.config/remote-size/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("remote-size")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("remote-size")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();

        match key {
            "unit" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `unit` value on line {line_no}"))?;
                cfg.unit = Some(parsed);
            }
            "timeout_ms" => {
                let parsed = parse_integer_i64(value)
                    .with_context(|| format!("Invalid `timeout_ms` value on line {line_no}"))?;
                cfg.timeout_ms = Some(parsed);
            }
            "max_attempts" => {
                let parsed = parse_integer_i64(value)
                    .with_context(|| format!("Invalid `max_attempts` value on line {line_no}"))?;
                cfg.max_attempts = Some(parsed);
            }
            "connect_timeout_secs" => {
                let parsed = parse_integer_i64(value).with_context(|| {
                    format!("Invalid `connect_timeout_secs` value on line {line_no}")
                })?;
                let secs = u64::try_from(parsed)
                    .map_err(|_| anyhow::anyhow!("connect_timeout_secs must be non-negative"))?;
                cfg.connect_timeout_secs = Some(secs);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_i64(raw_value: &str) -> Result<i64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    Ok(token.parse::<i64>()?)
}
