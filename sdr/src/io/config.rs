//! Tool configuration stored in `sdr.toml`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Default config file name, resolved relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "sdr.toml";

/// Endpoint and model settings (TOML).
///
/// Secrets never live here; they come from [`crate::io::credentials`].
/// Missing fields default to the hosted OpenAI and SendGrid endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SdrConfig {
    /// Model identifier submitted with every agent invocation.
    pub model: String,

    /// Base URL of the OpenAI-compatible API (without `/chat/completions`).
    pub openai_base_url: String,

    /// Base URL of the SendGrid API (without `/v3/mail/send`).
    pub sendgrid_base_url: String,

    /// Per-request HTTP timeout in seconds for both services.
    pub request_timeout_secs: u64,
}

impl Default for SdrConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4.1-mini".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            sendgrid_base_url: "https://api.sendgrid.com".to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl SdrConfig {
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(anyhow!("model must be non-empty"));
        }
        for (field, url) in [
            ("openai_base_url", &self.openai_base_url),
            ("sendgrid_base_url", &self.sendgrid_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(anyhow!("{field} must be an http(s) URL, got {url:?}"));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be > 0"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `SdrConfig::default()`.
pub fn load_config(path: &Path) -> Result<SdrConfig> {
    if !path.exists() {
        let cfg = SdrConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SdrConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &SdrConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
