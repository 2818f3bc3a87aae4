//! Service credentials read from the environment and an optional `.env` file.
//!
//! Values are collected into an immutable [`Credentials`] value that is passed
//! to the clients explicitly. The process environment is only read.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::debug;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const SENDGRID_API_KEY: &str = "SENDGRID_API_KEY";
pub const SENDGRID_FROM_EMAIL: &str = "SENDGRID_FROM_EMAIL";

/// Settings that must be present before any agent runs.
pub const REQUIRED_SETTINGS: [&str; 3] = [OPENAI_API_KEY, SENDGRID_API_KEY, SENDGRID_FROM_EMAIL];

/// Snapshot of key/value settings visible to this run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Process environment overlaid with `dotenv_path` when that file exists.
    ///
    /// Entries from the file win over the environment.
    pub fn load(dotenv_path: &Path) -> Result<Self> {
        let mut values: HashMap<String, String> = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        if dotenv_path.exists() {
            let entries = dotenvy::from_path_iter(dotenv_path)
                .with_context(|| format!("open {}", dotenv_path.display()))?;
            let mut loaded = 0usize;
            for entry in entries {
                let (key, value) =
                    entry.with_context(|| format!("parse {}", dotenv_path.display()))?;
                values.insert(key, value);
                loaded += 1;
            }
            debug!(path = %dotenv_path.display(), loaded, "merged dotenv entries");
        }
        Ok(Self { values })
    }

    /// Trimmed, non-empty value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Validated credentials for the model and email services.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub openai_api_key: String,
    pub sendgrid_api_key: String,
    /// Verified sender address registered with SendGrid.
    pub from_email: String,
}

impl Credentials {
    /// Extract credentials, naming every missing setting in the error.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let missing: Vec<&str> = REQUIRED_SETTINGS
            .into_iter()
            .filter(|key| settings.get(key).is_none())
            .collect();
        if !missing.is_empty() {
            bail!(
                "missing required setting{}: {}",
                if missing.len() > 1 { "s" } else { "" },
                missing.join(", ")
            );
        }

        let from_email = settings.get(SENDGRID_FROM_EMAIL).unwrap_or_default();
        if !from_email.contains('@') {
            bail!("{SENDGRID_FROM_EMAIL} must be an email address, got {from_email:?}");
        }

        Ok(Self {
            openai_api_key: settings.get(OPENAI_API_KEY).unwrap_or_default().to_string(),
            sendgrid_api_key: settings
                .get(SENDGRID_API_KEY)
                .unwrap_or_default()
                .to_string(),
            from_email: from_email.to_string(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &"<redacted>")
            .field("sendgrid_api_key", &"<redacted>")
            .field("from_email", &self.from_email)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_settings() -> Settings {
        Settings::from_pairs([
            (OPENAI_API_KEY, "sk-test"),
            (SENDGRID_API_KEY, "SG.test"),
            (SENDGRID_FROM_EMAIL, "me@acme.com"),
        ])
    }

    #[test]
    fn complete_settings_produce_credentials() {
        let creds = Credentials::from_settings(&full_settings()).expect("creds");
        assert_eq!(creds.openai_api_key, "sk-test");
        assert_eq!(creds.from_email, "me@acme.com");
    }

    #[test]
    fn blank_key_is_reported_by_name() {
        let mut settings = full_settings();
        settings
            .values
            .insert(SENDGRID_API_KEY.to_string(), "   ".to_string());
        let err = Credentials::from_settings(&settings).unwrap_err();
        assert_eq!(err.to_string(), "missing required setting: SENDGRID_API_KEY");
    }

    #[test]
    fn every_missing_setting_is_listed() {
        let err = Credentials::from_settings(&Settings::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing required settings: OPENAI_API_KEY, SENDGRID_API_KEY, SENDGRID_FROM_EMAIL"
        );
    }

    #[test]
    fn from_email_must_look_like_an_address() {
        let mut settings = full_settings();
        settings
            .values
            .insert(SENDGRID_FROM_EMAIL.to_string(), "nobody".to_string());
        let err = Credentials::from_settings(&settings).unwrap_err();
        assert!(err.to_string().contains(SENDGRID_FROM_EMAIL));
    }

    #[test]
    fn dotenv_entries_override_environment() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(".env");
        std::fs::write(&path, "SDR_TEST_ONLY_KEY=from-file\n").expect("write");
        let settings = Settings::load(&path).expect("load");
        assert_eq!(settings.get("SDR_TEST_ONLY_KEY"), Some("from-file"));
    }

    #[test]
    fn debug_output_redacts_keys() {
        let creds = Credentials::from_settings(&full_settings()).expect("creds");
        let shown = format!("{creds:?}");
        assert!(!shown.contains("sk-test"));
        assert!(shown.contains("me@acme.com"));
    }
}
