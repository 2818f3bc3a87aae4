//! Test doubles and fixtures for exercising the pipeline without network access.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tempfile::TempDir;

use crate::core::campaign::{CampaignContext, CampaignInput};
use crate::core::types::{DraftCandidate, DraftStyle, OutboundEmail};
use crate::io::config::{SdrConfig, write_config};
use crate::io::credentials::{OPENAI_API_KEY, SENDGRID_API_KEY, SENDGRID_FROM_EMAIL, Settings};
use crate::io::mailer::EmailSender;
use crate::io::model::{ModelClient, ModelRequest};

enum Script {
    Reply(String),
    Fail(String),
}

/// Model double answering by agent name.
///
/// Each rule matches when its pattern is a substring of the request's agent
/// name; the first matching rule wins. Unmatched agents get an error.
#[derive(Default)]
pub struct ScriptedModel {
    rules: Vec<(String, Script)>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, agent: &str, text: &str) -> Self {
        self.rules
            .push((agent.to_string(), Script::Reply(text.to_string())));
        self
    }

    pub fn fail_on(mut self, agent: &str, message: &str) -> Self {
        self.rules
            .push((agent.to_string(), Script::Fail(message.to_string())));
        self
    }

    /// Every request received so far, in call order.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn complete(&self, request: &ModelRequest) -> Result<String> {
        if let Ok(mut calls) = self.requests.lock() {
            calls.push(request.clone());
        }
        let rule = self
            .rules
            .iter()
            .find(|(pattern, _)| request.agent.contains(pattern.as_str()));
        match rule {
            Some((_, Script::Reply(text))) => Ok(text.clone()),
            Some((_, Script::Fail(message))) => Err(anyhow!("{message}")),
            None => Err(anyhow!("no scripted reply for agent {}", request.agent)),
        }
    }
}

/// Email sender double that records every delivery attempt.
pub struct RecordingSender {
    outcome: std::result::Result<u16, String>,
    sent: Mutex<Vec<OutboundEmail>>,
}

impl RecordingSender {
    pub fn accepting(status: u16) -> Self {
        Self {
            outcome: Ok(status),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Emails passed to `send`, including failed attempts.
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn attempts(&self) -> usize {
        self.sent().len()
    }
}

#[async_trait]
impl EmailSender for RecordingSender {
    async fn send(&self, email: &OutboundEmail) -> Result<u16> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email.clone());
        }
        self.outcome.clone().map_err(|message| anyhow!("{message}"))
    }
}

/// Acme / Jo / `x@y.com` campaign input.
pub fn sample_input() -> CampaignInput {
    CampaignInput {
        company_name: Some("Acme".to_string()),
        company_description: Some("a widget maker".to_string()),
        signer_name: Some("Jo".to_string()),
        signer_title: None,
        recipient_name: None,
        recipient_email: Some("x@y.com".to_string()),
        context_message: Some("They recently raised Series A funding".to_string()),
    }
}

pub fn sample_context() -> CampaignContext {
    CampaignContext::from_input(&sample_input())
}

/// One candidate per style, in fan-out order.
pub fn sample_drafts() -> Vec<DraftCandidate> {
    DraftStyle::ALL
        .into_iter()
        .map(|style| DraftCandidate {
            style,
            author: format!("Jo - {} Style", style.label()),
            body: format!("A {style} email from Jo"),
        })
        .collect()
}

/// Model scripted for a complete, successful run that picks draft `choice`.
pub fn scripted_campaign(choice: usize) -> ScriptedModel {
    ScriptedModel::new()
        .reply("Professional Style", "Dear prospect, a professional email from Jo")
        .reply("Witty Style", "Hey there, a witty email from Jo")
        .reply("Concise Style", "Hi, a concise email from Jo")
        .reply(
            "Sales Manager",
            &format!(r#"{{"choice": {choice}, "rationale": "most likely to get a reply"}}"#),
        )
        .reply("Subject Writer", "Congrats on the Series A")
        .reply(
            "HTML Converter",
            "<html><body><p>Hi, a concise email from Jo</p></body></html>",
        )
}

/// Settings carrying all three required credentials.
pub fn full_settings() -> Settings {
    Settings::from_pairs([
        (OPENAI_API_KEY, "sk-test"),
        (SENDGRID_API_KEY, "SG.test"),
        (SENDGRID_FROM_EMAIL, "sales@acme.com"),
    ])
}

/// Temp dir holding an `sdr.toml` written from `cfg`.
pub fn temp_config(cfg: &SdrConfig) -> Result<(TempDir, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("sdr.toml");
    write_config(&path, cfg)?;
    Ok((dir, path))
}
