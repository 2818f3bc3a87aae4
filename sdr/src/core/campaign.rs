//! Campaign parameters collected once per run.
//!
//! [`CampaignInput`] is the raw, possibly blank, form of what the operator
//! typed. [`CampaignContext`] is the resolved value every agent reads: blank
//! required fields carry their documented defaults and blank optional fields
//! are `None`.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

pub const DEFAULT_COMPANY_NAME: &str = "Your Company";
pub const DEFAULT_COMPANY_DESCRIPTION: &str = "a company that provides innovative solutions";
pub const DEFAULT_SIGNER_NAME: &str = "Sales Representative";
pub const DEFAULT_RECIPIENT_EMAIL: &str = "prospect@targetcompany.com";
pub const DEFAULT_CONTEXT_MESSAGE: &str = "I'd like to introduce you to our solution";

/// Raw operator input. Every field may be missing or blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignInput {
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub signer_name: Option<String>,
    pub signer_title: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_email: Option<String>,
    pub context_message: Option<String>,
}

/// Resolved parameters for one email-generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignContext {
    pub company_name: String,
    pub company_description: String,
    pub signer_name: String,
    pub signer_title: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_email: String,
    pub context_message: String,
}

impl CampaignContext {
    /// Resolve raw input, substituting defaults for blank fields.
    pub fn from_input(input: &CampaignInput) -> Self {
        Self {
            company_name: or_default(&input.company_name, DEFAULT_COMPANY_NAME),
            company_description: or_default(
                &input.company_description,
                DEFAULT_COMPANY_DESCRIPTION,
            ),
            signer_name: or_default(&input.signer_name, DEFAULT_SIGNER_NAME),
            signer_title: non_blank(&input.signer_title),
            recipient_name: non_blank(&input.recipient_name),
            recipient_email: or_default(&input.recipient_email, DEFAULT_RECIPIENT_EMAIL),
            context_message: or_default(&input.context_message, DEFAULT_CONTEXT_MESSAGE),
        }
    }

    /// Check the fields downstream agents rely on being present.
    pub fn validate(&self) -> Result<()> {
        if self.recipient_email.trim().is_empty() {
            bail!("recipient_email must be non-empty");
        }
        if self.context_message.trim().is_empty() {
            bail!("context_message must be non-empty");
        }
        Ok(())
    }

    /// `"Jo"` or `"Jo, Founder"`.
    pub fn signer_line(&self) -> String {
        match &self.signer_title {
            Some(title) => format!("{}, {}", self.signer_name, title),
            None => self.signer_name.clone(),
        }
    }

    /// `"Ana at ana@x.com"` when the prospect is named, otherwise the bare address.
    pub fn target_line(&self) -> String {
        match &self.recipient_name {
            Some(name) => format!("{} at {}", name, self.recipient_email),
            None => self.recipient_email.clone(),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn or_default(value: &Option<String>, default: &str) -> String {
    non_blank(value).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_resolves_to_documented_defaults() {
        let input = CampaignInput {
            company_name: Some("   ".to_string()),
            ..CampaignInput::default()
        };
        let ctx = CampaignContext::from_input(&input);

        assert_eq!(ctx.company_name, DEFAULT_COMPANY_NAME);
        assert_eq!(ctx.company_description, DEFAULT_COMPANY_DESCRIPTION);
        assert_eq!(ctx.signer_name, DEFAULT_SIGNER_NAME);
        assert_eq!(ctx.recipient_email, DEFAULT_RECIPIENT_EMAIL);
        assert_eq!(ctx.context_message, DEFAULT_CONTEXT_MESSAGE);
        assert_eq!(ctx.signer_title, None);
        assert_eq!(ctx.recipient_name, None);
        ctx.validate().expect("defaults satisfy invariants");
    }

    #[test]
    fn provided_values_are_trimmed_and_kept() {
        let input = CampaignInput {
            company_name: Some(" Acme ".to_string()),
            signer_title: Some(" Founder".to_string()),
            recipient_email: Some("x@y.com".to_string()),
            ..CampaignInput::default()
        };
        let ctx = CampaignContext::from_input(&input);

        assert_eq!(ctx.company_name, "Acme");
        assert_eq!(ctx.signer_title.as_deref(), Some("Founder"));
        assert_eq!(ctx.recipient_email, "x@y.com");
    }

    #[test]
    fn signer_and_target_lines_omit_absent_parts() {
        let mut ctx = CampaignContext::from_input(&CampaignInput {
            signer_name: Some("Jo".to_string()),
            recipient_email: Some("x@y.com".to_string()),
            ..CampaignInput::default()
        });
        assert_eq!(ctx.signer_line(), "Jo");
        assert_eq!(ctx.target_line(), "x@y.com");

        ctx.signer_title = Some("CEO".to_string());
        ctx.recipient_name = Some("Ana".to_string());
        assert_eq!(ctx.signer_line(), "Jo, CEO");
        assert_eq!(ctx.target_line(), "Ana at x@y.com");
    }

    #[test]
    fn validate_names_the_empty_field() {
        let mut ctx = CampaignContext::from_input(&CampaignInput::default());
        ctx.context_message = String::new();
        let err = ctx.validate().unwrap_err();
        assert!(err.to_string().contains("context_message"));
    }
}
