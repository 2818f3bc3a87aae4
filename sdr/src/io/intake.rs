//! Interactive collection of campaign fields.
//!
//! Prompts run in a fixed order and only for fields not already supplied on
//! the command line. Reader and writer are injected so the sequence can be
//! driven from tests.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use crate::core::campaign::{CampaignContext, CampaignInput};

const RULE_WIDTH: usize = 70;
const SUB_RULE_WIDTH: usize = 35;

#[derive(Clone, Copy)]
enum Slot {
    CompanyName,
    CompanyDescription,
    SignerName,
    SignerTitle,
    RecipientName,
    RecipientEmail,
    ContextMessage,
}

impl Slot {
    fn of(self, input: &mut CampaignInput) -> &mut Option<String> {
        match self {
            Slot::CompanyName => &mut input.company_name,
            Slot::CompanyDescription => &mut input.company_description,
            Slot::SignerName => &mut input.signer_name,
            Slot::SignerTitle => &mut input.signer_title,
            Slot::RecipientName => &mut input.recipient_name,
            Slot::RecipientEmail => &mut input.recipient_email,
            Slot::ContextMessage => &mut input.context_message,
        }
    }
}

struct Field {
    heading: Option<&'static str>,
    hint: Option<&'static str>,
    label: &'static str,
    slot: Slot,
}

const FIELDS: [Field; 7] = [
    Field {
        heading: Some("🏢 COMPANY INFORMATION:"),
        hint: None,
        label: "Company Name",
        slot: Slot::CompanyName,
    },
    Field {
        heading: None,
        hint: Some(
            "Describe what your company does\n(e.g., 'a SaaS platform that helps businesses automate their workflows')",
        ),
        label: "Company Description",
        slot: Slot::CompanyDescription,
    },
    Field {
        heading: Some("✍️  EMAIL SIGNER INFORMATION:"),
        hint: Some("Who will be signing the emails?"),
        label: "Signer Name",
        slot: Slot::SignerName,
    },
    Field {
        heading: None,
        hint: Some(
            "What's their title/role? (optional)\n(e.g., 'Sales Director', 'Account Executive', 'Founder')",
        ),
        label: "Signer Title",
        slot: Slot::SignerTitle,
    },
    Field {
        heading: Some("🎯 TARGET PROSPECT INFORMATION:"),
        hint: None,
        label: "Prospect Name (optional)",
        slot: Slot::RecipientName,
    },
    Field {
        heading: None,
        hint: None,
        label: "Prospect Email",
        slot: Slot::RecipientEmail,
    },
    Field {
        heading: Some("💬 OUTREACH CONTEXT:"),
        hint: Some(
            "What context or message do you want to base the sales email on?\n(e.g., 'They recently raised Series A funding', 'They posted about compliance challenges')",
        ),
        label: "Context",
        slot: Slot::ContextMessage,
    },
];

/// Prompt for every field that is still `None`, leaving supplied fields untouched.
///
/// An empty answer is recorded as an empty string so defaults apply later.
/// End of input behaves like an empty answer.
pub fn prompt_missing<R: BufRead, W: Write>(
    mut input: CampaignInput,
    reader: &mut R,
    out: &mut W,
) -> Result<CampaignInput> {
    writeln!(out, "🚀 Welcome to SDR Agent Setup!")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;

    for field in &FIELDS {
        let slot = field.slot.of(&mut input);
        if slot.is_some() {
            continue;
        }
        if let Some(heading) = field.heading {
            writeln!(out, "\n{heading}")?;
            writeln!(out, "{}", "-".repeat(SUB_RULE_WIDTH))?;
        }
        if let Some(hint) = field.hint {
            writeln!(out, "{hint}")?;
        }
        write!(out, "{}: ", field.label)?;
        out.flush().context("flush prompt")?;

        let mut line = String::new();
        reader
            .read_line(&mut line)
            .with_context(|| format!("read {}", field.label))?;
        *slot = Some(line.trim().to_string());
    }

    Ok(input)
}

/// Setup summary shown before agents run.
pub fn write_summary<W: Write>(ctx: &CampaignContext, out: &mut W) -> Result<()> {
    writeln!(out, "\n✅ SETUP COMPLETE!")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "🏢 Your Company: {}", ctx.company_name)?;
    writeln!(out, "📋 Description: {}", ctx.company_description)?;
    writeln!(out, "✍️  Email Signer: {}", ctx.signer_line())?;
    writeln!(
        out,
        "🎯 Target Prospect: {} <{}>",
        ctx.recipient_name.as_deref().unwrap_or("Generic Prospect"),
        ctx.recipient_email
    )?;
    writeln!(out, "💬 Context: {}", ctx.context_message)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    Ok(())
}
