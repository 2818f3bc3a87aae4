//! Console output for a finished run.

use std::fmt::Write as _;

use crate::core::campaign::CampaignContext;
use crate::core::types::CampaignOutcome;

const RULE_WIDTH: usize = 90;

/// Line printed before agents start.
pub fn render_start(ctx: &CampaignContext) -> String {
    format!(
        "\n🚀 {} is crafting personalized email for {}...",
        ctx.signer_line(),
        ctx.target_line()
    )
}

/// Success report: header, delivery summary, then the email body.
pub fn render_report(from_email: &str, outcome: &CampaignOutcome) -> String {
    let ctx = &outcome.context;
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "\n{rule}");
    let _ = writeln!(
        out,
        "📧 PERSONALIZED EMAIL FROM {} TO {}:",
        ctx.signer_line().to_uppercase(),
        ctx.target_line().to_uppercase()
    );
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "From: {} <{from_email}>", ctx.signer_line());
    let _ = writeln!(out, "To: {}", outcome.email.to_address);
    let _ = writeln!(out, "Context: {}", ctx.context_message);
    let _ = writeln!(out, "Subject: {}", outcome.email.subject);
    let _ = writeln!(
        out,
        "Status: {} (selected {} draft: {})",
        outcome.receipt.status_code, outcome.selected.style, outcome.verdict.rationale
    );
    let _ = writeln!(out, "\n{}", outcome.selected.body);
    let _ = writeln!(out, "{rule}");
    out
}

/// The single user-facing error line.
pub fn render_error(err: &anyhow::Error) -> String {
    format!("❌ Error: {err:#}")
}
