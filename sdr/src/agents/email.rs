//! Formatter: turns the chosen body into a subject plus HTML and sends it.
//!
//! The sequence is fixed: subject writer, then HTML converter, then exactly
//! one `send_email` call. A failing or empty step stops the run before
//! anything is sent.

use anyhow::{Context, Result, bail};
use tracing::{info, instrument};

use crate::agents::topology::Topology;
use crate::core::address::resolve_recipient;
use crate::core::campaign::CampaignContext;
use crate::core::cleanup::{attach_signature, clean_subject, strip_code_fence};
use crate::core::spec::AgentSpec;
use crate::core::types::{DeliveryReceipt, OutboundEmail};
use crate::io::mailer::EmailSender;
use crate::io::model::{ModelClient, ModelRequest};

/// The `send_email` function tool.
pub struct SendEmailTool<'a> {
    sender: &'a dyn EmailSender,
    ctx: &'a CampaignContext,
}

impl<'a> SendEmailTool<'a> {
    pub fn new(sender: &'a dyn EmailSender, ctx: &'a CampaignContext) -> Self {
        Self { sender, ctx }
    }

    /// Deliver once. The campaign recipient wins over `requested_to`.
    #[instrument(name = "send_email", skip_all)]
    pub async fn call(
        &self,
        requested_to: Option<&str>,
        subject: &str,
        html_body: &str,
    ) -> Result<(OutboundEmail, DeliveryReceipt)> {
        let email = OutboundEmail {
            to_address: resolve_recipient(Some(&self.ctx.recipient_email), requested_to),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        };
        let status_code = self
            .sender
            .send(&email)
            .await
            .with_context(|| format!("send email to {}", email.to_address))?;
        info!(status = status_code, to = %email.to_address, "email sent");
        let receipt = DeliveryReceipt {
            status_code,
            recipient: email.to_address.clone(),
            signer: self.ctx.signer_line(),
        };
        Ok((email, receipt))
    }
}

/// Handoff target of the sales manager.
pub struct EmailAgent<'a> {
    topology: &'a Topology,
    ctx: &'a CampaignContext,
}

impl<'a> EmailAgent<'a> {
    pub fn new(topology: &'a Topology, ctx: &'a CampaignContext) -> Self {
        Self { topology, ctx }
    }

    #[instrument(name = "email_agent", skip_all)]
    pub async fn run(
        &self,
        model: &dyn ModelClient,
        sender: &dyn EmailSender,
        body: &str,
    ) -> Result<(OutboundEmail, DeliveryReceipt)> {
        let raw_subject = ask(model, self.topology.subject_writer()?, body)
            .await
            .context("write subject")?;
        let subject = clean_subject(&raw_subject)?;
        info!(%subject, "subject written");

        let raw_html = ask(model, self.topology.html_converter()?, body)
            .await
            .context("convert body to HTML")?;
        if strip_code_fence(&raw_html).is_empty() {
            bail!("HTML converter returned an empty body");
        }
        let html_body = attach_signature(&raw_html, self.topology.signature_html());

        SendEmailTool::new(sender, self.ctx)
            .call(None, &subject, &html_body)
            .await
    }
}

async fn ask(model: &dyn ModelClient, spec: &AgentSpec, input: &str) -> Result<String> {
    let request = ModelRequest {
        agent: spec.name.clone(),
        model: spec.model.clone(),
        instructions: spec.instructions.clone(),
        input: input.to_string(),
        output_schema: None,
    };
    model.complete(&request).await
}
