//! Draft generators: one styled cold-email writer per [`DraftStyle`].

use anyhow::{Context, Result, bail};
use tracing::{debug, instrument};

use crate::core::campaign::CampaignContext;
use crate::core::spec::AgentSpec;
use crate::core::types::{DraftCandidate, DraftStyle};
use crate::io::model::{ModelClient, ModelRequest};

/// Tool-call input the sales manager sends to every draft generator.
pub fn draft_brief(ctx: &CampaignContext) -> String {
    format!(
        "Write a cold sales email to {}.\nOutreach context: {}",
        ctx.recipient_name.as_deref().unwrap_or("the prospect"),
        ctx.context_message
    )
}

/// A draft generator bound to its rendered spec.
#[derive(Debug, Clone, Copy)]
pub struct DraftAgent<'a> {
    style: DraftStyle,
    spec: &'a AgentSpec,
}

impl<'a> DraftAgent<'a> {
    pub fn new(style: DraftStyle, spec: &'a AgentSpec) -> Self {
        Self { style, spec }
    }

    /// Produce one email body. Model errors are returned unchanged apart from context.
    #[instrument(skip_all, fields(agent = %self.spec.name, style = %self.style))]
    pub async fn write(&self, model: &dyn ModelClient, brief: &str) -> Result<DraftCandidate> {
        let request = ModelRequest {
            agent: self.spec.name.clone(),
            model: self.spec.model.clone(),
            instructions: self.spec.instructions.clone(),
            input: brief.to_string(),
            output_schema: None,
        };
        let body = model
            .complete(&request)
            .await
            .with_context(|| format!("{} draft", self.style))?;
        if body.trim().is_empty() {
            bail!("{} returned an empty draft", self.spec.name);
        }
        debug!(bytes = body.len(), "draft written");
        Ok(DraftCandidate {
            style: self.style,
            author: self.spec.name.clone(),
            body: body.trim().to_string(),
        })
    }
}
