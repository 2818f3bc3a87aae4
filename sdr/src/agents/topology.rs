//! The fixed agent tree for one campaign.
//!
//! ```text
//! Sales Manager Agent
//! ├── tool sales_rep_agent1 → "{signer} - Professional Style"
//! ├── tool sales_rep_agent2 → "{signer} - Witty Style"
//! ├── tool sales_rep_agent3 → "{signer} - Concise Style"
//! └── handoff → Email Agent
//!     ├── tool subject_tool → Subject Writer
//!     ├── tool html_tool    → HTML Converter
//!     └── tool send_email   (function)
//! ```

use anyhow::{Context, Result, anyhow};

use crate::core::campaign::CampaignContext;
use crate::core::spec::{AgentSpec, ToolBinding};
use crate::core::types::DraftStyle;
use crate::io::prompt::InstructionBuilder;

pub const SALES_MANAGER: &str = "Sales Manager Agent";
pub const EMAIL_AGENT: &str = "Email Agent";
pub const SUBJECT_WRITER: &str = "Subject Writer";
pub const HTML_CONVERTER: &str = "HTML Converter";

pub const SUBJECT_TOOL: &str = "subject_tool";
pub const HTML_TOOL: &str = "html_tool";
pub const SEND_EMAIL_TOOL: &str = "send_email";

/// Name of the draft generator for `style`.
pub fn draft_agent_name(ctx: &CampaignContext, style: DraftStyle) -> String {
    format!("{} - {} Style", ctx.signer_name, style.label())
}

/// Rendered agent tree plus the pieces agents need at run time.
#[derive(Debug, Clone)]
pub struct Topology {
    root: AgentSpec,
    signature_html: String,
}

impl Topology {
    /// Render every agent's instructions and wire the edges.
    pub fn build(ctx: &CampaignContext, model: &str) -> Result<Self> {
        let prompts = InstructionBuilder::new(ctx);

        let subject_writer = AgentSpec::new(
            SUBJECT_WRITER,
            model,
            prompts.subject_writer()?.render(),
        );
        let html_converter = AgentSpec::new(
            HTML_CONVERTER,
            model,
            prompts.html_converter()?.render(),
        );
        let email_agent = AgentSpec::new(EMAIL_AGENT, model, prompts.email_agent()?.render())
            .with_tool(ToolBinding::agent(
                SUBJECT_TOOL,
                "A tool that writes a subject for a cold sales email.",
                subject_writer,
            ))
            .with_tool(ToolBinding::agent(
                HTML_TOOL,
                "A tool that converts a text email body to an HTML email body.",
                html_converter,
            ))
            .with_tool(ToolBinding::function(
                SEND_EMAIL_TOOL,
                "Send out an email with the given subject and HTML body to the sales prospect.",
            ));

        let description = prompts.draft_tool_description()?;
        let mut manager = AgentSpec::new(SALES_MANAGER, model, prompts.sales_manager()?.render());
        for style in DraftStyle::ALL {
            let draft = AgentSpec::new(
                draft_agent_name(ctx, style),
                model,
                prompts
                    .draft(style)
                    .with_context(|| format!("render {style} draft instructions"))?
                    .render(),
            );
            manager = manager.with_tool(ToolBinding::agent(
                style.tool_name(),
                description.clone(),
                draft,
            ));
        }
        let root = manager.with_handoff(email_agent);

        Ok(Self {
            root,
            signature_html: prompts.signature_block()?,
        })
    }

    /// Root of the tree.
    pub fn sales_manager(&self) -> &AgentSpec {
        &self.root
    }

    pub fn draft(&self, style: DraftStyle) -> Result<&AgentSpec> {
        tool_agent(&self.root, style.tool_name())
    }

    pub fn email_agent(&self) -> Result<&AgentSpec> {
        self.root
            .handoffs
            .iter()
            .find(|spec| spec.name == EMAIL_AGENT)
            .ok_or_else(|| anyhow!("{SALES_MANAGER} has no handoff to {EMAIL_AGENT}"))
    }

    pub fn subject_writer(&self) -> Result<&AgentSpec> {
        tool_agent(self.email_agent()?, SUBJECT_TOOL)
    }

    pub fn html_converter(&self) -> Result<&AgentSpec> {
        tool_agent(self.email_agent()?, HTML_TOOL)
    }

    /// Styled signature block appended to the HTML body.
    pub fn signature_html(&self) -> &str {
        &self.signature_html
    }
}

fn tool_agent<'a>(spec: &'a AgentSpec, tool_name: &str) -> Result<&'a AgentSpec> {
    spec.find_tool(tool_name)
        .and_then(ToolBinding::agent_spec)
        .ok_or_else(|| anyhow!("{} has no agent tool {tool_name}", spec.name))
}
