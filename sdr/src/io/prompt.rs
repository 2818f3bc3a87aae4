//! Instruction rendering for every agent in the run.
//!
//! Templates live in `io/prompts/` and are rendered with minijinja from the
//! [`CampaignContext`]. Small partials (persona, recipient clause, signer
//! clause, signature block) are separate templates so each can be rendered
//! and checked on its own.

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use serde::Serialize;
use tracing::debug;

use crate::core::campaign::CampaignContext;
use crate::core::types::{DraftCandidate, DraftStyle};

const TEMPLATES: &[(&str, &str)] = &[
    ("persona.md", include_str!("prompts/persona.md")),
    (
        "recipient_clause.md",
        include_str!("prompts/recipient_clause.md"),
    ),
    ("signer_clause.md", include_str!("prompts/signer_clause.md")),
    (
        "tool_description.md",
        include_str!("prompts/tool_description.md"),
    ),
    ("draft.md", include_str!("prompts/draft.md")),
    ("sales_manager.md", include_str!("prompts/sales_manager.md")),
    ("email_agent.md", include_str!("prompts/email_agent.md")),
    ("subject_writer.md", include_str!("prompts/subject_writer.md")),
    ("html_converter.md", include_str!("prompts/html_converter.md")),
    (
        "selection_request.md",
        include_str!("prompts/selection_request.md"),
    ),
    ("signature.html", include_str!("prompts/signature.html")),
];

/// Template engine wrapper around minijinja.
struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    fn new() -> Self {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)
                .expect("bundled instruction templates should be valid");
        }
        Self { env }
    }

    fn render<S: Serialize>(&self, name: &str, vars: S) -> Result<String> {
        let template = self.env.get_template(name)?;
        let rendered = template
            .render(vars)
            .with_context(|| format!("render template {name}"))?;
        Ok(rendered)
    }
}

/// Template variables: the campaign fields plus the optional draft style.
#[derive(Serialize)]
struct InstructionVars<'a> {
    #[serde(flatten)]
    campaign: &'a CampaignContext,
    style: Option<DraftStyle>,
}

/// A parsed section from rendered template output.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedSection {
    /// Section identifier (e.g., "persona", "recipient").
    key: String,
    content: String,
}

/// Parse sections from rendered template output using HTML comment markers.
///
/// Markers follow format: `<!-- section:KEY required|droppable -->`. Droppable
/// sections that render empty are left out.
fn parse_sections(rendered: &str) -> Vec<ParsedSection> {
    use std::sync::LazyLock;
    static SECTION_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
        regex::Regex::new(r"<!--\s*section:(\w+)\s+(required|droppable)\s*-->")
            .expect("section regex is valid")
    });

    let matches: Vec<_> = SECTION_RE.captures_iter(rendered).collect();
    let mut sections = Vec::with_capacity(matches.len());

    for (i, caps) in matches.iter().enumerate() {
        let (Some(marker), Some(key), Some(kind)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(rendered.len(), |next| next.start());

        let content = rendered[marker.end()..end].trim().to_string();
        if content.is_empty() && kind.as_str() == "droppable" {
            debug!(section = key.as_str(), "dropped empty section");
            continue;
        }
        sections.push(ParsedSection {
            key: key.as_str().to_string(),
            content,
        });
    }

    sections
}

/// Rendered instructions for one agent, kept as keyed sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionSet {
    sections: Vec<ParsedSection>,
}

impl InstructionSet {
    fn from_rendered(rendered: &str) -> Self {
        Self {
            sections: parse_sections(rendered),
        }
    }

    /// Join sections into the final instruction string.
    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn section(&self, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.content.as_str())
    }

    pub fn section_keys(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.key.as_str()).collect()
    }
}

/// Renders instructions and message text for a single campaign.
pub struct InstructionBuilder<'a> {
    campaign: &'a CampaignContext,
    engine: PromptEngine,
}

impl<'a> InstructionBuilder<'a> {
    pub fn new(campaign: &'a CampaignContext) -> Self {
        Self {
            campaign,
            engine: PromptEngine::new(),
        }
    }

    fn vars(&self, style: Option<DraftStyle>) -> InstructionVars<'a> {
        InstructionVars {
            campaign: self.campaign,
            style,
        }
    }

    fn sections(&self, name: &str, style: Option<DraftStyle>) -> Result<InstructionSet> {
        let rendered = self.engine.render(name, self.vars(style))?;
        Ok(InstructionSet::from_rendered(&rendered))
    }

    pub fn draft(&self, style: DraftStyle) -> Result<InstructionSet> {
        self.sections("draft.md", Some(style))
    }

    pub fn sales_manager(&self) -> Result<InstructionSet> {
        self.sections("sales_manager.md", None)
    }

    pub fn email_agent(&self) -> Result<InstructionSet> {
        self.sections("email_agent.md", None)
    }

    pub fn subject_writer(&self) -> Result<InstructionSet> {
        self.sections("subject_writer.md", None)
    }

    pub fn html_converter(&self) -> Result<InstructionSet> {
        self.sections("html_converter.md", None)
    }

    /// Description shared by the three draft tools.
    pub fn draft_tool_description(&self) -> Result<String> {
        let text = self.engine.render("tool_description.md", self.vars(None))?;
        Ok(text.trim().to_string())
    }

    /// Styled HTML signature block (HTML-escaped values).
    pub fn signature_block(&self) -> Result<String> {
        let html = self.engine.render("signature.html", self.vars(None))?;
        Ok(html.trim().to_string())
    }

    /// User message asking the judge to pick among `candidates`.
    pub fn selection_request(&self, candidates: &[DraftCandidate]) -> Result<String> {
        self.engine.render(
            "selection_request.md",
            context! {
                candidates => candidates,
                context_message => &self.campaign.context_message,
                company_name => &self.campaign.company_name,
                recipient_name => &self.campaign.recipient_name,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::campaign::CampaignInput;

    fn campaign(title: Option<&str>, recipient: Option<&str>) -> CampaignContext {
        CampaignContext::from_input(&CampaignInput {
            company_name: Some("Acme".to_string()),
            company_description: Some("a widget maker".to_string()),
            signer_name: Some("Jo".to_string()),
            signer_title: title.map(str::to_string),
            recipient_name: recipient.map(str::to_string),
            recipient_email: Some("x@y.com".to_string()),
            context_message: Some("New funding".to_string()),
        })
    }

    #[test]
    fn draft_sections_appear_in_stable_order() {
        let ctx = campaign(Some("Founder"), Some("Ana"));
        let set = InstructionBuilder::new(&ctx)
            .draft(DraftStyle::Professional)
            .expect("render");

        assert_eq!(
            set.section_keys(),
            vec!["persona", "style", "recipient", "signoff"]
        );
        let text = set.render();
        assert!(text.starts_with("You are Jo, Founder working for Acme, a widget maker."));
        assert!(text.contains("professional, serious, cold emails for Ana."));
        assert!(text.contains("The recipient's name is Ana - address them professionally"));
        assert!(text.contains("with your name and title (Founder)."));
    }

    #[test]
    fn empty_recipient_section_is_dropped() {
        let ctx = campaign(None, None);
        let set = InstructionBuilder::new(&ctx)
            .draft(DraftStyle::Witty)
            .expect("render");

        assert!(set.section("recipient").is_none());
        let text = set.render();
        assert!(text.contains("likely to get a response for your prospect."));
        assert!(text.contains("with your name in a personable way."));
        assert!(!text.contains("\n\n"), "no blank gaps: {text}");
    }

    #[test]
    fn blank_title_leaves_no_title_fragment() {
        let ctx = campaign(None, None);
        let builder = InstructionBuilder::new(&ctx);

        for style in DraftStyle::ALL {
            let text = builder.draft(style).expect("draft").render();
            assert!(!text.contains("title"), "{style}: {text}");
            assert!(text.starts_with("You are Jo working for"));
        }
        let manager = builder.sales_manager().expect("manager").render();
        assert!(manager.contains("signed by Jo from Acme."));
    }

    #[test]
    fn concise_style_signs_briefly() {
        let ctx = campaign(Some("CEO"), Some("Ana"));
        let text = InstructionBuilder::new(&ctx)
            .draft(DraftStyle::Concise)
            .expect("render")
            .render();
        assert!(text.contains("concise, to-the-point emails for Ana."));
        assert!(text.contains("address them directly and briefly."));
        assert!(text.contains("Always sign your emails briefly with your name and title (CEO)."));
    }

    #[test]
    fn manager_mentions_recipient_only_when_named() {
        let named = campaign(Some("CEO"), Some("Ana"));
        let text = InstructionBuilder::new(&named)
            .sales_manager()
            .expect("render")
            .render();
        assert!(text.contains("IMPORTANT: You are writing this email for Ana."));
        assert!(text.contains("signed by Jo, CEO from Acme."));

        let anonymous = campaign(None, None);
        let set = InstructionBuilder::new(&anonymous)
            .sales_manager()
            .expect("render");
        assert!(set.section("recipient").is_none());
    }

    #[test]
    fn tool_description_combines_clauses() {
        let ctx = campaign(Some("CEO"), None);
        let desc = InstructionBuilder::new(&ctx)
            .draft_tool_description()
            .expect("render");
        assert_eq!(
            desc,
            "Sales Rep Agent (Jo) That Writes Cold Sales E-mails for Acme for your prospect signed by Jo, CEO"
        );
    }

    #[test]
    fn signature_block_includes_title_only_when_present() {
        let with_title = campaign(Some("Founder"), None);
        let html = InstructionBuilder::new(&with_title)
            .signature_block()
            .expect("render");
        assert!(html.contains(">Jo<"));
        assert!(html.contains(">Founder<"));
        assert!(html.contains(">Acme<"));

        let without = campaign(None, None);
        let html = InstructionBuilder::new(&without)
            .signature_block()
            .expect("render");
        assert_eq!(html.matches("<tr>").count(), 2);
    }

    #[test]
    fn signature_block_escapes_markup() {
        let mut ctx = campaign(None, None);
        ctx.signer_name = "<b>Jo</b>".to_string();
        let html = InstructionBuilder::new(&ctx)
            .signature_block()
            .expect("render");
        assert!(html.contains("&lt;b&gt;Jo"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn selection_request_numbers_candidates() {
        let ctx = campaign(None, Some("Ana"));
        let candidates: Vec<DraftCandidate> = DraftStyle::ALL
            .iter()
            .map(|style| DraftCandidate {
                style: *style,
                author: format!("Jo - {} Style", style.label()),
                body: format!("{style} body\n"),
            })
            .collect();
        let text = InstructionBuilder::new(&ctx)
            .selection_request(&candidates)
            .expect("render");

        assert!(text.starts_with("Outreach context: New funding"));
        assert!(text.contains("<draft number=\"1\" style=\"professional\""));
        assert!(text.contains("<draft number=\"3\" style=\"concise\""));
        assert!(text.contains("witty body\n</draft>"));
        assert!(text.contains("Pick the single best email for Acme for Ana."));
    }
}
