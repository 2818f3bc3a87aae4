//! Picking the winning draft.
//!
//! The criterion is pluggable through [`SelectionPolicy`]. [`ModelJudge`]
//! asks the model under the sales-manager instructions and validates its
//! JSON verdict against `schemas/selection_verdict.schema.json`;
//! [`StylePreference`] always picks a fixed style without a model call.

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use jsonschema::Draft;
use serde_json::Value;
use tracing::{info, instrument};

use crate::core::campaign::CampaignContext;
use crate::core::cleanup::strip_code_fence;
use crate::core::spec::AgentSpec;
use crate::core::types::{DraftCandidate, DraftStyle, SelectionVerdict};
use crate::io::model::{ModelClient, ModelRequest, OutputSchema};
use crate::io::prompt::InstructionBuilder;

const VERDICT_SCHEMA: &str = include_str!("../../schemas/selection_verdict.schema.json");
const VERDICT_SCHEMA_NAME: &str = "selection_verdict";

/// Chooses one candidate out of the full draft set.
#[async_trait]
pub trait SelectionPolicy: Send + Sync {
    /// Return a verdict whose `choice` is a 1-based index into `candidates`.
    async fn select(
        &self,
        model: &dyn ModelClient,
        candidates: &[DraftCandidate],
    ) -> Result<SelectionVerdict>;
}

/// Model-backed judge running under the sales manager's instructions.
pub struct ModelJudge {
    agent: String,
    model: String,
    instructions: String,
    request_text: Box<dyn Fn(&[DraftCandidate]) -> Result<String> + Send + Sync>,
}

impl ModelJudge {
    /// `request_text` renders the user message listing the candidates.
    pub fn new<F>(manager: &AgentSpec, request_text: F) -> Self
    where
        F: Fn(&[DraftCandidate]) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            agent: manager.name.clone(),
            model: manager.model.clone(),
            instructions: manager.instructions.clone(),
            request_text: Box::new(request_text),
        }
    }

    /// Judge whose request text is the campaign's rendered selection prompt.
    pub fn for_campaign(manager: &AgentSpec, ctx: &CampaignContext) -> Self {
        let ctx = ctx.clone();
        Self::new(manager, move |candidates| {
            InstructionBuilder::new(&ctx).selection_request(candidates)
        })
    }
}

#[async_trait]
impl SelectionPolicy for ModelJudge {
    #[instrument(name = "model_judge", skip_all, fields(agent = %self.agent, candidates = candidates.len()))]
    async fn select(
        &self,
        model: &dyn ModelClient,
        candidates: &[DraftCandidate],
    ) -> Result<SelectionVerdict> {
        let schema = verdict_schema()?;
        let request = ModelRequest {
            agent: self.agent.clone(),
            model: self.model.clone(),
            instructions: self.instructions.clone(),
            input: (self.request_text)(candidates)?,
            output_schema: Some(OutputSchema {
                name: VERDICT_SCHEMA_NAME.to_string(),
                schema: schema.clone(),
            }),
        };
        let reply = model
            .complete(&request)
            .await
            .context("ask sales manager to pick a draft")?;
        let verdict = parse_verdict(&reply, &schema, candidates.len())?;
        info!(choice = verdict.choice, "draft selected");
        Ok(verdict)
    }
}

/// Deterministic policy: always pick the draft written in the given style.
#[derive(Debug, Clone, Copy)]
pub struct StylePreference(pub DraftStyle);

#[async_trait]
impl SelectionPolicy for StylePreference {
    async fn select(
        &self,
        _model: &dyn ModelClient,
        candidates: &[DraftCandidate],
    ) -> Result<SelectionVerdict> {
        let index = candidates
            .iter()
            .position(|candidate| candidate.style == self.0)
            .ok_or_else(|| anyhow!("no {} draft to select", self.0))?;
        Ok(SelectionVerdict {
            choice: index + 1,
            rationale: format!("configured to prefer the {} style", self.0),
        })
    }
}

fn verdict_schema() -> Result<Value> {
    serde_json::from_str(VERDICT_SCHEMA).context("parse selection verdict schema")
}

/// Validate a raw reply against the verdict schema and the candidate count.
pub fn parse_verdict(reply: &str, schema: &Value, candidate_count: usize) -> Result<SelectionVerdict> {
    let value: Value = serde_json::from_str(strip_code_fence(reply))
        .with_context(|| format!("selection verdict is not JSON: {}", reply.trim()))?;
    validate_schema(&value, schema)?;
    let verdict: SelectionVerdict =
        serde_json::from_value(value).context("deserialize selection verdict")?;
    if verdict.choice == 0 || verdict.choice > candidate_count {
        bail!(
            "selection verdict chose draft {} but only {} were offered",
            verdict.choice,
            candidate_count
        );
    }
    Ok(verdict)
}

/// Validate JSON instance against a JSON Schema (Draft 2020-12).
fn validate_schema(instance: &Value, schema: &Value) -> Result<()> {
    let compiled = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(schema)
        .context("compile json schema")?;
    let messages: Vec<String> = compiled
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        bail!("selection verdict failed schema validation:\n- {}", messages.join("\n- "));
    }
    Ok(())
}

/// Resolve a verdict to the candidate it names.
pub fn chosen<'a>(
    candidates: &'a [DraftCandidate],
    verdict: &SelectionVerdict,
) -> Result<&'a DraftCandidate> {
    verdict
        .choice
        .checked_sub(1)
        .and_then(|index| candidates.get(index))
        .ok_or_else(|| anyhow!("no draft numbered {}", verdict.choice))
}
