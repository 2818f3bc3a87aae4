//! Sales manager: fans out to the draft generators, picks one, hands off.

use anyhow::{Context, Result};
use futures::future::try_join_all;
use tracing::{info, instrument};

use crate::agents::draft::{DraftAgent, draft_brief};
use crate::agents::email::EmailAgent;
use crate::agents::selection::{SelectionPolicy, chosen};
use crate::agents::topology::Topology;
use crate::core::campaign::CampaignContext;
use crate::core::types::{CampaignOutcome, DraftCandidate, DraftStyle};
use crate::io::mailer::EmailSender;
use crate::io::model::ModelClient;

pub struct SalesManager<'a> {
    topology: &'a Topology,
    ctx: &'a CampaignContext,
    policy: &'a dyn SelectionPolicy,
}

impl<'a> SalesManager<'a> {
    pub fn new(
        topology: &'a Topology,
        ctx: &'a CampaignContext,
        policy: &'a dyn SelectionPolicy,
    ) -> Self {
        Self {
            topology,
            ctx,
            policy,
        }
    }

    /// Write every draft concurrently. Any failure aborts the whole set.
    #[instrument(name = "collect_drafts", skip_all)]
    pub async fn collect_drafts(&self, model: &dyn ModelClient) -> Result<Vec<DraftCandidate>> {
        let brief = draft_brief(self.ctx);
        let mut agents = Vec::with_capacity(DraftStyle::ALL.len());
        for style in DraftStyle::ALL {
            agents.push(DraftAgent::new(style, self.topology.draft(style)?));
        }
        let drafts = try_join_all(agents.iter().map(|agent| agent.write(model, &brief)))
            .await
            .context("write drafts")?;
        info!(count = drafts.len(), "drafts collected");
        Ok(drafts)
    }

    /// Full manager turn. Returns whatever the email agent returns.
    #[instrument(name = "sales_manager", skip_all)]
    pub async fn run(
        &self,
        model: &dyn ModelClient,
        sender: &dyn EmailSender,
    ) -> Result<CampaignOutcome> {
        let drafts = self.collect_drafts(model).await?;

        let verdict = self
            .policy
            .select(model, &drafts)
            .await
            .context("select best draft")?;
        let selected = chosen(&drafts, &verdict)?.clone();
        info!(
            choice = verdict.choice,
            style = %selected.style,
            author = %selected.author,
            "handing off to email agent"
        );

        let (email, receipt) = EmailAgent::new(self.topology, self.ctx)
            .run(model, sender, &selected.body)
            .await?;
        Ok(CampaignOutcome {
            context: self.ctx.clone(),
            selected,
            verdict,
            email,
            receipt,
        })
    }
}
