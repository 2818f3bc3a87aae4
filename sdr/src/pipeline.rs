//! One campaign run, from validated inputs to a delivery receipt.
//!
//! [`Session::prepare`] performs every check that can fail without touching
//! the network (credentials first, then campaign fields and config), so a run
//! that cannot complete never invokes a model or the sender.

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::agents::manager::SalesManager;
use crate::agents::selection::{ModelJudge, SelectionPolicy, StylePreference};
use crate::agents::topology::Topology;
use crate::core::campaign::{CampaignContext, CampaignInput};
use crate::core::types::{CampaignOutcome, DraftStyle};
use crate::io::config::SdrConfig;
use crate::io::credentials::{Credentials, Settings};
use crate::io::mailer::{EmailSender, SendGridSender};
use crate::io::model::{ModelClient, OpenAiClient};

/// How the winning draft is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    /// Ask the sales-manager model for a schema-checked verdict.
    #[default]
    ModelJudge,
    /// Skip the judge call and always take this style.
    PreferStyle(DraftStyle),
}

/// Validated inputs for one run.
#[derive(Debug, Clone)]
pub struct Session {
    pub ctx: CampaignContext,
    pub config: SdrConfig,
    credentials: Credentials,
}

impl Session {
    pub fn prepare(input: &CampaignInput, settings: &Settings, config: SdrConfig) -> Result<Self> {
        let credentials = Credentials::from_settings(settings)?;
        let ctx = CampaignContext::from_input(input);
        ctx.validate().context("invalid campaign")?;
        config.validate().context("invalid config")?;
        Ok(Self {
            ctx,
            config,
            credentials,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// HTTP-backed model and email clients for this session.
    pub fn live_clients(&self) -> Result<(OpenAiClient, SendGridSender)> {
        let model = OpenAiClient::new(&self.config, &self.credentials)?;
        let sender = SendGridSender::new(&self.config, &self.credentials)?;
        Ok((model, sender))
    }
}

/// Build the topology and drive the sales manager to completion.
#[instrument(name = "sdr_pipeline", skip_all, fields(recipient = %session.ctx.recipient_email))]
pub async fn run_campaign(
    session: &Session,
    model: &dyn ModelClient,
    sender: &dyn EmailSender,
    selection: Selection,
) -> Result<CampaignOutcome> {
    let topology = Topology::build(&session.ctx, &session.config.model)?;
    let policy: Box<dyn SelectionPolicy> = match selection {
        Selection::ModelJudge => Box::new(ModelJudge::for_campaign(
            topology.sales_manager(),
            &session.ctx,
        )),
        Selection::PreferStyle(style) => Box::new(StylePreference(style)),
    };

    let outcome = SalesManager::new(&topology, &session.ctx, policy.as_ref())
        .run(model, sender)
        .await?;
    info!(
        status = outcome.receipt.status_code,
        style = %outcome.selected.style,
        "campaign email delivered"
    );
    Ok(outcome)
}
