//! Shared value types passed between pipeline stages.
//!
//! None of these are persisted; each lives for at most one run.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::core::campaign::CampaignContext;

/// Writing style assigned to one draft generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStyle {
    Professional,
    Witty,
    Concise,
}

impl DraftStyle {
    /// Fixed fan-out order used by the sales manager.
    pub const ALL: [DraftStyle; 3] = [
        DraftStyle::Professional,
        DraftStyle::Witty,
        DraftStyle::Concise,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DraftStyle::Professional => "professional",
            DraftStyle::Witty => "witty",
            DraftStyle::Concise => "concise",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DraftStyle::Professional => "Professional",
            DraftStyle::Witty => "Witty",
            DraftStyle::Concise => "Concise",
        }
    }

    /// Tool name under which the sales manager sees this generator.
    pub fn tool_name(self) -> &'static str {
        match self {
            DraftStyle::Professional => "sales_rep_agent1",
            DraftStyle::Witty => "sales_rep_agent2",
            DraftStyle::Concise => "sales_rep_agent3",
        }
    }
}

impl fmt::Display for DraftStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DraftStyle {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "professional" => Ok(DraftStyle::Professional),
            "witty" => Ok(DraftStyle::Witty),
            "concise" => Ok(DraftStyle::Concise),
            other => bail!("unknown draft style {other:?} (expected professional, witty or concise)"),
        }
    }
}

/// One generated, not-yet-selected email body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftCandidate {
    pub style: DraftStyle,
    /// Name of the agent that produced the draft.
    pub author: String,
    pub body: String,
}

/// Selection result: 1-based index into the candidate list plus the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionVerdict {
    pub choice: usize,
    pub rationale: String,
}

/// Finished email handed to the sender exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub to_address: String,
    pub subject: String,
    pub html_body: String,
}

/// What the sender reports back after a delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReceipt {
    pub status_code: u16,
    pub recipient: String,
    pub signer: String,
}

/// Everything a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignOutcome {
    pub context: CampaignContext,
    pub selected: DraftCandidate,
    pub verdict: SelectionVerdict,
    pub email: OutboundEmail,
    pub receipt: DeliveryReceipt,
}
