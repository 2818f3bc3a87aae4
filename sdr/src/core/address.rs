//! Destination address resolution for the sender.

use crate::core::campaign::DEFAULT_RECIPIENT_EMAIL;

/// Pick the address an email is actually delivered to.
///
/// Precedence: the campaign's recipient, then the address the calling agent
/// asked for, then the placeholder prospect address. Blank values are skipped.
pub fn resolve_recipient(campaign_recipient: Option<&str>, requested: Option<&str>) -> String {
    [campaign_recipient, requested]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|addr| !addr.is_empty())
        .unwrap_or(DEFAULT_RECIPIENT_EMAIL)
        .to_string()
}
