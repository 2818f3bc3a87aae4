//! Multi-draft cold sales email pipeline.
//!
//! Three styled draft generators write candidate emails, a sales manager
//! picks one and hands off to an email agent that writes the subject,
//! converts the body to HTML and sends it once through SendGrid.
//!
//! - **[`core`]**: Pure logic (campaign defaults, agent specs, text cleanup).
//! - **[`io`]**: Side effects (config, credentials, prompts, model and email
//!   clients, interactive intake). Model and email access sit behind traits
//!   so tests can substitute scripted doubles.
//! - **[`agents`]**: Agent nodes and the topology connecting them.
//!
//! [`pipeline`] ties them together for the `sdr run` command.

pub mod agents;
pub mod core;
pub mod io;
pub mod logging;
pub mod pipeline;
pub mod report;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
