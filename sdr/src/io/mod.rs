//! Side-effecting boundaries: configuration, credentials, terminal input,
//! template rendering, and the model and email HTTP clients.

pub mod config;
pub mod credentials;
pub mod intake;
pub mod mailer;
pub mod model;
pub mod prompt;
