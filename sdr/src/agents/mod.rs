//! Agent nodes and the fixed topology connecting them.
//!
//! Tool edges ([`draft`], subject/HTML writers) return a value to the caller.
//! The single handoff edge (sales manager → email agent) transfers the rest
//! of the run.

pub mod draft;
pub mod email;
pub mod manager;
pub mod selection;
pub mod topology;
