//! PFCP control-plane peer simulator.
//!
//! Drives association setup/teardown and bulk session create/modify/delete
//! against a PFCP-speaking user-plane peer, for conformance and load
//! testing. The engine turns one operator command into N internally
//! consistent protocol sessions: deterministic, non-colliding rule ids,
//! cross-referenced PDR/FAR/QER sets, and a strict configured-then-
//! associated precondition around every session operation.

pub mod api;
pub mod context;
pub mod error;
pub mod peer;
pub mod rules;
pub mod service;
pub mod session;
pub mod store;

#[cfg(test)]
mod property_tests;

pub use context::SimContext;
pub use error::{SimError, SimResult};
pub use service::{status, CommandOutcome, ControlService};
pub use store::{EstablishedSession, SessionStore};
