//! Control service facade.
//!
//! Maps each operator command onto the engine and folds the outcome into a
//! `(status, message)` pair. This is the only place command outcomes are
//! logged; the engine below stays quiet apart from debug traces.

use serde::{Deserialize, Serialize};

use crate::context::SimContext;
use crate::error::SimError;

/// Caller-visible status codes, gRPC-compatible integers.
pub mod status {
    pub const OK: i32 = 0;
    pub const ABORTED: i32 = 10;
    pub const INTERNAL: i32 = 13;
}

/// Outcome of one control command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandOutcome {
    pub status: i32,
    pub message: String,
}

impl CommandOutcome {
    fn ok(message: String) -> Self {
        log::info!("{}", message);
        Self {
            status: status::OK,
            message,
        }
    }

    fn from_error(err: &SimError) -> Self {
        let status = if err.is_internal() {
            status::INTERNAL
        } else {
            status::ABORTED
        };
        let message = err.to_string();
        log::error!("{}", message);
        Self { status, message }
    }

    pub fn is_ok(&self) -> bool {
        self.status == status::OK
    }
}

/// The six operator commands.
#[allow(async_fn_in_trait)]
pub trait ControlService {
    async fn configure(&self, remote_peer_addr: &str, n3_addr: &str) -> CommandOutcome;
    async fn associate(&self) -> CommandOutcome;
    async fn disassociate(&self) -> CommandOutcome;
    async fn create_session(
        &self,
        base_id: u64,
        count: u64,
        ue_address_pool: &str,
        qfi: u8,
        app_filters: &[String],
    ) -> CommandOutcome;
    async fn modify_session(
        &self,
        base_id: u64,
        count: u64,
        node_b_addr: &str,
        buffer: bool,
        notify_cp: bool,
        app_filters: &[String],
    ) -> CommandOutcome;
    async fn delete_session(&self, base_id: u64, count: u64) -> CommandOutcome;
}

impl ControlService for SimContext {
    async fn configure(&self, remote_peer_addr: &str, n3_addr: &str) -> CommandOutcome {
        match SimContext::configure(self, remote_peer_addr, n3_addr) {
            Ok(()) => CommandOutcome::ok(format!(
                "server configured; remote peer address: {}, N3 interface address: {}",
                remote_peer_addr, n3_addr
            )),
            Err(e) => CommandOutcome::from_error(&e),
        }
    }

    async fn associate(&self) -> CommandOutcome {
        match SimContext::associate(self).await {
            Ok(()) => CommandOutcome::ok("association established".to_string()),
            Err(e) => CommandOutcome::from_error(&e),
        }
    }

    async fn disassociate(&self) -> CommandOutcome {
        match SimContext::disassociate(self).await {
            Ok(()) => CommandOutcome::ok(
                "association teardown completed and connection to remote peer closed".to_string(),
            ),
            Err(e) => CommandOutcome::from_error(&e),
        }
    }

    async fn create_session(
        &self,
        base_id: u64,
        count: u64,
        ue_address_pool: &str,
        qfi: u8,
        app_filters: &[String],
    ) -> CommandOutcome {
        match self
            .create_sessions(base_id, count, ue_address_pool, qfi, app_filters)
            .await
        {
            Ok(()) => CommandOutcome::ok(format!(
                "{} sessions were established using {} as base id",
                count, base_id
            )),
            Err(e) => CommandOutcome::from_error(&e),
        }
    }

    async fn modify_session(
        &self,
        base_id: u64,
        count: u64,
        node_b_addr: &str,
        buffer: bool,
        notify_cp: bool,
        app_filters: &[String],
    ) -> CommandOutcome {
        match self
            .modify_sessions(base_id, count, node_b_addr, buffer, notify_cp, app_filters)
            .await
        {
            Ok(()) => CommandOutcome::ok(format!("{} sessions were modified", count)),
            Err(e) => CommandOutcome::from_error(&e),
        }
    }

    async fn delete_session(&self, base_id: u64, count: u64) -> CommandOutcome {
        match self.delete_sessions(base_id, count).await {
            Ok(()) => CommandOutcome::ok(format!(
                "{} sessions deleted; active sessions: {}",
                count,
                self.store.len()
            )),
            Err(e) => CommandOutcome::from_error(&e),
        }
    }
}
