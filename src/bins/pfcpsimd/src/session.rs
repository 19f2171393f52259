//! Bulk session orchestration.
//!
//! Each operation walks the key range `base_id, base_id+10, ...` in order;
//! later iterations depend on address-pool state advanced by earlier ones,
//! so the walk is sequential. The first failure aborts the remaining
//! iterations and is returned as-is; sessions already established stay in
//! the store, and the caller reads actual progress from the store size.
//! The same holds for cancellation: if the caller goes away the request
//! future is dropped at the next await point, no further iterations are
//! issued, and the store reflects whatever completed.

use crate::context::SimContext;
use crate::error::{SimError, SimResult};
use crate::rules::{
    build_far_updates, build_session_rules, check_filter_count, parse_app_filters, session_keys,
    UeAddressPool,
};
use crate::store::EstablishedSession;

impl SimContext {
    /// Establishes `count` sessions keyed from `base_id`, allocating UE
    /// addresses sequentially out of `ue_pool`.
    pub async fn create_sessions(
        &self,
        base_id: u64,
        count: u64,
        ue_pool: &str,
        qfi: u8,
        app_filters: &[String],
    ) -> SimResult<()> {
        self.check_ready()?;

        let mut pool = UeAddressPool::parse(ue_pool)?;
        let filters = parse_app_filters(app_filters)?;
        let n3_addr = self.n3_addr()?;

        for key in session_keys(base_id, count) {
            let ue_addr = pool.next_address();
            let rules = build_session_rules(key, n3_addr, ue_addr, qfi, &filters)?;

            // CP-side SEID doubles as the session key
            let peer_seid = self.peer.establish_session(key, rules).await?;
            self.store.insert(EstablishedSession {
                key,
                ue_addr,
                local_seid: key,
                peer_seid,
            });
            log::debug!(
                "session {} established: UE {}, peer SEID 0x{:016x}",
                key,
                ue_addr,
                peer_seid
            );
        }

        Ok(())
    }

    /// Rebuilds the downlink FARs of `count` sessions keyed from
    /// `base_id`. PDRs and QERs are left untouched; the reused FAR ids
    /// keep each update correlated with the PDR installed at creation.
    pub async fn modify_sessions(
        &self,
        base_id: u64,
        count: u64,
        node_b_addr: &str,
        buffer: bool,
        notify_cp: bool,
        app_filters: &[String],
    ) -> SimResult<()> {
        self.check_ready()?;

        let node_b: std::net::Ipv4Addr = node_b_addr
            .parse()
            .map_err(|_| SimError::InvalidAddress(node_b_addr.to_string()))?;
        check_filter_count(app_filters.len())?;

        let available = self.store.len();
        if available < count as usize {
            return Err(SimError::NotEnoughSessions {
                available,
                requested: count as usize,
            });
        }

        for key in session_keys(base_id, count) {
            let session = self
                .store
                .get(key)
                .ok_or(SimError::SessionNotFound(key))?;

            let updates = build_far_updates(key, node_b, buffer, notify_cp, app_filters.len());
            self.peer.modify_session(session.peer_seid, updates).await?;
            log::debug!("session {} modified", key);
        }

        Ok(())
    }

    /// Deletes `count` sessions keyed from `base_id`, removing each from
    /// the store once the peer confirms the teardown.
    pub async fn delete_sessions(&self, base_id: u64, count: u64) -> SimResult<()> {
        self.check_ready()?;

        let available = self.store.len();
        if available < count as usize {
            return Err(SimError::NotEnoughSessions {
                available,
                requested: count as usize,
            });
        }

        for key in session_keys(base_id, count) {
            let session = self
                .store
                .get(key)
                .ok_or(SimError::SessionNotFound(key))?;

            self.peer.delete_session(session.peer_seid).await?;
            self.store.remove(key);
            log::debug!("session {} deleted", key);
        }

        Ok(())
    }
}
