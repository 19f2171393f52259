//! Rule construction for simulated sessions.
//!
//! One session is a set of PDRs, FARs and QERs whose ids must reference
//! each other correctly on the wire. All id arithmetic lives here: session
//! keys advance by [`SESSION_STEP`], and within a session each application
//! filter consumes two consecutive values (uplink, downlink) in the PDR,
//! FAR and QER id-spaces. The three id-spaces share numeric values even
//! though they are logically independent; the encoding layer tells them
//! apart by rule kind. Keeping the scheme confined to this module means a
//! future move to per-space counters is a local change.

use std::net::Ipv4Addr;

use pfcp::types::{
    ApplyAction, Bitrate, CreateFar, CreatePdr, CreateQer, DestinationInterface, FTeid,
    ForwardingParameters, GateStatus, OuterHeaderCreation, OuterHeaderRemoval, Pdi, SdfFilter,
    SourceInterface, UeIpAddress, UpdateFar,
};

use crate::error::{SimError, SimResult};

/// Spacing between consecutive session keys in a bulk operation. Leaves
/// room for up to [`MAX_NUM_APP_FILTERS`] filters' id pairs per session
/// before the next session's ids begin.
pub const SESSION_STEP: u64 = 10;

/// Maximum application filters per session, bounded by the id space one
/// session may consume before colliding with the next key.
pub const MAX_NUM_APP_FILTERS: usize = (SESSION_STEP / 2) as usize;

/// The session-level QER shared by every PDR of a session.
pub const SESSION_QER_ID: u32 = 0;

/// Aggregate session MBR, kbit/s per direction.
const SESSION_MBR_KBPS: u64 = 60_000;

/// Per-application MBR caps, kbit/s.
const APP_MBR_UPLINK_KBPS: u64 = 50_000;
const APP_MBR_DOWNLINK_KBPS: u64 = 30_000;

const DEFAULT_PRECEDENCE: u32 = 100;

/// Session keys of one bulk call: `base_id, base_id+10, ...`.
pub fn session_keys(base_id: u64, count: u64) -> impl Iterator<Item = u64> {
    (0..count).map(move |n| base_id + n * SESSION_STEP)
}

/// Rejects filter lists the id scheme cannot accommodate.
pub fn check_filter_count(count: usize) -> SimResult<()> {
    if count > MAX_NUM_APP_FILTERS {
        return Err(SimError::TooManyFilters {
            count,
            max: MAX_NUM_APP_FILTERS,
        });
    }
    Ok(())
}

// ============================================================================
// Application filters
// ============================================================================

/// One parsed application filter: the SDF flow description it renders to,
/// the gate it implies, and its precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppFilter {
    pub flow_description: String,
    pub gate: GateStatus,
    pub precedence: u32,
}

impl AppFilter {
    /// Parses the operator form
    /// `<proto>:<cidr|any>:<lo>-<hi>|any:<allow|deny>[:<precedence>]`,
    /// e.g. `udp:10.0.0.0/8:80-88:allow:100`.
    pub fn parse(filter: &str) -> SimResult<Self> {
        let invalid = |reason: &str| SimError::InvalidFilterSyntax {
            filter: filter.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = filter.split(':').collect();
        if parts.len() < 4 || parts.len() > 5 {
            return Err(invalid("expected proto:cidr:ports:action[:precedence]"));
        }

        let proto = match parts[0] {
            "ip" | "tcp" | "udp" => parts[0],
            _ => return Err(invalid("protocol must be ip, tcp or udp")),
        };

        let network = if parts[1] == "any" {
            "any".to_string()
        } else {
            let (addr, prefix) = parse_ipv4_cidr(parts[1])
                .ok_or_else(|| invalid("network must be 'any' or an IPv4 CIDR"))?;
            format!("{}/{}", addr, prefix)
        };

        let ports = if parts[2] == "any" {
            None
        } else {
            let (lo, hi) = parts[2]
                .split_once('-')
                .and_then(|(lo, hi)| Some((lo.parse::<u16>().ok()?, hi.parse::<u16>().ok()?)))
                .ok_or_else(|| invalid("ports must be 'any' or lo-hi"))?;
            if lo > hi {
                return Err(invalid("port range is inverted"));
            }
            Some((lo, hi))
        };

        let gate = match parts[3] {
            "allow" => GateStatus::open(),
            "deny" => GateStatus::closed(),
            _ => return Err(invalid("action must be allow or deny")),
        };

        let precedence = match parts.get(4) {
            Some(p) => p
                .parse::<u32>()
                .map_err(|_| invalid("precedence must be an unsigned integer"))?,
            None => DEFAULT_PRECEDENCE,
        };

        let flow_description = match ports {
            Some((lo, hi)) => {
                format!("permit out {} from {} {}-{} to assigned", proto, network, lo, hi)
            }
            None => format!("permit out {} from {} to assigned", proto, network),
        };

        Ok(Self {
            flow_description,
            gate,
            precedence,
        })
    }
}

/// Parses and bounds-checks a whole filter list before anything is sent.
pub fn parse_app_filters(filters: &[String]) -> SimResult<Vec<AppFilter>> {
    check_filter_count(filters.len())?;
    filters.iter().map(|f| AppFilter::parse(f)).collect()
}

fn parse_ipv4_cidr(s: &str) -> Option<(Ipv4Addr, u8)> {
    let (addr, prefix) = s.split_once('/')?;
    let addr: Ipv4Addr = addr.parse().ok()?;
    let prefix: u8 = prefix.parse().ok()?;
    if prefix > 32 {
        return None;
    }
    Some((addr, prefix))
}

// ============================================================================
// UE address pool
// ============================================================================

/// Sequential UE address allocator over a pool CIDR.
///
/// Addresses advance one at a time starting from the first host address
/// and are never returned to a free list within a run.
#[derive(Debug, Clone)]
pub struct UeAddressPool {
    next: u32,
}

impl UeAddressPool {
    pub fn parse(cidr: &str) -> SimResult<Self> {
        let (addr, prefix) = parse_ipv4_cidr(cidr)
            .ok_or_else(|| SimError::AddressPoolParse(cidr.to_string()))?;
        let mask = if prefix == 0 {
            0
        } else {
            u32::MAX << (32 - prefix)
        };
        let network = u32::from(addr) & mask;
        Ok(Self { next: network })
    }

    pub fn next_address(&mut self) -> Ipv4Addr {
        self.next = self.next.wrapping_add(1);
        Ipv4Addr::from(self.next)
    }
}

// ============================================================================
// Session rule sets
// ============================================================================

/// The complete rule set for one session.
#[derive(Debug, Clone)]
pub struct SessionRuleSet {
    pub pdrs: Vec<CreatePdr>,
    pub fars: Vec<CreateFar>,
    pub qers: Vec<CreateQer>,
}

/// Builds the rules for the session at `key`.
///
/// The uplink TEID equals the session key. Per filter: an uplink and a
/// downlink PDR each referencing a freshly allocated FAR and the shared
/// session QER, one FAR per direction (uplink to core, downlink to
/// access), and one app QER per direction carrying the filter's gate. The
/// session QER (id 0) exists exactly once regardless of filter count.
pub fn build_session_rules(
    key: u64,
    n3_addr: Ipv4Addr,
    ue_addr: Ipv4Addr,
    qfi: u8,
    filters: &[AppFilter],
) -> SimResult<SessionRuleSet> {
    check_filter_count(filters.len())?;

    let uplink_teid = key as u32;

    let mut session_qer = CreateQer::new(SESSION_QER_ID, GateStatus::open());
    session_qer.maximum_bitrate = Some(Bitrate::new(SESSION_MBR_KBPS, SESSION_MBR_KBPS));

    let mut pdrs = Vec::with_capacity(filters.len() * 2);
    let mut fars = Vec::with_capacity(filters.len() * 2);
    let mut qers = Vec::with_capacity(filters.len() * 2 + 1);
    qers.push(session_qer);

    let mut id = key as u16;

    for filter in filters {
        let uplink_pdr_id = id;
        let downlink_pdr_id = id + 1;
        let uplink_far_id = id as u32;
        let downlink_far_id = (id + 1) as u32;
        let uplink_app_qer_id = id as u32;
        let downlink_app_qer_id = (id + 1) as u32;

        let mut uplink_pdi = Pdi::new(SourceInterface::Access);
        uplink_pdi.local_f_teid = Some(FTeid::new_ipv4(uplink_teid, n3_addr.octets()));
        uplink_pdi.sdf_filter = Some(SdfFilter::new(filter.flow_description.clone()));

        let mut uplink_pdr = CreatePdr::new(uplink_pdr_id, filter.precedence, uplink_pdi);
        uplink_pdr.outer_header_removal = Some(OuterHeaderRemoval::GtpUUdpIpv4);
        uplink_pdr.far_id = Some(uplink_far_id);
        uplink_pdr.qer_ids = vec![SESSION_QER_ID];
        pdrs.push(uplink_pdr);

        let mut downlink_pdi = Pdi::new(SourceInterface::Core);
        downlink_pdi.ue_ip_address = Some(UeIpAddress::new_ipv4(ue_addr.octets(), false));
        downlink_pdi.sdf_filter = Some(SdfFilter::new(filter.flow_description.clone()));

        let mut downlink_pdr = CreatePdr::new(downlink_pdr_id, filter.precedence, downlink_pdi);
        downlink_pdr.far_id = Some(downlink_far_id);
        downlink_pdr.qer_ids = vec![SESSION_QER_ID];
        pdrs.push(downlink_pdr);

        let mut uplink_far = CreateFar::new(uplink_far_id, ApplyAction::forward());
        uplink_far.forwarding_parameters =
            Some(ForwardingParameters::new(DestinationInterface::Core));
        fars.push(uplink_far);

        let mut downlink_far = CreateFar::new(downlink_far_id, ApplyAction::forward());
        downlink_far.forwarding_parameters =
            Some(ForwardingParameters::new(DestinationInterface::Access));
        fars.push(downlink_far);

        for app_qer_id in [uplink_app_qer_id, downlink_app_qer_id] {
            let mut app_qer = CreateQer::new(app_qer_id, filter.gate);
            app_qer.maximum_bitrate =
                Some(Bitrate::new(APP_MBR_UPLINK_KBPS, APP_MBR_DOWNLINK_KBPS));
            app_qer.qfi = Some(qfi);
            qers.push(app_qer);
        }

        id += 2;
    }

    Ok(SessionRuleSet { pdrs, fars, qers })
}

/// Builds the downlink FAR updates for a session modification.
///
/// FAR ids repeat the downlink ids allocated at creation time (`key+1`,
/// `key+3`, ...) so each update correlates with the FAR reference already
/// installed in the matching PDR. When buffering is requested the action
/// becomes buffer+notify and the tunnel TEID is forced to 0; otherwise the
/// traffic is forwarded toward the downlink node.
pub fn build_far_updates(
    key: u64,
    node_b_addr: Ipv4Addr,
    buffer: bool,
    notify_cp: bool,
    filter_count: usize,
) -> Vec<UpdateFar> {
    let buffering = buffer || notify_cp;
    let action = if buffering {
        ApplyAction::buffer_notify()
    } else {
        ApplyAction::forward()
    };
    let teid = if buffering { 0 } else { (key + 1) as u32 };

    let mut updates = Vec::with_capacity(filter_count);
    let mut id = (key + 1) as u32;

    for _ in 0..filter_count {
        let mut fp = ForwardingParameters::new(DestinationInterface::Access);
        fp.outer_header_creation = Some(OuterHeaderCreation::new_gtpu_ipv4(
            teid,
            node_b_addr.octets(),
        ));

        let mut far = UpdateFar::new(id);
        far.apply_action = Some(action);
        far.update_forwarding_parameters = Some(fp);
        updates.push(far);

        id += 2;
    }

    updates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow_filter() -> AppFilter {
        AppFilter::parse("udp:10.0.0.0/8:80-88:allow:100").unwrap()
    }

    #[test]
    fn test_session_keys_progression() {
        let keys: Vec<u64> = session_keys(1, 3).collect();
        assert_eq!(keys, vec![1, 11, 21]);
        assert_eq!(session_keys(5, 0).count(), 0);
    }

    #[test]
    fn test_app_filter_parse_full_form() {
        let filter = allow_filter();
        assert_eq!(
            filter.flow_description,
            "permit out udp from 10.0.0.0/8 80-88 to assigned"
        );
        assert_eq!(filter.gate, GateStatus::open());
        assert_eq!(filter.precedence, 100);
    }

    #[test]
    fn test_app_filter_parse_defaults() {
        let filter = AppFilter::parse("ip:any:any:allow").unwrap();
        assert_eq!(filter.flow_description, "permit out ip from any to assigned");
        assert_eq!(filter.precedence, DEFAULT_PRECEDENCE);
    }

    #[test]
    fn test_app_filter_deny_closes_gate() {
        let filter = AppFilter::parse("tcp:192.168.0.0/16:443-443:deny:50").unwrap();
        assert_eq!(filter.gate, GateStatus::closed());
        // deny gates traffic, the description stays a permit match
        assert!(filter.flow_description.starts_with("permit out tcp"));
    }

    #[test]
    fn test_app_filter_rejects_malformed() {
        for bad in [
            "udp",
            "icmp:any:any:allow",
            "udp:300.0.0.0/8:80-88:allow",
            "udp:10.0.0.0/40:80-88:allow",
            "udp:any:88-80:allow",
            "udp:any:any:block",
            "udp:any:any:allow:abc",
            "udp:any:any:allow:1:extra",
        ] {
            assert!(
                matches!(
                    AppFilter::parse(bad),
                    Err(SimError::InvalidFilterSyntax { .. })
                ),
                "expected parse failure for {bad:?}"
            );
        }
    }

    #[test]
    fn test_parse_app_filters_bounds_count() {
        let filters = vec!["ip:any:any:allow".to_string(); MAX_NUM_APP_FILTERS + 1];
        assert!(matches!(
            parse_app_filters(&filters),
            Err(SimError::TooManyFilters { count: 6, max: 5 })
        ));
    }

    #[test]
    fn test_pool_allocates_sequential_host_addresses() {
        let mut pool = UeAddressPool::parse("10.1.0.0/24").unwrap();
        assert_eq!(pool.next_address(), Ipv4Addr::new(10, 1, 0, 1));
        assert_eq!(pool.next_address(), Ipv4Addr::new(10, 1, 0, 2));
        assert_eq!(pool.next_address(), Ipv4Addr::new(10, 1, 0, 3));
    }

    #[test]
    fn test_pool_masks_host_bits() {
        let mut pool = UeAddressPool::parse("10.1.0.77/24").unwrap();
        assert_eq!(pool.next_address(), Ipv4Addr::new(10, 1, 0, 1));
    }

    #[test]
    fn test_pool_rejects_garbage() {
        for bad in ["10.1.0.0", "10.1.0.0/33", "not-a-pool/8"] {
            assert!(matches!(
                UeAddressPool::parse(bad),
                Err(SimError::AddressPoolParse(_))
            ));
        }
    }

    #[test]
    fn test_rule_counts_per_filter() {
        let filters = vec![allow_filter(), allow_filter(), allow_filter()];
        let rules = build_session_rules(
            21,
            Ipv4Addr::new(10, 0, 0, 2),
            Ipv4Addr::new(10, 1, 0, 1),
            9,
            &filters,
        )
        .unwrap();

        assert_eq!(rules.pdrs.len(), 2 * filters.len());
        assert_eq!(rules.fars.len(), 2 * filters.len());
        // one session QER plus two app QERs per filter
        assert_eq!(rules.qers.len(), 2 * filters.len() + 1);
        assert_eq!(rules.qers[0].qer_id, SESSION_QER_ID);
    }

    #[test]
    fn test_no_filters_builds_only_session_qer() {
        let rules = build_session_rules(
            1,
            Ipv4Addr::new(10, 0, 0, 2),
            Ipv4Addr::new(10, 1, 0, 1),
            0,
            &[],
        )
        .unwrap();
        assert!(rules.pdrs.is_empty());
        assert!(rules.fars.is_empty());
        assert_eq!(rules.qers.len(), 1);
    }

    #[test]
    fn test_pdr_far_references_resolve() {
        let filters = vec![allow_filter(), allow_filter()];
        let rules = build_session_rules(
            11,
            Ipv4Addr::new(10, 0, 0, 2),
            Ipv4Addr::new(10, 1, 0, 4),
            9,
            &filters,
        )
        .unwrap();

        let far_ids: Vec<u32> = rules.fars.iter().map(|f| f.far_id).collect();
        for pdr in &rules.pdrs {
            let far_id = pdr.far_id.expect("every PDR references a FAR");
            assert!(far_ids.contains(&far_id), "dangling FAR id {far_id}");
            assert_eq!(pdr.qer_ids, vec![SESSION_QER_ID]);
        }
    }

    #[test]
    fn test_uplink_and_downlink_shapes() {
        let rules = build_session_rules(
            31,
            Ipv4Addr::new(10, 0, 0, 2),
            Ipv4Addr::new(10, 1, 0, 9),
            9,
            &[allow_filter()],
        )
        .unwrap();

        let uplink = &rules.pdrs[0];
        assert_eq!(uplink.pdi.source_interface, SourceInterface::Access);
        let fteid = uplink.pdi.local_f_teid.unwrap();
        assert_eq!(fteid.teid, 31);
        assert_eq!(fteid.ipv4_addr, Some([10, 0, 0, 2]));
        assert!(uplink.outer_header_removal.is_some());

        let downlink = &rules.pdrs[1];
        assert_eq!(downlink.pdi.source_interface, SourceInterface::Core);
        assert_eq!(
            downlink.pdi.ue_ip_address.unwrap().ipv4_addr,
            [10, 1, 0, 9]
        );
        assert!(downlink.pdi.local_f_teid.is_none());

        let dests: Vec<DestinationInterface> = rules
            .fars
            .iter()
            .map(|f| f.forwarding_parameters.as_ref().unwrap().destination_interface)
            .collect();
        assert_eq!(
            dests,
            vec![DestinationInterface::Core, DestinationInterface::Access]
        );
    }

    #[test]
    fn test_too_many_filters_rejected_by_builder() {
        let filters = vec![allow_filter(); MAX_NUM_APP_FILTERS + 1];
        assert!(matches!(
            build_session_rules(
                1,
                Ipv4Addr::new(10, 0, 0, 2),
                Ipv4Addr::new(10, 1, 0, 1),
                9,
                &filters,
            ),
            Err(SimError::TooManyFilters { .. })
        ));
    }

    #[test]
    fn test_far_updates_reuse_downlink_ids() {
        let updates = build_far_updates(21, Ipv4Addr::new(10, 0, 0, 9), false, false, 3);
        let ids: Vec<u32> = updates.iter().map(|u| u.far_id).collect();
        assert_eq!(ids, vec![22, 24, 26]);
        for update in &updates {
            assert_eq!(update.apply_action, Some(ApplyAction::forward()));
            let ohc = update
                .update_forwarding_parameters
                .as_ref()
                .unwrap()
                .outer_header_creation
                .unwrap();
            assert_eq!(ohc.teid, 22);
            assert_eq!(ohc.ipv4_addr, [10, 0, 0, 9]);
        }
    }

    #[test]
    fn test_far_updates_buffering_zeroes_teid() {
        for (buffer, notify) in [(true, false), (false, true), (true, true)] {
            let updates = build_far_updates(1, Ipv4Addr::new(10, 0, 0, 9), buffer, notify, 1);
            let update = &updates[0];
            let action = update.apply_action.unwrap();
            assert!(action.buff && action.nocp && !action.forw);
            let ohc = update
                .update_forwarding_parameters
                .as_ref()
                .unwrap()
                .outer_header_creation
                .unwrap();
            assert_eq!(ohc.teid, 0);
        }
    }
}
