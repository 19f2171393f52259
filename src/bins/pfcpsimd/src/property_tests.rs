//! Property-based tests for the id allocation scheme.
//!
//! The invariants that keep thousands of simulated sessions from stepping
//! on each other: session keys of one bulk call never collide, a
//! session's per-filter id pairs stay disjoint, and every FAR reference a
//! PDR carries is satisfied within the same build.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::net::Ipv4Addr;

    use proptest::prelude::*;

    use crate::rules::{
        build_far_updates, build_session_rules, session_keys, AppFilter, MAX_NUM_APP_FILTERS,
        SESSION_QER_ID, SESSION_STEP,
    };

    fn filters(count: usize) -> Vec<AppFilter> {
        (0..count)
            .map(|i| AppFilter::parse(&format!("udp:10.{}.0.0/16:80-88:allow:{}", i, 100 + i)).unwrap())
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_session_keys_unique_and_stepped(
            base_id in 1u64..1_000_000,
            count in 1u64..200,
        ) {
            let keys: Vec<u64> = session_keys(base_id, count).collect();
            prop_assert_eq!(keys.len() as u64, count);

            let unique: HashSet<u64> = keys.iter().copied().collect();
            prop_assert_eq!(unique.len() as u64, count);

            for (n, key) in keys.iter().enumerate() {
                prop_assert_eq!(*key, base_id + n as u64 * SESSION_STEP);
            }
        }

        #[test]
        fn prop_rule_counts_and_references(
            key in 1u64..60_000,
            filter_count in 0usize..=MAX_NUM_APP_FILTERS,
        ) {
            let filters = filters(filter_count);
            let rules = build_session_rules(
                key,
                Ipv4Addr::new(10, 0, 0, 2),
                Ipv4Addr::new(10, 1, 0, 1),
                9,
                &filters,
            ).unwrap();

            prop_assert_eq!(rules.pdrs.len(), 2 * filter_count);
            prop_assert_eq!(rules.fars.len(), 2 * filter_count);
            prop_assert_eq!(rules.qers.len(), 2 * filter_count + 1);

            let far_ids: HashSet<u32> = rules.fars.iter().map(|f| f.far_id).collect();
            prop_assert_eq!(far_ids.len(), rules.fars.len(), "FAR ids must not collide");

            for pdr in &rules.pdrs {
                let far_id = pdr.far_id.expect("PDR without FAR reference");
                prop_assert!(far_ids.contains(&far_id));
                prop_assert!(pdr.qer_ids.contains(&SESSION_QER_ID));
            }

            let pdr_ids: HashSet<u16> = rules.pdrs.iter().map(|p| p.pdr_id).collect();
            prop_assert_eq!(pdr_ids.len(), rules.pdrs.len(), "PDR ids must not collide");

            let qer_ids: HashSet<u32> = rules.qers.iter().map(|q| q.qer_id).collect();
            prop_assert_eq!(qer_ids.len(), rules.qers.len(), "QER ids must not collide");
        }

        #[test]
        fn prop_adjacent_sessions_use_disjoint_rule_ids(
            base_id in 1u64..50_000,
            filter_count in 1usize..=MAX_NUM_APP_FILTERS,
        ) {
            let filters = filters(filter_count);
            let n3 = Ipv4Addr::new(10, 0, 0, 2);
            let first = build_session_rules(
                base_id, n3, Ipv4Addr::new(10, 1, 0, 1), 9, &filters).unwrap();
            let second = build_session_rules(
                base_id + SESSION_STEP, n3, Ipv4Addr::new(10, 1, 0, 2), 9, &filters).unwrap();

            let first_ids: HashSet<u16> = first.pdrs.iter().map(|p| p.pdr_id).collect();
            let second_ids: HashSet<u16> = second.pdrs.iter().map(|p| p.pdr_id).collect();
            prop_assert!(first_ids.is_disjoint(&second_ids));

            // the shared session QER id 0 is per-session state, ignore it
            let first_fars: HashSet<u32> = first.fars.iter().map(|f| f.far_id).collect();
            let second_fars: HashSet<u32> = second.fars.iter().map(|f| f.far_id).collect();
            prop_assert!(first_fars.is_disjoint(&second_fars));
        }

        #[test]
        fn prop_far_updates_match_creation_ids(
            key in 1u64..50_000,
            filter_count in 1usize..=MAX_NUM_APP_FILTERS,
            buffer in prop::bool::ANY,
            notify in prop::bool::ANY,
        ) {
            let filters = filters(filter_count);
            let rules = build_session_rules(
                key,
                Ipv4Addr::new(10, 0, 0, 2),
                Ipv4Addr::new(10, 1, 0, 1),
                9,
                &filters,
            ).unwrap();
            let updates = build_far_updates(
                key, Ipv4Addr::new(10, 0, 0, 9), buffer, notify, filter_count);

            // every updated FAR id is a downlink FAR installed at creation
            let downlink_ids: HashSet<u32> = rules
                .pdrs
                .iter()
                .filter(|p| p.pdi.ue_ip_address.is_some())
                .map(|p| p.far_id.unwrap())
                .collect();
            for update in &updates {
                prop_assert!(downlink_ids.contains(&update.far_id));
                let ohc = update
                    .update_forwarding_parameters
                    .as_ref()
                    .unwrap()
                    .outer_header_creation
                    .unwrap();
                if buffer || notify {
                    prop_assert_eq!(ohc.teid, 0, "buffering forces TEID 0");
                } else {
                    prop_assert!(ohc.teid != 0);
                }
            }
        }
    }
}
