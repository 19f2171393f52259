//! Active session bookkeeping.
//!
//! The store is the one piece of mutable state shared by concurrent bulk
//! operations. The lock is held only around the map operation itself;
//! every network exchange happens outside it.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Mutex;

/// Handle for one session established with the peer.
///
/// `local_seid` is the SEID this side advertised in the CP F-SEID;
/// `peer_seid` is the one the peer assigned in its response and is what
/// every follow-up modification/deletion addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstablishedSession {
    pub key: u64,
    pub ue_addr: Ipv4Addr,
    pub local_seid: u64,
    pub peer_seid: u64,
}

/// Concurrency-safe map from session key to the established session.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<u64, EstablishedSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: EstablishedSession) {
        self.sessions
            .lock()
            .expect("session store lock poisoned")
            .insert(session.key, session);
    }

    pub fn get(&self, key: u64) -> Option<EstablishedSession> {
        self.sessions
            .lock()
            .expect("session store lock poisoned")
            .get(&key)
            .cloned()
    }

    /// Removes and returns the session; `None` makes a delete of an absent
    /// key observable to the caller.
    pub fn remove(&self, key: u64) -> Option<EstablishedSession> {
        self.sessions
            .lock()
            .expect("session store lock poisoned")
            .remove(&key)
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .expect("session store lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted snapshot of the active keys.
    pub fn keys(&self) -> Vec<u64> {
        let mut keys: Vec<u64> = self
            .sessions
            .lock()
            .expect("session store lock poisoned")
            .keys()
            .copied()
            .collect();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(key: u64) -> EstablishedSession {
        EstablishedSession {
            key,
            ue_addr: Ipv4Addr::new(10, 1, 0, 1),
            local_seid: key,
            peer_seid: 0x8000_0000 + key,
        }
    }

    #[test]
    fn test_insert_get_remove() {
        let store = SessionStore::new();
        assert!(store.is_empty());

        store.insert(session(1));
        store.insert(session(11));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).unwrap().peer_seid, 0x8000_0001);

        assert!(store.remove(1).is_some());
        assert!(store.remove(1).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_absent_key_is_observable() {
        let store = SessionStore::new();
        assert!(store.remove(42).is_none());
    }

    #[test]
    fn test_keys_sorted() {
        let store = SessionStore::new();
        for key in [21, 1, 11] {
            store.insert(session(key));
        }
        assert_eq!(store.keys(), vec![1, 11, 21]);
    }

    #[test]
    fn test_insert_overwrites_same_key() {
        let store = SessionStore::new();
        store.insert(session(1));
        let mut replacement = session(1);
        replacement.peer_seid = 99;
        store.insert(replacement);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1).unwrap().peer_seid, 99);
    }
}
