//! Engine context: configuration, association state, session store and the
//! peer transport, built once per process (or per test) and passed
//! explicitly to whoever needs it.

use std::net::Ipv4Addr;
use std::sync::RwLock;

use crate::error::{SimError, SimResult};
use crate::peer::{parse_peer_addr, PfcpPeer};
use crate::store::SessionStore;

/// Association state. `associated` implies `configured`: associate() is
/// gated on configuration and disassociate() only clears `associated`.
#[derive(Debug, Clone, Default)]
pub struct Association {
    pub configured: bool,
    pub associated: bool,
    pub remote_peer_addr: String,
    pub upf_n3_addr: Option<Ipv4Addr>,
}

/// The engine context.
pub struct SimContext {
    association: RwLock<Association>,
    pub store: SessionStore,
    pub peer: PfcpPeer,
}

impl SimContext {
    pub fn new() -> Self {
        Self {
            association: RwLock::new(Association::default()),
            store: SessionStore::new(),
            peer: PfcpPeer::new(),
        }
    }

    /// Validates and records the remote peer and local N3 addresses.
    pub fn configure(&self, remote_peer_addr: &str, n3_addr: &str) -> SimResult<()> {
        let n3: Ipv4Addr = n3_addr
            .parse()
            .map_err(|_| SimError::InvalidAddress(n3_addr.to_string()))?;
        let remote = parse_peer_addr(remote_peer_addr)?;

        self.peer.set_target(remote, n3);

        let mut assoc = self.association.write().expect("association lock poisoned");
        assoc.configured = true;
        assoc.remote_peer_addr = remote_peer_addr.to_string();
        assoc.upf_n3_addr = Some(n3);
        log::info!(
            "configured: remote peer {}, N3 address {}",
            remote_peer_addr,
            n3_addr
        );
        Ok(())
    }

    /// Connects (or reuses the existing transport) and runs the PFCP
    /// association setup exchange.
    pub async fn associate(&self) -> SimResult<()> {
        {
            let assoc = self.association.read().expect("association lock poisoned");
            if !assoc.configured {
                return Err(SimError::NotConfigured);
            }
        }

        if !self.peer.is_connected().await {
            self.peer.connect().await?;
        }
        self.peer.setup_association().await?;

        self.association
            .write()
            .expect("association lock poisoned")
            .associated = true;
        log::info!("association established");
        Ok(())
    }

    /// Tears down the association, then closes the transport. The
    /// associated flag is cleared once the release exchange succeeds,
    /// whatever happens to the transport close.
    pub async fn disassociate(&self) -> SimResult<()> {
        self.check_ready()?;

        self.peer.teardown_association().await?;
        self.peer.disconnect().await;

        self.association
            .write()
            .expect("association lock poisoned")
            .associated = false;
        log::info!("association released");
        Ok(())
    }

    /// Precondition for every session operation.
    pub fn check_ready(&self) -> SimResult<()> {
        let assoc = self.association.read().expect("association lock poisoned");
        if !assoc.configured {
            return Err(SimError::NotConfigured);
        }
        if !assoc.associated {
            return Err(SimError::NotAssociated);
        }
        Ok(())
    }

    /// The local N3 address advertised to the peer in uplink rules.
    pub fn n3_addr(&self) -> SimResult<Ipv4Addr> {
        self.association
            .read()
            .expect("association lock poisoned")
            .upf_n3_addr
            .ok_or(SimError::NotConfigured)
    }

    /// Snapshot of the association state.
    pub fn association(&self) -> Association {
        self.association
            .read()
            .expect("association lock poisoned")
            .clone()
    }
}

impl Default for SimContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unconfigured() {
        let ctx = SimContext::new();
        assert!(matches!(ctx.check_ready(), Err(SimError::NotConfigured)));
        assert!(matches!(ctx.n3_addr(), Err(SimError::NotConfigured)));
    }

    #[test]
    fn test_configure_validates_n3_address() {
        let ctx = SimContext::new();
        assert!(matches!(
            ctx.configure("10.0.0.1", "not-an-address"),
            Err(SimError::InvalidAddress(_))
        ));
        assert!(!ctx.association().configured);

        ctx.configure("10.0.0.1", "10.0.0.2").unwrap();
        let assoc = ctx.association();
        assert!(assoc.configured);
        assert!(!assoc.associated);
        assert_eq!(assoc.remote_peer_addr, "10.0.0.1");
        assert_eq!(ctx.n3_addr().unwrap(), Ipv4Addr::new(10, 0, 0, 2));
    }

    #[test]
    fn test_configured_but_not_associated() {
        let ctx = SimContext::new();
        ctx.configure("10.0.0.1", "10.0.0.2").unwrap();
        assert!(matches!(ctx.check_ready(), Err(SimError::NotAssociated)));
    }

    #[tokio::test]
    async fn test_associate_requires_configuration() {
        let ctx = SimContext::new();
        assert!(matches!(
            ctx.associate().await,
            Err(SimError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_disassociate_requires_association() {
        let ctx = SimContext::new();
        ctx.configure("10.0.0.1", "10.0.0.2").unwrap();
        assert!(matches!(
            ctx.disassociate().await,
            Err(SimError::NotAssociated)
        ));
    }
}
