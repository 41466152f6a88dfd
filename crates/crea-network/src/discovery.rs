//! Peer discovery.
//!
//! Bootstrap peer lists per network, plus DNS-based resolution for turning
//! seed hostnames into connectable addresses.

use crea_consensus::NetworkType;
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Mainnet seed addresses.
pub const MAINNET_SEEDS: &[&str] = &[
    "seed1.creativechain.org:10946",
    "seed2.creativechain.org:10946",
    "dnsseed.creativecoin.net:10946",
];

/// Testnet seed addresses.
pub const TESTNET_SEEDS: &[&str] = &["testnet-seed.creativechain.org:20946"];

/// Bootstrap seed list for a network name.
///
/// `main` and `testnet` resolve to their seed lists; any other name,
/// including `regtest`, yields an empty list.
pub fn seeds(name: &str) -> &'static [&'static str] {
    match name.parse::<NetworkType>() {
        Ok(NetworkType::Mainnet) => MAINNET_SEEDS,
        Ok(NetworkType::Testnet) => TESTNET_SEEDS,
        _ => &[],
    }
}

/// Seed-based peer discovery service.
pub struct PeerDiscovery {
    /// Network whose seeds to resolve.
    network: NetworkType,
    /// DNS resolution timeout.
    dns_timeout: Duration,
}

impl PeerDiscovery {
    /// Create a discovery service for a network.
    pub fn new(network: NetworkType) -> Self {
        Self {
            network,
            dns_timeout: Duration::from_secs(10),
        }
    }

    /// Set the DNS resolution timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.dns_timeout = timeout;
        self
    }

    /// Resolve every seed into socket addresses.
    ///
    /// Seeds that fail or time out are skipped; the result is deduplicated.
    pub async fn discover(&self) -> Vec<SocketAddr> {
        let mut peers = Vec::new();

        for seed in seeds(self.network.as_str()) {
            match self.resolve_seed(seed).await {
                Ok(addrs) => {
                    debug!(seed = %seed, count = addrs.len(), "resolved seed");
                    peers.extend(addrs);
                }
                Err(e) => {
                    warn!(seed = %seed, error = %e, "failed to resolve seed");
                }
            }
        }

        peers.sort();
        peers.dedup();

        info!(count = peers.len(), network = %self.network, "discovered peers");
        peers
    }

    /// Resolve one seed, off the async runtime's worker threads.
    async fn resolve_seed(&self, seed: &str) -> Result<Vec<SocketAddr>, std::io::Error> {
        let seed = seed.to_string();

        let result = timeout(
            self.dns_timeout,
            tokio::task::spawn_blocking(move || {
                seed.to_socket_addrs().map(|iter| iter.collect::<Vec<_>>())
            }),
        )
        .await;

        match result {
            Ok(Ok(Ok(addrs))) => Ok(addrs),
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(e)) => Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("task join error: {}", e),
            )),
            Err(_) => Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "DNS resolution timed out",
            )),
        }
    }
}
