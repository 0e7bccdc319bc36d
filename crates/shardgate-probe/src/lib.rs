//! shardgate-probe — TCP-connect reachability checks.
//!
//! A probe succeeds only on a fully established connection within the
//! timeout. Timeouts, refusals, DNS failures, and malformed addresses are
//! all indistinguishable `false` — callers get a single liveness bit, no
//! partial-failure detail. Probes hold no shared state and are safe from
//! any number of concurrent callers.

use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::net::TcpStream;
use tracing::debug;

/// Probe `(host, port)` for reachability within `timeout`.
pub async fn probe(host: &str, port: u16, timeout: Duration) -> bool {
    probe_addr(&format!("{host}:{port}"), timeout).await
}

/// Probe a `"host:port"` address string. Malformed input yields `false`.
pub async fn probe_addr(addr: &str, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(e)) => {
            debug!(%addr, error = %e, "probe connect failed");
            false
        }
        Err(_) => {
            debug!(%addr, timeout_ms = timeout.as_millis() as u64, "probe timed out");
            false
        }
    }
}

/// Probe many `"host:port"` addresses concurrently.
///
/// The result is aligned by input position; a malformed entry yields
/// `false` at its position without affecting the others.
pub async fn probe_many(addrs: &[String], timeout: Duration) -> Vec<bool> {
    join_all(addrs.iter().map(|addr| probe_addr(addr, timeout))).await
}

/// Measure connect latency to `(host, port)`. `None` when unreachable
/// within the timeout.
pub async fn probe_rtt(host: &str, port: u16, timeout: Duration) -> Option<Duration> {
    let addr = format!("{host}:{port}");
    let start = Instant::now();
    match tokio::time::timeout(timeout, TcpStream::connect(&addr)).await {
        Ok(Ok(_stream)) => Some(start.elapsed()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    const TIMEOUT: Duration = Duration::from_secs(2);

    /// Bind a listener on an ephemeral loopback port.
    async fn local_listener() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    /// A loopback port with nothing listening on it.
    async fn closed_port() -> u16 {
        let (listener, port) = local_listener().await;
        drop(listener);
        port
    }

    #[tokio::test]
    async fn probe_reaches_live_listener() {
        let (_listener, port) = local_listener().await;
        assert!(probe("127.0.0.1", port, TIMEOUT).await);
    }

    #[tokio::test]
    async fn probe_fails_on_closed_port() {
        let port = closed_port().await;
        assert!(!probe("127.0.0.1", port, TIMEOUT).await);
    }

    #[tokio::test]
    async fn probe_fails_on_unresolvable_host() {
        assert!(!probe("host.invalid", 25565, TIMEOUT).await);
    }

    #[tokio::test]
    async fn probe_addr_rejects_malformed_input() {
        assert!(!probe_addr("not an address", TIMEOUT).await);
        assert!(!probe_addr("", TIMEOUT).await);
        assert!(!probe_addr("127.0.0.1", TIMEOUT).await); // Missing port.
    }

    #[tokio::test]
    async fn probe_is_bounded_by_timeout() {
        // Non-routable address (RFC 5737 TEST-NET) — connect hangs until
        // the timeout fires rather than refusing.
        let start = Instant::now();
        let up = probe("192.0.2.1", 25565, Duration::from_millis(200)).await;
        assert!(!up);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn probe_many_aligns_results_by_position() {
        let (_listener, open) = local_listener().await;
        let closed = closed_port().await;

        let addrs = vec![
            format!("127.0.0.1:{open}"),
            "garbage-entry".to_string(),
            format!("127.0.0.1:{closed}"),
            format!("127.0.0.1:{open}"),
        ];
        let results = probe_many(&addrs, TIMEOUT).await;

        assert_eq!(results, vec![true, false, false, true]);
    }

    #[tokio::test]
    async fn probe_many_empty_input() {
        let results = probe_many(&[], TIMEOUT).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn rtt_present_only_when_reachable() {
        let (_listener, port) = local_listener().await;
        let rtt = probe_rtt("127.0.0.1", port, TIMEOUT).await;
        assert!(rtt.is_some());
        assert!(rtt.unwrap() < TIMEOUT);

        let closed = closed_port().await;
        assert!(probe_rtt("127.0.0.1", closed, TIMEOUT).await.is_none());
    }

    #[tokio::test]
    async fn concurrent_probes_share_no_state() {
        let (_listener, port) = local_listener().await;
        let mut handles = Vec::new();
        for _ in 0..8 {
            handles.push(tokio::spawn(async move {
                probe("127.0.0.1", port, TIMEOUT).await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }
    }
}
