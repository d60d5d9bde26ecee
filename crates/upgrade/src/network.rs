//! Startup gate: wait for a default network gateway.

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;

/// Give up on the network after this long.
pub const WAIT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(120);

/// Interval between gateway lookups.
pub const GATEWAY_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("no network access: no default gateway after {}s", .waited.as_secs())]
    NoNetwork { waited: Duration },
}

/// Looks up the default gateway address.
pub trait GatewayProbe: Send + Sync {
    /// `None` (or an empty string) when there is no default route.
    fn default_gateway(&self) -> Option<String>;
}

/// Reads the default route from the kernel routing table.
#[derive(Debug, Clone)]
pub struct ProcNetRoute {
    path: PathBuf,
}

impl ProcNetRoute {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcNetRoute {
    fn default() -> Self {
        Self::new("/proc/net/route")
    }
}

impl GatewayProbe for ProcNetRoute {
    fn default_gateway(&self) -> Option<String> {
        let table = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "cannot read routing table");
                return None;
            }
        };
        parse_default_gateway(&table).map(|gw| gw.to_string())
    }
}

/// Extracts the gateway of the default route from `/proc/net/route` text.
///
/// Addresses in the table are hex in host (little-endian) byte order.
pub fn parse_default_gateway(table: &str) -> Option<Ipv4Addr> {
    table.lines().skip(1).find_map(|line| {
        let mut fields = line.split_whitespace();
        let destination = fields.nth(1)?;
        let gateway = fields.next()?;
        if destination != "00000000" {
            return None;
        }
        match u32::from_str_radix(gateway, 16) {
            Ok(0) | Err(_) => None,
            Ok(raw) => Some(Ipv4Addr::from(raw.to_le_bytes())),
        }
    })
}

/// Holds startup until a default gateway shows up, bounded by a timeout.
pub struct NetworkGate<P> {
    probe: P,
    timeout: Duration,
    poll_interval: Duration,
}

impl<P: GatewayProbe> NetworkGate<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            timeout: WAIT_GATEWAY_TIMEOUT,
            poll_interval: GATEWAY_POLL_INTERVAL,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Returns the gateway address, or [`GateError::NoNetwork`] once the
    /// timeout has elapsed without one.
    pub async fn wait(&self) -> Result<String, GateError> {
        let start = Instant::now();
        let deadline = start + self.timeout;
        let mut logged = false;

        loop {
            if let Some(gateway) = self.probe.default_gateway().filter(|g| !g.is_empty()) {
                tracing::info!(%gateway, waited_secs = start.elapsed().as_secs(), "network available");
                return Ok(gateway);
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            if !logged {
                tracing::info!(timeout_secs = self.timeout.as_secs(), "waiting for default gateway");
                logged = true;
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }

        let waited = start.elapsed();
        tracing::warn!(waited_secs = waited.as_secs(), "no default gateway, giving up");
        Err(GateError::NoNetwork { waited })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    /// Reports a gateway from the `ready_at`-th lookup on (1-based).
    struct CountingProbe {
        calls: AtomicU32,
        ready_at: u32,
        gateway: &'static str,
    }

    impl CountingProbe {
        fn new(ready_at: u32, gateway: &'static str) -> Self {
            Self {
                calls: AtomicU32::new(0),
                ready_at,
                gateway,
            }
        }
    }

    impl GatewayProbe for CountingProbe {
        fn default_gateway(&self) -> Option<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            (n >= self.ready_at).then(|| self.gateway.to_string())
        }
    }

    const ROUTE_TABLE: &str = "\
Iface\tDestination\tGateway \tFlags\tRefCnt\tUse\tMetric\tMask\t\tMTU\tWindow\tIRTT
eth0\t0001A8C0\t00000000\t0001\t0\t0\t100\t00FFFFFF\t0\t0\t0
eth0\t00000000\t0101A8C0\t0003\t0\t0\t100\t00000000\t0\t0\t0
";

    #[test]
    fn parses_default_route() {
        assert_eq!(
            parse_default_gateway(ROUTE_TABLE),
            Some(Ipv4Addr::new(192, 168, 1, 1))
        );
    }

    #[test]
    fn no_default_route() {
        let table = ROUTE_TABLE.lines().take(2).collect::<Vec<_>>().join("\n");
        assert_eq!(parse_default_gateway(&table), None);
        assert_eq!(parse_default_gateway(""), None);
    }

    #[test]
    fn zero_gateway_is_not_a_gateway() {
        let table = "Iface\tDestination\tGateway\nwg0\t00000000\t00000000\n";
        assert_eq!(parse_default_gateway(table), None);
    }

    #[test]
    fn proc_net_route_reads_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("route");
        std::fs::write(&path, ROUTE_TABLE).unwrap();
        assert_eq!(
            ProcNetRoute::new(&path).default_gateway().as_deref(),
            Some("192.168.1.1")
        );
        assert_eq!(ProcNetRoute::new(tmp.path().join("missing")).default_gateway(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn gateway_present_immediately() {
        let gate = NetworkGate::new(CountingProbe::new(1, "10.0.0.1"));
        let start = Instant::now();
        assert_eq!(gate.wait().await.unwrap(), "10.0.0.1");
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn gateway_appears_after_a_few_seconds() {
        let gate = NetworkGate::new(CountingProbe::new(5, "10.0.0.1"));
        let start = Instant::now();
        assert!(gate.wait().await.is_ok());
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_timeout() {
        // Would only appear after 125 seconds.
        let probe = CountingProbe::new(126, "10.0.0.1");
        let gate = NetworkGate::new(probe);
        let start = Instant::now();

        let err = gate.wait().await.unwrap_err();
        assert_eq!(start.elapsed(), WAIT_GATEWAY_TIMEOUT);
        assert!(matches!(err, GateError::NoNetwork { waited } if waited == WAIT_GATEWAY_TIMEOUT));
        assert_eq!(gate.probe.calls.load(Ordering::SeqCst), 121);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_gateway_counts_as_missing() {
        let gate = NetworkGate::new(CountingProbe::new(1, ""))
            .with_timeout(Duration::from_secs(3))
            .with_poll_interval(Duration::from_millis(500));
        let start = Instant::now();
        assert!(gate.wait().await.is_err());
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[test]
    fn error_message_mentions_wait() {
        let err = GateError::NoNetwork {
            waited: Duration::from_secs(120),
        };
        assert_eq!(
            err.to_string(),
            "no network access: no default gateway after 120s"
        );
    }
}
