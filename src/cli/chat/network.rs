use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

use super::services::NetworkCheck;

const DEFAULT_PROBE_ADDR: &str = "generativelanguage.googleapis.com:443";
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Reports the network as available when a TCP connection to `addr` opens.
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_ADDR, DEFAULT_PROBE_TIMEOUT)
    }
}

impl TcpProbe {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }

    /// Probes the host serving `base_url`, falling back to the Gemini host
    /// when the URL has no usable host or port.
    pub fn for_base_url(base_url: &str) -> Self {
        match probe_addr(base_url) {
            Some(addr) => Self::new(addr, DEFAULT_PROBE_TIMEOUT),
            None => {
                warn!(
                    "Cannot derive a probe address from {}, using {}",
                    base_url, DEFAULT_PROBE_ADDR
                );
                Self::default()
            }
        }
    }
}

/// `host:port` of a URL, with the scheme's default port when none is given.
pub fn probe_addr(base_url: &str) -> Option<String> {
    let url = Url::parse(base_url).ok()?;
    let host = url.host_str()?;
    let port = url.port_or_known_default()?;
    Some(format!("{}:{}", host, port))
}

#[async_trait]
impl NetworkCheck for TcpProbe {
    async fn is_online(&self) -> bool {
        match timeout(self.timeout, TcpStream::connect(&self.addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!("Network probe to {} failed: {}", self.addr, e);
                false
            }
            Err(_) => {
                debug!("Network probe to {} timed out", self.addr);
                false
            }
        }
    }
}
