//! Connectivity probe for the backend and the proxy.

use hr_portal_core::{ClientConfig, DispatchMode, Dispatcher, NetworkConfig};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Outcome of probing one endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub name: String,
    pub url: String,
    pub reachable: bool,
    pub databases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reachable {
            write!(
                f,
                "{:<8} {} ok, databases: {}",
                self.name,
                self.url,
                self.databases.join(", ")
            )
        } else {
            write!(
                f,
                "{:<8} {} unreachable: {}",
                self.name,
                self.url,
                self.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}

async fn probe_one(name: &str, url: &str) -> ProbeReport {
    let report = |reachable, databases, error| ProbeReport {
        name: name.to_string(),
        url: url.to_string(),
        reachable,
        databases,
        error,
    };

    let dispatcher = ClientConfig::direct(url)
        .and_then(|c| c.with_mode(DispatchMode::Strict))
        .map(|c| c.with_timeout(NetworkConfig::PROBE_TIMEOUT))
        .and_then(Dispatcher::new);
    let dispatcher = match dispatcher {
        Ok(d) => d,
        Err(e) => return report(false, Vec::new(), Some(e.to_string())),
    };

    match dispatcher.list_databases().await {
        Ok(databases) => {
            debug!("{} answered with {} database(s)", url, databases.len());
            report(true, databases, None)
        }
        Err(e) => report(false, Vec::new(), Some(e.to_string())),
    }
}

/// Probe the direct backend and the proxy concurrently.
pub async fn run_probe(backend_url: &str, proxy_url: &str) -> Vec<ProbeReport> {
    let (backend, proxy) = futures::join!(
        probe_one("backend", backend_url),
        probe_one("proxy", proxy_url)
    );
    vec![backend, proxy]
}

/// Reports as a pretty-printed JSON array.
pub fn reports_to_json(reports: &[ProbeReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}
