//! Centralized configuration for the portal bridge.
//!
//! Constants for network behaviour and the local development setup, plus the
//! runtime `ClientConfig` that selects between strict and fallback dispatch.

use crate::{PortalError, Result};
use std::time::Duration;
use url::Url;

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
    pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
    pub const USER_AGENT: &'static str = "HR-Portal/0.1";
    pub const CONTENT_TYPE: &'static str = "application/json";
}

/// Local development defaults shared by the client and the dev servers.
pub struct DevConfig;

impl DevConfig {
    pub const DATABASE: &'static str = "odoo_hr";
    pub const LOGIN: &'static str = "admin";
    pub const PASSWORD: &'static str = "admin";
    pub const UID: i64 = 1;
    pub const BACKEND_PORT: u16 = 8069;
    pub const PROXY_PORT: u16 = 8070;
    pub const UI_ORIGIN: &'static str = "http://localhost:3000";
    pub const BACKEND_URL: &'static str = "http://localhost:8069";
    pub const PROXY_URL: &'static str = "http://localhost:8070";
}

/// ERP endpoint paths.
pub struct Endpoints;

impl Endpoints {
    pub const AUTHENTICATE: &'static str = "/web/session/authenticate";
    pub const DESTROY: &'static str = "/web/session/destroy";
    pub const DATABASE_LIST: &'static str = "/web/database/list";
    pub const CALL_KW: &'static str = "/web/dataset/call_kw";
}

/// How the dispatcher treats transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Every failure propagates unchanged.
    Strict,
    /// Transport failures are served from the in-memory dataset.
    Fallback,
}

impl DispatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchMode::Strict => "strict",
            DispatchMode::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Runtime configuration for a [`crate::Dispatcher`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
    proxy_url: Option<Url>,
    database: String,
    timeout: Duration,
    mode_override: Option<DispatchMode>,
}

impl ClientConfig {
    /// Configuration talking directly to `base_url`, without a proxy.
    pub fn direct(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_url("base_url", base_url)?,
            proxy_url: None,
            database: DevConfig::DATABASE.to_string(),
            timeout: NetworkConfig::REQUEST_TIMEOUT,
            mode_override: None,
        })
    }

    /// Configuration routed through a same-origin proxy.
    pub fn proxied(base_url: &str, proxy_url: &str) -> Result<Self> {
        Self::direct(base_url)?.with_proxy(proxy_url)
    }

    /// Read configuration from the environment.
    ///
    /// - `HR_PORTAL_ODOO_URL`: backend URL (default `http://localhost:8069`)
    /// - `HR_PORTAL_PROXY_URL`: proxy URL; when set, dispatch is strict
    /// - `HR_PORTAL_DATABASE`: database name (default `odoo_hr`)
    pub fn from_env() -> Result<Self> {
        let base = std::env::var("HR_PORTAL_ODOO_URL")
            .unwrap_or_else(|_| DevConfig::BACKEND_URL.to_string());
        let mut config = Self::direct(&base)?;

        if let Ok(proxy) = std::env::var("HR_PORTAL_PROXY_URL") {
            if !proxy.trim().is_empty() {
                config = config.with_proxy(&proxy)?;
            }
        }
        if let Ok(db) = std::env::var("HR_PORTAL_DATABASE") {
            if !db.trim().is_empty() {
                config = config.with_database(db);
            }
        }
        Ok(config)
    }

    /// Route requests through a proxy. Implies strict mode.
    pub fn with_proxy(mut self, proxy_url: &str) -> Result<Self> {
        self.proxy_url = Some(parse_url("proxy_url", proxy_url)?);
        self.check_mode()?;
        Ok(self)
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Force a dispatch mode.
    ///
    /// Fallback cannot be forced while a proxy is configured.
    pub fn with_mode(mut self, mode: DispatchMode) -> Result<Self> {
        self.mode_override = Some(mode);
        self.check_mode()?;
        Ok(self)
    }

    /// The URL requests are actually sent to.
    pub fn endpoint(&self) -> &Url {
        self.proxy_url.as_ref().unwrap_or(&self.base_url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn proxy_url(&self) -> Option<&Url> {
        self.proxy_url.as_ref()
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn mode(&self) -> DispatchMode {
        match (self.mode_override, &self.proxy_url) {
            (Some(mode), _) => mode,
            (None, Some(_)) => DispatchMode::Strict,
            (None, None) => DispatchMode::Fallback,
        }
    }

    fn check_mode(&self) -> Result<()> {
        if self.proxy_url.is_some() && self.mode_override == Some(DispatchMode::Fallback) {
            return Err(PortalError::Config {
                message: "fallback mode cannot be used with a proxy endpoint".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_url(field: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| PortalError::Config {
        message: format!("invalid {}: {}: {}", field, raw, e),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(PortalError::Config {
            message: format!("unsupported scheme for {}: {}", field, other),
        }),
    }
}
