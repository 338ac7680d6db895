//! Per-scope proxy variables.

use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::tls::SharedTlsContext;

pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_millis(30_000);
pub const DEFAULT_KEEPALIVE_TIMEOUT: Duration = Duration::from_millis(2_000);
pub const DEFAULT_WEBSOCKET_TIMEOUT: Duration = Duration::from_millis(300_000);

pub(crate) fn serialize_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Websocket proxying settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WebSocketVars {
    pub enabled: bool,
    #[serde(rename = "timeout_ms", serialize_with = "serialize_millis")]
    pub timeout: Duration,
}

/// Root values every scope inherits unless overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyDefaults {
    pub io_timeout: Duration,
    pub keepalive_timeout: Duration,
    pub preserve_host: bool,
    pub websocket: WebSocketVars,
}

impl Default for ProxyDefaults {
    fn default() -> Self {
        Self {
            io_timeout: DEFAULT_IO_TIMEOUT,
            keepalive_timeout: DEFAULT_KEEPALIVE_TIMEOUT,
            preserve_host: false,
            // Disabled until websocket proxying is no longer experimental.
            websocket: WebSocketVars {
                enabled: false,
                timeout: DEFAULT_WEBSOCKET_TIMEOUT,
            },
        }
    }
}

impl ProxyDefaults {
    /// Build the root snapshot around the given TLS context.
    pub fn instantiate(&self, tls: SharedTlsContext) -> ProxyVars {
        ProxyVars {
            io_timeout: self.io_timeout,
            keepalive_timeout: self.keepalive_timeout,
            preserve_host: self.preserve_host,
            websocket: self.websocket,
            tls,
        }
    }
}

/// Effective proxy settings of one scope.
///
/// Cloning a snapshot retains its TLS context; dropping it releases it.
#[derive(Debug, Clone, Serialize)]
pub struct ProxyVars {
    #[serde(rename = "io_timeout_ms", serialize_with = "serialize_millis")]
    pub io_timeout: Duration,
    #[serde(rename = "keepalive_timeout_ms", serialize_with = "serialize_millis")]
    pub keepalive_timeout: Duration,
    pub preserve_host: bool,
    pub websocket: WebSocketVars,
    pub tls: SharedTlsContext,
}
