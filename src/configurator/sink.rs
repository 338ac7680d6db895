//! Effective configuration produced by a walk.
//!
//! # Responsibilities
//! - Define what the configurator hands to its consumer
//! - Collect the global settings and reverse-proxy registrations
//!
//! # Design Decisions
//! - The consumer only sees fully resolved snapshots; nothing reaches a
//!   sink from a walk that failed
//! - Registrations own their snapshot (and so a reference to its TLS context)

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::configurator::vars::{serialize_millis, ProxyVars};
use crate::tls::SharedTlsContext;

/// Host and path a scope is bound to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct RouteKey {
    pub host: Option<String>,
    pub path: Option<String>,
}

impl RouteKey {
    pub fn global() -> Self {
        Self::default()
    }

    pub fn host(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            path: None,
        }
    }

    /// Same host, new path.
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self {
            host: self.host.clone(),
            path: Some(path.into()),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.host, &self.path) {
            (None, None) => write!(f, "<global>"),
            (Some(host), None) => write!(f, "{}", host),
            (None, Some(path)) => write!(f, "*{}", path),
            (Some(host), Some(path)) => write!(f, "{}{}", host, path),
        }
    }
}

/// Upstream a path is proxied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyTarget {
    pub url: Url,
    pub host: String,
    pub port: u16,
    pub tls: bool,
}

/// Why a target URL was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetParseError {
    #[error("{0}")]
    Invalid(#[from] url::ParseError),

    #[error("unsupported scheme `{0}` (expected http or https)")]
    UnsupportedScheme(String),

    #[error("missing host")]
    MissingHost,
}

impl ProxyTarget {
    /// Parse an `http://` or `https://` URL with a host.
    pub fn parse(input: &str) -> Result<Self, TargetParseError> {
        let url = Url::parse(input.trim())?;

        let tls = match url.scheme() {
            "http" => false,
            "https" => true,
            other => return Err(TargetParseError::UnsupportedScheme(other.to_string())),
        };
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or(TargetParseError::MissingHost)?
            .to_string();
        let port = url
            .port_or_known_default()
            .unwrap_or(if tls { 443 } else { 80 });

        Ok(Self { url, host, port, tls })
    }

    /// `host:port` of the upstream.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Settings committed by the global scope.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalProxyConfig {
    #[serde(rename = "io_timeout_ms", serialize_with = "serialize_millis")]
    pub io_timeout: Duration,
    pub tls: SharedTlsContext,
}

/// A path bound to an upstream with the settings in effect at its scope.
#[derive(Debug, Clone, Serialize)]
pub struct ReverseProxyRegistration {
    pub route: RouteKey,
    pub target: ProxyTarget,
    pub vars: ProxyVars,
}

/// Receiver of the configuration a successful walk produces.
pub trait ConfigSink {
    /// Called once, when the global scope exits.
    fn commit_global(&mut self, global: GlobalProxyConfig);

    /// Called for every registration, in declaration order.
    fn register_reverse_proxy(&mut self, registration: ReverseProxyRegistration);
}

/// Sink that keeps everything it is given.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EffectiveConfig {
    pub global: Option<GlobalProxyConfig>,
    pub reverse_proxies: Vec<ReverseProxyRegistration>,
}

impl EffectiveConfig {
    /// Registrations bound to `path`, in declaration order.
    pub fn registrations_for<'a>(
        &'a self,
        path: &'a str,
    ) -> impl Iterator<Item = &'a ReverseProxyRegistration> + 'a {
        self.reverse_proxies
            .iter()
            .filter(move |r| r.route.path.as_deref() == Some(path))
    }
}

impl ConfigSink for EffectiveConfig {
    fn commit_global(&mut self, global: GlobalProxyConfig) {
        self.global = Some(global);
    }

    fn register_reverse_proxy(&mut self, registration: ReverseProxyRegistration) {
        self.reverse_proxies.push(registration);
    }
}
