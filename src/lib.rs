//! Scoped reverse-proxy configuration engine.
//!
//! Walks a hierarchical configuration document (global, hosts, paths),
//! applies `proxy.*` directives with per-scope inheritance, shares upstream
//! TLS contexts copy-on-write, and emits one reverse-proxy registration per
//! `proxy.reverse.url`.

// Core subsystems
pub mod config;
pub mod configurator;
pub mod tls;

// Surfaces
pub mod admin;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use configurator::{Configurator, ConfiguratorOptions, EffectiveConfig};
pub use lifecycle::Shutdown;
