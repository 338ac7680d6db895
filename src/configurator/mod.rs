//! Scoped proxy configurator.
//!
//! # Data Flow
//! ```text
//! ConfigNode tree (global → hosts → paths → nested paths)
//!     → walker.rs (enter / body / exit per scope)
//!         → stack.rs (push inherited ProxyVars, pop + commit)
//!         → registry.rs (directive lookup, level + shape checks)
//!         → handlers.rs (mutate the current ProxyVars)
//!         → deferred directives at scope exit (capture registrations)
//!     → sink.rs (global settings, then registrations in declaration order)
//! ```
//!
//! # Design Decisions
//! - Fail fast: the first error aborts the walk and nothing reaches the sink
//! - Children inherit the parent's settings as of the moment they are entered
//! - TLS contexts are shared between scopes until one of them changes it

pub mod directive;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod scan;
pub mod sink;
pub mod stack;
pub mod vars;
pub mod walker;

pub use directive::{Directive, DirectiveContext, Levels, ScopeLevel};
pub use error::ConfigureError;
pub use registry::{registry, DirectiveRegistry};
pub use sink::{
    ConfigSink, EffectiveConfig, GlobalProxyConfig, ProxyTarget, ReverseProxyRegistration, RouteKey,
};
pub use stack::{ScopeStack, DEFAULT_MAX_DEPTH};
pub use vars::{ProxyDefaults, ProxyVars, WebSocketVars};
pub use walker::{Configurator, ConfiguratorOptions};
