//! Directive dispatcher.
//!
//! Walks the configuration tree depth first. Every scope is entered
//! (snapshot pushed), its entries run in document order, then its deferred
//! directives run against the scope's final snapshot before it exits.
//! Registrations reach the sink only after the whole tree has been walked.

use std::path::PathBuf;

use crate::config::ConfigNode;
use crate::configurator::directive::{Directive, DirectiveContext, RegistrationQueue, ScopeLevel};
use crate::configurator::error::ConfigureError;
use crate::configurator::registry::{registry, DirectiveRegistry};
use crate::configurator::sink::{ConfigSink, EffectiveConfig, RouteKey};
use crate::configurator::stack::{RootTls, ScopeStack, DEFAULT_MAX_DEPTH};
use crate::configurator::vars::ProxyDefaults;
use crate::tls::SharedTlsContext;

/// Key opening host scopes (global level only).
pub const HOSTS_KEY: &str = "hosts";
/// Key opening path scopes (host and path levels).
pub const PATHS_KEY: &str = "paths";

/// Knobs of a configuration walk.
#[derive(Debug, Clone)]
pub struct ConfiguratorOptions {
    /// Maximum number of nested scopes, global included.
    pub max_depth: usize,
    pub defaults: ProxyDefaults,
    /// CA bundle loaded into the root TLS context.
    pub default_ca_bundle: Option<PathBuf>,
    /// Use this context as the root instead of building one.
    pub root_tls: Option<SharedTlsContext>,
}

impl Default for ConfiguratorOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            defaults: ProxyDefaults::default(),
            default_ca_bundle: None,
            root_tls: None,
        }
    }
}

/// Applies configuration trees using a directive registry.
#[derive(Debug, Clone)]
pub struct Configurator<'r> {
    registry: &'r DirectiveRegistry,
    options: ConfiguratorOptions,
}

impl Configurator<'static> {
    /// Configurator over the process-wide proxy directives.
    pub fn new(options: ConfiguratorOptions) -> Self {
        Self::with_registry(registry(), options)
    }
}

impl<'r> Configurator<'r> {
    pub fn with_registry(registry: &'r DirectiveRegistry, options: ConfiguratorOptions) -> Self {
        Self { registry, options }
    }

    pub fn options(&self) -> &ConfiguratorOptions {
        &self.options
    }

    /// Walk `root` and feed the result to `sink`.
    ///
    /// On error the sink is left untouched and every TLS context reference
    /// taken during the walk has been released.
    pub fn apply(&self, root: &ConfigNode, sink: &mut dyn ConfigSink) -> Result<(), ConfigureError> {
        let root_tls = match &self.options.root_tls {
            Some(ctx) => RootTls::Context(ctx.clone()),
            None => RootTls::DefaultBundle(self.options.default_ca_bundle.clone()),
        };
        let mut walk = Walk {
            registry: self.registry,
            stack: ScopeStack::new(self.options.defaults, root_tls, self.options.max_depth),
            registrations: RegistrationQueue::default(),
            next_seq: 0,
        };

        if let Err(e) = walk.scope(root, ScopeLevel::Global, &RouteKey::global(), sink) {
            walk.stack.unwind();
            return Err(e);
        }

        let count = walk.registrations.len();
        for registration in walk.registrations.into_ordered() {
            sink.register_reverse_proxy(registration);
        }
        tracing::debug!(reverse_proxies = count, "Configuration applied");
        Ok(())
    }

    /// Walk `root` into a fresh [`EffectiveConfig`].
    pub fn configure(&self, root: &ConfigNode) -> Result<EffectiveConfig, ConfigureError> {
        let mut effective = EffectiveConfig::default();
        self.apply(root, &mut effective)?;
        Ok(effective)
    }
}

/// A deferred directive waiting for its scope to exit.
struct Pending<'n> {
    seq: usize,
    directive: &'n Directive,
    node: &'n ConfigNode,
}

struct Walk<'r> {
    registry: &'r DirectiveRegistry,
    stack: ScopeStack,
    registrations: RegistrationQueue,
    next_seq: usize,
}

impl<'r> Walk<'r> {
    fn scope(
        &mut self,
        node: &ConfigNode,
        level: ScopeLevel,
        route: &RouteKey,
        sink: &mut dyn ConfigSink,
    ) -> Result<(), ConfigureError> {
        let entries = expect_mapping(node)?;

        self.stack
            .push_inherit()
            .map_err(|e| ConfigureError::DepthExceeded {
                max_depth: e.max_depth,
                location: node.location.clone(),
            })?;
        tracing::trace!(%level, %route, depth = self.stack.depth(), "Entered scope");

        let mut deferred: Vec<Pending<'_>> = Vec::new();
        for (key, value) in entries {
            match key.as_str() {
                HOSTS_KEY => {
                    check_scope_key(key, level, ScopeLevel::Global == level, value)?;
                    for (host, block) in expect_mapping(value)? {
                        self.scope(block, ScopeLevel::Host, &RouteKey::host(host.as_str()), sink)?;
                    }
                }
                PATHS_KEY => {
                    check_scope_key(key, level, level != ScopeLevel::Global, value)?;
                    for (path, block) in expect_mapping(value)? {
                        self.scope(block, ScopeLevel::Path, &route.with_path(path.as_str()), sink)?;
                    }
                }
                name => {
                    let directive = self.resolve(name, level, value)?;
                    let seq = self.next_seq;
                    self.next_seq += 1;
                    if directive.deferred {
                        deferred.push(Pending {
                            seq,
                            directive,
                            node: value,
                        });
                    } else {
                        self.invoke(directive, value, seq, level, route)?;
                    }
                }
            }
        }

        for pending in deferred {
            self.invoke(pending.directive, pending.node, pending.seq, level, route)?;
        }

        self.stack.pop_commit(level, sink);
        tracing::trace!(%level, %route, "Exited scope");
        Ok(())
    }

    /// Look up `name` and check it may be used here with this value.
    fn resolve(
        &self,
        name: &str,
        level: ScopeLevel,
        value: &ConfigNode,
    ) -> Result<&'r Directive, ConfigureError> {
        let directive = self
            .registry
            .lookup(name)
            .ok_or_else(|| ConfigureError::UnknownDirective {
                name: name.to_string(),
                location: value.location.clone(),
            })?;

        if !directive.levels.contains(level) {
            return Err(ConfigureError::DirectiveNotAllowedAtLevel {
                name: name.to_string(),
                level,
                location: value.location.clone(),
            });
        }

        if value.as_scalar().is_none() {
            return Err(ConfigureError::ExpectedScalar {
                name: name.to_string(),
                found: value.kind(),
                location: value.location.clone(),
            });
        }

        Ok(directive)
    }

    fn invoke(
        &mut self,
        directive: &Directive,
        node: &ConfigNode,
        seq: usize,
        level: ScopeLevel,
        route: &RouteKey,
    ) -> Result<(), ConfigureError> {
        let mut ctx = DirectiveContext {
            level,
            route,
            vars: self.stack.current_mut(),
            seq,
            registrations: &mut self.registrations,
        };
        (directive.handler)(&mut ctx, node)
    }
}

fn expect_mapping(node: &ConfigNode) -> Result<&[(String, ConfigNode)], ConfigureError> {
    node.entries().ok_or_else(|| ConfigureError::ExpectedMapping {
        found: node.kind(),
        location: node.location.clone(),
    })
}

fn check_scope_key(
    key: &str,
    level: ScopeLevel,
    allowed: bool,
    value: &ConfigNode,
) -> Result<(), ConfigureError> {
    if allowed {
        Ok(())
    } else {
        Err(ConfigureError::DirectiveNotAllowedAtLevel {
            name: key.to_string(),
            level,
            location: value.location.clone(),
        })
    }
}
