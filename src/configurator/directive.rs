//! Directive definitions.

use std::fmt;

use serde::Serialize;

use crate::config::ConfigNode;
use crate::configurator::error::ConfigureError;
use crate::configurator::sink::{ProxyTarget, ReverseProxyRegistration, RouteKey};
use crate::configurator::vars::ProxyVars;

/// Nesting level of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeLevel {
    Global,
    Host,
    Path,
}

impl fmt::Display for ScopeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeLevel::Global => write!(f, "global"),
            ScopeLevel::Host => write!(f, "host"),
            ScopeLevel::Path => write!(f, "path"),
        }
    }
}

/// Set of levels a directive may appear at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Levels(u8);

impl Levels {
    pub const GLOBAL: Levels = Levels(0b001);
    pub const HOST: Levels = Levels(0b010);
    pub const PATH: Levels = Levels(0b100);
    pub const ALL: Levels = Levels(0b111);

    pub fn contains(self, level: ScopeLevel) -> bool {
        let bit = match level {
            ScopeLevel::Global => Self::GLOBAL,
            ScopeLevel::Host => Self::HOST,
            ScopeLevel::Path => Self::PATH,
        };
        self.0 & bit.0 != 0
    }
}

impl fmt::Display for Levels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = [ScopeLevel::Global, ScopeLevel::Host, ScopeLevel::Path]
            .into_iter()
            .filter(|level| self.contains(*level))
            .map(|level| level.to_string())
            .collect();
        write!(f, "{}", names.join(","))
    }
}

/// Handler invoked with the directive's value node.
pub type DirectiveHandler = fn(&mut DirectiveContext<'_>, &ConfigNode) -> Result<(), ConfigureError>;

/// A registered directive. Every directive takes a scalar argument.
#[derive(Clone, Copy)]
pub struct Directive {
    pub name: &'static str,
    pub levels: Levels,
    /// Run at scope exit against the scope's final variables.
    pub deferred: bool,
    pub handler: DirectiveHandler,
}

impl Directive {
    /// A directive taking a scalar, allowed everywhere, run immediately.
    pub fn scalar(name: &'static str, handler: DirectiveHandler) -> Self {
        Self {
            name,
            levels: Levels::ALL,
            deferred: false,
            handler,
        }
    }

    pub fn levels(mut self, levels: Levels) -> Self {
        self.levels = levels;
        self
    }

    pub fn deferred(mut self) -> Self {
        self.deferred = true;
        self
    }
}

impl fmt::Debug for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Directive")
            .field("name", &self.name)
            .field("levels", &self.levels)
            .field("deferred", &self.deferred)
            .finish_non_exhaustive()
    }
}

/// Registrations captured during a walk, tagged with declaration order.
#[derive(Debug, Default)]
pub struct RegistrationQueue {
    entries: Vec<(usize, ReverseProxyRegistration)>,
}

impl RegistrationQueue {
    pub fn push(&mut self, seq: usize, registration: ReverseProxyRegistration) {
        self.entries.push((seq, registration));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registrations in the order their directives were declared.
    pub fn into_ordered(mut self) -> impl Iterator<Item = ReverseProxyRegistration> {
        self.entries.sort_by_key(|(seq, _)| *seq);
        self.entries.into_iter().map(|(_, registration)| registration)
    }
}

/// What a handler sees of the scope it runs in.
pub struct DirectiveContext<'a> {
    pub level: ScopeLevel,
    pub route: &'a RouteKey,
    pub vars: &'a mut ProxyVars,
    pub(crate) seq: usize,
    pub(crate) registrations: &'a mut RegistrationQueue,
}

impl DirectiveContext<'_> {
    /// Capture the scope's current variables for `target`.
    pub fn register_reverse_proxy(&mut self, target: ProxyTarget) {
        tracing::debug!(
            route = %self.route,
            target = %target.url,
            "Registering reverse proxy"
        );
        self.registrations.push(
            self.seq,
            ReverseProxyRegistration {
                route: self.route.clone(),
                target,
                vars: self.vars.clone(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert!(Levels::ALL.contains(ScopeLevel::Host));
        assert!(Levels::PATH.contains(ScopeLevel::Path));
        assert!(!Levels::PATH.contains(ScopeLevel::Global));

        assert_eq!(Levels::ALL.to_string(), "global,host,path");
        assert_eq!(Levels::PATH.to_string(), "path");
    }

    #[test]
    fn test_directive_builder() {
        fn noop(_: &mut DirectiveContext<'_>, _: &ConfigNode) -> Result<(), ConfigureError> {
            Ok(())
        }

        let d = Directive::scalar("x", noop);
        assert_eq!(d.levels, Levels::ALL);
        assert!(!d.deferred);

        let d = Directive::scalar("y", noop).levels(Levels::PATH).deferred();
        assert_eq!(d.levels, Levels::PATH);
        assert!(d.deferred);
    }
}
