//! Directive registry.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::configurator::directive::Directive;
use crate::configurator::handlers;

/// Name → directive table. Read-only once built.
#[derive(Debug, Default)]
pub struct DirectiveRegistry {
    directives: Vec<Directive>,
    by_name: HashMap<&'static str, usize>,
}

impl DirectiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directive.
    ///
    /// # Panics
    /// If a directive with the same name is already registered.
    pub fn register(&mut self, directive: Directive) -> &mut Self {
        assert!(
            !self.by_name.contains_key(directive.name),
            "directive `{}` registered twice",
            directive.name
        );
        self.by_name.insert(directive.name, self.directives.len());
        self.directives.push(directive);
        self
    }

    pub fn lookup(&self, name: &str) -> Option<&Directive> {
        self.by_name.get(name).map(|&i| &self.directives[i])
    }

    /// Directives in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Directive> {
        self.directives.iter()
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

/// The process-wide registry holding the proxy directives.
pub fn registry() -> &'static DirectiveRegistry {
    static REGISTRY: OnceLock<DirectiveRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut registry = DirectiveRegistry::new();
        handlers::register_proxy_directives(&mut registry);
        registry
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigNode;
    use crate::configurator::directive::{DirectiveContext, Levels};
    use crate::configurator::error::ConfigureError;

    fn noop(_: &mut DirectiveContext<'_>, _: &ConfigNode) -> Result<(), ConfigureError> {
        Ok(())
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = DirectiveRegistry::new();
        registry
            .register(Directive::scalar("a", noop))
            .register(Directive::scalar("b", noop).levels(Levels::PATH));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("b").unwrap().levels, Levels::PATH);
        assert!(registry.lookup("c").is_none());
        let names: Vec<_> = registry.iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_registration_panics() {
        let mut registry = DirectiveRegistry::new();
        registry.register(Directive::scalar("a", noop));
        registry.register(Directive::scalar("a", noop));
    }

    #[test]
    fn test_global_registry_is_shared() {
        assert!(std::ptr::eq(registry(), registry()));
        assert!(registry().lookup("proxy.reverse.url").unwrap().deferred);
        assert_eq!(registry().len(), 8);
    }
}
