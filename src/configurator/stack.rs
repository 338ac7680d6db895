//! Scope variable stack.
//!
//! # Responsibilities
//! - Hold one `ProxyVars` snapshot per open scope
//! - Start every scope as a copy of its parent
//! - Commit the global scope to the sink and release everything else
//!
//! # Design Decisions
//! - A plain `Vec` bounded by `max_depth`; index 0 is the global scope
//! - Pushing copies the parent snapshot, which retains its TLS context;
//!   popping drops it, which releases it
//! - Dropping the stack mid-walk releases every open scope

use thiserror::Error;

use crate::configurator::directive::ScopeLevel;
use crate::configurator::sink::{ConfigSink, GlobalProxyConfig};
use crate::configurator::vars::{ProxyDefaults, ProxyVars};
use crate::tls::SharedTlsContext;

/// Global, host, path and one nested path.
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Pushing would nest scopes deeper than the stack allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("scope nesting exceeds maximum depth of {max_depth}")]
pub struct DepthExceeded {
    pub max_depth: usize,
}

/// Source of the global scope's TLS context.
#[derive(Debug, Clone)]
pub enum RootTls {
    /// Build a fresh context from this CA bundle (or an empty store).
    DefaultBundle(Option<std::path::PathBuf>),
    /// Reuse a context owned by the caller.
    Context(SharedTlsContext),
}

impl RootTls {
    fn materialize(&self) -> SharedTlsContext {
        match self {
            RootTls::DefaultBundle(bundle) => SharedTlsContext::with_default_bundle(bundle.as_deref()),
            RootTls::Context(ctx) => ctx.clone(),
        }
    }
}

/// Stack of per-scope snapshots.
#[derive(Debug)]
pub struct ScopeStack {
    defaults: ProxyDefaults,
    root_tls: RootTls,
    frames: Vec<ProxyVars>,
    max_depth: usize,
}

impl ScopeStack {
    pub fn new(defaults: ProxyDefaults, root_tls: RootTls, max_depth: usize) -> Self {
        Self {
            defaults,
            root_tls,
            frames: Vec::with_capacity(max_depth),
            max_depth,
        }
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Open a scope inheriting the current one.
    ///
    /// The first scope gets the root defaults and a root TLS context. On
    /// error the stack is left as it was.
    pub fn push_inherit(&mut self) -> Result<(), DepthExceeded> {
        if self.frames.len() >= self.max_depth {
            return Err(DepthExceeded {
                max_depth: self.max_depth,
            });
        }

        let frame = match self.frames.last() {
            Some(parent) => parent.clone(),
            None => self.defaults.instantiate(self.root_tls.materialize()),
        };
        self.frames.push(frame);
        Ok(())
    }

    /// Close the current scope.
    ///
    /// The global scope hands its I/O timeout and TLS context to the sink;
    /// any other scope just releases its snapshot.
    pub fn pop_commit(&mut self, level: ScopeLevel, sink: &mut dyn ConfigSink) {
        let Some(frame) = self.frames.pop() else {
            tracing::error!(%level, "Unbalanced scope exit on an empty scope stack");
            return;
        };

        if level == ScopeLevel::Global {
            sink.commit_global(GlobalProxyConfig {
                io_timeout: frame.io_timeout,
                tls: frame.tls,
            });
        }
    }

    /// Variables of the current scope.
    ///
    /// # Panics
    /// If no scope is open.
    pub fn current(&self) -> &ProxyVars {
        self.frames.last().expect("no scope is open")
    }

    /// Mutable variables of the current scope.
    ///
    /// # Panics
    /// If no scope is open.
    pub fn current_mut(&mut self) -> &mut ProxyVars {
        self.frames.last_mut().expect("no scope is open")
    }

    /// Release every open scope.
    pub fn unwind(&mut self) {
        if !self.frames.is_empty() {
            tracing::debug!(depth = self.frames.len(), "Unwinding scope stack");
        }
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configurator::sink::EffectiveConfig;
    use std::time::Duration;

    fn stack_with(root: &SharedTlsContext, max_depth: usize) -> ScopeStack {
        ScopeStack::new(
            ProxyDefaults::default(),
            RootTls::Context(root.clone()),
            max_depth,
        )
    }

    #[test]
    fn test_push_inherits_parent() {
        let root = SharedTlsContext::with_default_bundle(None);
        let mut stack = stack_with(&root, DEFAULT_MAX_DEPTH);

        stack.push_inherit().unwrap();
        stack.current_mut().io_timeout = Duration::from_millis(5000);
        stack.push_inherit().unwrap();

        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.current().io_timeout, Duration::from_millis(5000));
        assert!(SharedTlsContext::ptr_eq(&stack.current().tls, &root));
        // caller + stack template + two frames
        assert_eq!(root.refcount(), 4);
    }

    #[test]
    fn test_child_override_does_not_leak_into_parent() {
        let root = SharedTlsContext::with_default_bundle(None);
        let mut stack = stack_with(&root, DEFAULT_MAX_DEPTH);
        let mut sink = EffectiveConfig::default();

        stack.push_inherit().unwrap();
        stack.push_inherit().unwrap();
        stack.current_mut().preserve_host = true;
        stack.pop_commit(ScopeLevel::Host, &mut sink);

        assert!(!stack.current().preserve_host);
        assert!(sink.global.is_none());
    }

    #[test]
    fn test_depth_bound_leaves_stack_unchanged() {
        let root = SharedTlsContext::with_default_bundle(None);
        let mut stack = stack_with(&root, 2);

        stack.push_inherit().unwrap();
        stack.push_inherit().unwrap();
        let count = root.refcount();

        assert_eq!(stack.push_inherit(), Err(DepthExceeded { max_depth: 2 }));
        assert_eq!(stack.depth(), 2);
        assert_eq!(root.refcount(), count);
    }

    #[test]
    fn test_global_pop_commits_to_sink() {
        let root = SharedTlsContext::with_default_bundle(None);
        let mut stack = stack_with(&root, DEFAULT_MAX_DEPTH);
        let mut sink = EffectiveConfig::default();

        stack.push_inherit().unwrap();
        stack.current_mut().io_timeout = Duration::from_millis(1234);
        stack.pop_commit(ScopeLevel::Global, &mut sink);

        let global = sink.global.as_ref().unwrap();
        assert_eq!(global.io_timeout, Duration::from_millis(1234));
        assert!(SharedTlsContext::ptr_eq(&global.tls, &root));
        assert_eq!(stack.depth(), 0);
        // caller + stack template + sink
        assert_eq!(root.refcount(), 3);
    }

    #[test]
    fn test_unwind_releases_all_frames() {
        let root = SharedTlsContext::with_default_bundle(None);
        let mut stack = stack_with(&root, DEFAULT_MAX_DEPTH);

        for _ in 0..3 {
            stack.push_inherit().unwrap();
        }
        assert_eq!(root.refcount(), 5);

        stack.unwind();
        assert_eq!(stack.depth(), 0);
        assert_eq!(root.refcount(), 2);

        drop(stack);
        assert_eq!(root.refcount(), 1);
    }

    #[test]
    fn test_default_bundle_root() {
        let mut stack = ScopeStack::new(ProxyDefaults::default(), RootTls::DefaultBundle(None), 1);
        stack.push_inherit().unwrap();
        assert_eq!(stack.current().tls.refcount(), 1);
        assert_eq!(
            stack.current().tls.store().len(),
            crate::tls::CertStore::native().len()
        );
    }

    #[test]
    fn test_pop_on_empty_stack_commits_nothing() {
        let root = SharedTlsContext::with_default_bundle(None);
        let mut stack = stack_with(&root, DEFAULT_MAX_DEPTH);
        let mut sink = EffectiveConfig::default();

        stack.pop_commit(ScopeLevel::Global, &mut sink);

        assert!(sink.global.is_none());
        assert_eq!(stack.depth(), 0);
        assert_eq!(root.refcount(), 2);
    }
}
