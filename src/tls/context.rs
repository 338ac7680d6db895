//! Shared TLS client context with clone-on-write.
//!
//! # Responsibilities
//! - Hold the verify mode and certificate store used for upstream TLS
//! - Share one context between every scope that does not override it
//! - Copy the context the first time a scope changes it
//!
//! # Design Decisions
//! - `SharedTlsContext` is an `Arc`; retain is `clone`, release is `drop`
//! - Mutation is only reachable through `make_exclusive`, so a shared
//!   context can never be changed in place
//! - Copies share the certificate store; only the context is duplicated

use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use rustls::ClientConfig;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::tls::store::{CertStore, CertStoreError};
use crate::tls::verifier::NoServerVerification;

/// Peer verification policy for upstream TLS connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyMode {
    /// Accept any server certificate.
    None,
    /// Require a server certificate that chains to the store.
    Peer,
}

/// Errors building a rustls configuration from a context.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("failed to build TLS client config: {0}")]
    ConfigBuild(#[from] rustls::Error),
}

/// A TLS client context: verify mode plus a shared certificate store.
#[derive(Debug, Clone)]
pub struct TlsClientContext {
    verify_mode: VerifyMode,
    store: Arc<CertStore>,
}

impl TlsClientContext {
    /// Create a context over the given store.
    pub fn new(verify_mode: VerifyMode, store: CertStore) -> Self {
        Self {
            verify_mode,
            store: Arc::new(store),
        }
    }

    pub fn verify_mode(&self) -> VerifyMode {
        self.verify_mode
    }

    pub fn set_verify_mode(&mut self, mode: VerifyMode) {
        self.verify_mode = mode;
    }

    pub fn store(&self) -> &CertStore {
        &self.store
    }

    /// Install a new store, dropping this context's reference to the old one.
    pub fn replace_store(&mut self, store: CertStore) {
        self.store = Arc::new(store);
    }

    /// Build the rustls configuration the proxying side connects with.
    pub fn client_config(&self) -> Result<Arc<ClientConfig>, TlsError> {
        let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
        let algorithms = provider.signature_verification_algorithms;
        let builder =
            ClientConfig::builder_with_provider(provider).with_safe_default_protocol_versions()?;

        let config = match self.verify_mode {
            VerifyMode::Peer => builder
                .with_root_certificates(self.store.roots().clone())
                .with_no_client_auth(),
            VerifyMode::None => builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(NoServerVerification::new(algorithms)))
                .with_no_client_auth(),
        };

        Ok(Arc::new(config))
    }
}

/// Reference-counted handle to a [`TlsClientContext`].
#[derive(Debug, Clone)]
pub struct SharedTlsContext(Arc<TlsClientContext>);

impl SharedTlsContext {
    pub fn new(context: TlsClientContext) -> Self {
        Self(Arc::new(context))
    }

    /// The root context: peer verification with the default trust anchors.
    ///
    /// `bundle` names a PEM file; without one the platform's roots are used.
    /// Neither failure is fatal. An empty store is logged since HTTPS
    /// upstreams will fail verification until a scope sets `proxy.ssl.cafile`.
    pub fn with_default_bundle(bundle: Option<&Path>) -> Self {
        let store = match bundle {
            Some(path) => CertStore::load(path).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to load the default certificates file");
                CertStore::empty()
            }),
            None => CertStore::native(),
        };
        if store.is_empty() {
            tracing::warn!("Default certificate store is empty. Proxying to HTTPS servers may fail.");
        }
        Self::new(TlsClientContext::new(VerifyMode::Peer, store))
    }

    /// Get mutable access, copying the context first if it is shared.
    ///
    /// After this returns the handle is the only reference to its context.
    /// Other holders keep the original untouched.
    pub fn make_exclusive(&mut self) -> &mut TlsClientContext {
        Arc::make_mut(&mut self.0)
    }

    /// Load a PEM bundle and install it as this handle's store.
    ///
    /// The bundle is loaded before anything is copied or replaced, so a
    /// failure leaves the handle exactly as it was.
    pub fn replace_store_from_file(&mut self, path: &Path) -> Result<(), CertStoreError> {
        let store = CertStore::load(path)?;
        self.make_exclusive().replace_store(store);
        Ok(())
    }

    /// Number of live handles to this context.
    pub fn refcount(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Number of contexts sharing this context's store.
    pub fn store_refcount(&self) -> usize {
        Arc::strong_count(&self.0.store)
    }

    /// True if both handles point at the same context.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// True if both contexts use the same store.
    pub fn shares_store_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0.store, &other.0.store)
    }
}

impl Deref for SharedTlsContext {
    type Target = TlsClientContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Serialize for SharedTlsContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TlsClientContext", 3)?;
        state.serialize_field("verify_mode", &self.verify_mode)?;
        state.serialize_field("ca_file", &self.store.source())?;
        state.serialize_field("trust_anchors", &self.store.len())?;
        state.end()
    }
}
