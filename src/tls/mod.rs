//! Upstream TLS client contexts.
//!
//! # Data Flow
//! ```text
//! global scope enter
//!     → SharedTlsContext::with_default_bundle (root context)
//!     → inherited by every nested scope (refcount + 1)
//!
//! proxy.ssl.verify-peer / proxy.ssl.cafile
//!     → make_exclusive (copy if shared, store stays shared)
//!     → mutate the private copy
//!
//! scope exit → handle dropped (refcount - 1)
//! ```

pub mod context;
pub mod store;
pub mod verifier;

pub use context::{SharedTlsContext, TlsClientContext, TlsError, VerifyMode};
pub use store::{CertStore, CertStoreError};
