//! Certificate store loading.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rustls::pki_types::CertificateDer;
use rustls::RootCertStore;
use thiserror::Error;

/// Failure to load a PEM certificate bundle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to load certificates file {}: {reason}", path.display())]
pub struct CertStoreError {
    pub path: PathBuf,
    pub reason: String,
}

impl CertStoreError {
    fn new(path: &Path, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// A set of trust anchors plus the file they came from.
///
/// Stores are never mutated once built; TLS contexts share them through an
/// `Arc` and replace them wholesale.
#[derive(Debug, Clone)]
pub struct CertStore {
    roots: RootCertStore,
    source: Option<PathBuf>,
}

impl CertStore {
    /// A store with no trust anchors.
    pub fn empty() -> Self {
        Self {
            roots: RootCertStore::empty(),
            source: None,
        }
    }

    /// Load every certificate of a PEM bundle as a trust anchor.
    ///
    /// Fails if the file cannot be read, contains malformed PEM, holds a
    /// certificate that is not a usable trust anchor, or holds no
    /// certificates at all.
    pub fn load(path: &Path) -> Result<Self, CertStoreError> {
        let file = File::open(path).map_err(|e| CertStoreError::new(path, e.to_string()))?;
        let mut reader = BufReader::new(file);

        let certs: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut reader)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CertStoreError::new(path, e.to_string()))?;

        let mut roots = RootCertStore::empty();
        for cert in certs {
            roots
                .add(cert)
                .map_err(|e| CertStoreError::new(path, format!("invalid CA certificate: {}", e)))?;
        }

        if roots.is_empty() {
            return Err(CertStoreError::new(path, "no certificates found"));
        }

        tracing::debug!(
            ca_file = %path.display(),
            cert_count = roots.len(),
            "Loaded CA certificates"
        );

        Ok(Self {
            roots,
            source: Some(path.to_path_buf()),
        })
    }

    /// The platform's trust anchors.
    ///
    /// Certificates the platform store yields but rustls rejects are skipped.
    /// The result may be empty when the host has no usable roots.
    pub fn native() -> Self {
        let result = rustls_native_certs::load_native_certs();
        for e in &result.errors {
            tracing::warn!(error = %e, "Error while loading native root certificates");
        }

        let mut roots = RootCertStore::empty();
        let (added, ignored) = roots.add_parsable_certificates(result.certs);
        tracing::debug!(added, ignored, "Loaded native root certificates");

        Self {
            roots,
            source: None,
        }
    }

    /// The trust anchors.
    pub fn roots(&self) -> &RootCertStore {
        &self.roots
    }

    /// File the store was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Number of trust anchors.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

impl Default for CertStore {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/ca.pem")
    }

    #[test]
    fn test_load_bundle() {
        let store = CertStore::load(&fixture()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.source(), Some(fixture().as_path()));
    }

    #[test]
    fn test_missing_file() {
        let err = CertStore::load(Path::new("/nonexistent/ca.pem")).unwrap_err();
        assert_eq!(err.path, PathBuf::from("/nonexistent/ca.pem"));
        assert!(err.to_string().contains("/nonexistent/ca.pem"));
    }

    #[test]
    fn test_file_without_certificates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not a certificate").unwrap();

        let err = CertStore::load(file.path()).unwrap_err();
        assert_eq!(err.reason, "no certificates found");
    }

    #[test]
    fn test_empty_store() {
        let store = CertStore::empty();
        assert!(store.is_empty());
        assert!(store.source().is_none());
    }

    #[test]
    fn test_native_store_has_no_source() {
        let store = CertStore::native();
        assert!(store.source().is_none());
        assert_eq!(store.len(), store.roots().len());
    }
}
