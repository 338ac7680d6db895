//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the configuration document
//! - Apply it to produce the effective configuration
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The same path is used for the initial load and for reloads

use std::path::Path;

use thiserror::Error;

use crate::config::{load_document, ConfigError};
use crate::configurator::{ConfigureError, Configurator, ConfiguratorOptions, EffectiveConfig};

/// Anything that can go wrong turning a file into an effective configuration.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Document(#[from] ConfigError),

    #[error(transparent)]
    Configure(#[from] ConfigureError),
}

/// Load `path` and apply it.
pub fn load(path: &Path, options: &ConfiguratorOptions) -> Result<EffectiveConfig, LoadError> {
    let root = load_document(path)?;
    let effective = Configurator::new(options.clone()).configure(&root)?;

    tracing::info!(
        path = %path.display(),
        reverse_proxies = effective.reverse_proxies.len(),
        "Configuration loaded"
    );
    Ok(effective)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_success_and_failures() {
        let dir = tempfile::tempdir().unwrap();

        let good = dir.path().join("good.yaml");
        fs::write(&good, "proxy.timeout.io: 10\n").unwrap();
        assert!(load(&good, &ConfiguratorOptions::default()).is_ok());

        let bad = dir.path().join("bad.yaml");
        fs::write(&bad, "proxy.timeout.io: soon\n").unwrap();
        assert!(matches!(
            load(&bad, &ConfiguratorOptions::default()),
            Err(LoadError::Configure(ConfigureError::ScalarFormat { .. }))
        ));

        let missing = dir.path().join("missing.yaml");
        assert!(matches!(
            load(&missing, &ConfiguratorOptions::default()),
            Err(LoadError::Document(ConfigError::Io { .. }))
        ));
    }
}
