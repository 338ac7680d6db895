//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::configurator::{ConfiguratorOptions, EffectiveConfig};
use crate::lifecycle::startup;

/// A watcher that re-applies the configuration file when it changes.
pub struct ConfigWatcher {
    path: PathBuf,
    options: ConfiguratorOptions,
    update_tx: mpsc::UnboundedSender<EffectiveConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for freshly applied configurations.
    pub fn new(
        path: &Path,
        options: ConfiguratorOptions,
    ) -> (Self, mpsc::UnboundedReceiver<EffectiveConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                options,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file. Dropping the returned watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();
        let options = self.options.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Config file change detected, reloading...");
                        match startup::load(&path, &options) {
                            Ok(effective) => {
                                let _ = tx.send(effective);
                            }
                            Err(e) => {
                                tracing::error!(
                                    error = %e,
                                    "Failed to reload config. Keeping current configuration."
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_reload_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxy.yaml");
        fs::write(&path, "proxy.timeout.io: 100\n").unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(&path, ConfiguratorOptions::default());
        let _watcher = watcher.run().unwrap();

        // Give the backend a moment to register before writing.
        tokio::time::sleep(Duration::from_millis(200)).await;
        fs::write(&path, "proxy.timeout.io: 250\n").unwrap();

        let effective = tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                let effective = rx.recv().await.unwrap();
                let io = effective.global.as_ref().unwrap().io_timeout;
                if io == Duration::from_millis(250) {
                    return effective;
                }
            }
        })
        .await
        .unwrap();

        assert!(effective.reverse_proxies.is_empty());
    }
}
