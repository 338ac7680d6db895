//! Configuration documents.
//!
//! # Data Flow
//! ```text
//! config file (YAML/TOML)
//!     → loader.rs (parse into a located ConfigNode tree)
//!     → configurator (apply directives)
//!     → EffectiveConfig (immutable)
//!     → shared via ArcSwap with the admin API
//!
//! On change:
//!     watcher.rs detects change
//!     → loader.rs loads the new document
//!     → configurator applies it
//!     → atomic swap of Arc<EffectiveConfig>
//! ```
//!
//! # Design Decisions
//! - Key order is preserved; directive order is significant
//! - Every node carries its key path for diagnostics
//! - A reload that fails keeps the running configuration

pub mod loader;
pub mod node;
pub mod watcher;

pub use loader::{load_document, parse_document, ConfigError, DocumentFormat};
pub use node::{ConfigNode, NodeValue, SourceLocation};
