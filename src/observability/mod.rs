//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! loader / configurator / watcher / admin
//!     → tracing events (structured fields: path, route, level, depth)
//!     → logging.rs subscriber (EnvFilter + fmt)
//!     → stderr
//! ```
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the command-line level when set
//! - Scope traversal is logged at `trace`, results at `info`

pub mod logging;
