//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Read document → Apply directives → Publish effective configuration
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop reload task → Stop admin listener → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: configuration first, then watcher, then admin listener
//! - A failed initial load is fatal; a failed reload is logged and skipped

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{load, LoadError};
