//! pingwatch - minimal availability monitor powered by Rust and Tokio.
//!
//! Probes network targets (ICMP echo or HTTP `GET`) and reports their health
//! in one of two ways:
//!
//! - **Push mode**: on a schedule, every target is probed concurrently and the
//!   verdict is posted to the target's webhook.
//! - **Pull mode**: an HTTP server answers `GET /?key=..&host=..` with a
//!   status code that reflects a fresh probe of `host`.
//!
//! # Architecture
//!
//! ```text
//! Registry ──▶ Monitor ──▶ Prober ──▶ classify_push ──▶ Notifier ──▶ webhook
//!                          (ICMP │ HTTP)
//! QueryServer ───────────▶ Prober ──▶ classify_query ──▶ HTTP response
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use pingwatch::config::MonitorConfig;
//! use pingwatch::monitor::Monitor;
//! use pingwatch::notify::Notifier;
//! use pingwatch::probe::NetworkProber;
//! use pingwatch::registry::Registry;
//!
//! let config = MonitorConfig::load("targets.json")?;
//! let monitor = Monitor::new(
//!     Registry::from_config(&config),
//!     NetworkProber::for_push()?,
//!     Notifier::new()?,
//! );
//! monitor.run().await;
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars) with optional "-dirty" suffix
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)" or "0.1.0 (abc12345-dirty)"
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_VERSION"), ")");

pub mod classify;
pub mod config;
pub mod logging;
pub mod monitor;
pub mod notify;
pub mod probe;
pub mod registry;
pub mod server;

// Re-exports for convenience
pub use classify::{QueryVerdict, Status, Trigger, Verdict};
pub use monitor::Monitor;
pub use probe::{NetworkProber, Prober, Target};
pub use server::QueryServer;
