//! # Observability Setup
//!
//! One-call initialization of the `tracing` subscriber for binaries and
//! integration harnesses. Library code never installs a subscriber itself;
//! it only emits events and spans.

/// Initializes structured logging for the process.
///
/// Filtering is controlled via the `RUST_LOG` environment variable:
/// - `RUST_LOG=info` - lifecycle events and claims
/// - `RUST_LOG=debug` - full request payloads and hub drop counts
/// - `RUST_LOG=delivery_server=debug` - debug for the domain crate only
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
