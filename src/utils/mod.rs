/// Initializes the tracing subscriber for logging.
///
/// Filtering is controlled by `RUST_LOG`; output goes through the default
/// `fmt` layer. Call once at the top of a binary's `main`.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
