use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `PRESSBOX_LOG` overrides the
/// default filter, e.g. `PRESSBOX_LOG=pressbox=debug,reqwest=warn`.
pub fn init() {
    let filter = EnvFilter::try_from_env("PRESSBOX_LOG")
        .unwrap_or_else(|_| EnvFilter::new("pressbox=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
