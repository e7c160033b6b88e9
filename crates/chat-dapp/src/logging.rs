use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Crates whose events are shown at the configured level.
const CRATES: &[&str] = &["chat_dapp", "chat_contract", "wallet_provider"];

/// Builds the filter: `RUST_LOG` when set, otherwise `level` for this
/// workspace's crates and `warn` for everything else.
pub fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level)))
}

fn directives(level: &str) -> String {
    let mut directives = vec!["warn".to_string()];
    directives.extend(CRATES.iter().map(|c| format!("{c}={level}")));
    directives.join(",")
}

/// Installs the global subscriber. Events go to stderr so they do not mix
/// with the rendered page on stdout.
pub fn init(level: &str) {
    tracing_subscriber::registry()
        .with(filter(level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
