use clap::Parser;
use tracing_subscriber::EnvFilter;

use commutator_zenoh_runtime::config::Settings;

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=debug for per-tick decisions)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::parse();

    if let Err(e) = commutator_zenoh_runtime::runtime::run(settings).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
