use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` overrides the verbosity flag.
pub fn init(verbose: bool) {
    let level = if verbose { Level::INFO } else { Level::WARN };

    let result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();

    if let Err(e) = result {
        eprintln!("Warning: logging already initialized: {}", e);
    }
}
