use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_on_error(result: anyhow::Result<()>) {
    if let Err(err) = result {
        eprintln!("\u{001b}[31merror:\u{001b}[0m {err:?}");
        std::process::exit(1);
    }
}

#[cfg(feature = "server")]
#[tokio::main]
async fn main() {
    init_tracing();
    exit_on_error(layerboard::cli::dispatch().await);
}

#[cfg(not(feature = "server"))]
fn main() {
    init_tracing();
    exit_on_error(layerboard::cli::dispatch_sync());
}
