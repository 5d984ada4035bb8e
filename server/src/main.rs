//! findoc HTTP server.
//!
//! Usage: `findoc-server [--config <path>]`
//!
//! The worker pool and its blocking HTTP clients are built before the tokio
//! runtime starts and torn down after it stops.

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use findoc::{apply_env, load_config, Config, Service};

fn main() -> anyhow::Result<()> {
    let config = match config_path_from_args()? {
        Some(path) => load_config(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    let config = apply_env(config)?;

    findoc::logging::init(config.log_format)
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    let service = Service::start(&config).context("starting findoc service")?;
    let app = service.router();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    let served = runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(&config.bind_address)
            .await
            .with_context(|| format!("binding {}", config.bind_address))?;
        info!(
            address = %config.bind_address,
            workers = config.worker_count,
            "findoc listening"
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("serving HTTP")
    });
    drop(runtime);

    // In-flight and queued jobs finish before the process exits.
    service.shutdown();

    served
}

fn config_path_from_args() -> anyhow::Result<Option<PathBuf>> {
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        None => Ok(None),
        Some("--config") | Some("-c") => {
            let path = args
                .get(2)
                .context("Usage: findoc-server [--config <path>]")?;
            Ok(Some(PathBuf::from(path)))
        }
        Some(other) => anyhow::bail!(
            "unexpected argument '{}'. Usage: findoc-server [--config <path>]",
            other
        ),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
