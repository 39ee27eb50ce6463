use anyhow::Result;
use homestats::*;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let reader: Arc<dyn sysinfo_repo::HostMetricsReader> = Arc::new(sysinfo_repo::SysinfoRepo::new());
    let builder = Arc::new(
        snapshot_builder::SnapshotBuilder::seeded(reader)
            .map_err(|e| anyhow::anyhow!("seeding rate tracker: {}", e))?,
    );

    let history_repo = Arc::new(
        history_repo::HistoryRepo::connect(
            &app_config.database.path,
            app_config.database.max_pool_size,
        )
        .await?
        .with_max_limit(app_config.history.max_limit),
    );
    history_repo.init().await?;

    let sampler = sampler::spawn(
        sampler::SamplerDeps {
            builder: builder.clone(),
            history_repo: history_repo.clone(),
        },
        sampler::SamplerConfig {
            interval: Duration::from_secs(app_config.sampling.interval_secs),
            tick_timeout: Duration::from_secs(app_config.sampling.tick_timeout_secs),
        },
    );

    let query = Arc::new(query_service::QueryService::new(
        builder,
        history_repo.clone(),
        app_config.history,
    ));
    let app = routes::app(query);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Stop sampling before the pool goes away, whatever ended the server.
    sampler.shutdown().await;
    history_repo.close().await;
    served?;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("Received shutdown signal");
}
