use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use vitalwatch_alert::engine::AlertEngine;
use vitalwatch_notify::channels::file::FileSink;
use vitalwatch_notify::channels::log::LogSink;
use vitalwatch_notify::manager::NotificationManager;
use vitalwatch_notify::routing::SinkRoute;
use vitalwatch_notify::AlertSink;
use vitalwatch_storage::DataStore;

use vitalwatch_server::config::ServerConfig;
use vitalwatch_server::reader;
use vitalwatch_server::scheduler::EvaluationScheduler;

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  vitalwatch-server [config.toml]    Start the monitor (default: config/server.toml)");
}

fn init_tracing(config: &ServerConfig) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("vitalwatch=info".parse()?);
    if config.json_logs() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

fn build_notifier(config: &ServerConfig) -> Result<NotificationManager> {
    let mut sinks: Vec<Arc<dyn AlertSink>> = Vec::new();
    if config.notify.log_sink {
        sinks.push(Arc::new(LogSink));
    }
    if let Some(path) = &config.notify.file_sink_path {
        sinks.push(Arc::new(FileSink::new(path)?));
    }

    let routes = (0..sinks.len())
        .map(|sink_index| SinkRoute {
            min_priority: config.notify.min_priority,
            sink_index,
        })
        .collect();
    Ok(NotificationManager::new(sinks, routes))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config_path = match args.get(1).map(|s| s.as_str()) {
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(path) => path.to_string(),
        None => "config/server.toml".to_string(),
    };

    let (config, found) = ServerConfig::load_or_default(&config_path)?;
    init_tracing(&config)?;
    if found {
        tracing::info!(path = %config_path, "Configuration loaded");
    } else {
        tracing::warn!(path = %config_path, "Configuration file not found, using defaults");
    }

    let store = Arc::new(DataStore::new());
    let engine = Arc::new(AlertEngine::new(
        config.thresholds.clone(),
        config.annotations.clone(),
    ));
    let notifier = Arc::new(build_notifier(&config)?);

    if let Some(path) = &config.ingest.file_path {
        reader::ingest_file(path, &store).await?;
    }

    let scheduler = EvaluationScheduler::new(
        store,
        engine,
        notifier,
        config.evaluation.interval_secs,
        config.evaluation.window_ms(),
        config.evaluation.max_concurrent,
    );

    tokio::select! {
        _ = scheduler.run() => {}
        _ = signal::ctrl_c() => {
            tracing::info!("Shutting down gracefully");
        }
    }
    Ok(())
}
