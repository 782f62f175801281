mod api;
mod metrics;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use doctrans_core::{
    job_service::{HttpJobService, JobService},
    load_config,
    translation::{HttpTranslationClient, TranslationClient},
    validate_config, Config, TaskOutcome, TaskRunner,
};

use api::create_router;
use state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How long shutdown waits for halted tasks to report and clean up.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    init_logging();

    // Determine config path
    let config_path = std::env::var("DOCTRANS_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    info!(version = VERSION, "Configuration loaded successfully");
    info!("Translation endpoint: {}", config.translation.url);
    info!("Job service: {}", config.job_service.url);
    info!(
        concurrency = config.dispatcher.concurrency,
        max_batch_characters = config.dispatcher.max_batch_characters,
        "Dispatcher settings"
    );

    let runner = Arc::new(build_runner(&config)?);

    match std::env::var("DOCTRANS_RUN_MODE").as_deref() {
        Ok("simple") => run_simple(runner).await,
        Ok("server") | Err(_) => serve(config, runner).await,
        Ok(other) => bail!("Unknown run mode: {}", other),
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    let json = std::env::var("DOCTRANS_LOG_JSON").is_ok_and(|v| v == "1");

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn build_runner(config: &Config) -> Result<TaskRunner> {
    let translation: Arc<dyn TranslationClient> = Arc::new(
        HttpTranslationClient::new(&config.translation)
            .context("Failed to create translation client")?,
    );
    let job_service: Arc<dyn JobService> = Arc::new(
        HttpJobService::new(config.job_service.clone())
            .context("Failed to create job service client")?,
    );

    std::fs::create_dir_all(&config.worker.work_dir).with_context(|| {
        format!("Failed to create work dir {:?}", config.worker.work_dir)
    })?;
    info!("Work directory: {:?}", config.worker.work_dir);

    Ok(TaskRunner::from_config(job_service, translation, config))
}

/// Run the single task named by `DOCTRANS_TASK_ID` and exit.
async fn run_simple(runner: Arc<TaskRunner>) -> Result<()> {
    let task_id = std::env::var("DOCTRANS_TASK_ID")
        .context("DOCTRANS_TASK_ID is required in simple run mode")?;
    info!(task_id = %task_id, "Running single task");

    let stop = runner.register(&task_id).await?;
    let task = {
        let runner = Arc::clone(&runner);
        let task_id = task_id.clone();
        tokio::spawn(async move { runner.run_registered(&task_id, stop).await })
    };

    let halt = {
        let runner = Arc::clone(&runner);
        tokio::spawn(async move {
            shutdown_signal().await;
            warn!("Shutdown requested, halting task");
            runner.stop_all().await;
        })
    };

    let outcome = task.await.context("Task panicked")?;
    halt.abort();

    match outcome? {
        TaskOutcome::Completed {
            translated_segments,
            domain,
        } => info!(
            task_id = %task_id,
            translated_segments,
            domain = domain.as_deref().unwrap_or("-"),
            "Task completed"
        ),
        TaskOutcome::Halted => info!(task_id = %task_id, "Task halted"),
    }
    Ok(())
}

async fn serve(config: Config, runner: Arc<TaskRunner>) -> Result<()> {
    let state = Arc::new(AppState::new(config.clone(), Arc::clone(&runner)));
    let app = create_router(Arc::clone(&state));

    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let shutdown_state = Arc::clone(&state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("Server shutting down...");
            shutdown_state.begin_shutdown();
            shutdown_state.runner().stop_all().await;
        })
        .await
        .context("Server error")?;

    wait_for_tasks(&runner).await;
    Ok(())
}

/// Give halted tasks time to report `cancelled` and remove their files.
async fn wait_for_tasks(runner: &TaskRunner) {
    let deadline = tokio::time::Instant::now() + SHUTDOWN_GRACE;
    loop {
        let active = runner.active_tasks().await;
        if active.is_empty() {
            info!("All tasks stopped");
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            warn!(tasks = ?active, "Tasks still running at shutdown");
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
