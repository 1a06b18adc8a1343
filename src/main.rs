use anyhow::{Context, Result};
use axum::{Router, middleware, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{Level, info, warn};
use tracing_subscriber::fmt::format::FmtSpan;

use model_trainer::{
    AuditLog, ContractExecutor, DatabasePool, ModelTrainer,
    api::{
        ContractApiState, GuardConfig, GuardState, PlatformApiState, body_size_middleware,
        create_contract_router, create_platform_router, logging_middleware,
        rate_limit_middleware, security_headers_middleware,
    },
    config::{TrainerConfig, sanitize_for_logging},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first so bad settings never reach the ledger
    let config = Arc::new(TrainerConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {:#}", e);
        eprintln!("Please check the MODEL_TRAINER_* environment variables.");
        e
    })?);

    init_logging(&config)?;

    info!("Starting model trainer ledger");

    let owner = config.platform.owner_principal()?;
    let params = config.platform.to_parameters();
    info!(
        "Platform owner: {}, min_contribution={}, min_stake={}, reward_rate={}",
        owner, params.min_contribution, params.min_stake, params.reward_rate
    );

    let mut trainer = ModelTrainer::new(owner, params);

    if config.database.postgres_enabled {
        info!(
            "Connecting to PostgreSQL at {}",
            sanitize_for_logging(&config.database.postgres_url)
        );
        let db = DatabasePool::new(&config.database.postgres_url)
            .await
            .map_err(|e| anyhow::anyhow!(e))
            .context("Failed to connect to PostgreSQL")?;
        db.init_schema()
            .await
            .map_err(|e| anyhow::anyhow!(e))
            .context("Failed to initialize database schema")?;
        trainer = trainer.with_database(Arc::new(db));
    } else {
        warn!("PostgreSQL disabled - ledger state lives in memory only");
    }

    let trainer = Arc::new(trainer);
    let restored = trainer.load_from_database().await?;
    if restored > 0 {
        info!("Restored {} participants", restored);
    }

    let audit = Arc::new(AuditLog::new());
    let executor = Arc::new(ContractExecutor::new(trainer.clone(), audit.clone()));

    let guard_state = GuardState::new(GuardConfig::from_config(&config));
    spawn_rate_limit_cleanup(guard_state.clone());

    let app = Router::new()
        // Contract calls (transactions, blocks, read-only)
        .nest(
            "/contract",
            create_contract_router(ContractApiState {
                executor: executor.clone(),
            }),
        )
        // Participants, parameters, stats and audit trail
        .merge(create_platform_router(PlatformApiState {
            trainer: trainer.clone(),
            audit: audit.clone(),
        }))
        .route("/health", get(|| async { "OK" }))
        // Outermost layer runs first
        .layer(middleware::from_fn_with_state(
            guard_state.clone(),
            body_size_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            guard_state.clone(),
            rate_limit_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            guard_state.clone(),
            logging_middleware,
        ))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http());

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", bind_addr, e))?;

    info!("Model trainer listening on {}", bind_addr);
    info!(
        "Request guards: Rate limit={}/min, Max body={}KB",
        config.security.rate_limit_per_minute,
        config.security.max_request_size / 1024
    );

    // Serve with connect info for client IP extraction
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn init_logging(config: &TrainerConfig) -> Result<()> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(if config.logging.log_requests {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    if config.logging.sanitize_logs {
        info!("Logging initialized with data sanitization enabled");
    }

    Ok(())
}

/// Periodically drop idle rate limit windows
fn spawn_rate_limit_cleanup(state: GuardState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            state.rate_limiter.cleanup();
        }
    });
}
