use std::sync::Arc;

use anyhow::Context;
use api_rest::AppState;
use axum::Router;
use keeper_callback::{
    CallbackConfig, CallbackService, HttpTransport, NotificationSource, RequestsController,
    callback_channel,
};
use keeper_core::config::{database_url_from_env_value, flag_from_env_value};
use keeper_core::{CoreConfig, ErrorCatalog, KeeperService, Store};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Main entry point for the config keeper
///
/// Starts the REST server and the callback service that delivers change notifications to
/// listeners. Both share one cancellation token, cancelled on Ctrl-C: the server finishes
/// in-flight requests and the callback service is awaited before exit.
///
/// # Environment Variables
/// - `KEEPER_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `DATABASE_URL`: SQLite database url (default: "sqlite://keeper.db")
/// - `PRODUCTION`: emit JSON logs when true
/// - `CALLBACK_*`: callback channel, concurrency and retry settings
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let core_config = CoreConfig::new(
        database_url_from_env_value(std::env::var("DATABASE_URL").ok()),
        flag_from_env_value("PRODUCTION", std::env::var("PRODUCTION").ok())?,
    )?;
    init_tracing(core_config.production())?;

    let callback_config = CallbackConfig::from_env_values(|name| std::env::var(name).ok())
        .context("invalid callback configuration")?;
    let rest_addr =
        std::env::var("KEEPER_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    let store = Store::connect(core_config.database_url())
        .await
        .with_context(|| format!("failed to open {}", core_config.database_url()))?;

    let (sender, receiver) = callback_channel(callback_config.channel_capacity);
    let source: Arc<dyn NotificationSource> = Arc::new(store.clone());
    let controller = RequestsController::new(Arc::new(HttpTransport::new()), callback_config.retry);
    let callbacks = CallbackService::new(
        receiver,
        source,
        controller,
        callback_config.max_concurrent,
    );

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));
    let callback_task = tokio::spawn(callbacks.run(cancel.clone()));

    let service = KeeperService::new(store, Arc::new(sender));
    let app = api_rest::router(AppState::new(service, ErrorCatalog::standard()));

    tracing::info!("++ Starting keeper REST on {}", rest_addr);
    let listener = TcpListener::bind(&rest_addr)
        .await
        .with_context(|| format!("failed to bind {rest_addr}"))?;
    let served = serve_until_cancelled(listener, app, cancel.clone()).await;

    cancel.cancel();
    callback_task.await?;
    served?;
    tracing::info!("keeper stopped");

    Ok(())
}

fn init_tracing(production: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("keeper_run=info".parse()?)
        .add_directive("keeper_core=info".parse()?)
        .add_directive("keeper_callback=info".parse()?)
        .add_directive("api_rest=info".parse()?);

    let registry = tracing_subscriber::registry().with(filter);
    if production {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
    Ok(())
}

/// Serve `app` until `cancel` fires, then finish in-flight requests.
async fn serve_until_cancelled(
    listener: TcpListener,
    app: Router,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
}

async fn cancel_on_signal(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("shutdown signal received");
            cancel.cancel();
        }
        Err(e) => tracing::error!("failed to listen for shutdown signal: {:?}", e),
    }
}
