use todo_feed::{
    application::todo_repository::TodoRepositoryImpl,
    config::{prepare_sqlite_file, Config, StoreConfig},
    domain::store::TodoStore,
    http::routing::{self, todos},
    infrastructure::{file_store::FileTodoStore, sqlite_store::SqliteTodoStore},
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    telemetry::init();

    match &config.store {
        StoreConfig::File(path) => {
            tracing::info!(path = %path.display(), "using file store");
            serve(FileTodoStore::new(path), &config).await
        }
        StoreConfig::Database(url) => {
            prepare_sqlite_file(url)?;
            tracing::info!("using database store");
            serve(SqliteTodoStore::connect(url).await?, &config).await
        }
    }
}

async fn serve<S: TodoStore + Clone>(store: S, config: &Config) -> anyhow::Result<()> {
    store.init().await?;
    let repository = TodoRepositoryImpl::new(store);
    let state = todos::AppState { repository, default_limit: config.default_limit };
    let router = routing::app(todos::router(state));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::ctrl_c;
    let _ = ctrl_c().await;
    tracing::info!("shutdown");
}
