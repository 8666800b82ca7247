use std::net::SocketAddr;
use std::sync::Arc;

use job_board_backend::database::{
    memory::InMemoryPostingRepository,
    pool::{create_pool, run_migrations},
    postgres::PgPostingRepository,
    repository::PostingRepository,
};
use job_board_backend::{
    config::{get_config, init_config},
    middleware::cors::cors_layer,
    routes, AppState,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("job_board_backend=info,tower_http=info")),
        )
        .init();
    init_config()?;
    let config = get_config();

    let repository: Arc<dyn PostingRepository> = match config.database_url {
        Some(_) => {
            let pool = create_pool(config).await?;
            run_migrations(&pool).await?;
            info!("Using Postgres posting store");
            Arc::new(PgPostingRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, postings are kept in memory and lost on restart");
            Arc::new(InMemoryPostingRepository::new())
        }
    };

    if config.exclude_expired_postings {
        info!("Expired postings are hidden from listings and stats");
    }

    let app_state = AppState::new(repository, config);
    let app = routes::router(app_state, cors_layer(&config.cors_allowed_origins));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
