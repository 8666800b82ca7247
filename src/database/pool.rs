use crate::config::Config;
use crate::error::{Error, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| Error::Config("DATABASE_URL is not set".to_string()))?;
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(database_url)
        .await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
