use crate::error::{Error, Result};
use crate::services::posting_query::ListingPolicy;
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    /// Absent means postings live in process memory only.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub cors_allowed_origins: Vec<String>,
    pub exclude_expired_postings: bool,
    pub max_page_limit: i64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env_opt("DATABASE_URL"),
            database_max_connections: get_env_parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            cors_allowed_origins: get_env_opt("CORS_ALLOWED_ORIGINS")
                .map(|raw| parse_list(&raw))
                .unwrap_or_default(),
            exclude_expired_postings: get_env_parse_or("EXCLUDE_EXPIRED_POSTINGS", false)?,
            max_page_limit: get_env_parse_or("MAX_PAGE_LIMIT", 100)?,
        })
    }

    pub fn listing_policy(&self) -> ListingPolicy {
        ListingPolicy {
            exclude_expired: self.exclude_expired_postings,
            max_limit: self.max_page_limit.max(1),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_address: "127.0.0.1:5000".to_string(),
            database_url: None,
            database_max_connections: 10,
            cors_allowed_origins: Vec::new(),
            exclude_expired_postings: false,
            max_page_limit: 100,
        }
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
