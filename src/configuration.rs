use std::{env, ops::Deref, str::FromStr, sync::Arc, time::Duration};

use tracing::warn;

use crate::{error::Error, provider::DatabasePool};

#[derive(Debug)]
pub struct AppState<T>(Arc<T>);

impl<T> AppState<T> {
    pub fn new(state: T) -> AppState<T> {
        AppState(Arc::new(state))
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> AppState<T> {
        AppState(Arc::clone(&self.0))
    }
}

impl<T> Deref for AppState<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Arc<T> {
        &self.0
    }
}

#[derive(Debug)]
pub struct State {
    pub config: Config,
    pub database: DatabasePool,
}

impl State {
    pub fn new(config: Config, database: DatabasePool) -> State {
        Self { config, database }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub query_timeout: Duration,
}

impl Config {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }
}

pub fn get_configuration() -> Result<Config, Error> {
    let database_url = env::var("DATABASE_URL")?;
    let server_host = var_or("SERVER_HOST", String::from("0.0.0.0"))?;
    let port = var_or("PORT", 8080)?;
    let allowed_origins = parse_origins(&var_or(
        "ALLOWED_ORIGINS",
        String::from("*"),
    )?);
    let max_connections = var_or("DB_MAX_CONNECTIONS", 20)?;
    let acquire_timeout = Duration::from_secs(var_or("DB_ACQUIRE_TIMEOUT", 5)?);
    let query_timeout = Duration::from_secs(var_or("QUERY_TIMEOUT", 30)?);

    if max_connections == 0 {
        return Err(Error::ConfigurationError(String::from(
            "DB_MAX_CONNECTIONS must be greater than 0",
        )));
    }

    let config = Config {
        database_url,
        server_host,
        port,
        allowed_origins,
        max_connections,
        acquire_timeout,
        query_timeout,
    };

    Ok(config)
}

/// Loads `.env` into the process environment. Variables already set in the
/// environment win over the file.
pub fn set_configuration() -> Result<(), Error> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("No .env file found, using process environment");
            Ok(())
        },
        Err(e) => Err(Error::ConfigurationError(e.to_string())),
    }
}

fn var_or<T>(key: &str, default: T) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) => value.trim().parse().map_err(|e: T::Err| {
            Error::ConfigurationError(format!("{}: {}", key, e))
        }),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(e) => Err(Error::VAR(e)),
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_owned)
        .collect()
}
