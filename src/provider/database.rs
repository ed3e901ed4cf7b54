use sqlx::Executor;
use tracing::info;

use crate::{
    configuration::Config,
    dao::{PoolOption, PoolType},
    error::Error,
    model::{Subscription, Table},
};

#[derive(Debug)]
pub struct DatabasePool {
    pub subscription: Table<Subscription>,
    pub pool: PoolType,
}

impl DatabasePool {
    pub async fn new(config: &Config) -> Result<DatabasePool, Error> {
        let statement_timeout = format!(
            "SET statement_timeout = {}",
            config.query_timeout.as_millis()
        );

        let pool = PoolOption::new()
            .after_connect(move |conn, _meta| {
                let statement = statement_timeout.to_owned();
                Box::pin(async move {
                    conn.execute(statement.as_str()).await?;
                    Ok(())
                })
            })
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(config.database_url.as_str())
            .await?;

        info!(
            "Connected to database, max connections {}",
            config.max_connections
        );

        Ok(DatabasePool::from_pool(pool))
    }

    pub fn from_pool(pool: PoolType) -> DatabasePool {
        DatabasePool {
            subscription: Table::new(pool.clone()),
            pool,
        }
    }

    pub fn get_pool(&self) -> &PoolType {
        &self.pool
    }
}
