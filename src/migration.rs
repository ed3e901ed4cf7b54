//! Schema migrations, embedded from `migrations/` and applied with refinery
//! before the connection pool is built. Applied versions are tracked in
//! `refinery_schema_history`.

use refinery::embed_migrations;
use tokio_postgres::NoTls;
use tracing::{error, info};

use crate::error::Error;

embed_migrations!("migrations");

pub async fn run_migrations(database_url: &str) -> Result<(), Error> {
    info!("Running database migrations...");

    let config: tokio_postgres::Config = database_url.parse().map_err(|e| {
        Error::ConfigurationError(format!("Invalid database URL: {}", e))
    })?;

    let (mut client, connection) =
        config.connect(NoTls).await.map_err(|e| {
            Error::ConfigurationError(format!(
                "Failed to connect for migrations: {}",
                e
            ))
        })?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!("Migration connection error: {}", e);
        }
    });

    let report =
        migrations::runner()
            .run_async(&mut client)
            .await
            .map_err(|e| {
                Error::ConfigurationError(format!("Migration failed: {}", e))
            })?;

    let applied = report.applied_migrations();
    if applied.is_empty() {
        info!("No new migrations to apply");
    } else {
        for migration in applied {
            info!(
                "Applied migration: V{:03}__{}",
                migration.version(),
                migration.name()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_embedded() {
        let runner = migrations::runner();
        let migrations = runner.get_migrations();

        let mut versions: Vec<_> =
            migrations.iter().map(|m| m.version()).collect();
        versions.sort();

        assert_eq!(versions.first(), Some(&1));
        assert!(
            versions.windows(2).all(|pair| pair[0] < pair[1]),
            "Migration versions must be unique"
        );
        assert!(migrations
            .iter()
            .any(|m| m.name() == "create_subscriptions"));
    }
}
