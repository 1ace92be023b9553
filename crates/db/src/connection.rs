use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;

use assurini_core::config::StoreConfig;

pub type DbPool = sqlx::SqlitePool;

/// Open the contract store pool described by the store section of the app
/// config.
pub async fn connect(config: &StoreConfig) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(&config.url, config.max_connections, config.timeout_secs).await
}

pub async fn connect_with_settings(
    store_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(store_url)
        .await
}

#[cfg(test)]
mod tests {
    use assurini_core::config::StoreConfig;

    use super::connect;

    #[tokio::test]
    async fn connect_uses_the_store_config_and_enables_foreign_keys() {
        let config = StoreConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            timeout_secs: 5,
        };
        let pool = connect(&config).await.expect("connect");

        let enforced: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .expect("read pragma");
        assert_eq!(enforced, 1);
    }
}
