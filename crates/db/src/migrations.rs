use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::run_pending;
    use crate::connect_with_settings;

    // single connection: every in-memory sqlite connection is its own database
    async fn connect() -> crate::DbPool {
        connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect")
    }

    #[tokio::test]
    async fn migrations_create_the_contract_schema() {
        let pool = connect().await;
        run_pending(&pool).await.expect("migrate");

        let rows = sqlx::query(
            "SELECT name FROM sqlite_master WHERE type IN ('table', 'index') \
             AND name NOT LIKE 'sqlite_%' AND name NOT LIKE '_sqlx%'",
        )
        .fetch_all(&pool)
        .await
        .expect("introspect schema");

        let names: Vec<String> =
            rows.iter().map(|row| row.get::<String, _>("name")).collect();
        assert!(names.contains(&"contract".to_string()), "missing contract table: {names:?}");
        assert!(
            names.contains(&"idx_contract_owner_email".to_string()),
            "missing owner email index: {names:?}"
        );
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = connect().await;
        run_pending(&pool).await.expect("first run");
        run_pending(&pool).await.expect("second run");
    }
}
