use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Pool, Sqlite};

#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let in_memory = database_url.contains(":memory:");

        if !in_memory {
            // Ensure parent directory exists
            if let Some(db_path) = database_url.strip_prefix("sqlite://") {
                if let Some(parent) = std::path::Path::new(db_path).parent() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            // Create database if it doesn't exist
            if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
                tracing::info!("Creating database at {}", database_url);
                Sqlite::create_database(database_url).await?;
            }
        }

        // An in-memory database exists per connection, so the pool must
        // stay at a single connection or the schema vanishes between
        // queries.
        let max_connections = if in_memory { 1 } else { 20 };

        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(max_connections)
            .max_lifetime(Some(std::time::Duration::from_secs(30 * 60)))
            .idle_timeout(Some(std::time::Duration::from_secs(10 * 60)))
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        let pool = self.pool();

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS notification_preferences (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL UNIQUE,
                email_alerts INTEGER NOT NULL DEFAULT 1,
                browser_notifications INTEGER NOT NULL DEFAULT 1,
                sound_notifications INTEGER NOT NULL DEFAULT 1,
                critical_alerts_only INTEGER NOT NULL DEFAULT 0,
                alert_types TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS network_logs (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                file_name TEXT NOT NULL,
                file_path TEXT NOT NULL,
                upload_date TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                analysis_result TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS ml_models (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT,
                file_path TEXT,
                trained_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS alerts (
                id TEXT PRIMARY KEY,
                network_log_id TEXT NOT NULL,
                ml_model_id TEXT NOT NULL,
                attack_type TEXT NOT NULL,
                severity TEXT NOT NULL,
                source_ip TEXT,
                destination_ip TEXT,
                confidence_score REAL,
                status TEXT NOT NULL DEFAULT 'new',
                detected_at TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (network_log_id) REFERENCES network_logs(id) ON DELETE CASCADE,
                FOREIGN KEY (ml_model_id) REFERENCES ml_models(id) ON DELETE CASCADE
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS user_alerts (
                alert_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                assigned_at TEXT NOT NULL,
                PRIMARY KEY (alert_id, user_id),
                FOREIGN KEY (alert_id) REFERENCES alerts(id) ON DELETE CASCADE,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS notifications (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                title TEXT NOT NULL,
                message TEXT NOT NULL,
                severity TEXT NOT NULL,
                icon TEXT NOT NULL,
                color TEXT NOT NULL,
                action_url TEXT,
                priority TEXT NOT NULL,
                created_at TEXT NOT NULL,
                read_at TEXT,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_alerts_detected_at ON alerts(detected_at)",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, created_at)",
        )
        .execute(pool)
        .await?;

        tracing::info!("Database schema is up to date");
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}
