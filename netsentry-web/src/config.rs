use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    pub port: u16,
    pub database_url: String,
    pub max_upload_size: usize,
    pub upload_dir: String,
    /// Optional external command invoked with a log id after upload.
    /// The ML pipeline itself lives outside this service.
    pub processor_command: Option<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: "sqlite://data/netsentry.db".to_string(),
            max_upload_size: 10 * 1024 * 1024, // 10MB
            upload_dir: "./uploads".to_string(),
            processor_command: None,
        }
    }
}

impl WebConfig {
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(port) = env::var("NETSENTRY_PORT") {
            config.port = port.parse()?;
        }

        // Try NETSENTRY_DATABASE_URL first, then DATABASE_URL
        if let Ok(db_url) = env::var("NETSENTRY_DATABASE_URL") {
            config.database_url = db_url;
        } else if let Ok(db_url) = env::var("DATABASE_URL") {
            config.database_url = db_url;
        }

        if let Ok(max_size) = env::var("NETSENTRY_MAX_UPLOAD_SIZE") {
            config.max_upload_size = max_size.parse()?;
        }

        if let Ok(upload_dir) = env::var("NETSENTRY_UPLOAD_DIR") {
            config.upload_dir = upload_dir;
        }

        if let Ok(cmd) = env::var("NETSENTRY_PROCESSOR_CMD") {
            if !cmd.trim().is_empty() {
                config.processor_command = Some(cmd);
            }
        }

        Ok(config)
    }
}
