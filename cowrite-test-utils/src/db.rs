use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Connection handle for test databases. In-memory SQLite is limited to a single
/// pooled connection, so every caller shares the same schema.
pub struct TestDb {
    url: String,
}

impl TestDb {
    pub fn new_in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
        }
    }

    pub fn new_file(path: impl Into<String>) -> Self {
        Self {
            url: format!("sqlite://{}?mode=rwc", path.into()),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn connect(&self) -> Result<DatabaseConnection, DbErr> {
        let mut options = ConnectOptions::new(self.url.clone());
        options.sqlx_logging(false);
        if self.url.contains(":memory:") {
            options.max_connections(1).min_connections(1);
        }
        Database::connect(options).await
    }
}
