use std::sync::Arc;

use anyhow::Context;
use time::UtcOffset;
use tracing::{info, warn};

use crate::config::{AppConfig, JwtConfig};
use crate::storage::{MealStore, MemoryStore, PgStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub meals: Arc<dyn MealStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let Some(url) = config.database_url.clone() else {
            warn!("DATABASE_URL not set; using in-memory store, data is lost on exit");
            let store = MemoryStore::new();
            return Ok(Self::from_parts(
                config,
                Arc::new(store.clone()),
                Arc::new(store),
            ));
        };

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&url)
            .await
            .context("connecting to DATABASE_URL")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            warn!(error = %e, "migration failed; continuing");
        }
        info!("postgres store ready");

        let store = PgStore::new(db);
        Ok(Self::from_parts(
            config,
            Arc::new(store.clone()),
            Arc::new(store),
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        meals: Arc<dyn MealStore>,
    ) -> Self {
        Self { config, users, meals }
    }

    /// In-memory state for tests.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            database_url: None,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: 5,
            },
            utc_offset: UtcOffset::UTC,
        });
        let store = MemoryStore::new();
        Self::from_parts(config, Arc::new(store.clone()), Arc::new(store))
    }
}
