use std::sync::Arc;

use crate::auth::jwt::TokenIssuer;
use crate::auth::repo::{PgUserStore, UserStore};
use crate::completion::{CompletionClient, HttpCompletionClient};
use crate::config::AppConfig;
use crate::db;
use crate::waste::repo::{PgWasteStore, WasteStore};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub waste: Arc<dyn WasteStore>,
    pub tokens: Arc<TokenIssuer>,
    pub completion: Arc<dyn CompletionClient>,
}

impl AppState {
    /// Connects to Postgres, applies migrations and builds the outbound client.
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = db::connect(&config.database_url).await?;
        db::migrate(&pool).await?;

        let completion =
            Arc::new(HttpCompletionClient::new(&config.completion)?) as Arc<dyn CompletionClient>;

        Ok(Self::from_parts(
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgWasteStore::new(pool)),
            Arc::new(TokenIssuer::new(&config.jwt)),
            completion,
        ))
    }

    pub fn from_parts(
        users: Arc<dyn UserStore>,
        waste: Arc<dyn WasteStore>,
        tokens: Arc<TokenIssuer>,
        completion: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            users,
            waste,
            tokens,
            completion,
        }
    }

    /// In-memory stores, a fixed signing secret and the given completion client.
    #[cfg(test)]
    pub fn fake(completion: Arc<dyn CompletionClient>) -> Self {
        use crate::config::JwtConfig;
        use crate::db::MemoryStore;

        let store = Arc::new(MemoryStore::default());
        let tokens = TokenIssuer::new(&JwtConfig {
            secret: "test".into(),
            algorithm: jsonwebtoken::Algorithm::HS256,
            ttl_minutes: 30,
        });
        Self::from_parts(store.clone(), store, Arc::new(tokens), completion)
    }
}
