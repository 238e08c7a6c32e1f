// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::services::{
    AuditTrail, AuthService, CrmService, InventoryService, MovementService, UserService,
};
use crate::store::{DocumentStore, PgStore};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub store: Arc<dyn DocumentStore>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub inventory_service: InventoryService,
    pub movement_service: MovementService,
    pub crm_service: CrmService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")?;

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        // Tudo fala com as coleções através do gateway de documentos.
        let store: Arc<dyn DocumentStore> = Arc::new(PgStore::new(db_pool.clone()));
        let audit = AuditTrail::new(store.clone());

        Ok(Self {
            db_pool,
            auth_service: AuthService::new(store.clone(), jwt_secret),
            user_service: UserService::new(store.clone()),
            inventory_service: InventoryService::new(store.clone(), audit.clone()),
            movement_service: MovementService::new(store.clone()),
            crm_service: CrmService::new(store.clone(), audit),
            store,
        })
    }

    /// Endereço de escuta do servidor; configurável via BIND_ADDR.
    pub fn bind_addr() -> String {
        env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
    }
}
