use std::sync::Arc;
use std::time::Duration;

use log::info;
use serde::Deserialize;

use crate::api::{self, ApiState};
use crate::clients::{
    self, CollaborationServiceClient, DocumentServiceClient, UserServiceClient,
};
use crate::db;
use crate::restore::RestoreCoordinator;
use crate::store::PgVersionStore;
use crate::versions::VersionService;

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u32 {
    8083
}
fn default_request_timeout_ms() -> u64 {
    5000
}

#[derive(Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u32,
    pub documents_url: String,
    pub users_url: String,
    pub collaboration_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    pub db: db::DbConfig,
}

pub type StartupError = Box<dyn std::error::Error + Send + Sync>;

pub struct Server {
    pool: db::DbConnectionPool,
    state: ApiState,
    host: String,
    port: u32,
}

impl Server {
    pub fn new(config: ServiceConfig) -> Result<Self, StartupError> {
        let pool = db::create_pool(&config.db)?;
        let http = clients::http_client(Duration::from_millis(
            config.request_timeout_ms,
        ))?;

        let documents =
            Arc::new(DocumentServiceClient::new(&config.documents_url, http.clone()));
        let users = Arc::new(UserServiceClient::new(&config.users_url, http.clone()));
        let collaboration = Arc::new(CollaborationServiceClient::new(
            &config.collaboration_url,
            http,
        ));

        let restorer = RestoreCoordinator::new(documents.clone(), collaboration);
        let versions = Arc::new(VersionService::new(
            Arc::new(PgVersionStore::new(pool.clone())),
            documents.clone(),
            documents,
            users.clone(),
            restorer,
        ));

        Ok(Self {
            pool,
            state: ApiState { versions, users },
            host: config.host,
            port: config.port,
        })
    }

    pub async fn run(self) -> Result<(), StartupError> {
        let conn = self.pool.get().await?;
        db::run_migrations(deadpool::managed::Object::take(conn)).await?;

        let app = api::app(self.state);
        let host = format!("{}:{}", self.host, self.port);
        let listener = tokio::net::TcpListener::bind(&host).await?;
        info!("listening on {}", host);
        axum::serve(listener, app).await?;
        Ok(())
    }
}
