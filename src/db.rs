use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::pooled_connection::deadpool::{BuildError, Pool};
use diesel_async::{
    pooled_connection::AsyncDieselConnectionManager, AsyncPgConnection,
};
use diesel_migrations::{
    embed_migrations, EmbeddedMigrations, MigrationHarness,
};
use serde::Deserialize;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbConnection =
    deadpool::managed::Object<AsyncDieselConnectionManager<AsyncPgConnection>>;

pub type DbConnectionPool = deadpool::managed::Pool<
    AsyncDieselConnectionManager<diesel_async::AsyncPgConnection>,
>;

fn default_db_port() -> i32 {
    5432
}

#[derive(Deserialize)]
pub struct DbConfig {
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: i32,
    pub user: String,
    pub password: String,
    pub database: String,
}

pub fn create_pool(config: &DbConfig) -> Result<DbConnectionPool, BuildError> {
    let config_string = format!(
        "host={} port={} user={} password={} dbname={}",
        config.host, config.port, config.user, config.password, config.database,
    );
    pool_for_url(config_string)
}

pub fn pool_for_url(url: String) -> Result<DbConnectionPool, BuildError> {
    let manager =
        AsyncDieselConnectionManager::<diesel_async::AsyncPgConnection>::new(url);
    Pool::builder(manager).build()
}

pub type MigrationError = Box<dyn std::error::Error + Send + Sync>;

pub async fn run_migrations(conn: AsyncPgConnection) -> Result<(), MigrationError> {
    let mut wrapper: AsyncConnectionWrapper<AsyncPgConnection> =
        AsyncConnectionWrapper::from(conn);
    tokio::task::spawn_blocking(move || {
        wrapper.run_pending_migrations(MIGRATIONS).map(|_| ())
    })
    .await?
}
