use std::env;

use vellum::config::{Server, ServiceConfig};

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    env_logger::init();

    let Ok(config_str) = &env::var("VELLUM_CONFIG") else {
        log::error!("Config not found! Set env variable \"VELLUM_CONFIG\"");
        return;
    };

    let config = match serde_json::from_str::<ServiceConfig>(config_str) {
        Ok(config) => config,
        Err(err) => {
            log::error!("Error parsing config:\n{}", err);
            return;
        }
    };

    let server = match Server::new(config) {
        Ok(server) => server,
        Err(err) => {
            log::error!("Couldn't start: {}", err);
            return;
        }
    };
    if let Err(err) = server.run().await {
        log::error!("Server stopped: {}", err);
    }
}
