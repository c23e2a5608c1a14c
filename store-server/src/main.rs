use store_server::{Config, Server, ServerState, print_banner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv, logging)
    dotenv::dotenv().ok();
    let config = Config::from_env();
    if config.log_to_file {
        let log_dir = config.log_dir();
        std::fs::create_dir_all(&log_dir)?;
        store_server::init_logger_with_file(None, log_dir.to_str());
    } else {
        store_server::init_logger();
    }

    print_banner();
    tracing::info!(environment = %config.environment, "GreenBasket store server starting...");

    // 2. Initialize state
    let state = ServerState::initialize(&config).await?;

    // 3. Run the HTTP server
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {e}");
        return Err(e);
    }

    Ok(())
}
