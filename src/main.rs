use essentia::config::ServerConfig;
use essentia::server::{self, ServerError};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env()?;
    if let Err(e) = server::run(&config).await {
        tracing::error!(error = %e, "essentia stopped");
        return Err(e);
    }
    Ok(())
}
