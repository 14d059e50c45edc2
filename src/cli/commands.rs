//! CLI command implementations

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::auth::{TokenService, UserRole};
use crate::cli::{error, info, success, warn};
use crate::config::{self, loader::CONFIG_FILENAME, Config};

/// Initialize a new bookstore.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = Path::new(CONFIG_FILENAME);

    if config_path.exists() {
        warn(&format!("{} already exists", CONFIG_FILENAME));
        return Ok(());
    }

    let secret = config::loader::generate_secret();
    fs::write(config_path, config::loader::default_config_content(&secret))?;

    success(&format!("Created {}", CONFIG_FILENAME));
    info("Run 'bookstore serve' to start the API");

    Ok(())
}

/// Start the HTTP API server
pub async fn serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = load_config()?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info(&format!("Starting server at http://{}:{}", host, port));

    crate::api::run_server(config, &host, port).await?;
    Ok(())
}

/// Print a signed token for a subject
pub async fn token(user_id: &str, role: UserRole) -> Result<()> {
    let config = load_config()?;
    config.validate()?;

    let tokens = TokenService::new(&config.auth);
    match tokens.issue(user_id, role) {
        Ok(token) => {
            println!("{}", token);
            Ok(())
        }
        Err(e) => {
            error(&format!("Failed to issue token: {}", e));
            Err(e.into())
        }
    }
}

fn load_config() -> Result<Config> {
    config::load_config().map_err(|e| {
        error(&e.to_string());
        e.into()
    })
}
