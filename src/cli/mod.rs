//! CLI interface for the bookstore backend

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand};

use crate::auth::UserRole;

#[derive(Parser)]
#[command(name = "bookstore")]
#[command(version = "1.0.0")]
#[command(about = "Bookstore REST backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new bookstore.toml configuration file
    Init,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides server.port)
        #[arg(short, long, env = "BOOKSTORE_PORT")]
        port: Option<u16>,
    },

    /// Mint a token with the configured secret
    Token {
        /// Subject the token is issued for
        #[arg(short, long)]
        user_id: String,

        /// Role embedded in the token
        #[arg(short, long, default_value = "user", value_parser = parse_role)]
        role: UserRole,
    },
}

fn parse_role(s: &str) -> Result<UserRole, String> {
    s.parse::<UserRole>().map_err(|e| e.to_string())
}
