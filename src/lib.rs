//! Bookstore - REST backend for browsing books and placing orders
//!
//! This is the library interface, exposing the token service, the request
//! gates and the router so they can be embedded or tested directly.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod store;

pub use auth::TokenService;
pub use config::Config;
pub use error::Error;
