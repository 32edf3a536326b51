pub mod config;
pub mod error;
pub mod graphql;
pub mod http_client;
pub mod provider;
pub mod season;
pub mod standings;
pub mod state;
