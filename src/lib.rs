//! Flutterbye message-token minting service library.

pub mod config;
pub mod http;
pub mod ledger;
pub mod lifecycle;
pub mod minting;
pub mod observability;
pub mod security;

pub use config::schema::MinterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use minting::MintOrchestrator;
