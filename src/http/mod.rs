//! HTTP API subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, request span)
//!     → tokens.rs / wallets.rs / health.rs (request-shape validation, handlers)
//!     → minting / ledger
//!     → response.rs (error → status + JSON body)
//! ```

pub mod health;
pub mod request;
pub mod response;
pub mod server;
pub mod tokens;
pub mod wallets;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use response::{ApiError, ErrorBody};
pub use server::{AppState, HttpServer};
