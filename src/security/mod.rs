//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! POST /tokens:
//!     → rate_limit.rs (per-IP token bucket, 429 when empty)
//!     → handler
//! ```
//!
//! Request body size is bounded by the server's body-limit layer.

pub mod rate_limit;

pub use rate_limit::{rate_limit_middleware, RateLimiterState};
