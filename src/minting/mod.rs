//! Token minting subsystem.
//!
//! # Data Flow
//! ```text
//! http (request-shape validation)
//!     → types.rs (MintRequest)
//!     → orchestrator.rs (plan, build, submit, confirm)
//!     → ledger::Ledger
//!     → registry.rs (record of minted tokens)
//!     → metadata.rs (served metadata document)
//! ```

pub mod metadata;
pub mod orchestrator;
pub mod plan;
pub mod registry;
pub mod types;

pub use metadata::TokenMetadata;
pub use orchestrator::MintOrchestrator;
pub use plan::DistributionPlan;
pub use registry::TokenRegistry;
pub use types::{MintError, MintReceipt, MintRequest, TokenMessage, TokenRecord, ValidationError};
