//! Configuration and response models
//!
//! DTOs for cache rules read from configuration and for the metrics
//! server's JSON responses.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::RuleSpec;
pub use responses::HealthResponse;
