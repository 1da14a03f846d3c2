//! stayhaven-common: Shared types, errors, and listing rules used across all Stayhaven crates.

pub mod error;
pub mod role;
pub mod facilities;
pub mod validation;
pub mod rating;
pub mod images;

// Re-export commonly used types
pub use error::{ApiError, StayhavenError};
pub use images::ImageProblem;
pub use role::Role;
