//! Business rules of the marketplace: discovery ranking, financing matches, and the
//! credit application and prospect lifecycles.
//!
//! Every service here works on materialized records handed over by a repository and
//! returns derived values; none of them keeps state between calls.

pub mod catalog;
pub mod credit;
pub mod financing;
pub mod lifecycle;
pub mod listings;
pub mod prospects;
pub mod repository;
pub mod router;
pub mod validation;

#[cfg(test)]
mod tests;

pub use lifecycle::{InvalidTransition, StatusMachine, StatusOverride};
pub use repository::RepositoryError;
pub use router::marketplace_router;
pub use validation::{FieldViolation, ValidationError};
