//! Matching, ranking, and lead-lifecycle rules for the used-car marketplace.
//!
//! The [`marketplace`] tree holds the decision logic: listing heat and feed ranking,
//! bank-partner matching, and the credit application and prospect state machines.
//! Persistence is reached only through the repository traits each area defines.

pub mod config;
pub mod error;
pub mod marketplace;
pub mod telemetry;
