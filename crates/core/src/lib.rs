//! Stockpile Core - Domain entities, services, and traits.
//!
//! This crate contains the business logic of the stockpile service: budget
//! allocation, progress tracking and shipment triggers. It is
//! database-agnostic and defines traits that are implemented by the
//! `storage-sqlite` crate.

pub mod allocation;
pub mod catalog;
pub mod constants;
pub mod errors;
pub mod shipments;
pub mod stockpile;
pub mod subscriptions;
pub mod triggers;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
