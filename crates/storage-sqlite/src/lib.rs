//! SQLite storage implementation for the stockpile service.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `stockpile-core` and contains:
//! - Database connection pooling and the single-writer actor
//! - Diesel migrations
//! - Repository implementations for all domain entities
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The core crate is database-agnostic and works with traits.
//!
//! ```text
//!   core (domain)      server (HTTP)
//!         │                  │
//!         └────────┬─────────┘
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod allocation;
pub mod catalog;
pub mod shipments;
pub mod stockpile;
pub mod subscriptions;
pub mod triggers;

#[cfg(test)]
mod test_support;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export repositories
pub use allocation::AllocationRepository;
pub use catalog::CatalogRepository;
pub use shipments::ShipmentRepository;
pub use stockpile::StockpileRepository;
pub use subscriptions::SubscriptionRepository;
pub use triggers::TriggerRepository;

// Re-export from stockpile-core for convenience
pub use stockpile_core::errors::{DatabaseError, Error, Result};
