//! SQLite storage implementation for monthly allocations.

mod model;
mod repository;

pub use model::StockpileAllocationDB;
pub use repository::AllocationRepository;
