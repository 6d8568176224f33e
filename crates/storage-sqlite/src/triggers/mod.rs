//! SQLite storage implementation for shipment triggers.

mod model;
mod repository;

pub use model::ShipmentTriggerDB;
pub use repository::TriggerRepository;
