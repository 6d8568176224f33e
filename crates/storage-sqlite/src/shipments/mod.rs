//! SQLite storage implementation for shipments.

mod model;
mod repository;

pub use model::{ShipmentDB, ShipmentItemDB};
pub use repository::ShipmentRepository;
