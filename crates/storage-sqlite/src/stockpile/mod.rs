//! SQLite storage implementation for the virtual stockpile and its history.

mod model;
mod repository;

pub use model::{StockpileHistoryDB, VirtualStockpileDB};
pub use repository::StockpileRepository;
pub(crate) use repository::{apply_quantity_change, QuantityChange};
