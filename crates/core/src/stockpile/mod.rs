//! Stockpile module - accumulated quantities, progress and history.

mod progress_calculator;
mod stockpile_model;
mod stockpile_service;
mod stockpile_traits;

pub use progress_calculator::{progress, summarize, summarize_item};
pub use stockpile_model::{
    AverageRoundPrice, HistoryChangeType, HistoryFilter, HistoryPage, HistoryQuery, Pagination,
    ProgressConfig, ProgressReport, StockpileHistoryEntry, StockpileItem, StockpileItemSummary,
    StockpileOverview, StockpileSummary,
};
pub use stockpile_service::StockpileService;
pub use stockpile_traits::{StockpileRepositoryTrait, StockpileServiceTrait};
