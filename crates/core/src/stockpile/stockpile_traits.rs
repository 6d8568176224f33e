use crate::errors::Result;
use crate::stockpile::stockpile_model::{
    HistoryFilter, HistoryPage, HistoryQuery, ProgressReport, StockpileHistoryEntry,
    StockpileItem, StockpileOverview,
};

/// Trait for stockpile repository operations
pub trait StockpileRepositoryTrait: Send + Sync {
    /// The user's stockpile rows with catalog labels and unit prices joined in.
    fn get_stockpile_items(&self, user_id: &str) -> Result<Vec<StockpileItem>>;

    /// One page of history, newest first, and the total number of matching entries.
    fn get_history(
        &self,
        user_id: &str,
        filter: &HistoryFilter,
    ) -> Result<(Vec<StockpileHistoryEntry>, i64)>;
}

/// Trait for stockpile service operations
pub trait StockpileServiceTrait: Send + Sync {
    fn get_items(&self, user_id: &str) -> Result<Vec<StockpileItem>>;
    fn get_progress(&self, user_id: &str) -> Result<ProgressReport>;
    fn get_overview(&self, user_id: &str) -> Result<StockpileOverview>;
    fn get_history(&self, user_id: &str, query: &HistoryQuery) -> Result<HistoryPage>;
}
