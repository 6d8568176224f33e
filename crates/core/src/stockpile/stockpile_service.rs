use std::sync::Arc;

use chrono::Utc;
use log::debug;

use super::progress_calculator;
use super::stockpile_model::{
    HistoryPage, HistoryQuery, Pagination, ProgressConfig, ProgressReport, StockpileItem,
    StockpileOverview,
};
use super::stockpile_traits::{StockpileRepositoryTrait, StockpileServiceTrait};
use crate::errors::Result;
use crate::triggers::{self, TriggerRepositoryTrait};

pub struct StockpileService {
    stockpile_repository: Arc<dyn StockpileRepositoryTrait>,
    trigger_repository: Arc<dyn TriggerRepositoryTrait>,
    config: ProgressConfig,
}

impl StockpileService {
    pub fn new(
        stockpile_repository: Arc<dyn StockpileRepositoryTrait>,
        trigger_repository: Arc<dyn TriggerRepositoryTrait>,
        config: ProgressConfig,
    ) -> Self {
        StockpileService {
            stockpile_repository,
            trigger_repository,
            config,
        }
    }
}

impl StockpileServiceTrait for StockpileService {
    fn get_items(&self, user_id: &str) -> Result<Vec<StockpileItem>> {
        self.stockpile_repository.get_stockpile_items(user_id)
    }

    fn get_progress(&self, user_id: &str) -> Result<ProgressReport> {
        let items = self.stockpile_repository.get_stockpile_items(user_id)?;
        Ok(progress_calculator::summarize(
            &items,
            &self.config,
            Utc::now(),
        ))
    }

    fn get_overview(&self, user_id: &str) -> Result<StockpileOverview> {
        let report = self.get_progress(user_id)?;
        let active_triggers: Vec<_> = self
            .trigger_repository
            .get_triggers(user_id)?
            .into_iter()
            .filter(|t| t.is_active)
            .collect();
        let readiness = triggers::evaluate(&active_triggers, &report.summary);

        debug!(
            "Stockpile overview for {}: {} items, ready={}",
            user_id, report.summary.items, readiness.ready
        );

        Ok(StockpileOverview {
            summary: report.summary,
            items: report.items,
            triggers: active_triggers,
            readiness,
        })
    }

    fn get_history(&self, user_id: &str, query: &HistoryQuery) -> Result<HistoryPage> {
        let filter = query.resolve()?;
        let (items, total) = self.stockpile_repository.get_history(user_id, &filter)?;
        Ok(HistoryPage {
            items,
            pagination: Pagination::new(total, filter.limit, filter.offset),
        })
    }
}
