use crate::allocation::allocation_model::{
    AllocationBatchResponse, AllocationRequest, AllocationWrite, ScheduledAllocationSummary,
    StockpileAllocation,
};
use crate::errors::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Trait for allocation repository operations
#[async_trait]
pub trait AllocationRepositoryTrait: Send + Sync {
    fn get_allocations(&self, subscription_id: &str) -> Result<Vec<StockpileAllocation>>;

    /// Applies a batch of successful allocations.
    ///
    /// For each write: upserts the monthly amount keyed by
    /// `(subscription_id, product_id)`, adds `quantity_delta` to the stockpile
    /// row keyed by `(user_id, product_id)` (creating it when missing) and
    /// appends an `allocation` history entry.
    async fn record_allocations(
        &self,
        user_id: &str,
        subscription_id: &str,
        writes: Vec<AllocationWrite>,
        allocated_at: DateTime<Utc>,
    ) -> Result<usize>;
}

/// Trait for allocation service operations
#[async_trait]
pub trait AllocationServiceTrait: Send + Sync {
    fn get_allocations(&self, user_id: &str) -> Result<Vec<StockpileAllocation>>;
    async fn allocate(
        &self,
        user_id: &str,
        requests: Vec<AllocationRequest>,
        now: DateTime<Utc>,
    ) -> Result<AllocationBatchResponse>;
    async fn run_due_allocations(&self, now: DateTime<Utc>) -> Result<ScheduledAllocationSummary>;
}
