use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use super::allocation_engine;
use super::allocation_model::{
    AllocationBatchResponse, AllocationRequest, AllocationWrite, ScheduledAllocationSummary,
    StockpileAllocation,
};
use super::allocation_traits::{AllocationRepositoryTrait, AllocationServiceTrait};
use crate::catalog::CatalogServiceTrait;
use crate::errors::{AllocationError, Result};
use crate::subscriptions::{Subscription, SubscriptionRepositoryTrait};

pub struct AllocationService {
    catalog_service: Arc<dyn CatalogServiceTrait>,
    subscription_repository: Arc<dyn SubscriptionRepositoryTrait>,
    allocation_repository: Arc<dyn AllocationRepositoryTrait>,
}

impl AllocationService {
    pub fn new(
        catalog_service: Arc<dyn CatalogServiceTrait>,
        subscription_repository: Arc<dyn SubscriptionRepositoryTrait>,
        allocation_repository: Arc<dyn AllocationRepositoryTrait>,
    ) -> Self {
        AllocationService {
            catalog_service,
            subscription_repository,
            allocation_repository,
        }
    }

    fn active_subscription(&self, user_id: &str) -> Result<Subscription> {
        self.subscription_repository
            .get_subscription(user_id)?
            .filter(Subscription::is_active)
            .ok_or_else(|| AllocationError::NoSubscription.into())
    }

    async fn allocate_for_subscription(
        &self,
        subscription: &Subscription,
        requests: Vec<AllocationRequest>,
        now: DateTime<Utc>,
    ) -> Result<AllocationBatchResponse> {
        let product_ids: Vec<String> = requests.iter().map(|r| r.product_id.clone()).collect();
        let catalog = self.catalog_service.price_catalog(&product_ids)?;

        let outcome = allocation_engine::allocate(subscription.monthly_budget, &requests, &catalog)?;

        let writes: Vec<AllocationWrite> =
            outcome.results.iter().map(AllocationWrite::from).collect();
        if !writes.is_empty() {
            self.allocation_repository
                .record_allocations(&subscription.user_id, &subscription.id, writes, now)
                .await?;
        }

        let next_allocation_date = subscription.allocation_frequency.advance(now);
        self.subscription_repository
            .update_next_allocation_date(&subscription.id, next_allocation_date)
            .await?;

        info!(
            "Allocated {} of {} items for user {} ({} remaining of {})",
            outcome.results.len(),
            requests.len(),
            subscription.user_id,
            outcome.remaining_budget,
            subscription.monthly_budget
        );

        Ok(AllocationBatchResponse {
            success: true,
            results: outcome.results,
            errors: if outcome.errors.is_empty() {
                None
            } else {
                Some(outcome.errors)
            },
            next_allocation_date,
            remaining_budget: outcome.remaining_budget,
        })
    }
}

#[async_trait]
impl AllocationServiceTrait for AllocationService {
    fn get_allocations(&self, user_id: &str) -> Result<Vec<StockpileAllocation>> {
        match self.subscription_repository.get_subscription(user_id)? {
            Some(subscription) => self.allocation_repository.get_allocations(&subscription.id),
            None => Ok(Vec::new()),
        }
    }

    async fn allocate(
        &self,
        user_id: &str,
        requests: Vec<AllocationRequest>,
        now: DateTime<Utc>,
    ) -> Result<AllocationBatchResponse> {
        let subscription = self.active_subscription(user_id)?;
        self.allocate_for_subscription(&subscription, requests, now)
            .await
    }

    async fn run_due_allocations(&self, now: DateTime<Utc>) -> Result<ScheduledAllocationSummary> {
        let due = self.subscription_repository.get_due_subscriptions(now)?;
        let mut summary = ScheduledAllocationSummary::default();

        for subscription in due {
            summary.subscriptions_processed += 1;
            let requests: Vec<AllocationRequest> = self
                .allocation_repository
                .get_allocations(&subscription.id)?
                .into_iter()
                .map(|allocation| AllocationRequest {
                    product_id: allocation.product_id,
                    amount: Some(allocation.monthly_amount),
                    target_quantity: None,
                })
                .collect();

            if requests.is_empty() {
                debug!(
                    "Subscription {} has no stored allocations, advancing schedule only",
                    subscription.id
                );
                self.subscription_repository
                    .update_next_allocation_date(
                        &subscription.id,
                        subscription.allocation_frequency.advance(now),
                    )
                    .await?;
                continue;
            }

            match self
                .allocate_for_subscription(&subscription, requests, now)
                .await
            {
                Ok(response) => summary.items_allocated += response.results.len(),
                Err(err) => {
                    // Skip this period so a failing subscription is not retried every tick.
                    warn!(
                        "Scheduled allocation for subscription {} failed: {}",
                        subscription.id, err
                    );
                    summary.failures += 1;
                    self.subscription_repository
                        .update_next_allocation_date(
                            &subscription.id,
                            subscription.allocation_frequency.advance(now),
                        )
                        .await?;
                }
            }
        }

        Ok(summary)
    }
}
