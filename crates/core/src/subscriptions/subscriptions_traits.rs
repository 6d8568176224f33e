use crate::errors::Result;
use crate::subscriptions::subscriptions_model::{
    OnboardingRecord, OnboardingRequest, OnboardingResult, Subscription,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Trait for subscription repository operations
#[async_trait]
pub trait SubscriptionRepositoryTrait: Send + Sync {
    fn get_subscription(&self, user_id: &str) -> Result<Option<Subscription>>;
    /// Active subscriptions whose next allocation date is at or before `now`.
    fn get_due_subscriptions(&self, now: DateTime<Utc>) -> Result<Vec<Subscription>>;
    /// Persists the subscription and its allocations atomically.
    async fn save_onboarding(&self, record: OnboardingRecord) -> Result<Subscription>;
    async fn update_next_allocation_date(
        &self,
        subscription_id: &str,
        next_allocation_date: DateTime<Utc>,
    ) -> Result<()>;
}

/// Trait for subscription service operations
#[async_trait]
pub trait SubscriptionServiceTrait: Send + Sync {
    fn get_subscription(&self, user_id: &str) -> Result<Subscription>;
    async fn complete_onboarding(
        &self,
        caller_id: &str,
        request: OnboardingRequest,
    ) -> Result<OnboardingResult>;
}
