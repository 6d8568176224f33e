use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{info, warn};
use rust_decimal::Decimal;

use super::subscriptions_model::{
    CaliberSelection, OnboardingRecord, OnboardingRequest, OnboardingResult, Subscription,
};
use super::subscriptions_traits::{SubscriptionRepositoryTrait, SubscriptionServiceTrait};
use crate::errors::{Error, Result};

pub struct SubscriptionService {
    repository: Arc<dyn SubscriptionRepositoryTrait>,
}

impl SubscriptionService {
    pub fn new(repository: Arc<dyn SubscriptionRepositoryTrait>) -> Self {
        SubscriptionService { repository }
    }

    fn validate_selections(selections: &[CaliberSelection]) -> Result<()> {
        let mut seen = HashSet::new();
        for selection in selections {
            if selection.id.trim().is_empty() {
                return Err(Error::missing_field("calibers[].id"));
            }
            if selection.monthly_amount.is_sign_negative() {
                return Err(Error::invalid_input(format!(
                    "Monthly amount for '{}' must not be negative",
                    selection.id
                )));
            }
            if selection
                .target_quantity
                .is_some_and(|target| target.is_sign_negative())
            {
                return Err(Error::invalid_input(format!(
                    "Target quantity for '{}' must not be negative",
                    selection.id
                )));
            }
            if !seen.insert(selection.id.as_str()) {
                return Err(Error::invalid_input(format!(
                    "Product '{}' is selected more than once",
                    selection.id
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriptionServiceTrait for SubscriptionService {
    fn get_subscription(&self, user_id: &str) -> Result<Subscription> {
        self.repository
            .get_subscription(user_id)?
            .ok_or_else(|| Error::NotFound(format!("No subscription for user {}", user_id)))
    }

    async fn complete_onboarding(
        &self,
        caller_id: &str,
        request: OnboardingRequest,
    ) -> Result<OnboardingResult> {
        let user_id = request
            .user_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| Error::missing_field("userId"))?;
        if request.calibers.is_empty() {
            return Err(Error::missing_field("calibers"));
        }
        let monthly_budget = request
            .monthly_budget
            .ok_or_else(|| Error::missing_field("monthlyBudget"))?;
        let shipping_address = request
            .shipping_address
            .ok_or_else(|| Error::missing_field("shippingAddress"))?;

        if user_id != caller_id {
            return Err(Error::Forbidden(
                "Onboarding can only be completed for the signed-in user".to_string(),
            ));
        }
        if monthly_budget.is_sign_negative() {
            return Err(Error::invalid_input("monthlyBudget must not be negative"));
        }
        shipping_address.validate()?;

        let mut selections = request.calibers;
        selections.extend(request.accessories);
        Self::validate_selections(&selections)?;

        // Over-budget selections are accepted; the allocation step enforces the budget.
        let mut warnings = Vec::new();
        let selected_total = selections
            .iter()
            .try_fold(Decimal::ZERO, |total, s| total.checked_add(s.monthly_amount))
            .ok_or_else(|| Error::invalid_input("Selected monthly amounts are out of range"))?;
        if selected_total > monthly_budget {
            let message = format!(
                "Selected monthly amounts total {} which exceeds the monthly budget of {}",
                selected_total, monthly_budget
            );
            warn!("Onboarding for user {}: {}", user_id, message);
            warnings.push(message);
        }

        let now = Utc::now();
        let allocation_frequency = request.allocation_frequency.unwrap_or_default();
        let record = OnboardingRecord {
            user_id: user_id.clone(),
            monthly_budget,
            allocation_frequency,
            next_allocation_date: allocation_frequency.advance(now),
            shipping_address,
            selections,
            completed_at: now,
        };
        let selection_count = record.selections.len();
        let subscription = self.repository.save_onboarding(record).await?;
        info!(
            "Completed onboarding for user {} with {} selections",
            user_id, selection_count
        );

        Ok(OnboardingResult {
            subscription,
            warnings,
        })
    }
}
