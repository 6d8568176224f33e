//! Subscriptions module - budget, allocation cadence and onboarding.

mod subscriptions_model;
mod subscriptions_service;
mod subscriptions_traits;

pub use subscriptions_model::{
    AllocationFrequency, CaliberSelection, OnboardingRecord, OnboardingRequest, OnboardingResult,
    ShippingAddress, Subscription, SubscriptionStatus,
};
pub use subscriptions_service::SubscriptionService;
pub use subscriptions_traits::{SubscriptionRepositoryTrait, SubscriptionServiceTrait};
