//! SQLite storage implementation for subscriptions and onboarding.

mod model;
mod repository;

pub use model::SubscriptionDB;
pub use repository::SubscriptionRepository;
