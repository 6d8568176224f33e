//! Tests for the allocation service.

#[cfg(test)]
mod tests {
    use crate::allocation::*;
    use crate::catalog::{CatalogServiceTrait, NewProduct, PriceCatalog, Product, ProductCategory};
    use crate::errors::{AllocationError, Error, Result};
    use crate::subscriptions::{
        AllocationFrequency, OnboardingRecord, Subscription, SubscriptionRepositoryTrait,
        SubscriptionStatus,
    };
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    // ============== Mocks ==============

    struct MockCatalogService {
        prices: HashMap<String, Decimal>,
    }

    #[async_trait]
    impl CatalogServiceTrait for MockCatalogService {
        fn list_products(&self, _category: Option<ProductCategory>) -> Result<Vec<Product>> {
            unimplemented!()
        }

        fn price_catalog(&self, product_ids: &[String]) -> Result<PriceCatalog> {
            Ok(product_ids
                .iter()
                .filter_map(|id| self.prices.get(id).map(|p| (id.clone(), *p)))
                .collect())
        }

        async fn seed_products(&self, _products: Vec<NewProduct>) -> Result<usize> {
            unimplemented!()
        }
    }

    struct MockSubscriptionRepository {
        subscriptions: Mutex<Vec<Subscription>>,
    }

    #[async_trait]
    impl SubscriptionRepositoryTrait for MockSubscriptionRepository {
        fn get_subscription(&self, user_id: &str) -> Result<Option<Subscription>> {
            Ok(self
                .subscriptions
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.user_id == user_id)
                .cloned())
        }

        fn get_due_subscriptions(&self, now: DateTime<Utc>) -> Result<Vec<Subscription>> {
            Ok(self
                .subscriptions
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.is_active() && s.next_allocation_date.is_some_and(|d| d <= now))
                .cloned()
                .collect())
        }

        async fn save_onboarding(&self, _record: OnboardingRecord) -> Result<Subscription> {
            unimplemented!()
        }

        async fn update_next_allocation_date(
            &self,
            subscription_id: &str,
            next_allocation_date: DateTime<Utc>,
        ) -> Result<()> {
            for s in self.subscriptions.lock().unwrap().iter_mut() {
                if s.id == subscription_id {
                    s.next_allocation_date = Some(next_allocation_date);
                }
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockAllocationRepository {
        stored: Mutex<Vec<StockpileAllocation>>,
        writes: Mutex<Vec<(String, AllocationWrite)>>,
    }

    #[async_trait]
    impl AllocationRepositoryTrait for MockAllocationRepository {
        fn get_allocations(&self, subscription_id: &str) -> Result<Vec<StockpileAllocation>> {
            Ok(self
                .stored
                .lock()
                .unwrap()
                .iter()
                .filter(|a| a.subscription_id == subscription_id)
                .cloned()
                .collect())
        }

        async fn record_allocations(
            &self,
            user_id: &str,
            _subscription_id: &str,
            writes: Vec<AllocationWrite>,
            _allocated_at: DateTime<Utc>,
        ) -> Result<usize> {
            let count = writes.len();
            let mut recorded = self.writes.lock().unwrap();
            recorded.extend(writes.into_iter().map(|w| (user_id.to_string(), w)));
            Ok(count)
        }
    }

    // ============== Fixtures ==============

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 9, 0, 0).unwrap()
    }

    fn subscription(user_id: &str, budget: Decimal, status: SubscriptionStatus) -> Subscription {
        Subscription {
            id: format!("sub-{}", user_id),
            user_id: user_id.to_string(),
            monthly_budget: budget,
            status,
            allocation_frequency: AllocationFrequency::Monthly,
            next_allocation_date: Some(now()),
            shipping_address: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    struct Fixture {
        service: AllocationService,
        subscriptions: Arc<MockSubscriptionRepository>,
        allocations: Arc<MockAllocationRepository>,
    }

    fn fixture(subscriptions: Vec<Subscription>) -> Fixture {
        let catalog = Arc::new(MockCatalogService {
            prices: HashMap::from([
                ("A".to_string(), dec!(2.00)),
                ("B".to_string(), dec!(0.50)),
                ("ZERO".to_string(), Decimal::ZERO),
            ]),
        });
        let subscription_repo = Arc::new(MockSubscriptionRepository {
            subscriptions: Mutex::new(subscriptions),
        });
        let allocation_repo = Arc::new(MockAllocationRepository::default());
        Fixture {
            service: AllocationService::new(
                catalog,
                subscription_repo.clone(),
                allocation_repo.clone(),
            ),
            subscriptions: subscription_repo,
            allocations: allocation_repo,
        }
    }

    // ============== Tests ==============

    #[tokio::test]
    async fn test_allocate_records_successful_items_and_advances_date() {
        let f = fixture(vec![subscription(
            "user-1",
            dec!(100),
            SubscriptionStatus::Active,
        )]);

        let response = f
            .service
            .allocate(
                "user-1",
                vec![
                    AllocationRequest::new("A", dec!(40)),
                    AllocationRequest::new("B", dec!(50)),
                ],
                now(),
            )
            .await
            .unwrap();

        assert!(response.success);
        assert!(response.errors.is_none());
        assert_eq!(response.remaining_budget, dec!(10));
        assert_eq!(
            response.next_allocation_date,
            Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap()
        );

        let writes = f.allocations.writes.lock().unwrap();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].1.quantity_delta, dec!(20));
        assert_eq!(writes[1].1.quantity_delta, dec!(100));
        assert_eq!(writes[1].1.monthly_amount, dec!(50));

        let stored = f.subscriptions.get_subscription("user-1").unwrap().unwrap();
        assert_eq!(
            stored.next_allocation_date,
            Some(response.next_allocation_date)
        );
    }

    #[tokio::test]
    async fn test_budget_exceeded_performs_no_writes() {
        let f = fixture(vec![subscription(
            "user-1",
            dec!(100),
            SubscriptionStatus::Active,
        )]);

        let err = f
            .service
            .allocate(
                "user-1",
                vec![
                    AllocationRequest::new("A", dec!(40)),
                    AllocationRequest::new("B", dec!(70)),
                ],
                now(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Allocation(AllocationError::BudgetExceeded { .. })
        ));
        assert!(f.allocations.writes.lock().unwrap().is_empty());
        // Schedule is untouched on rejection
        let stored = f.subscriptions.get_subscription("user-1").unwrap().unwrap();
        assert_eq!(stored.next_allocation_date, Some(now()));
    }

    #[tokio::test]
    async fn test_item_errors_are_reported_alongside_results() {
        let f = fixture(vec![subscription(
            "user-1",
            dec!(100),
            SubscriptionStatus::Active,
        )]);

        let response = f
            .service
            .allocate(
                "user-1",
                vec![
                    AllocationRequest::new("A", dec!(10)),
                    AllocationRequest::new("ZERO", dec!(10)),
                    AllocationRequest::new("nope", dec!(10)),
                ],
                now(),
            )
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.results.len(), 1);
        let errors = response.errors.unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].kind, AllocationErrorKind::InvalidProduct);
        assert_eq!(errors[1].kind, AllocationErrorKind::ProductNotFound);
        assert_eq!(response.remaining_budget, dec!(90));
        assert_eq!(f.allocations.writes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_or_paused_subscription_is_rejected() {
        let f = fixture(vec![subscription(
            "paused",
            dec!(100),
            SubscriptionStatus::Paused,
        )]);

        for user in ["nobody", "paused"] {
            let err = f
                .service
                .allocate(user, vec![AllocationRequest::new("A", dec!(1))], now())
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                Error::Allocation(AllocationError::NoSubscription)
            ));
        }
    }

    #[tokio::test]
    async fn test_run_due_allocations_replays_stored_amounts() {
        let f = fixture(vec![
            subscription("user-1", dec!(100), SubscriptionStatus::Active),
            subscription("user-2", dec!(10), SubscriptionStatus::Active),
        ]);
        {
            let mut stored = f.allocations.stored.lock().unwrap();
            for (sub, product, amount) in [
                ("sub-user-1", "A", dec!(40)),
                ("sub-user-1", "B", dec!(50)),
                // Exceeds user-2's budget
                ("sub-user-2", "A", dec!(20)),
            ] {
                stored.push(StockpileAllocation {
                    id: format!("{}-{}", sub, product),
                    subscription_id: sub.to_string(),
                    product_id: product.to_string(),
                    monthly_amount: amount,
                    target_quantity: None,
                    created_at: now(),
                    updated_at: now(),
                });
            }
        }

        let summary = f.service.run_due_allocations(now()).await.unwrap();

        assert_eq!(summary.subscriptions_processed, 2);
        assert_eq!(summary.items_allocated, 2);
        assert_eq!(summary.failures, 1);

        // Both subscriptions move to the next period, so a second pass is a no-op
        let again = f.service.run_due_allocations(now()).await.unwrap();
        assert_eq!(again.subscriptions_processed, 0);
    }
}
