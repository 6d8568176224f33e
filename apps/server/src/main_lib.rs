use std::sync::Arc;

use anyhow::Context;
use stockpile_core::{
    allocation::{AllocationService, AllocationServiceTrait},
    catalog::{CatalogService, CatalogServiceTrait, NewProduct},
    shipments::{ShipmentService, ShipmentServiceTrait},
    stockpile::{ProgressConfig, StockpileService, StockpileServiceTrait},
    subscriptions::{SubscriptionService, SubscriptionServiceTrait},
    triggers::{TriggerService, TriggerServiceTrait},
};
use stockpile_storage_sqlite::{
    db::{self, write_actor},
    AllocationRepository, CatalogRepository, ShipmentRepository, StockpileRepository,
    SubscriptionRepository, TriggerRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{auth::AuthManager, config::Config};

pub struct AppState {
    pub catalog_service: Arc<dyn CatalogServiceTrait>,
    pub subscription_service: Arc<dyn SubscriptionServiceTrait>,
    pub allocation_service: Arc<dyn AllocationServiceTrait>,
    pub stockpile_service: Arc<dyn StockpileServiceTrait>,
    pub trigger_service: Arc<dyn TriggerServiceTrait>,
    pub shipment_service: Arc<dyn ShipmentServiceTrait>,
    pub auth: Arc<AuthManager>,
}

pub fn init_tracing() {
    let log_format = std::env::var("STOCKPILE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

async fn seed_catalog(
    catalog_service: &Arc<dyn CatalogServiceTrait>,
    path: &std::path::Path,
) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read catalog seed {}", path.display()))?;
    let products: Vec<NewProduct> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid catalog seed {}", path.display()))?;
    let count = catalog_service.seed_products(products).await?;
    tracing::info!("Seeded {} products from {}", count, path.display());
    Ok(())
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = write_actor::spawn_writer((*pool).clone());

    let catalog_repository = Arc::new(CatalogRepository::new(pool.clone(), writer.clone()));
    let catalog_service: Arc<dyn CatalogServiceTrait> =
        Arc::new(CatalogService::new(catalog_repository));
    if let Some(seed) = &config.catalog_seed {
        seed_catalog(&catalog_service, seed).await?;
    }

    let subscription_repository =
        Arc::new(SubscriptionRepository::new(pool.clone(), writer.clone()));
    let subscription_service: Arc<dyn SubscriptionServiceTrait> =
        Arc::new(SubscriptionService::new(subscription_repository.clone()));

    let allocation_repository = Arc::new(AllocationRepository::new(pool.clone(), writer.clone()));
    let allocation_service: Arc<dyn AllocationServiceTrait> = Arc::new(AllocationService::new(
        catalog_service.clone(),
        subscription_repository,
        allocation_repository,
    ));

    let trigger_repository = Arc::new(TriggerRepository::new(pool.clone(), writer.clone()));
    let stockpile_repository = Arc::new(StockpileRepository::new(pool.clone(), writer.clone()));
    let stockpile_service: Arc<dyn StockpileServiceTrait> = Arc::new(StockpileService::new(
        stockpile_repository,
        trigger_repository.clone(),
        ProgressConfig {
            average_round_price: config.average_round_price,
        },
    ));
    let trigger_service: Arc<dyn TriggerServiceTrait> = Arc::new(TriggerService::new(
        trigger_repository,
        stockpile_service.clone(),
    ));

    let shipment_repository = Arc::new(ShipmentRepository::new(pool.clone(), writer));
    let shipment_service: Arc<dyn ShipmentServiceTrait> = Arc::new(ShipmentService::new(
        shipment_repository,
        catalog_service.clone(),
    ));

    Ok(Arc::new(AppState {
        catalog_service,
        subscription_service,
        allocation_service,
        stockpile_service,
        trigger_service,
        shipment_service,
        auth: Arc::new(AuthManager::new(&config.jwt_secret)),
    }))
}
