//! Background scheduler for recurring allocations.
//!
//! Each tick replays the stored monthly allocations of every subscription
//! whose next allocation date has passed.

use std::sync::Arc;

use chrono::Utc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::main_lib::AppState;

/// Initial delay before the first run, to let the server finish starting.
const INITIAL_DELAY_SECS: u64 = 30;

/// Starts the allocation scheduler. `None` leaves it disabled.
pub fn start_allocation_scheduler(state: Arc<AppState>, period: Option<Duration>) {
    let Some(period) = period else {
        info!("Allocation scheduler disabled");
        return;
    };

    tokio::spawn(async move {
        info!("Allocation scheduler started ({}s interval)", period.as_secs());
        tokio::time::sleep(Duration::from_secs(INITIAL_DELAY_SECS)).await;

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            run_scheduled_allocations(&state).await;
        }
    });
}

/// Runs a single pass over the due subscriptions.
pub async fn run_scheduled_allocations(state: &Arc<AppState>) {
    match state.allocation_service.run_due_allocations(Utc::now()).await {
        Ok(summary) if summary.subscriptions_processed == 0 => {
            debug!("Scheduled allocation: nothing due");
        }
        Ok(summary) => {
            info!(
                "Scheduled allocation processed {} subscriptions: {} items allocated, {} failures",
                summary.subscriptions_processed, summary.items_allocated, summary.failures
            );
        }
        Err(e) => warn!("Scheduled allocation failed: {}", e),
    }
}
