//! Allocation module - monthly budget split into stockpile quantities.

mod allocation_engine;
mod allocation_model;
mod allocation_service;
mod allocation_traits;

#[cfg(test)]
mod allocation_service_tests;

pub use allocation_engine::allocate;
pub use allocation_model::{
    AllocationBatchResponse, AllocationErrorKind, AllocationItemError, AllocationOutcome,
    AllocationRequest, AllocationResult, AllocationWrite, ScheduledAllocationSummary,
    StockpileAllocation,
};
pub use allocation_service::AllocationService;
pub use allocation_traits::{AllocationRepositoryTrait, AllocationServiceTrait};
