//! Budget allocation across calibers and accessories.
//!
//! Pure computation: prices come in through a [`PriceCatalog`], nothing is
//! persisted here. The caller applies the successful results.

use std::collections::HashSet;

use log::warn;
use rust_decimal::Decimal;

use super::allocation_model::{
    AllocationErrorKind, AllocationItemError, AllocationOutcome, AllocationRequest,
    AllocationResult,
};
use crate::catalog::PriceCatalog;
use crate::errors::{AllocationError, Error, Result};

/// Splits `budget` over `requests`, converting each amount into a unit quantity.
///
/// The whole batch is rejected with [`AllocationError::BudgetExceeded`] when the
/// well-formed amounts add up to more than `budget`. Otherwise each line is
/// processed on its own: unknown products and unusable prices are reported in
/// `errors` while the remaining lines still produce results. A product listed
/// more than once keeps its first line; the repeats are `InvalidAllocation`.
pub fn allocate(
    budget: Decimal,
    requests: &[AllocationRequest],
    catalog: &PriceCatalog,
) -> Result<AllocationOutcome> {
    if requests.is_empty() {
        return Err(Error::invalid_input(
            "At least one allocation is required",
        ));
    }

    let mut seen = HashSet::new();
    let repeated: Vec<bool> = requests
        .iter()
        .map(|r| r.valid_amount().is_some() && !seen.insert(r.product_id.trim()))
        .collect();

    let budget_lines = requests
        .iter()
        .zip(&repeated)
        .filter(|(_, repeated)| !**repeated)
        .filter_map(|(r, _)| r.valid_amount());
    let Some(total_requested) = checked_total(budget_lines) else {
        return Err(AllocationError::BudgetExceeded {
            requested: Decimal::MAX,
            budget,
            overage: Decimal::MAX.saturating_sub(budget),
        }
        .into());
    };
    if total_requested > budget {
        return Err(AllocationError::BudgetExceeded {
            requested: total_requested,
            budget,
            overage: total_requested - budget,
        }
        .into());
    }

    let mut results = Vec::with_capacity(requests.len());
    let mut errors = Vec::new();
    let mut total_allocated = Decimal::ZERO;

    for (request, repeated) in requests.iter().zip(repeated) {
        let line = if repeated {
            Err(AllocationItemError::new(
                request.product_id.as_str(),
                AllocationErrorKind::InvalidAllocation,
                "Product appears more than once in the batch",
            ))
        } else {
            allocate_line(request, catalog)
        };
        match line {
            Ok(result) => {
                total_allocated = total_allocated.saturating_add(result.amount);
                results.push(result);
            }
            Err(item_error) => {
                warn!(
                    "Skipping allocation for product '{}': {}",
                    item_error.product_id, item_error.error
                );
                errors.push(item_error);
            }
        }
    }

    Ok(AllocationOutcome {
        results,
        errors,
        total_requested,
        total_allocated,
        remaining_budget: budget - total_allocated,
    })
}

/// Sum of `amounts`, or `None` when it does not fit in a `Decimal`.
fn checked_total(amounts: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
}

fn allocate_line(
    request: &AllocationRequest,
    catalog: &PriceCatalog,
) -> std::result::Result<AllocationResult, AllocationItemError> {
    let product_id = request.product_id.as_str();
    let amount = request.valid_amount().ok_or_else(|| {
        AllocationItemError::new(
            product_id,
            AllocationErrorKind::InvalidAllocation,
            "Invalid allocation data",
        )
    })?;

    let unit_price = catalog.unit_price(product_id).ok_or_else(|| {
        AllocationItemError::new(
            product_id,
            AllocationErrorKind::ProductNotFound,
            "Product not found",
        )
    })?;

    if unit_price <= Decimal::ZERO {
        return Err(AllocationItemError::new(
            product_id,
            AllocationErrorKind::InvalidProduct,
            format!("Product has an invalid unit price of {}", unit_price),
        ));
    }

    let quantity = amount.checked_div(unit_price).ok_or_else(|| {
        AllocationItemError::new(
            product_id,
            AllocationErrorKind::InvalidProduct,
            "Quantity is out of range for this unit price",
        )
    })?;

    Ok(AllocationResult {
        product_id: product_id.to_string(),
        amount,
        quantity,
        success: true,
        error: None,
        target_quantity: request.target_quantity,
    })
}
