use std::collections::BTreeSet;
use std::sync::Arc;

use bigdecimal::{BigDecimal, Zero};

use crate::domain::errors::DomainError;
use crate::domain::order::LineItem;
use crate::domain::ports::{OrderRepository, PriceResolver};

/// Validates and persists new orders.
///
/// Validation is all-or-nothing: the referenced user must exist, every
/// quantity must be non-negative, and every referenced product must
/// resolve to a current catalog price. Any failure aborts intake before a
/// single row is written. The total is computed once, from the prices in
/// effect at creation time, and persisted verbatim.
pub struct OrderIntake<R, P> {
    repo: Arc<R>,
    prices: Arc<P>,
}

impl<R: OrderRepository, P: PriceResolver> OrderIntake<R, P> {
    pub fn new(repo: Arc<R>, prices: Arc<P>) -> Self {
        Self { repo, prices }
    }

    pub async fn create_order(
        &self,
        user_id: i32,
        items: Vec<LineItem>,
    ) -> Result<i32, DomainError> {
        if !self.repo.user_exists(user_id).await? {
            return Err(DomainError::Validation(
                "User with specified id does not exist".to_string(),
            ));
        }
        if items.is_empty() {
            return Err(DomainError::Validation(
                "Order must contain at least one item".to_string(),
            ));
        }
        if items.iter().any(|i| i.quantity < 0) {
            return Err(DomainError::Validation(
                "Item count cannot be less than 0".to_string(),
            ));
        }

        let ids: BTreeSet<i32> = items.iter().map(|i| i.product_id).collect();
        let prices = self.prices.resolve_prices(&ids).await?;

        let total_price = items.iter().try_fold(BigDecimal::zero(), |acc, item| {
            let price = prices.get(&item.product_id).ok_or_else(|| {
                DomainError::Internal(format!(
                    "resolved prices are missing product {}",
                    item.product_id
                ))
            })?;
            Ok::<_, DomainError>(acc + price.unit_price.clone() * BigDecimal::from(item.quantity))
        })?;

        self.repo.create(user_id, total_price, items).await
    }
}
