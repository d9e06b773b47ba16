use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use bigdecimal::{BigDecimal, Zero};

use crate::domain::errors::DomainError;
use crate::domain::order::{OrderPage, OrderSkeleton, OrderView, PricedItem, ResolvedPrice};
use crate::domain::ports::{OrderRepository, PriceResolver};

/// Joins stored order skeletons with current catalog prices into
/// client-facing order views.
///
/// Both entry points share the same join logic: collect the distinct
/// product ids referenced by the order(s), resolve them in one batched
/// call, then price each order's line items against the resolved map. A
/// resolver failure fails the whole request; partially priced views are
/// never returned.
pub struct OrderMaterializer<R, P> {
    repo: Arc<R>,
    prices: Arc<P>,
}

impl<R: OrderRepository, P: PriceResolver> OrderMaterializer<R, P> {
    pub fn new(repo: Arc<R>, prices: Arc<P>) -> Self {
        Self { repo, prices }
    }

    /// Materialize a single order into a priced view.
    pub async fn materialize(&self, order_id: i32) -> Result<OrderView, DomainError> {
        let order = self
            .repo
            .find_by_id(order_id)
            .await?
            .ok_or(DomainError::NotFound)?;

        let ids = distinct_product_ids(std::slice::from_ref(&order));
        let prices = self.resolve(&ids).await?;

        price_order(order, &prices)
    }

    /// Materialize one page of orders, newest first, optionally filtered
    /// by user.
    ///
    /// All distinct product ids across the page are resolved in a single
    /// batched call, so the remote cost is proportional to the number of
    /// distinct products in the page, not the number of orders.
    pub async fn materialize_page(
        &self,
        user_id: Option<i32>,
        page: i64,
        page_size: i64,
    ) -> Result<OrderPage, DomainError> {
        if page < 1 || page_size < 1 {
            return Err(DomainError::Validation(
                "page and pageSize cannot be negative or equal to 0".to_string(),
            ));
        }

        let (orders, total) = self.repo.list(user_id, page, page_size).await?;
        if orders.is_empty() {
            return Ok(OrderPage {
                items: Vec::new(),
                total,
            });
        }

        let ids = distinct_product_ids(&orders);
        let prices = self.resolve(&ids).await?;

        let items = orders
            .into_iter()
            .map(|order| price_order(order, &prices))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OrderPage { items, total })
    }

    async fn resolve(
        &self,
        ids: &BTreeSet<i32>,
    ) -> Result<HashMap<i32, ResolvedPrice>, DomainError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(self.prices.resolve_prices(ids).await?)
    }
}

fn distinct_product_ids(orders: &[OrderSkeleton]) -> BTreeSet<i32> {
    orders
        .iter()
        .flat_map(|o| o.items.iter().map(|i| i.product_id))
        .collect()
}

/// Price every line item of `order` against the resolved map.
///
/// Duplicate product ids within one order are priced and summed
/// independently, never merged. The stored total is used verbatim unless
/// it is exactly zero, in which case it is recomputed from the priced
/// lines for the returned view only.
fn price_order(
    order: OrderSkeleton,
    prices: &HashMap<i32, ResolvedPrice>,
) -> Result<OrderView, DomainError> {
    let items = order
        .items
        .iter()
        .map(|item| {
            let price = prices.get(&item.product_id).ok_or_else(|| {
                DomainError::Internal(format!(
                    "resolved prices are missing product {}",
                    item.product_id
                ))
            })?;
            Ok(PricedItem {
                product_id: item.product_id,
                name: price.name.clone(),
                unit_price: price.unit_price.clone(),
                quantity: item.quantity,
            })
        })
        .collect::<Result<Vec<_>, DomainError>>()?;

    let total_price = if order.total_price.is_zero() {
        items.iter().fold(BigDecimal::zero(), |acc, item| {
            acc + item.unit_price.clone() * BigDecimal::from(item.quantity)
        })
    } else {
        order.total_price
    };

    Ok(OrderView {
        id: order.id,
        user_id: order.user_id,
        created_at: order.created_at,
        items,
        total_price,
    })
}
