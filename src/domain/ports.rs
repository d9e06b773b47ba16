use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use bigdecimal::BigDecimal;

use super::errors::{DomainError, PriceError};
use super::order::{Identity, LineItem, OrderSkeleton, ResolvedPrice};

/// Local persistence of orders and their line items. Deals only in ids and
/// quantities; never talks to the price resolver.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    /// Persist an order and all of its line items in a single transaction.
    async fn create(
        &self,
        user_id: i32,
        total_price: BigDecimal,
        items: Vec<LineItem>,
    ) -> Result<i32, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<OrderSkeleton>, DomainError>;

    /// One page of orders, newest first, optionally filtered by user. The
    /// returned count is the unfiltered total number of orders.
    async fn list(
        &self,
        user_id: Option<i32>,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<OrderSkeleton>, i64), DomainError>;

    async fn user_exists(&self, user_id: i32) -> Result<bool, DomainError>;
}

/// Batched price lookup against the remote product catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceResolver: Send + Sync + 'static {
    /// Resolve current name and unit price for every id in `ids`, in one
    /// remote request. `ids` must be non-empty; callers skip the call
    /// entirely when an order references no products. The returned map
    /// covers exactly the requested ids or the call fails as a whole.
    async fn resolve_prices(
        &self,
        ids: &BTreeSet<i32>,
    ) -> Result<HashMap<i32, ResolvedPrice>, PriceError>;
}

/// Validates a bearer credential before the pipeline runs. The pipeline
/// trusts the gate's verdict and never re-validates credentials itself.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGate: Send + Sync + 'static {
    async fn authenticate(&self, token: &str) -> Result<Identity, DomainError>;
}
