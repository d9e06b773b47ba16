use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

/// A stored order line: a product reference and a quantity. No price is
/// kept per line; prices are resolved from the catalog at read time.
#[derive(Debug, Clone)]
pub struct LineItem {
    pub product_id: i32,
    pub quantity: i32,
}

/// A stored order with its line items but no resolved prices.
///
/// A `total_price` of exactly zero is a sentinel meaning "not yet
/// computed": the materializer derives the total from current prices for
/// the returned view, without ever writing it back.
#[derive(Debug, Clone)]
pub struct OrderSkeleton {
    pub id: i32,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub total_price: BigDecimal,
    pub items: Vec<LineItem>,
}

/// Current price and display name for one product, as reported by the
/// catalog. Lives only for the duration of a single materialization or
/// intake operation; never cached.
#[derive(Debug, Clone)]
pub struct ResolvedPrice {
    pub product_id: i32,
    pub name: String,
    pub unit_price: BigDecimal,
}

/// One line of a priced order view.
#[derive(Debug, Clone)]
pub struct PricedItem {
    pub product_id: i32,
    pub name: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
}

/// The fully priced, client-facing projection of an order. Derived from a
/// skeleton plus a batch of resolved prices; never persisted.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: i32,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub items: Vec<PricedItem>,
    pub total_price: BigDecimal,
}

/// One page of priced orders. `total` is the unfiltered count of all
/// orders in the store, regardless of any user filter on the page itself.
#[derive(Debug, Clone)]
pub struct OrderPage {
    pub items: Vec<OrderView>,
    pub total: i64,
}

/// Authenticated caller identity as reported by the authorization gate.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i32,
    pub display_name: String,
}
