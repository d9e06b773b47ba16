use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::order::{LineItem, OrderView};
use crate::errors::AppError;
use crate::AppState;

use super::authorize;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItemRequest {
    pub product_id: i32,
    pub count: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_id: i32,
    #[serde(default)]
    pub items: Vec<CreateOrderItemRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub product_id: i32,
    pub name: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    pub count: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i32,
    pub user_id: i32,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
    pub total_price: String,
}

impl From<OrderView> for OrderResponse {
    fn from(view: OrderView) -> Self {
        OrderResponse {
            id: view.id,
            user_id: view.user_id,
            created_at: view.created_at.to_rfc3339(),
            items: view
                .items
                .into_iter()
                .map(|i| OrderItemResponse {
                    product_id: i.product_id,
                    name: i.name,
                    price: i.unit_price.to_string(),
                    count: i.quantity,
                })
                .collect(),
            total_price: view.total_price.to_string(),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersParams {
    /// Restrict the page to one user's orders; the total still counts all
    /// orders.
    pub user_id: Option<i32>,
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 10.
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /orders/{id}
///
/// Returns the order with every line item priced from the current catalog.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Priced order view", body = OrderResponse),
        (status = 401, description = "Missing or rejected credential"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    authorize(&req, state.gate.as_ref()).await?;

    let view = state.materializer.materialize(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(view)))
}

/// GET /orders
///
/// Returns one page of priced orders, newest first, optionally filtered by
/// `userId`. The reported total is the overall order count.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("userId" = Option<i32>, Query, description = "Filter by owning user"),
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("pageSize" = Option<i64>, Query, description = "Items per page (default 10)"),
    ),
    responses(
        (status = 200, description = "Paginated list of priced orders", body = ListOrdersResponse),
        (status = 400, description = "Invalid pagination parameters"),
        (status = 401, description = "Missing or rejected credential"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    authorize(&req, state.gate.as_ref()).await?;

    let params = query.into_inner();
    let page = state
        .materializer
        .materialize_page(params.user_id, params.page, params.page_size)
        .await?;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: page.items.into_iter().map(OrderResponse::from).collect(),
        total: page.total,
        page: params.page,
        page_size: params.page_size,
    }))
}

/// POST /orders
///
/// Validates the order, prices it against the current catalog and persists
/// it atomically. Nothing is written when validation or price resolution
/// fails.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = CreateOrderResponse),
        (status = 400, description = "Validation failed or unknown product"),
        (status = 401, description = "Missing or rejected credential"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    authorize(&req, state.gate.as_ref()).await?;

    let body = body.into_inner();
    let items: Vec<LineItem> = body
        .items
        .into_iter()
        .map(|i| LineItem {
            product_id: i.product_id,
            quantity: i.count,
        })
        .collect();

    let id = state.intake.create_order(body.user_id, items).await?;
    Ok(HttpResponse::Created().json(json!({ "id": id })))
}
