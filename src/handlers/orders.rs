use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::order::{OrderLineView, OrderView};
use crate::errors::AppError;
use crate::AppOrderService;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub user_id: Uuid,
    /// Decimal total as a string to avoid floating-point issues, e.g. "42.5".
    /// The total is caller-supplied; it is not recomputed from line items.
    pub total: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total: String,
    pub created_at: String,
    pub line_ids: Vec<Uuid>,
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        OrderResponse {
            id: order.id,
            user_id: order.user_id,
            total: order.total.to_string(),
            created_at: order.created_at.to_rfc3339(),
            line_ids: order.line_ids,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLineResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

impl From<OrderLineView> for OrderLineResponse {
    fn from(line: OrderLineView) -> Self {
        OrderLineResponse {
            id: line.id,
            order_id: line.order_id,
            product_id: line.product_id,
            quantity: line.quantity,
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Number of orders to skip. Defaults to 0.
    #[serde(default)]
    pub skip: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub skip: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Creates an order with the supplied total and no lines. Lines are attached
/// afterwards through POST /orders/{order_id}/lines.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = OrderResponse),
        (status = 404, description = "User not found"),
        (status = 422, description = "Malformed total"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<AppOrderService>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let total = BigDecimal::from_str(&body.total)
        .map_err(|e| AppError::InvalidInput(format!("Invalid total '{}': {}", body.total, e)))?;

    let order = web::block(move || service.create_order(body.user_id, total))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /orders/{order_id}
///
/// Returns the order with the ids of its lines.
#[utoipa::path(
    get,
    path = "/orders/{order_id}",
    params(
        ("order_id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<AppOrderService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || service.get_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders
///
/// Returns a page of orders. Use `skip` and `limit` to control pagination.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("skip" = Option<i64>, Query, description = "Orders to skip (default 0)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    service: web::Data<AppOrderService>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let skip = params.skip.max(0);
    let limit = params.limit.clamp(1, 100);

    let result = web::block(move || service.list_orders(skip, limit))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items.into_iter().map(OrderResponse::from).collect(),
        total: result.total,
        skip,
        limit,
    }))
}

/// POST /orders/{order_id}/lines
///
/// Attaches a line to an existing order. Quantity must be at least 1.
#[utoipa::path(
    post,
    path = "/orders/{order_id}/lines",
    params(
        ("order_id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = CreateOrderLineRequest,
    responses(
        (status = 201, description = "Order line created successfully", body = OrderLineResponse),
        (status = 404, description = "Order or product not found"),
        (status = 422, description = "Quantity below 1"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn add_order_line(
    service: web::Data<AppOrderService>,
    path: web::Path<Uuid>,
    body: web::Json<CreateOrderLineRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let body = body.into_inner();

    let line = web::block(move || {
        service.add_order_line(order_id, body.product_id, body.quantity)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(OrderLineResponse::from(line)))
}

/// GET /orders/{order_id}/lines
///
/// Returns all lines of the order; an order without lines yields an empty
/// list, not an error.
#[utoipa::path(
    get,
    path = "/orders/{order_id}/lines",
    params(
        ("order_id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Lines of the order", body = [OrderLineResponse]),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_order_lines(
    service: web::Data<AppOrderService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let lines = web::block(move || service.list_order_lines(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let responses: Vec<OrderLineResponse> =
        lines.into_iter().map(OrderLineResponse::from).collect();
    Ok(HttpResponse::Ok().json(responses))
}

/// GET /orders/lines/{line_id}
///
/// Returns a single order line by id.
#[utoipa::path(
    get,
    path = "/orders/lines/{line_id}",
    params(
        ("line_id" = Uuid, Path, description = "Order line UUID"),
    ),
    responses(
        (status = 200, description = "Order line found", body = OrderLineResponse),
        (status = 404, description = "Order line not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order_line(
    service: web::Data<AppOrderService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let line_id = path.into_inner();

    let line = web::block(move || service.get_order_line(line_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderLineResponse::from(line)))
}
