use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::cart::CartView;
use crate::errors::AppError;
use crate::AppCartService;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCartRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Distinct product ids currently in the cart. Membership is boolean;
    /// there are no quantities.
    pub items: Vec<Uuid>,
}

impl From<CartView> for CartResponse {
    fn from(cart: CartView) -> Self {
        CartResponse {
            id: cart.id,
            user_id: cart.user_id,
            items: cart.product_ids,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /carts
///
/// Creates an empty cart for the user. Each user has at most one cart; a
/// second create for the same user is rejected with 409.
#[utoipa::path(
    post,
    path = "/carts",
    request_body = CreateCartRequest,
    responses(
        (status = 201, description = "Cart created successfully", body = CartResponse),
        (status = 404, description = "User not found"),
        (status = 409, description = "A cart already exists for this user"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "carts"
)]
pub async fn create_cart(
    service: web::Data<AppCartService>,
    body: web::Json<CreateCartRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let cart = web::block(move || service.create_cart(body.user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(CartResponse::from(cart)))
}

/// GET /carts/{user_id}
///
/// Returns the user's cart with its resolved product-id set.
#[utoipa::path(
    get,
    path = "/carts/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Owning user UUID"),
    ),
    responses(
        (status = 200, description = "Cart found", body = CartResponse),
        (status = 404, description = "No cart exists for this user"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "carts"
)]
pub async fn get_cart(
    service: web::Data<AppCartService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let cart = web::block(move || service.get_cart(user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}

/// POST /carts/{user_id}/items/{product_id}
///
/// Adds a product to the cart. Adding a product that is already a member is
/// a no-op and still returns the (unchanged) cart snapshot.
#[utoipa::path(
    post,
    path = "/carts/{user_id}/items/{product_id}",
    params(
        ("user_id" = Uuid, Path, description = "Owning user UUID"),
        ("product_id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 404, description = "Cart or product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "carts"
)]
pub async fn add_cart_item(
    service: web::Data<AppCartService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (user_id, product_id) = path.into_inner();

    let cart = web::block(move || service.add_item(user_id, product_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}

/// DELETE /carts/{user_id}/items/{product_id}
///
/// Removes a product from the cart. Removing a product that is not a member
/// is an error (404), not a silent success.
#[utoipa::path(
    delete,
    path = "/carts/{user_id}/items/{product_id}",
    params(
        ("user_id" = Uuid, Path, description = "Owning user UUID"),
        ("product_id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 404, description = "Cart, product, or membership not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "carts"
)]
pub async fn remove_cart_item(
    service: web::Data<AppCartService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (user_id, product_id) = path.into_inner();

    let cart = web::block(move || service.remove_item(user_id, product_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}
