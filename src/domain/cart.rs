use uuid::Uuid;

/// Immutable snapshot of a cart with its resolved product-id set.
///
/// Membership is boolean: a product is either in the cart or not, there are
/// no per-product quantities.
#[derive(Debug, Clone)]
pub struct CartView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_ids: Vec<Uuid>,
}
