use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::cart::CartView;
use super::errors::DomainError;
use super::order::{ListResult, OrderLineView, OrderView};

/// Cart persistence port. Carts are addressed by their owning user; every
/// mutating method runs in a single storage transaction and returns the
/// post-mutation snapshot.
pub trait CartRepository: Send + Sync + 'static {
    fn create(&self, user_id: Uuid) -> Result<CartView, DomainError>;
    fn find_by_user(&self, user_id: Uuid) -> Result<CartView, DomainError>;
    fn add_item(&self, user_id: Uuid, product_id: Uuid) -> Result<CartView, DomainError>;
    fn remove_item(&self, user_id: Uuid, product_id: Uuid) -> Result<CartView, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    fn create(&self, user_id: Uuid, total: BigDecimal) -> Result<OrderView, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<OrderView, DomainError>;
    fn list(&self, skip: i64, limit: i64) -> Result<ListResult, DomainError>;
    fn add_line(
        &self,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<OrderLineView, DomainError>;
    fn find_line(&self, line_id: Uuid) -> Result<OrderLineView, DomainError>;
    fn list_lines(&self, order_id: Uuid) -> Result<Vec<OrderLineView>, DomainError>;
}
