use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{ListResult, OrderLineView, OrderView};
use crate::domain::ports::OrderRepository;

pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_order(&self, user_id: Uuid, total: BigDecimal) -> Result<OrderView, DomainError> {
        self.repo.create(user_id, total)
    }

    pub fn get_order(&self, id: Uuid) -> Result<OrderView, DomainError> {
        self.repo.find_by_id(id)
    }

    pub fn list_orders(&self, skip: i64, limit: i64) -> Result<ListResult, DomainError> {
        if skip < 0 || limit < 0 {
            return Err(DomainError::InvalidInput(format!(
                "skip and limit must be non-negative, got skip={skip} limit={limit}"
            )));
        }
        self.repo.list(skip, limit)
    }

    /// Quantity validation lives here, not in the repository: a line with
    /// quantity below 1 must be rejected before any storage work happens.
    pub fn add_order_line(
        &self,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<OrderLineView, DomainError> {
        if quantity < 1 {
            return Err(DomainError::InvalidInput(format!(
                "quantity must be at least 1, got {quantity}"
            )));
        }
        self.repo.add_line(order_id, product_id, quantity)
    }

    pub fn get_order_line(&self, line_id: Uuid) -> Result<OrderLineView, DomainError> {
        self.repo.find_line(line_id)
    }

    pub fn list_order_lines(&self, order_id: Uuid) -> Result<Vec<OrderLineView>, DomainError> {
        self.repo.list_lines(order_id)
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use uuid::Uuid;

    use super::OrderService;
    use crate::domain::errors::DomainError;
    use crate::domain::order::{ListResult, OrderLineView, OrderView};
    use crate::domain::ports::OrderRepository;

    /// Stub that panics on any call: validation failures must short-circuit
    /// before the repository is reached.
    struct UnreachableRepo;

    impl OrderRepository for UnreachableRepo {
        fn create(&self, _: Uuid, _: BigDecimal) -> Result<OrderView, DomainError> {
            panic!("repository should not be called");
        }
        fn find_by_id(&self, _: Uuid) -> Result<OrderView, DomainError> {
            panic!("repository should not be called");
        }
        fn list(&self, _: i64, _: i64) -> Result<ListResult, DomainError> {
            panic!("repository should not be called");
        }
        fn add_line(&self, _: Uuid, _: Uuid, _: i32) -> Result<OrderLineView, DomainError> {
            panic!("repository should not be called");
        }
        fn find_line(&self, _: Uuid) -> Result<OrderLineView, DomainError> {
            panic!("repository should not be called");
        }
        fn list_lines(&self, _: Uuid) -> Result<Vec<OrderLineView>, DomainError> {
            panic!("repository should not be called");
        }
    }

    #[test]
    fn add_order_line_rejects_zero_quantity() {
        let service = OrderService::new(UnreachableRepo);
        let result = service.add_order_line(Uuid::new_v4(), Uuid::new_v4(), 0);
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn add_order_line_rejects_negative_quantity() {
        let service = OrderService::new(UnreachableRepo);
        let result = service.add_order_line(Uuid::new_v4(), Uuid::new_v4(), -3);
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn list_orders_rejects_negative_skip() {
        let service = OrderService::new(UnreachableRepo);
        let result = service.list_orders(-1, 20);
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn list_orders_rejects_negative_limit() {
        let service = OrderService::new(UnreachableRepo);
        let result = service.list_orders(0, -20);
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }
}
