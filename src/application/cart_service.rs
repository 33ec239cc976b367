use uuid::Uuid;

use crate::domain::cart::CartView;
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;

pub struct CartService<R> {
    repo: R,
}

impl<R: CartRepository> CartService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_cart(&self, user_id: Uuid) -> Result<CartView, DomainError> {
        self.repo.create(user_id)
    }

    pub fn get_cart(&self, user_id: Uuid) -> Result<CartView, DomainError> {
        self.repo.find_by_user(user_id)
    }

    pub fn add_item(&self, user_id: Uuid, product_id: Uuid) -> Result<CartView, DomainError> {
        self.repo.add_item(user_id, product_id)
    }

    pub fn remove_item(&self, user_id: Uuid, product_id: Uuid) -> Result<CartView, DomainError> {
        self.repo.remove_item(user_id, product_id)
    }
}
