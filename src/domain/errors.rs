use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// The kind of entity an error refers to, so callers can map failures to
/// status codes without re-deriving the cause from message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Product,
    Cart,
    CartItem,
    Order,
    OrderLine,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "user",
            EntityKind::Product => "product",
            EntityKind::Cart => "cart",
            EntityKind::CartItem => "cart item",
            EntityKind::Order => "order",
            EntityKind::OrderLine => "order line",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} {1} not found")]
    NotFound(EntityKind, Uuid),

    #[error("{0} already exists for {1}")]
    Conflict(EntityKind, Uuid),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("persistence failure: {0}")]
    Persistence(String),
}
