use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::CartView;
use crate::domain::errors::{DomainError, EntityKind};
use crate::domain::ports::CartRepository;
use crate::schema::{cart_items, carts};

use super::lookups;
use super::models::{CartRow, NewCartItemRow, NewCartRow};

pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn find_cart_id(conn: &mut PgConnection, user_id: Uuid) -> Result<Uuid, DomainError> {
    carts::table
        .filter(carts::user_id.eq(user_id))
        .select(carts::id)
        .first(conn)
        .optional()?
        .ok_or(DomainError::NotFound(EntityKind::Cart, user_id))
}

fn load_product_ids(conn: &mut PgConnection, cart_id: Uuid) -> Result<Vec<Uuid>, DomainError> {
    let ids = cart_items::table
        .filter(cart_items::cart_id.eq(cart_id))
        .order(cart_items::added_at.asc())
        .select(cart_items::product_id)
        .load(conn)?;
    Ok(ids)
}

impl CartRepository for DieselCartRepository {
    fn create(&self, user_id: Uuid) -> Result<CartView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            if !lookups::user_exists(conn, user_id)? {
                return Err(DomainError::NotFound(EntityKind::User, user_id));
            }

            // No pre-read for an existing cart: the unique constraint on
            // carts.user_id decides, so concurrent creates cannot both win.
            let inserted = diesel::insert_into(carts::table)
                .values(&NewCartRow {
                    id: Uuid::new_v4(),
                    user_id,
                })
                .returning(CartRow::as_returning())
                .get_result::<CartRow>(conn);

            let cart = match inserted {
                Ok(cart) => cart,
                Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                    return Err(DomainError::Conflict(EntityKind::Cart, user_id));
                }
                Err(e) => return Err(e.into()),
            };

            Ok(CartView {
                id: cart.id,
                user_id: cart.user_id,
                product_ids: Vec::new(),
            })
        })
    }

    fn find_by_user(&self, user_id: Uuid) -> Result<CartView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let cart_id = find_cart_id(conn, user_id)?;
            let product_ids = load_product_ids(conn, cart_id)?;
            Ok(CartView {
                id: cart_id,
                user_id,
                product_ids,
            })
        })
    }

    fn add_item(&self, user_id: Uuid, product_id: Uuid) -> Result<CartView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let cart_id = find_cart_id(conn, user_id)?;
            if !lookups::product_exists(conn, product_id)? {
                return Err(DomainError::NotFound(EntityKind::Product, product_id));
            }

            // Re-adding a member is a no-op; the composite primary key on
            // (cart_id, product_id) absorbs the duplicate.
            diesel::insert_into(cart_items::table)
                .values(&NewCartItemRow {
                    cart_id,
                    product_id,
                })
                .on_conflict_do_nothing()
                .execute(conn)?;

            let product_ids = load_product_ids(conn, cart_id)?;
            Ok(CartView {
                id: cart_id,
                user_id,
                product_ids,
            })
        })
    }

    fn remove_item(&self, user_id: Uuid, product_id: Uuid) -> Result<CartView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let cart_id = find_cart_id(conn, user_id)?;
            if !lookups::product_exists(conn, product_id)? {
                return Err(DomainError::NotFound(EntityKind::Product, product_id));
            }

            let removed = diesel::delete(
                cart_items::table
                    .filter(cart_items::cart_id.eq(cart_id))
                    .filter(cart_items::product_id.eq(product_id)),
            )
            .execute(conn)?;

            // Removing a product that is not a member is an error, not a no-op.
            if removed == 0 {
                return Err(DomainError::NotFound(EntityKind::CartItem, product_id));
            }

            let product_ids = load_product_ids(conn, cart_id)?;
            Ok(CartView {
                id: cart_id,
                user_id,
                product_ids,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use diesel::prelude::*;
    use uuid::Uuid;

    use super::DieselCartRepository;
    use crate::domain::errors::{DomainError, EntityKind};
    use crate::domain::ports::CartRepository;
    use crate::infrastructure::test_support::{seed_product, seed_user, setup_db};
    use crate::schema::cart_items;

    #[tokio::test]
    async fn create_cart_for_unknown_user_fails() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCartRepository::new(pool);

        let result = repo.create(Uuid::new_v4());

        assert!(matches!(
            result,
            Err(DomainError::NotFound(EntityKind::User, _))
        ));
    }

    #[tokio::test]
    async fn create_cart_twice_conflicts() {
        let (_container, pool) = setup_db().await;
        let user_id = seed_user(&pool);
        let repo = DieselCartRepository::new(pool);

        repo.create(user_id).expect("first create failed");
        let second = repo.create(user_id);

        assert!(matches!(
            second,
            Err(DomainError::Conflict(EntityKind::Cart, id)) if id == user_id
        ));
    }

    #[tokio::test]
    async fn get_cart_before_create_fails() {
        let (_container, pool) = setup_db().await;
        let user_id = seed_user(&pool);
        let repo = DieselCartRepository::new(pool);

        let result = repo.find_by_user(user_id);

        assert!(matches!(
            result,
            Err(DomainError::NotFound(EntityKind::Cart, _))
        ));
    }

    #[tokio::test]
    async fn add_item_is_idempotent() {
        let (_container, pool) = setup_db().await;
        let user_id = seed_user(&pool);
        let product_id = seed_product(&pool);
        let repo = DieselCartRepository::new(pool.clone());

        let cart = repo.create(user_id).expect("create failed");
        let once = repo.add_item(user_id, product_id).expect("first add failed");
        let twice = repo
            .add_item(user_id, product_id)
            .expect("second add failed");

        assert_eq!(once.product_ids, vec![product_id]);
        assert_eq!(twice.product_ids, vec![product_id]);

        // Exactly one association row, never a duplicate.
        let mut conn = pool.get().expect("Failed to get connection");
        let rows: i64 = cart_items::table
            .filter(cart_items::cart_id.eq(cart.id))
            .count()
            .get_result(&mut conn)
            .expect("count failed");
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn add_item_unknown_product_fails() {
        let (_container, pool) = setup_db().await;
        let user_id = seed_user(&pool);
        let repo = DieselCartRepository::new(pool);

        repo.create(user_id).expect("create failed");
        let result = repo.add_item(user_id, Uuid::new_v4());

        assert!(matches!(
            result,
            Err(DomainError::NotFound(EntityKind::Product, _))
        ));
    }

    #[tokio::test]
    async fn add_item_without_cart_fails() {
        let (_container, pool) = setup_db().await;
        let user_id = seed_user(&pool);
        let product_id = seed_product(&pool);
        let repo = DieselCartRepository::new(pool);

        let result = repo.add_item(user_id, product_id);

        assert!(matches!(
            result,
            Err(DomainError::NotFound(EntityKind::Cart, _))
        ));
    }

    #[tokio::test]
    async fn remove_item_never_added_fails() {
        let (_container, pool) = setup_db().await;
        let user_id = seed_user(&pool);
        let product_id = seed_product(&pool);
        let repo = DieselCartRepository::new(pool);

        repo.create(user_id).expect("create failed");
        let result = repo.remove_item(user_id, product_id);

        assert!(matches!(
            result,
            Err(DomainError::NotFound(EntityKind::CartItem, id)) if id == product_id
        ));
    }

    #[tokio::test]
    async fn cart_lifecycle_roundtrip() {
        let (_container, pool) = setup_db().await;
        let user_id = seed_user(&pool);
        let product_id = seed_product(&pool);
        let repo = DieselCartRepository::new(pool);

        assert!(repo.find_by_user(user_id).is_err());

        let cart = repo.create(user_id).expect("create failed");
        assert_eq!(cart.user_id, user_id);
        assert!(cart.product_ids.is_empty());

        let cart = repo.add_item(user_id, product_id).expect("add failed");
        assert_eq!(cart.product_ids, vec![product_id]);

        let cart = repo
            .add_item(user_id, product_id)
            .expect("repeated add failed");
        assert_eq!(cart.product_ids, vec![product_id]);

        let cart = repo
            .remove_item(user_id, product_id)
            .expect("remove failed");
        assert!(cart.product_ids.is_empty());
    }

    #[tokio::test]
    async fn concurrent_create_cart_yields_one_conflict() {
        let (_container, pool) = setup_db().await;
        let user_id = seed_user(&pool);
        let first = DieselCartRepository::new(pool.clone());
        let second = DieselCartRepository::new(pool);

        let handle_a = std::thread::spawn(move || first.create(user_id));
        let handle_b = std::thread::spawn(move || second.create(user_id));
        let results = [
            handle_a.join().expect("thread a panicked"),
            handle_b.join().expect("thread b panicked"),
        ];

        let created = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(created, 1, "exactly one concurrent create may succeed");
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(DomainError::Conflict(EntityKind::Cart, _)))));
    }
}
