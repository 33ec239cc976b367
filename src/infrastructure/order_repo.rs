use std::collections::HashMap;

use bigdecimal::BigDecimal;
use diesel::dsl::{exists, select};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::{DomainError, EntityKind};
use crate::domain::order::{ListResult, OrderLineView, OrderView};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_lines, orders};

use super::lookups;
use super::models::{NewOrderLineRow, NewOrderRow, OrderLineRow, OrderRow};

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn order_exists(conn: &mut PgConnection, order_id: Uuid) -> Result<bool, DomainError> {
    let found = select(exists(orders::table.find(order_id))).get_result(conn)?;
    Ok(found)
}

fn line_view(row: OrderLineRow) -> OrderLineView {
    OrderLineView {
        id: row.id,
        order_id: row.order_id,
        product_id: row.product_id,
        quantity: row.quantity,
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, user_id: Uuid, total: BigDecimal) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            if !lookups::user_exists(conn, user_id)? {
                return Err(DomainError::NotFound(EntityKind::User, user_id));
            }

            let order: OrderRow = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: Uuid::new_v4(),
                    user_id,
                    total,
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            Ok(OrderView {
                id: order.id,
                user_id: order.user_id,
                total: order.total,
                created_at: order.created_at,
                line_ids: Vec::new(),
            })
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let order = orders::table
                .find(id)
                .select(OrderRow::as_select())
                .first(conn)
                .optional()?
                .ok_or(DomainError::NotFound(EntityKind::Order, id))?;

            let line_ids = order_lines::table
                .filter(order_lines::order_id.eq(order.id))
                .select(order_lines::id)
                .load(conn)?;

            Ok(OrderView {
                id: order.id,
                user_id: order.user_id,
                total: order.total,
                created_at: order.created_at,
                line_ids,
            })
        })
    }

    fn list(&self, skip: i64, limit: i64) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        // Count and page are read in one transaction so they agree with each
        // other; the id tiebreak keeps the page order stable across calls.
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = orders::table.count().get_result(conn)?;

            let rows: Vec<OrderRow> = orders::table
                .select(OrderRow::as_select())
                .order((orders::created_at.desc(), orders::id.asc()))
                .limit(limit)
                .offset(skip)
                .load(conn)?;

            let order_ids: Vec<Uuid> = rows.iter().map(|o| o.id).collect();
            let lines: Vec<(Uuid, Uuid)> = order_lines::table
                .filter(order_lines::order_id.eq_any(&order_ids))
                .select((order_lines::order_id, order_lines::id))
                .load(conn)?;

            let mut by_order: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
            for (order_id, line_id) in lines {
                by_order.entry(order_id).or_default().push(line_id);
            }

            Ok(ListResult {
                items: rows
                    .into_iter()
                    .map(|o| OrderView {
                        line_ids: by_order.remove(&o.id).unwrap_or_default(),
                        id: o.id,
                        user_id: o.user_id,
                        total: o.total,
                        created_at: o.created_at,
                    })
                    .collect(),
                total,
            })
        })
    }

    fn add_line(
        &self,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<OrderLineView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            if !order_exists(conn, order_id)? {
                return Err(DomainError::NotFound(EntityKind::Order, order_id));
            }
            if !lookups::product_exists(conn, product_id)? {
                return Err(DomainError::NotFound(EntityKind::Product, product_id));
            }

            let row: OrderLineRow = diesel::insert_into(order_lines::table)
                .values(&NewOrderLineRow {
                    id: Uuid::new_v4(),
                    order_id,
                    product_id,
                    quantity,
                })
                .returning(OrderLineRow::as_returning())
                .get_result(conn)?;

            Ok(line_view(row))
        })
    }

    fn find_line(&self, line_id: Uuid) -> Result<OrderLineView, DomainError> {
        let mut conn = self.pool.get()?;

        let row = order_lines::table
            .find(line_id)
            .select(OrderLineRow::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or(DomainError::NotFound(EntityKind::OrderLine, line_id))?;

        Ok(line_view(row))
    }

    fn list_lines(&self, order_id: Uuid) -> Result<Vec<OrderLineView>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            if !order_exists(conn, order_id)? {
                return Err(DomainError::NotFound(EntityKind::Order, order_id));
            }

            let rows: Vec<OrderLineRow> = order_lines::table
                .filter(order_lines::order_id.eq(order_id))
                .select(OrderLineRow::as_select())
                .load(conn)?;

            Ok(rows.into_iter().map(line_view).collect())
        })
    }
}
