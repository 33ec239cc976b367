use diesel::dsl::{exists, select};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::{products, users};

/// Existence checks for references owned by other aggregates. They take the
/// caller's connection so that check and write share one transaction.
pub fn user_exists(conn: &mut PgConnection, user_id: Uuid) -> QueryResult<bool> {
    select(exists(users::table.find(user_id))).get_result(conn)
}

pub fn product_exists(conn: &mut PgConnection, product_id: Uuid) -> QueryResult<bool> {
    select(exists(products::table.find(product_id))).get_result(conn)
}
