use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderLine, OrderLineContentLine, OrderStatus};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_line_content_lines, order_lines, orders};

use super::ensure_affected;
use super::models::{
    ContentLineRow, NewContentLineRow, NewOrderLineRow, OrderChangeset, OrderLineRow, OrderRow,
};

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create_order(&self, order: &Order) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(orders::table)
            .values(&OrderRow::from(order))
            .returning(OrderRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn update_order(&self, order: &Order) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(orders::table.find(order.id))
            .set(&OrderChangeset::from(order))
            .execute(&mut conn)?;
        ensure_affected(updated, "Order", order.id)
    }

    fn delete_order(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        // Children first, so the cascade does not depend on the FK definition.
        conn.transaction::<_, DomainError, _>(|conn| {
            let line_ids = order_lines::table
                .filter(order_lines::order_id.eq(id))
                .select(order_lines::id);
            diesel::delete(
                order_line_content_lines::table
                    .filter(order_line_content_lines::order_line_id.eq_any(line_ids)),
            )
            .execute(conn)?;
            diesel::delete(order_lines::table.filter(order_lines::order_id.eq(id)))
                .execute(conn)?;

            let deleted = diesel::delete(orders::table.find(id)).execute(conn)?;
            ensure_affected(deleted, "Order", id)
        })
    }

    fn find_order_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Order::from))
    }

    fn find_order_by_session_id(&self, session_id: &str) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = orders::table
            .filter(orders::session_id.eq(session_id))
            .order(orders::created_date_time.desc())
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Order::from))
    }

    fn find_orders_by_status(&self, status: &OrderStatus) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = orders::table
            .filter(orders::status.eq(status.as_str()))
            .order(orders::created_date_time.asc())
            .select(OrderRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    fn create_order_line(&self, line: &OrderLine) -> Result<OrderLine, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(order_lines::table)
            .values(&NewOrderLineRow::from(line))
            .returning(OrderLineRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn update_order_line(&self, line: &OrderLine) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(order_lines::table.find(line.id))
            .set(&NewOrderLineRow::from(line))
            .execute(&mut conn)?;
        ensure_affected(updated, "Order line", line.id)
    }

    fn delete_order_line(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            diesel::delete(
                order_line_content_lines::table
                    .filter(order_line_content_lines::order_line_id.eq(id)),
            )
            .execute(conn)?;
            let deleted = diesel::delete(order_lines::table.find(id)).execute(conn)?;
            ensure_affected(deleted, "Order line", id)
        })
    }

    fn find_order_line_by_id(&self, id: Uuid) -> Result<Option<OrderLine>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = order_lines::table
            .find(id)
            .select(OrderLineRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(OrderLine::from))
    }

    fn find_order_lines_by_order_id(&self, order_id: Uuid) -> Result<Vec<OrderLine>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = order_lines::table
            .filter(order_lines::order_id.eq(order_id))
            .order(order_lines::created_at.asc())
            .select(OrderLineRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(OrderLine::from).collect())
    }

    fn create_content_line(
        &self,
        line: &OrderLineContentLine,
    ) -> Result<OrderLineContentLine, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(order_line_content_lines::table)
            .values(&NewContentLineRow::from(line))
            .returning(ContentLineRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn update_content_line(&self, line: &OrderLineContentLine) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(order_line_content_lines::table.find(line.id))
            .set(&NewContentLineRow::from(line))
            .execute(&mut conn)?;
        ensure_affected(updated, "Content line", line.id)
    }

    fn delete_content_line(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let deleted =
            diesel::delete(order_line_content_lines::table.find(id)).execute(&mut conn)?;
        ensure_affected(deleted, "Content line", id)
    }

    fn find_content_line_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<OrderLineContentLine>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = order_line_content_lines::table
            .find(id)
            .select(ContentLineRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(OrderLineContentLine::from))
    }

    fn find_content_lines_by_order_line_id(
        &self,
        order_line_id: Uuid,
    ) -> Result<Vec<OrderLineContentLine>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = order_line_content_lines::table
            .filter(order_line_content_lines::order_line_id.eq(order_line_id))
            .order(order_line_content_lines::created_at.asc())
            .select(ContentLineRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(OrderLineContentLine::from).collect())
    }

    fn find_content_lines_by_order_line_ids(
        &self,
        order_line_ids: &[Uuid],
    ) -> Result<Vec<OrderLineContentLine>, DomainError> {
        if order_line_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get()?;
        let rows = order_line_content_lines::table
            .filter(order_line_content_lines::order_line_id.eq_any(order_line_ids.to_vec()))
            .order(order_line_content_lines::created_at.asc())
            .select(ContentLineRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(OrderLineContentLine::from).collect())
    }
}
