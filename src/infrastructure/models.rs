use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::order::{Order, OrderLine, OrderLineContentLine};
use crate::domain::product::{Product, ProductGroup};
use crate::schema::{order_line_content_lines, order_lines, orders, product_groups, products};

// ── Catalog rows ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable, AsChangeset)]
#[diesel(table_name = product_groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductGroupRow {
    pub id: Uuid,
    pub name: String,
    pub sort_order: i32,
    pub is_sold: bool,
}

#[derive(
    Debug, Clone, Queryable, Selectable, Identifiable, Associations, Insertable, AsChangeset,
)]
#[diesel(table_name = products)]
#[diesel(belongs_to(ProductGroupRow, foreign_key = product_group_id))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub product_group_id: Uuid,
    pub sort_order: i32,
    pub is_configurable: bool,
    pub configured_by_product_group_id: Option<Uuid>,
    pub configured_quantity: i32,
    pub is_sold_separately: bool,
}

impl From<&ProductGroup> for ProductGroupRow {
    fn from(g: &ProductGroup) -> Self {
        Self {
            id: g.id,
            name: g.name.clone(),
            sort_order: g.sort_order,
            is_sold: g.is_sold,
        }
    }
}

impl From<ProductGroupRow> for ProductGroup {
    fn from(r: ProductGroupRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            sort_order: r.sort_order,
            is_sold: r.is_sold,
        }
    }
}

impl From<&Product> for ProductRow {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            price: p.price,
            product_group_id: p.product_group_id,
            sort_order: p.sort_order,
            is_configurable: p.is_configurable,
            configured_by_product_group_id: p.configured_by_product_group_id,
            configured_quantity: p.configured_quantity,
            is_sold_separately: p.is_sold_separately,
        }
    }
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            price: r.price,
            product_group_id: r.product_group_id,
            sort_order: r.sort_order,
            is_configurable: r.is_configurable,
            configured_by_product_group_id: r.configured_by_product_group_id,
            configured_quantity: r.configured_quantity,
            is_sold_separately: r.is_sold_separately,
        }
    }
}

// ── Order rows ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub session_id: String,
    pub email: String,
    pub name: String,
    pub address: String,
    pub zip_code: String,
    pub city: String,
    pub company_name: String,
    pub status: String,
    pub created_date_time: DateTime<Utc>,
}

/// Mutable order columns; `created_date_time` is never written after insert.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = orders)]
pub struct OrderChangeset {
    pub session_id: String,
    pub email: String,
    pub name: String,
    pub address: String,
    pub zip_code: String,
    pub city: String,
    pub company_name: String,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = order_lines)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderLineRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub price: i64,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = order_lines)]
pub struct NewOrderLineRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub price: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = order_line_content_lines)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ContentLineRow {
    pub id: Uuid,
    pub order_line_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = order_line_content_lines)]
pub struct NewContentLineRow {
    pub id: Uuid,
    pub order_line_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

impl From<&Order> for OrderRow {
    fn from(o: &Order) -> Self {
        Self {
            id: o.id,
            session_id: o.session_id.clone(),
            email: o.email.clone(),
            name: o.name.clone(),
            address: o.address.clone(),
            zip_code: o.zip_code.clone(),
            city: o.city.clone(),
            company_name: o.company_name.clone(),
            status: o.status.as_str().to_string(),
            created_date_time: o.created_date_time,
        }
    }
}

impl From<&Order> for OrderChangeset {
    fn from(o: &Order) -> Self {
        Self {
            session_id: o.session_id.clone(),
            email: o.email.clone(),
            name: o.name.clone(),
            address: o.address.clone(),
            zip_code: o.zip_code.clone(),
            city: o.city.clone(),
            company_name: o.company_name.clone(),
            status: o.status.as_str().to_string(),
        }
    }
}

impl From<OrderRow> for Order {
    fn from(r: OrderRow) -> Self {
        Self {
            id: r.id,
            session_id: r.session_id,
            email: r.email,
            name: r.name,
            address: r.address,
            zip_code: r.zip_code,
            city: r.city,
            company_name: r.company_name,
            status: r.status.into(),
            created_date_time: r.created_date_time,
        }
    }
}

impl From<&OrderLine> for NewOrderLineRow {
    fn from(l: &OrderLine) -> Self {
        Self {
            id: l.id,
            order_id: l.order_id,
            product_id: l.product_id,
            price: l.price,
            quantity: l.quantity,
        }
    }
}

impl From<OrderLineRow> for OrderLine {
    fn from(r: OrderLineRow) -> Self {
        Self {
            id: r.id,
            order_id: r.order_id,
            product_id: r.product_id,
            price: r.price,
            quantity: r.quantity,
        }
    }
}

impl From<&OrderLineContentLine> for NewContentLineRow {
    fn from(c: &OrderLineContentLine) -> Self {
        Self {
            id: c.id,
            order_line_id: c.order_line_id,
            product_id: c.product_id,
            quantity: c.quantity,
        }
    }
}

impl From<ContentLineRow> for OrderLineContentLine {
    fn from(r: ContentLineRow) -> Self {
        Self {
            id: r.id,
            order_line_id: r.order_line_id,
            product_id: r.product_id,
            quantity: r.quantity,
        }
    }
}
