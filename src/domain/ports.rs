use std::fmt;
use std::sync::Arc;

use log::Level;
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{Order, OrderLine, OrderLineContentLine, OrderStatus};
use super::product::{Product, ProductGroup, ProductGroupWithProducts};

// ── Catalog ───────────────────────────────────────────────────────────────────

/// Catalog storage. Updates and deletes of a missing row fail with
/// [`DomainError::NotFound`]; lists are ordered by sort order, then name.
pub trait ProductRepository: Send + Sync + 'static {
    fn create_product(&self, product: &Product) -> Result<(), DomainError>;
    fn update_product(&self, product: &Product) -> Result<(), DomainError>;
    fn delete_product(&self, id: Uuid) -> Result<(), DomainError>;
    fn find_product_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn list_products(&self) -> Result<Vec<Product>, DomainError>;
    fn list_products_by_group(&self, group_id: Uuid) -> Result<Vec<Product>, DomainError>;

    fn create_product_group(&self, group: &ProductGroup) -> Result<(), DomainError>;
    fn update_product_group(&self, group: &ProductGroup) -> Result<(), DomainError>;
    fn delete_product_group(&self, id: Uuid) -> Result<(), DomainError>;
    fn find_product_group_by_id(&self, id: Uuid) -> Result<Option<ProductGroup>, DomainError>;
    fn list_product_groups(&self) -> Result<Vec<ProductGroup>, DomainError>;
    fn list_product_groups_with_products(
        &self,
    ) -> Result<Vec<ProductGroupWithProducts>, DomainError>;
}

// ── Orders ────────────────────────────────────────────────────────────────────

/// Order storage. Child rows come back in insertion order. Deleting an order
/// removes its lines, deleting a line removes its content lines.
pub trait OrderRepository: Send + Sync + 'static {
    fn create_order(&self, order: &Order) -> Result<Order, DomainError>;
    fn update_order(&self, order: &Order) -> Result<(), DomainError>;
    fn delete_order(&self, id: Uuid) -> Result<(), DomainError>;
    fn find_order_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    /// Most recently created order for the session, whatever its status.
    fn find_order_by_session_id(&self, session_id: &str) -> Result<Option<Order>, DomainError>;
    fn find_orders_by_status(&self, status: &OrderStatus) -> Result<Vec<Order>, DomainError>;

    fn create_order_line(&self, line: &OrderLine) -> Result<OrderLine, DomainError>;
    fn update_order_line(&self, line: &OrderLine) -> Result<(), DomainError>;
    fn delete_order_line(&self, id: Uuid) -> Result<(), DomainError>;
    fn find_order_line_by_id(&self, id: Uuid) -> Result<Option<OrderLine>, DomainError>;
    fn find_order_lines_by_order_id(&self, order_id: Uuid) -> Result<Vec<OrderLine>, DomainError>;

    fn create_content_line(
        &self,
        line: &OrderLineContentLine,
    ) -> Result<OrderLineContentLine, DomainError>;
    fn update_content_line(&self, line: &OrderLineContentLine) -> Result<(), DomainError>;
    fn delete_content_line(&self, id: Uuid) -> Result<(), DomainError>;
    fn find_content_line_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<OrderLineContentLine>, DomainError>;
    fn find_content_lines_by_order_line_id(
        &self,
        order_line_id: Uuid,
    ) -> Result<Vec<OrderLineContentLine>, DomainError>;

    /// Content lines belonging to any of `order_line_ids`, in one call where
    /// the adapter can batch. Callers group the result themselves.
    fn find_content_lines_by_order_line_ids(
        &self,
        order_line_ids: &[Uuid],
    ) -> Result<Vec<OrderLineContentLine>, DomainError> {
        let mut all = Vec::new();
        for id in order_line_ids {
            all.extend(self.find_content_lines_by_order_line_id(*id)?);
        }
        Ok(all)
    }
}

impl<T: ProductRepository + ?Sized> ProductRepository for Arc<T> {
    fn create_product(&self, product: &Product) -> Result<(), DomainError> {
        (**self).create_product(product)
    }
    fn update_product(&self, product: &Product) -> Result<(), DomainError> {
        (**self).update_product(product)
    }
    fn delete_product(&self, id: Uuid) -> Result<(), DomainError> {
        (**self).delete_product(id)
    }
    fn find_product_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        (**self).find_product_by_id(id)
    }
    fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        (**self).list_products()
    }
    fn list_products_by_group(&self, group_id: Uuid) -> Result<Vec<Product>, DomainError> {
        (**self).list_products_by_group(group_id)
    }
    fn create_product_group(&self, group: &ProductGroup) -> Result<(), DomainError> {
        (**self).create_product_group(group)
    }
    fn update_product_group(&self, group: &ProductGroup) -> Result<(), DomainError> {
        (**self).update_product_group(group)
    }
    fn delete_product_group(&self, id: Uuid) -> Result<(), DomainError> {
        (**self).delete_product_group(id)
    }
    fn find_product_group_by_id(&self, id: Uuid) -> Result<Option<ProductGroup>, DomainError> {
        (**self).find_product_group_by_id(id)
    }
    fn list_product_groups(&self) -> Result<Vec<ProductGroup>, DomainError> {
        (**self).list_product_groups()
    }
    fn list_product_groups_with_products(
        &self,
    ) -> Result<Vec<ProductGroupWithProducts>, DomainError> {
        (**self).list_product_groups_with_products()
    }
}

impl<T: OrderRepository + ?Sized> OrderRepository for Arc<T> {
    fn create_order(&self, order: &Order) -> Result<Order, DomainError> {
        (**self).create_order(order)
    }
    fn update_order(&self, order: &Order) -> Result<(), DomainError> {
        (**self).update_order(order)
    }
    fn delete_order(&self, id: Uuid) -> Result<(), DomainError> {
        (**self).delete_order(id)
    }
    fn find_order_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        (**self).find_order_by_id(id)
    }
    fn find_order_by_session_id(&self, session_id: &str) -> Result<Option<Order>, DomainError> {
        (**self).find_order_by_session_id(session_id)
    }
    fn find_orders_by_status(&self, status: &OrderStatus) -> Result<Vec<Order>, DomainError> {
        (**self).find_orders_by_status(status)
    }
    fn create_order_line(&self, line: &OrderLine) -> Result<OrderLine, DomainError> {
        (**self).create_order_line(line)
    }
    fn update_order_line(&self, line: &OrderLine) -> Result<(), DomainError> {
        (**self).update_order_line(line)
    }
    fn delete_order_line(&self, id: Uuid) -> Result<(), DomainError> {
        (**self).delete_order_line(id)
    }
    fn find_order_line_by_id(&self, id: Uuid) -> Result<Option<OrderLine>, DomainError> {
        (**self).find_order_line_by_id(id)
    }
    fn find_order_lines_by_order_id(&self, order_id: Uuid) -> Result<Vec<OrderLine>, DomainError> {
        (**self).find_order_lines_by_order_id(order_id)
    }
    fn create_content_line(
        &self,
        line: &OrderLineContentLine,
    ) -> Result<OrderLineContentLine, DomainError> {
        (**self).create_content_line(line)
    }
    fn update_content_line(&self, line: &OrderLineContentLine) -> Result<(), DomainError> {
        (**self).update_content_line(line)
    }
    fn delete_content_line(&self, id: Uuid) -> Result<(), DomainError> {
        (**self).delete_content_line(id)
    }
    fn find_content_line_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<OrderLineContentLine>, DomainError> {
        (**self).find_content_line_by_id(id)
    }
    fn find_content_lines_by_order_line_id(
        &self,
        order_line_id: Uuid,
    ) -> Result<Vec<OrderLineContentLine>, DomainError> {
        (**self).find_content_lines_by_order_line_id(order_line_id)
    }
    fn find_content_lines_by_order_line_ids(
        &self,
        order_line_ids: &[Uuid],
    ) -> Result<Vec<OrderLineContentLine>, DomainError> {
        (**self).find_content_lines_by_order_line_ids(order_line_ids)
    }
}

// ── Logging ───────────────────────────────────────────────────────────────────

/// Structured log sink handed to each service at construction.
pub trait Logger: Send + Sync + 'static {
    fn log(&self, level: Level, message: &str, fields: &[(&str, &dyn fmt::Display)]);

    fn info(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        self.log(Level::Info, message, fields);
    }

    fn warn(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        self.log(Level::Warn, message, fields);
    }

    fn error(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        self.log(Level::Error, message, fields);
    }
}
