//! Mutex-guarded in-process repositories.
//!
//! They honour the same contracts as the Diesel adapters, including the
//! foreign keys and cascades the migrations declare, so services and HTTP
//! handlers can be exercised without a database.

use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderLine, OrderLineContentLine, OrderStatus};
use crate::domain::ports::{OrderRepository, ProductRepository};
use crate::domain::product::{Product, ProductGroup, ProductGroupWithProducts};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, DomainError> {
    mutex
        .lock()
        .map_err(|_| DomainError::Storage("in-memory store lock poisoned".to_string()))
}

fn duplicate_key(table: &str, id: Uuid) -> DomainError {
    DomainError::Storage(format!("duplicate key {} in {}", id, table))
}

fn missing_parent(table: &str, id: Uuid) -> DomainError {
    DomainError::Storage(format!(
        "foreign key violation: {} {} does not exist",
        table, id
    ))
}

fn check_group_refs(groups: &[ProductGroup], product: &Product) -> Result<(), DomainError> {
    let referenced = [Some(product.product_group_id), product.configured_by_product_group_id];
    for group_id in referenced.into_iter().flatten() {
        if !groups.iter().any(|g| g.id == group_id) {
            return Err(missing_parent("product_groups", group_id));
        }
    }
    Ok(())
}

fn replace<T, F>(rows: &mut [T], row: T, entity: &str, id: Uuid, same: F) -> Result<(), DomainError>
where
    F: Fn(&T) -> bool,
{
    match rows.iter_mut().find(|r| same(r)) {
        Some(slot) => {
            *slot = row;
            Ok(())
        }
        None => Err(DomainError::not_found(entity, id)),
    }
}

fn catalog_order<T, K>(rows: &mut [T], key: K)
where
    K: Fn(&T) -> (i32, &str),
{
    rows.sort_by(|a, b| key(a).cmp(&key(b)));
}

// ── Catalog ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    groups: Mutex<Vec<ProductGroup>>,
    products: Mutex<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn create_product(&self, product: &Product) -> Result<(), DomainError> {
        let groups = lock(&self.groups)?;
        check_group_refs(&groups, product)?;

        let mut products = lock(&self.products)?;
        if products.iter().any(|p| p.id == product.id) {
            return Err(duplicate_key("products", product.id));
        }
        products.push(product.clone());
        Ok(())
    }

    fn update_product(&self, product: &Product) -> Result<(), DomainError> {
        let groups = lock(&self.groups)?;
        let mut products = lock(&self.products)?;
        // A missing row matches nothing, so no key is checked.
        if products.iter().any(|p| p.id == product.id) {
            check_group_refs(&groups, product)?;
        }
        replace(products.as_mut_slice(), product.clone(), "Product", product.id, |p| {
            p.id == product.id
        })
    }

    fn delete_product(&self, id: Uuid) -> Result<(), DomainError> {
        let mut products = lock(&self.products)?;
        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before {
            return Err(DomainError::not_found("Product", id));
        }
        Ok(())
    }

    fn find_product_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(lock(&self.products)?.iter().find(|p| p.id == id).cloned())
    }

    fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        let mut products = lock(&self.products)?.clone();
        catalog_order(&mut products, |p| (p.sort_order, p.name.as_str()));
        Ok(products)
    }

    fn list_products_by_group(&self, group_id: Uuid) -> Result<Vec<Product>, DomainError> {
        let mut products: Vec<Product> = lock(&self.products)?
            .iter()
            .filter(|p| p.product_group_id == group_id)
            .cloned()
            .collect();
        catalog_order(&mut products, |p| (p.sort_order, p.name.as_str()));
        Ok(products)
    }

    fn create_product_group(&self, group: &ProductGroup) -> Result<(), DomainError> {
        let mut groups = lock(&self.groups)?;
        if groups.iter().any(|g| g.id == group.id) {
            return Err(duplicate_key("product_groups", group.id));
        }
        groups.push(group.clone());
        Ok(())
    }

    fn update_product_group(&self, group: &ProductGroup) -> Result<(), DomainError> {
        let mut groups = lock(&self.groups)?;
        replace(groups.as_mut_slice(), group.clone(), "Product group", group.id, |g| {
            g.id == group.id
        })
    }

    fn delete_product_group(&self, id: Uuid) -> Result<(), DomainError> {
        let mut groups = lock(&self.groups)?;
        if !groups.iter().any(|g| g.id == id) {
            return Err(DomainError::not_found("Product group", id));
        }
        let referenced = lock(&self.products)?.iter().any(|p| {
            p.product_group_id == id || p.configured_by_product_group_id == Some(id)
        });
        if referenced {
            return Err(DomainError::Storage(format!(
                "foreign key violation: product group {} is still referenced by products",
                id
            )));
        }
        groups.retain(|g| g.id != id);
        Ok(())
    }

    fn find_product_group_by_id(&self, id: Uuid) -> Result<Option<ProductGroup>, DomainError> {
        Ok(lock(&self.groups)?.iter().find(|g| g.id == id).cloned())
    }

    fn list_product_groups(&self) -> Result<Vec<ProductGroup>, DomainError> {
        let mut groups = lock(&self.groups)?.clone();
        catalog_order(&mut groups, |g| (g.sort_order, g.name.as_str()));
        Ok(groups)
    }

    fn list_product_groups_with_products(
        &self,
    ) -> Result<Vec<ProductGroupWithProducts>, DomainError> {
        let groups = self.list_product_groups()?;
        let products = self.list_products()?;
        Ok(groups
            .into_iter()
            .map(|product_group| {
                let products = products
                    .iter()
                    .filter(|p| p.product_group_id == product_group.id)
                    .cloned()
                    .collect();
                ProductGroupWithProducts {
                    product_group,
                    products,
                }
            })
            .collect())
    }
}

// ── Orders ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct OrderTables {
    orders: Vec<Order>,
    lines: Vec<OrderLine>,
    content_lines: Vec<OrderLineContentLine>,
}

impl OrderTables {
    fn remove_line_cascade(&mut self, line_id: Uuid) {
        self.content_lines.retain(|c| c.order_line_id != line_id);
        self.lines.retain(|l| l.id != line_id);
    }
}

/// All three order tables sit behind one lock so cascades are atomic.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    tables: Mutex<OrderTables>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn create_order(&self, order: &Order) -> Result<Order, DomainError> {
        let mut tables = lock(&self.tables)?;
        if tables.orders.iter().any(|o| o.id == order.id) {
            return Err(duplicate_key("orders", order.id));
        }
        tables.orders.push(order.clone());
        Ok(order.clone())
    }

    fn update_order(&self, order: &Order) -> Result<(), DomainError> {
        let mut tables = lock(&self.tables)?;
        replace(tables.orders.as_mut_slice(), order.clone(), "Order", order.id, |o| {
            o.id == order.id
        })
    }

    fn delete_order(&self, id: Uuid) -> Result<(), DomainError> {
        let mut tables = lock(&self.tables)?;
        if !tables.orders.iter().any(|o| o.id == id) {
            return Err(DomainError::not_found("Order", id));
        }
        let line_ids: Vec<Uuid> = tables
            .lines
            .iter()
            .filter(|l| l.order_id == id)
            .map(|l| l.id)
            .collect();
        for line_id in line_ids {
            tables.remove_line_cascade(line_id);
        }
        tables.orders.retain(|o| o.id != id);
        Ok(())
    }

    fn find_order_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(lock(&self.tables)?.orders.iter().find(|o| o.id == id).cloned())
    }

    fn find_order_by_session_id(&self, session_id: &str) -> Result<Option<Order>, DomainError> {
        Ok(lock(&self.tables)?
            .orders
            .iter()
            .filter(|o| o.session_id == session_id)
            .max_by_key(|o| o.created_date_time)
            .cloned())
    }

    fn find_orders_by_status(&self, status: &OrderStatus) -> Result<Vec<Order>, DomainError> {
        Ok(lock(&self.tables)?
            .orders
            .iter()
            .filter(|o| &o.status == status)
            .cloned()
            .collect())
    }

    fn create_order_line(&self, line: &OrderLine) -> Result<OrderLine, DomainError> {
        let mut tables = lock(&self.tables)?;
        if !tables.orders.iter().any(|o| o.id == line.order_id) {
            return Err(missing_parent("orders", line.order_id));
        }
        if tables.lines.iter().any(|l| l.id == line.id) {
            return Err(duplicate_key("order_lines", line.id));
        }
        tables.lines.push(line.clone());
        Ok(line.clone())
    }

    fn update_order_line(&self, line: &OrderLine) -> Result<(), DomainError> {
        let mut tables = lock(&self.tables)?;
        replace(tables.lines.as_mut_slice(), line.clone(), "Order line", line.id, |l| {
            l.id == line.id
        })
    }

    fn delete_order_line(&self, id: Uuid) -> Result<(), DomainError> {
        let mut tables = lock(&self.tables)?;
        if !tables.lines.iter().any(|l| l.id == id) {
            return Err(DomainError::not_found("Order line", id));
        }
        tables.remove_line_cascade(id);
        Ok(())
    }

    fn find_order_line_by_id(&self, id: Uuid) -> Result<Option<OrderLine>, DomainError> {
        Ok(lock(&self.tables)?.lines.iter().find(|l| l.id == id).cloned())
    }

    fn find_order_lines_by_order_id(&self, order_id: Uuid) -> Result<Vec<OrderLine>, DomainError> {
        Ok(lock(&self.tables)?
            .lines
            .iter()
            .filter(|l| l.order_id == order_id)
            .cloned()
            .collect())
    }

    fn create_content_line(
        &self,
        line: &OrderLineContentLine,
    ) -> Result<OrderLineContentLine, DomainError> {
        let mut tables = lock(&self.tables)?;
        if !tables.lines.iter().any(|l| l.id == line.order_line_id) {
            return Err(missing_parent("order_lines", line.order_line_id));
        }
        if tables.content_lines.iter().any(|c| c.id == line.id) {
            return Err(duplicate_key("order_line_content_lines", line.id));
        }
        tables.content_lines.push(line.clone());
        Ok(line.clone())
    }

    fn update_content_line(&self, line: &OrderLineContentLine) -> Result<(), DomainError> {
        let mut tables = lock(&self.tables)?;
        replace(
            tables.content_lines.as_mut_slice(),
            line.clone(),
            "Content line",
            line.id,
            |c| c.id == line.id,
        )
    }

    fn delete_content_line(&self, id: Uuid) -> Result<(), DomainError> {
        let mut tables = lock(&self.tables)?;
        let before = tables.content_lines.len();
        tables.content_lines.retain(|c| c.id != id);
        if tables.content_lines.len() == before {
            return Err(DomainError::not_found("Content line", id));
        }
        Ok(())
    }

    fn find_content_line_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<OrderLineContentLine>, DomainError> {
        Ok(lock(&self.tables)?
            .content_lines
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    fn find_content_lines_by_order_line_id(
        &self,
        order_line_id: Uuid,
    ) -> Result<Vec<OrderLineContentLine>, DomainError> {
        Ok(lock(&self.tables)?
            .content_lines
            .iter()
            .filter(|c| c.order_line_id == order_line_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{CreateContentLineInput, CreateOrderInput, CreateOrderLineInput};
    use crate::domain::product::{CreateProductGroupInput, CreateProductInput};

    fn group(name: &str, sort_order: i32) -> ProductGroup {
        ProductGroup::new(CreateProductGroupInput {
            name: name.to_string(),
            sort_order,
            is_sold: true,
        })
        .expect("valid group")
    }

    fn product(name: &str, group_id: Uuid, sort_order: i32) -> Product {
        Product::new(CreateProductInput {
            name: name.to_string(),
            price: 100,
            product_group_id: group_id,
            sort_order,
            is_configurable: false,
            configured_by_product_group_id: None,
            configured_quantity: 0,
            is_sold_separately: true,
        })
        .expect("valid product")
    }

    #[test]
    fn products_are_listed_by_sort_order_then_name() {
        let repo = InMemoryProductRepository::new();
        let g = group("Boards", 1);
        repo.create_product_group(&g).expect("group");
        repo.create_product(&product("Wheels", g.id, 2)).expect("p1");
        repo.create_product(&product("Trucks", g.id, 2)).expect("p2");
        repo.create_product(&product("Deck", g.id, 1)).expect("p3");

        let names: Vec<String> = repo
            .list_products()
            .expect("list")
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Deck", "Trucks", "Wheels"]);
    }

    #[test]
    fn product_with_unknown_group_is_rejected() {
        let repo = InMemoryProductRepository::new();
        let result = repo.create_product(&product("Deck", Uuid::new_v4(), 1));
        assert!(matches!(result, Err(DomainError::Storage(_))));
    }

    #[test]
    fn update_to_unknown_configuring_group_is_rejected() {
        let repo = InMemoryProductRepository::new();
        let g = group("Boards", 1);
        repo.create_product_group(&g).expect("group");
        let mut deck = product("Deck", g.id, 1);
        repo.create_product(&deck).expect("product");

        deck.configured_by_product_group_id = Some(Uuid::new_v4());
        let result = repo.update_product(&deck);
        assert!(matches!(result, Err(DomainError::Storage(_))));

        let stored = repo.find_product_by_id(deck.id).expect("find").expect("row");
        assert_eq!(stored.configured_by_product_group_id, None);
    }

    #[test]
    fn updating_a_missing_product_is_not_found() {
        let repo = InMemoryProductRepository::new();
        let result = repo.update_product(&product("Ghost", Uuid::new_v4(), 1));
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[test]
    fn referenced_group_cannot_be_deleted() {
        let repo = InMemoryProductRepository::new();
        let g = group("Boards", 1);
        repo.create_product_group(&g).expect("group");
        repo.create_product(&product("Deck", g.id, 1)).expect("product");

        let result = repo.delete_product_group(g.id);
        assert!(matches!(result, Err(DomainError::Storage(_))));
        assert!(repo.find_product_group_by_id(g.id).expect("find").is_some());
    }

    #[test]
    fn groups_with_products_pairs_members() {
        let repo = InMemoryProductRepository::new();
        let boards = group("Boards", 1);
        let wheels = group("Wheels", 2);
        repo.create_product_group(&wheels).expect("g2");
        repo.create_product_group(&boards).expect("g1");
        repo.create_product(&product("Deck", boards.id, 1)).expect("p");

        let catalog = repo.list_product_groups_with_products().expect("catalog");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].product_group.id, boards.id);
        assert_eq!(catalog[0].products.len(), 1);
        assert!(catalog[1].products.is_empty());
    }

    #[test]
    fn deleting_an_order_cascades_to_lines_and_contents() {
        let repo = InMemoryOrderRepository::new();
        let order = Order::new(CreateOrderInput {
            session_id: "s-1".to_string(),
        })
        .expect("order");
        repo.create_order(&order).expect("create order");
        let line = OrderLine::new(
            order.id,
            CreateOrderLineInput {
                product_id: Uuid::new_v4(),
                price: 100,
                quantity: 1,
            },
        )
        .expect("line");
        repo.create_order_line(&line).expect("create line");
        let content = OrderLineContentLine::new(
            line.id,
            CreateContentLineInput {
                product_id: Uuid::new_v4(),
                quantity: 1,
            },
        )
        .expect("content");
        repo.create_content_line(&content).expect("create content");

        repo.delete_order(order.id).expect("delete");

        assert!(repo.find_order_line_by_id(line.id).expect("find").is_none());
        assert!(repo
            .find_content_line_by_id(content.id)
            .expect("find")
            .is_none());
        assert!(matches!(
            repo.delete_order(order.id),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn session_lookup_returns_latest_order() {
        let repo = InMemoryOrderRepository::new();
        let mut older = Order::new(CreateOrderInput {
            session_id: "s-1".to_string(),
        })
        .expect("order");
        older.created_date_time -= chrono::Duration::minutes(5);
        let newer = Order::new(CreateOrderInput {
            session_id: "s-1".to_string(),
        })
        .expect("order");
        repo.create_order(&newer).expect("create newer");
        repo.create_order(&older).expect("create older");

        let found = repo
            .find_order_by_session_id("s-1")
            .expect("lookup")
            .expect("order for session");
        assert_eq!(found.id, newer.id);
        assert!(repo
            .find_order_by_session_id("other")
            .expect("lookup")
            .is_none());
    }
}
