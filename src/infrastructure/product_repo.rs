use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{Product, ProductGroup, ProductGroupWithProducts};
use crate::schema::{product_groups, products};

use super::ensure_affected;
use super::models::{ProductGroupRow, ProductRow};

pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ProductRepository for DieselProductRepository {
    fn create_product(&self, product: &Product) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::insert_into(products::table)
            .values(&ProductRow::from(product))
            .execute(&mut conn)?;
        Ok(())
    }

    fn update_product(&self, product: &Product) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(products::table.find(product.id))
            .set(&ProductRow::from(product))
            .execute(&mut conn)?;
        ensure_affected(updated, "Product", product.id)
    }

    fn delete_product(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(products::table.find(id)).execute(&mut conn)?;
        ensure_affected(deleted, "Product", id)
    }

    fn find_product_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .select(ProductRow::as_select())
            .order((products::sort_order.asc(), products::name.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn list_products_by_group(&self, group_id: Uuid) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .filter(products::product_group_id.eq(group_id))
            .select(ProductRow::as_select())
            .order((products::sort_order.asc(), products::name.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn create_product_group(&self, group: &ProductGroup) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::insert_into(product_groups::table)
            .values(&ProductGroupRow::from(group))
            .execute(&mut conn)?;
        Ok(())
    }

    fn update_product_group(&self, group: &ProductGroup) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(product_groups::table.find(group.id))
            .set(&ProductGroupRow::from(group))
            .execute(&mut conn)?;
        ensure_affected(updated, "Product group", group.id)
    }

    fn delete_product_group(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(product_groups::table.find(id)).execute(&mut conn)?;
        ensure_affected(deleted, "Product group", id)
    }

    fn find_product_group_by_id(&self, id: Uuid) -> Result<Option<ProductGroup>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = product_groups::table
            .find(id)
            .select(ProductGroupRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(ProductGroup::from))
    }

    fn list_product_groups(&self) -> Result<Vec<ProductGroup>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = product_groups::table
            .select(ProductGroupRow::as_select())
            .order((product_groups::sort_order.asc(), product_groups::name.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(ProductGroup::from).collect())
    }

    fn list_product_groups_with_products(
        &self,
    ) -> Result<Vec<ProductGroupWithProducts>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let groups = product_groups::table
                .select(ProductGroupRow::as_select())
                .order((product_groups::sort_order.asc(), product_groups::name.asc()))
                .load(conn)?;

            let members = ProductRow::belonging_to(&groups)
                .select(ProductRow::as_select())
                .order((products::sort_order.asc(), products::name.asc()))
                .load(conn)?;

            Ok(members
                .grouped_by(&groups)
                .into_iter()
                .zip(groups)
                .map(|(products, group)| ProductGroupWithProducts {
                    product_group: group.into(),
                    products: products.into_iter().map(Product::from).collect(),
                })
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::DieselProductRepository;
    use crate::domain::errors::DomainError;
    use crate::domain::ports::ProductRepository;
    use crate::domain::product::{
        CreateProductGroupInput, CreateProductInput, Product, ProductGroup, UpdateProductInput,
    };
    use crate::infrastructure::test_db::setup_db;

    fn make_group(name: &str, sort_order: i32) -> ProductGroup {
        ProductGroup::new(CreateProductGroupInput {
            name: name.to_string(),
            sort_order,
            is_sold: true,
        })
        .expect("valid group")
    }

    fn make_product(name: &str, group_id: Uuid) -> Product {
        Product::new(CreateProductInput {
            name: name.to_string(),
            price: 5000,
            product_group_id: group_id,
            sort_order: 1,
            is_configurable: false,
            configured_by_product_group_id: None,
            configured_quantity: 0,
            is_sold_separately: true,
        })
        .expect("valid product")
    }

    #[tokio::test]
    #[ignore = "requires a container runtime (docker or podman)"]
    async fn create_and_find_product_roundtrip() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);
        let group = make_group("Boards", 1);
        repo.create_product_group(&group).expect("create group");
        let product = make_product("Deck", group.id);
        repo.create_product(&product).expect("create product");

        let found = repo
            .find_product_by_id(product.id)
            .expect("find failed")
            .expect("product should exist");
        assert_eq!(found, product);

        let in_group = repo.list_products_by_group(group.id).expect("list failed");
        assert_eq!(in_group, vec![product]);
    }

    #[tokio::test]
    #[ignore = "requires a container runtime (docker or podman)"]
    async fn update_persists_all_columns_including_optional_group() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);
        let group = make_group("Boards", 1);
        let options = make_group("Wheels", 2);
        repo.create_product_group(&group).expect("create group");
        repo.create_product_group(&options).expect("create group");
        let mut product = make_product("Complete", group.id);
        repo.create_product(&product).expect("create product");

        product
            .apply(UpdateProductInput {
                is_configurable: Some(true),
                configured_by_product_group_id: Some(options.id),
                configured_quantity: Some(4),
                ..Default::default()
            })
            .expect("apply");
        repo.update_product(&product).expect("update");

        let found = repo
            .find_product_by_id(product.id)
            .expect("find failed")
            .expect("product should exist");
        assert_eq!(found.configured_by_product_group_id, Some(options.id));
        assert_eq!(found.configured_quantity, 4);
    }

    #[tokio::test]
    #[ignore = "requires a container runtime (docker or podman)"]
    async fn deleting_missing_rows_is_not_found() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);

        assert!(matches!(
            repo.delete_product(Uuid::new_v4()),
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            repo.delete_product_group(Uuid::new_v4()),
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    #[ignore = "requires a container runtime (docker or podman)"]
    async fn referenced_group_delete_is_a_storage_error() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);
        let group = make_group("Boards", 1);
        repo.create_product_group(&group).expect("create group");
        repo.create_product(&make_product("Deck", group.id))
            .expect("create product");

        assert!(matches!(
            repo.delete_product_group(group.id),
            Err(DomainError::Storage(_))
        ));
    }

    #[tokio::test]
    #[ignore = "requires a container runtime (docker or podman)"]
    async fn groups_with_products_keeps_empty_groups() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);
        let boards = make_group("Boards", 1);
        let empty = make_group("Accessories", 2);
        repo.create_product_group(&boards).expect("create group");
        repo.create_product_group(&empty).expect("create group");
        repo.create_product(&make_product("Deck", boards.id))
            .expect("create product");

        let catalog = repo
            .list_product_groups_with_products()
            .expect("catalog failed");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].product_group.id, boards.id);
        assert_eq!(catalog[0].products.len(), 1);
        assert_eq!(catalog[1].product_group.id, empty.id);
        assert!(catalog[1].products.is_empty());
    }
}
