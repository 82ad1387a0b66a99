use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::{Logger, ProductRepository};
use crate::domain::product::{
    CreateProductGroupInput, CreateProductInput, Product, ProductGroup, ProductGroupWithProducts,
    UpdateProductGroupInput, UpdateProductInput,
};

use super::{log_failure, parse_logged};

pub struct ProductService<R> {
    repo: R,
    logger: Arc<dyn Logger>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repo: R, logger: Arc<dyn Logger>) -> Self {
        Self { repo, logger }
    }

    fn fail(&self, operation: &str, id: &dyn fmt::Display, err: DomainError) -> DomainError {
        log_failure(self.logger.as_ref(), operation, id, err)
    }

    fn parse(&self, operation: &str, raw: &str) -> Result<Uuid, DomainError> {
        parse_logged(self.logger.as_ref(), operation, raw)
    }

    fn load_product(&self, operation: &str, id: Uuid) -> Result<Product, DomainError> {
        self.repo
            .find_product_by_id(id)
            .map_err(|e| self.fail(operation, &id, e))?
            .ok_or_else(|| self.fail(operation, &id, DomainError::not_found("Product", id)))
    }

    fn load_group(&self, operation: &str, id: Uuid) -> Result<ProductGroup, DomainError> {
        self.repo
            .find_product_group_by_id(id)
            .map_err(|e| self.fail(operation, &id, e))?
            .ok_or_else(|| self.fail(operation, &id, DomainError::not_found("Product group", id)))
    }

    // ── Product groups ────────────────────────────────────────────────────────

    pub fn create_product_group(
        &self,
        input: CreateProductGroupInput,
    ) -> Result<ProductGroup, DomainError> {
        let group = ProductGroup::new(input)?;
        self.repo
            .create_product_group(&group)
            .map_err(|e| self.fail("create_product_group", &group.id, e))?;
        Ok(group)
    }

    pub fn get_product_group(&self, id: &str) -> Result<ProductGroup, DomainError> {
        let id = self.parse("get_product_group", id)?;
        self.load_group("get_product_group", id)
    }

    pub fn list_product_groups(&self) -> Result<Vec<ProductGroup>, DomainError> {
        self.repo
            .list_product_groups()
            .map_err(|e| self.fail("list_product_groups", &"-", e))
    }

    /// Every group with its products, for rendering the storefront catalog.
    pub fn list_product_groups_with_products(
        &self,
    ) -> Result<Vec<ProductGroupWithProducts>, DomainError> {
        self.repo
            .list_product_groups_with_products()
            .map_err(|e| self.fail("list_product_groups_with_products", &"-", e))
    }

    /// Apply the supplied fields to an existing group. An empty update
    /// returns the stored group untouched.
    pub fn update_product_group(
        &self,
        id: &str,
        input: UpdateProductGroupInput,
    ) -> Result<ProductGroup, DomainError> {
        let id = self.parse("update_product_group", id)?;
        let mut group = self.load_group("update_product_group", id)?;
        if input.is_empty() {
            return Ok(group);
        }
        group.apply(input)?;
        self.repo
            .update_product_group(&group)
            .map_err(|e| self.fail("update_product_group", &id, e))?;
        Ok(group)
    }

    /// Fails with a storage error while products still reference the group.
    pub fn delete_product_group(&self, id: &str) -> Result<(), DomainError> {
        let id = self.parse("delete_product_group", id)?;
        self.repo
            .delete_product_group(id)
            .map_err(|e| self.fail("delete_product_group", &id, e))
    }

    // ── Products ──────────────────────────────────────────────────────────────

    pub fn create_product(&self, input: CreateProductInput) -> Result<Product, DomainError> {
        let product = Product::new(input)?;
        self.repo
            .create_product(&product)
            .map_err(|e| self.fail("create_product", &product.id, e))?;
        Ok(product)
    }

    pub fn get_product(&self, id: &str) -> Result<Product, DomainError> {
        let id = self.parse("get_product", id)?;
        self.load_product("get_product", id)
    }

    pub fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        self.repo
            .list_products()
            .map_err(|e| self.fail("list_products", &"-", e))
    }

    pub fn list_products_by_group(&self, group_id: &str) -> Result<Vec<Product>, DomainError> {
        let group_id = self.parse("list_products_by_group", group_id)?;
        self.load_group("list_products_by_group", group_id)?;
        self.repo
            .list_products_by_group(group_id)
            .map_err(|e| self.fail("list_products_by_group", &group_id, e))
    }

    pub fn update_product(
        &self,
        id: &str,
        input: UpdateProductInput,
    ) -> Result<Product, DomainError> {
        let id = self.parse("update_product", id)?;
        let mut product = self.load_product("update_product", id)?;
        if input.is_empty() {
            return Ok(product);
        }
        product.apply(input)?;
        self.repo
            .update_product(&product)
            .map_err(|e| self.fail("update_product", &id, e))?;
        Ok(product)
    }

    pub fn delete_product(&self, id: &str) -> Result<(), DomainError> {
        let id = self.parse("delete_product", id)?;
        self.repo
            .delete_product(id)
            .map_err(|e| self.fail("delete_product", &id, e))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::ProductService;
    use crate::domain::errors::DomainError;
    use crate::domain::product::{
        CreateProductGroupInput, CreateProductInput, ProductGroup, UpdateProductGroupInput,
        UpdateProductInput,
    };
    use crate::infrastructure::logger::RecordingLogger;
    use crate::infrastructure::memory::InMemoryProductRepository;

    fn service() -> (ProductService<InMemoryProductRepository>, Arc<RecordingLogger>) {
        let logger = Arc::new(RecordingLogger::default());
        let service = ProductService::new(InMemoryProductRepository::new(), logger.clone());
        (service, logger)
    }

    fn boards(service: &ProductService<InMemoryProductRepository>) -> ProductGroup {
        service
            .create_product_group(CreateProductGroupInput {
                name: "Boards".to_string(),
                sort_order: 1,
                is_sold: true,
            })
            .expect("create group")
    }

    fn deck_input(group_id: Uuid) -> CreateProductInput {
        CreateProductInput {
            name: "Deck".to_string(),
            price: 5000,
            product_group_id: group_id,
            sort_order: 1,
            is_configurable: false,
            configured_by_product_group_id: None,
            configured_quantity: 0,
            is_sold_separately: true,
        }
    }

    #[test]
    fn created_product_is_listed_under_its_group() {
        let (service, _) = service();
        let group = boards(&service);
        let product = service.create_product(deck_input(group.id)).expect("create");

        let fetched = service.get_product(&product.id.to_string()).expect("get");
        assert_eq!(fetched, product);
        assert_eq!(fetched.price, 5000);

        let listed = service
            .list_products_by_group(&group.id.to_string())
            .expect("list");
        assert_eq!(listed, vec![product.clone()]);

        let catalog = service.list_product_groups_with_products().expect("catalog");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].product_group, group);
        assert_eq!(catalog[0].products, vec![product]);
    }

    #[test]
    fn invalid_product_is_rejected_before_storage() {
        let (service, logger) = service();
        let group = boards(&service);

        let err = service
            .create_product(CreateProductInput {
                name: "  ".to_string(),
                ..deck_input(group.id)
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = service
            .create_product(CreateProductInput {
                price: -1,
                ..deck_input(group.id)
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        assert!(service.list_products().expect("list").is_empty());
        assert!(logger.errors().is_empty());
    }

    #[test]
    fn product_in_unknown_group_is_a_storage_error() {
        let (service, logger) = service();
        let err = service.create_product(deck_input(Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));
        assert!(logger.errors()[0].contains("operation=create_product"));
    }

    #[test]
    fn malformed_identifiers_are_rejected() {
        let (service, _) = service();
        assert!(matches!(
            service.get_product("not-a-uuid"),
            Err(DomainError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            service.delete_product_group(""),
            Err(DomainError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            service.list_products_by_group("42"),
            Err(DomainError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn missing_rows_are_not_found_and_logged() {
        let (service, logger) = service();
        let missing = Uuid::new_v4().to_string();

        assert!(matches!(
            service.get_product(&missing),
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            service.get_product_group(&missing),
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            service.list_products_by_group(&missing),
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_product(&missing),
            Err(DomainError::NotFound(_))
        ));
        assert_eq!(logger.errors().len(), 4);
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let (service, _) = service();
        let group = boards(&service);
        let product = service.create_product(deck_input(group.id)).expect("create");

        let updated = service
            .update_product(
                &product.id.to_string(),
                UpdateProductInput {
                    price: Some(4500),
                    ..Default::default()
                },
            )
            .expect("update");
        assert_eq!(updated.price, 4500);
        assert_eq!(updated.name, "Deck");

        let stored = service.get_product(&product.id.to_string()).expect("get");
        assert_eq!(stored, updated);
    }

    #[test]
    fn invalid_update_leaves_product_unchanged() {
        let (service, _) = service();
        let group = boards(&service);
        let product = service.create_product(deck_input(group.id)).expect("create");

        let err = service
            .update_product(
                &product.id.to_string(),
                UpdateProductInput {
                    name: Some(String::new()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(
            service.get_product(&product.id.to_string()).expect("get"),
            product
        );
    }

    #[test]
    fn empty_update_returns_stored_group() {
        let (service, _) = service();
        let group = boards(&service);
        let same = service
            .update_product_group(&group.id.to_string(), UpdateProductGroupInput::default())
            .expect("update");
        assert_eq!(same, group);

        let renamed = service
            .update_product_group(
                &group.id.to_string(),
                UpdateProductGroupInput {
                    name: Some("Decks".to_string()),
                    ..Default::default()
                },
            )
            .expect("update");
        assert_eq!(renamed.name, "Decks");
        assert_eq!(renamed.sort_order, 1);
    }

    #[test]
    fn group_with_products_cannot_be_deleted() {
        let (service, _) = service();
        let group = boards(&service);
        let product = service.create_product(deck_input(group.id)).expect("create");

        assert!(matches!(
            service.delete_product_group(&group.id.to_string()),
            Err(DomainError::Storage(_))
        ));

        service
            .delete_product(&product.id.to_string())
            .expect("delete product");
        service
            .delete_product_group(&group.id.to_string())
            .expect("delete group");
        assert!(service.list_product_groups().expect("list").is_empty());
    }

    #[test]
    fn configurable_product_references_option_group() {
        let (service, _) = service();
        let group = boards(&service);
        let wheels = service
            .create_product_group(CreateProductGroupInput {
                name: "Wheels".to_string(),
                sort_order: 2,
                is_sold: false,
            })
            .expect("create group");

        let complete = service
            .create_product(CreateProductInput {
                name: "Complete".to_string(),
                is_configurable: true,
                configured_by_product_group_id: Some(wheels.id),
                configured_quantity: 4,
                ..deck_input(group.id)
            })
            .expect("create");
        assert_eq!(complete.configured_by_product_group_id, Some(wheels.id));
        assert_eq!(complete.configured_quantity, 4);
    }
}
