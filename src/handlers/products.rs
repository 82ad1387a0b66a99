use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::CatalogService;
use crate::domain::product::{
    format_price, CreateProductGroupInput, CreateProductInput, Product, ProductGroup,
    ProductGroupWithProducts, UpdateProductGroupInput, UpdateProductInput,
};
use crate::errors::AppError;

use super::blocking;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductGroupRequest {
    pub name: String,
    /// Position in listings; lower sorts first.
    pub order: i32,
    pub is_sold: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductGroupRequest {
    pub name: Option<String>,
    pub order: Option<i32>,
    pub is_sold: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductGroupResponse {
    pub id: Uuid,
    pub name: String,
    pub order: i32,
    pub is_sold: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    /// Price in minor currency units (cents).
    pub price: i64,
    pub product_group_id: Uuid,
    pub order: i32,
    #[serde(default)]
    pub is_configurable: bool,
    /// Group whose products configure this one, e.g. the wheels of a board.
    #[serde(default)]
    pub configured_by_product_group_id: Option<Uuid>,
    #[serde(default)]
    pub configured_quantity: i32,
    pub is_sold_separately: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub order: Option<i32>,
    pub is_configurable: Option<bool>,
    pub configured_by_product_group_id: Option<Uuid>,
    pub configured_quantity: Option<i32>,
    pub is_sold_separately: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub product_group_id: Uuid,
    pub order: i32,
    pub is_configurable: bool,
    pub configured_by_product_group_id: Option<Uuid>,
    pub configured_quantity: i32,
    pub is_sold_separately: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CatalogProductResponse {
    #[serde(flatten)]
    pub product: ProductResponse,
    /// `price` rendered with two decimals, e.g. "50.00".
    pub formatted_price: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CatalogGroupResponse {
    #[serde(flatten)]
    pub product_group: ProductGroupResponse,
    pub products: Vec<CatalogProductResponse>,
}

impl From<ProductGroup> for ProductGroupResponse {
    fn from(g: ProductGroup) -> Self {
        Self {
            id: g.id,
            name: g.name,
            order: g.sort_order,
            is_sold: g.is_sold,
        }
    }
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            price: p.price,
            product_group_id: p.product_group_id,
            order: p.sort_order,
            is_configurable: p.is_configurable,
            configured_by_product_group_id: p.configured_by_product_group_id,
            configured_quantity: p.configured_quantity,
            is_sold_separately: p.is_sold_separately,
        }
    }
}

impl From<ProductGroupWithProducts> for CatalogGroupResponse {
    fn from(entry: ProductGroupWithProducts) -> Self {
        Self {
            product_group: entry.product_group.into(),
            products: entry
                .products
                .into_iter()
                .map(|p| CatalogProductResponse {
                    formatted_price: format_price(p.price),
                    product: p.into(),
                })
                .collect(),
        }
    }
}

impl From<CreateProductGroupRequest> for CreateProductGroupInput {
    fn from(r: CreateProductGroupRequest) -> Self {
        Self {
            name: r.name,
            sort_order: r.order,
            is_sold: r.is_sold,
        }
    }
}

impl From<UpdateProductGroupRequest> for UpdateProductGroupInput {
    fn from(r: UpdateProductGroupRequest) -> Self {
        Self {
            name: r.name,
            sort_order: r.order,
            is_sold: r.is_sold,
        }
    }
}

impl From<CreateProductRequest> for CreateProductInput {
    fn from(r: CreateProductRequest) -> Self {
        Self {
            name: r.name,
            price: r.price,
            product_group_id: r.product_group_id,
            sort_order: r.order,
            is_configurable: r.is_configurable,
            configured_by_product_group_id: r.configured_by_product_group_id,
            configured_quantity: r.configured_quantity,
            is_sold_separately: r.is_sold_separately,
        }
    }
}

impl From<UpdateProductRequest> for UpdateProductInput {
    fn from(r: UpdateProductRequest) -> Self {
        Self {
            name: r.name,
            price: r.price,
            sort_order: r.order,
            is_configurable: r.is_configurable,
            configured_by_product_group_id: r.configured_by_product_group_id,
            configured_quantity: r.configured_quantity,
            is_sold_separately: r.is_sold_separately,
        }
    }
}

// ── Product group handlers ───────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/api/product-groups",
    request_body = CreateProductGroupRequest,
    responses(
        (status = 201, description = "Product group created", body = ProductGroupResponse),
        (status = 400, description = "Invalid product group"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn create_product_group(
    service: web::Data<CatalogService>,
    body: web::Json<CreateProductGroupRequest>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let input = CreateProductGroupInput::from(body.into_inner());
    let group = blocking(move || service.create_product_group(input)).await?;
    Ok(HttpResponse::Created().json(ProductGroupResponse::from(group)))
}

#[utoipa::path(
    get,
    path = "/api/product-groups",
    responses(
        (status = 200, description = "All product groups", body = Vec<ProductGroupResponse>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn list_product_groups(
    service: web::Data<CatalogService>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let groups = blocking(move || service.list_product_groups()).await?;
    let body: Vec<ProductGroupResponse> = groups.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    get,
    path = "/api/product-groups/{id}",
    params(("id" = String, Path, description = "Product group UUID")),
    responses(
        (status = 200, description = "Product group found", body = ProductGroupResponse),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Product group not found"),
    ),
    tag = "catalog"
)]
pub async fn get_product_group(
    service: web::Data<CatalogService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let id = path.into_inner();
    let group = blocking(move || service.get_product_group(&id)).await?;
    Ok(HttpResponse::Ok().json(ProductGroupResponse::from(group)))
}

#[utoipa::path(
    patch,
    path = "/api/product-groups/{id}",
    params(("id" = String, Path, description = "Product group UUID")),
    request_body = UpdateProductGroupRequest,
    responses(
        (status = 200, description = "Product group updated", body = ProductGroupResponse),
        (status = 400, description = "Malformed id or invalid field"),
        (status = 404, description = "Product group not found"),
    ),
    tag = "catalog"
)]
pub async fn update_product_group(
    service: web::Data<CatalogService>,
    path: web::Path<String>,
    body: web::Json<UpdateProductGroupRequest>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let id = path.into_inner();
    let input = UpdateProductGroupInput::from(body.into_inner());
    let group = blocking(move || service.update_product_group(&id, input)).await?;
    Ok(HttpResponse::Ok().json(ProductGroupResponse::from(group)))
}

/// Fails with 500 while products still belong to the group.
#[utoipa::path(
    delete,
    path = "/api/product-groups/{id}",
    params(("id" = String, Path, description = "Product group UUID")),
    responses(
        (status = 204, description = "Product group deleted"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Product group not found"),
        (status = 500, description = "Group still referenced or storage failure"),
    ),
    tag = "catalog"
)]
pub async fn delete_product_group(
    service: web::Data<CatalogService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let id = path.into_inner();
    blocking(move || service.delete_product_group(&id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/product-groups/{id}/products",
    params(("id" = String, Path, description = "Product group UUID")),
    responses(
        (status = 200, description = "Products in the group", body = Vec<ProductResponse>),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Product group not found"),
    ),
    tag = "catalog"
)]
pub async fn list_products_by_group(
    service: web::Data<CatalogService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let id = path.into_inner();
    let products = blocking(move || service.list_products_by_group(&id)).await?;
    let body: Vec<ProductResponse> = products.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/catalog
///
/// Every product group with its products, prices also pre-formatted for
/// display.
#[utoipa::path(
    get,
    path = "/api/catalog",
    responses(
        (status = 200, description = "Catalog", body = Vec<CatalogGroupResponse>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn get_catalog(service: web::Data<CatalogService>) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let catalog = blocking(move || service.list_product_groups_with_products()).await?;
    let body: Vec<CatalogGroupResponse> = catalog.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

// ── Product handlers ─────────────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid product"),
        (status = 500, description = "Unknown group or storage failure"),
    ),
    tag = "catalog"
)]
pub async fn create_product(
    service: web::Data<CatalogService>,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let input = CreateProductInput::from(body.into_inner());
    let product = blocking(move || service.create_product(input)).await?;
    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "All products", body = Vec<ProductResponse>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn list_products(service: web::Data<CatalogService>) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let products = blocking(move || service.list_products()).await?;
    let body: Vec<ProductResponse> = products.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = String, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Product not found"),
    ),
    tag = "catalog"
)]
pub async fn get_product(
    service: web::Data<CatalogService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let id = path.into_inner();
    let product = blocking(move || service.get_product(&id)).await?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}",
    params(("id" = String, Path, description = "Product UUID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Malformed id or invalid field"),
        (status = 404, description = "Product not found"),
    ),
    tag = "catalog"
)]
pub async fn update_product(
    service: web::Data<CatalogService>,
    path: web::Path<String>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let id = path.into_inner();
    let input = UpdateProductInput::from(body.into_inner());
    let product = blocking(move || service.update_product(&id, input)).await?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = String, Path, description = "Product UUID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Product not found"),
    ),
    tag = "catalog"
)]
pub async fn delete_product(
    service: web::Data<CatalogService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let id = path.into_inner();
    blocking(move || service.delete_product(&id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_entry_carries_formatted_prices() {
        let group = ProductGroup {
            id: Uuid::new_v4(),
            name: "Boards".to_string(),
            sort_order: 1,
            is_sold: true,
        };
        let product = Product {
            id: Uuid::new_v4(),
            name: "Deck".to_string(),
            price: 5000,
            product_group_id: group.id,
            sort_order: 1,
            is_configurable: false,
            configured_by_product_group_id: None,
            configured_quantity: 0,
            is_sold_separately: true,
        };

        let entry = CatalogGroupResponse::from(ProductGroupWithProducts {
            product_group: group,
            products: vec![product],
        });
        let json = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(json["name"], "Boards");
        assert_eq!(json["order"], 1);
        assert_eq!(json["products"][0]["price"], 5000);
        assert_eq!(json["products"][0]["formatted_price"], "50.00");
    }

    #[test]
    fn update_request_maps_order_to_sort_order() {
        let input = UpdateProductInput::from(UpdateProductRequest {
            order: Some(3),
            ..Default::default()
        });
        assert_eq!(input.sort_order, Some(3));
        assert!(input.name.is_none());
    }
}
