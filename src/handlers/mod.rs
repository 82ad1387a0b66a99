pub mod orders;
pub mod products;

use actix_web::web;
use utoipa::OpenApi;

use crate::domain::errors::DomainError;
use crate::errors::AppError;

/// Run a synchronous service call on actix's blocking pool.
async fn blocking<F, T>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    Ok(web::block(f)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??)
}

/// Mount every route under `/api`. Expects a `web::Data` for both
/// [`crate::application::CatalogService`] and
/// [`crate::application::SessionOrderService`].
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/catalog", web::get().to(products::get_catalog))
            .service(
                web::scope("/product-groups")
                    .route("", web::post().to(products::create_product_group))
                    .route("", web::get().to(products::list_product_groups))
                    .route("/{id}", web::get().to(products::get_product_group))
                    .route("/{id}", web::patch().to(products::update_product_group))
                    .route("/{id}", web::delete().to(products::delete_product_group))
                    .route(
                        "/{id}/products",
                        web::get().to(products::list_products_by_group),
                    ),
            )
            .service(
                web::scope("/products")
                    .route("", web::post().to(products::create_product))
                    .route("", web::get().to(products::list_products))
                    .route("/{id}", web::get().to(products::get_product))
                    .route("/{id}", web::patch().to(products::update_product))
                    .route("/{id}", web::delete().to(products::delete_product)),
            )
            .service(
                web::scope("/orders")
                    .route("", web::post().to(orders::create_order))
                    .route("/{id}", web::get().to(orders::get_order))
                    .route("/{id}", web::patch().to(orders::update_order))
                    .route("/{id}", web::delete().to(orders::delete_order))
                    .route("/{id}/lines", web::get().to(orders::list_order_lines))
                    .route("/{id}/lines", web::post().to(orders::add_order_line)),
            )
            .service(
                web::scope("/order-lines")
                    .route("/{id}", web::patch().to(orders::update_order_line))
                    .route("/{id}", web::delete().to(orders::delete_order_line))
                    .route(
                        "/{id}/content-lines",
                        web::get().to(orders::list_content_lines),
                    )
                    .route(
                        "/{id}/content-lines",
                        web::post().to(orders::add_content_line),
                    ),
            )
            .service(
                web::scope("/content-lines")
                    .route("/{id}", web::patch().to(orders::update_content_line))
                    .route("/{id}", web::delete().to(orders::delete_content_line)),
            )
            .service(
                web::scope("/sessions")
                    .route("/{id}", web::post().to(orders::create_session_order))
                    .route("/{id}/order", web::get().to(orders::get_session_order)),
            ),
    );
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Composable Commerce API"),
    paths(
        products::get_catalog,
        products::create_product_group,
        products::list_product_groups,
        products::get_product_group,
        products::update_product_group,
        products::delete_product_group,
        products::list_products_by_group,
        products::create_product,
        products::list_products,
        products::get_product,
        products::update_product,
        products::delete_product,
        orders::create_session_order,
        orders::get_session_order,
        orders::create_order,
        orders::get_order,
        orders::update_order,
        orders::delete_order,
        orders::list_order_lines,
        orders::add_order_line,
        orders::update_order_line,
        orders::delete_order_line,
        orders::list_content_lines,
        orders::add_content_line,
        orders::update_content_line,
        orders::delete_content_line,
    ),
    components(schemas(
        products::CreateProductGroupRequest,
        products::UpdateProductGroupRequest,
        products::ProductGroupResponse,
        products::CreateProductRequest,
        products::UpdateProductRequest,
        products::ProductResponse,
        products::CatalogProductResponse,
        products::CatalogGroupResponse,
        orders::CreateOrderRequest,
        orders::UpdateOrderRequest,
        orders::OrderResponse,
        orders::CreateOrderLineRequest,
        orders::UpdateOrderLineRequest,
        orders::OrderLineResponse,
        orders::CreateContentLineRequest,
        orders::UpdateContentLineRequest,
        orders::ContentLineResponse,
        orders::OrderLineDetailsResponse,
        orders::OrderDetailsResponse,
    )),
    tags(
        (name = "catalog", description = "Product groups and products"),
        (name = "orders", description = "Orders, order lines and content lines"),
        (name = "sessions", description = "Session carts"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::ApiDoc;
    use utoipa::OpenApi;

    #[test]
    fn openapi_document_lists_session_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/sessions/{id}"));
        assert!(doc.paths.paths.contains_key("/api/sessions/{id}/order"));
        assert!(doc.paths.paths.contains_key("/api/catalog"));
    }
}
