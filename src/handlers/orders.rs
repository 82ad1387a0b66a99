use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::OpenedOrder;
use crate::application::SessionOrderService;
use crate::domain::order::{
    CreateContentLineInput, CreateOrderInput, CreateOrderLineInput, Order, OrderDetails,
    OrderLine, OrderLineContentLine, OrderLineDetails, UpdateContentLineInput, UpdateOrderInput,
    UpdateOrderLineInput,
};
use crate::errors::AppError;

use super::blocking;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub session_id: String,
}

/// Every field is optional; omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub session_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub company_name: Option<String>,
    /// Any value is accepted; only "created" keeps the order visible to its
    /// session.
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub session_id: String,
    pub email: String,
    pub name: String,
    pub address: String,
    pub zip_code: String,
    pub city: String,
    pub company_name: String,
    pub status: String,
    /// RFC 3339 timestamp.
    pub created_date_time: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderLineRequest {
    pub product_id: Uuid,
    /// Unit price in minor currency units, captured at the time of adding.
    pub price: i64,
    pub quantity: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateOrderLineRequest {
    pub product_id: Option<Uuid>,
    pub price: Option<i64>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderLineResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub price: i64,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateContentLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateContentLineRequest {
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContentLineResponse {
    pub id: Uuid,
    pub order_line_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderLineDetailsResponse {
    #[serde(flatten)]
    pub order_line: OrderLineResponse,
    pub content_lines: Vec<ContentLineResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderDetailsResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub order_lines: Vec<OrderLineDetailsResponse>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            session_id: o.session_id,
            email: o.email,
            name: o.name,
            address: o.address,
            zip_code: o.zip_code,
            city: o.city,
            company_name: o.company_name,
            status: o.status.into(),
            created_date_time: o.created_date_time.to_rfc3339(),
        }
    }
}

impl From<OrderLine> for OrderLineResponse {
    fn from(l: OrderLine) -> Self {
        Self {
            id: l.id,
            order_id: l.order_id,
            product_id: l.product_id,
            price: l.price,
            quantity: l.quantity,
        }
    }
}

impl From<OrderLineContentLine> for ContentLineResponse {
    fn from(c: OrderLineContentLine) -> Self {
        Self {
            id: c.id,
            order_line_id: c.order_line_id,
            product_id: c.product_id,
            quantity: c.quantity,
        }
    }
}

impl From<OrderLineDetails> for OrderLineDetailsResponse {
    fn from(d: OrderLineDetails) -> Self {
        Self {
            order_line: d.order_line.into(),
            content_lines: d.content_lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<OrderDetails> for OrderDetailsResponse {
    fn from(d: OrderDetails) -> Self {
        Self {
            order: d.order.into(),
            order_lines: d.order_lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<UpdateOrderRequest> for UpdateOrderInput {
    fn from(r: UpdateOrderRequest) -> Self {
        Self {
            session_id: r.session_id,
            email: r.email,
            name: r.name,
            address: r.address,
            zip_code: r.zip_code,
            city: r.city,
            company_name: r.company_name,
            status: r.status.map(Into::into),
        }
    }
}

impl From<CreateOrderLineRequest> for CreateOrderLineInput {
    fn from(r: CreateOrderLineRequest) -> Self {
        Self {
            product_id: r.product_id,
            price: r.price,
            quantity: r.quantity,
        }
    }
}

impl From<UpdateOrderLineRequest> for UpdateOrderLineInput {
    fn from(r: UpdateOrderLineRequest) -> Self {
        Self {
            product_id: r.product_id,
            price: r.price,
            quantity: r.quantity,
        }
    }
}

impl From<CreateContentLineRequest> for CreateContentLineInput {
    fn from(r: CreateContentLineRequest) -> Self {
        Self {
            product_id: r.product_id,
            quantity: r.quantity,
        }
    }
}

impl From<UpdateContentLineRequest> for UpdateContentLineInput {
    fn from(r: UpdateContentLineRequest) -> Self {
        Self {
            product_id: r.product_id,
            quantity: r.quantity,
        }
    }
}

// ── Session handlers ─────────────────────────────────────────────────────────

fn opened_response(opened: OpenedOrder) -> HttpResponse {
    let mut response = if opened.reused {
        HttpResponse::Ok()
    } else {
        HttpResponse::Created()
    };
    response.json(OrderResponse::from(opened.order))
}

/// POST /api/sessions/{id}
///
/// Opens a cart for the browser session. A session that already has an open
/// cart gets that cart back with 200 instead of 201.
#[utoipa::path(
    post,
    path = "/api/sessions/{id}",
    params(("id" = String, Path, description = "Session UUID")),
    responses(
        (status = 201, description = "Cart opened", body = OrderResponse),
        (status = 200, description = "Session already has an open cart", body = OrderResponse),
        (status = 400, description = "Session id is not a UUID"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "sessions"
)]
pub async fn create_session_order(
    service: web::Data<SessionOrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let session_id = path.into_inner();
    let opened = blocking(move || service.create_session_order(&session_id)).await?;
    Ok(opened_response(opened))
}

/// GET /api/sessions/{id}/order
///
/// The session's open cart with its lines and their content lines. Once the
/// order has left the "created" status this is a 404.
#[utoipa::path(
    get,
    path = "/api/sessions/{id}/order",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Open cart", body = OrderDetailsResponse),
        (status = 404, description = "No open cart for the session"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "sessions"
)]
pub async fn get_session_order(
    service: web::Data<SessionOrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let session_id = path.into_inner();
    let details = blocking(move || service.get_order_details_by_session_id(&session_id)).await?;
    Ok(HttpResponse::Ok().json(OrderDetailsResponse::from(details)))
}

// ── Order handlers ───────────────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 200, description = "Session already has an open order", body = OrderResponse),
        (status = 400, description = "Blank session id"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<SessionOrderService>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let input = CreateOrderInput {
        session_id: body.into_inner().session_id,
    };
    let opened = blocking(move || service.create_order(input)).await?;
    Ok(opened_response(opened))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = String, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<SessionOrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let id = path.into_inner();
    let order = blocking(move || service.get_order_by_id(&id)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}",
    params(("id" = String, Path, description = "Order UUID")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 400, description = "Malformed id or blank session id"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn update_order(
    service: web::Data<SessionOrderService>,
    path: web::Path<String>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let id = path.into_inner();
    let input = UpdateOrderInput::from(body.into_inner());
    let order = blocking(move || service.update_order(&id, input)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// DELETE /api/orders/{id}
///
/// Removes the order with all of its lines and content lines.
#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(("id" = String, Path, description = "Order UUID")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    service: web::Data<SessionOrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let id = path.into_inner();
    blocking(move || service.delete_order(&id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ── Order line handlers ──────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/orders/{id}/lines",
    params(("id" = String, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Lines of the order", body = Vec<OrderLineResponse>),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn list_order_lines(
    service: web::Data<SessionOrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let order_id = path.into_inner();
    let lines = blocking(move || service.list_order_lines(&order_id)).await?;
    let body: Vec<OrderLineResponse> = lines.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/lines",
    params(("id" = String, Path, description = "Order UUID")),
    request_body = CreateOrderLineRequest,
    responses(
        (status = 201, description = "Line added", body = OrderLineResponse),
        (status = 400, description = "Malformed id, negative price or quantity below 1"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn add_order_line(
    service: web::Data<SessionOrderService>,
    path: web::Path<String>,
    body: web::Json<CreateOrderLineRequest>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let order_id = path.into_inner();
    let input = CreateOrderLineInput::from(body.into_inner());
    let line = blocking(move || service.add_order_line(&order_id, input)).await?;
    Ok(HttpResponse::Created().json(OrderLineResponse::from(line)))
}

#[utoipa::path(
    patch,
    path = "/api/order-lines/{id}",
    params(("id" = String, Path, description = "Order line UUID")),
    request_body = UpdateOrderLineRequest,
    responses(
        (status = 200, description = "Line updated", body = OrderLineResponse),
        (status = 400, description = "Malformed id or invalid field"),
        (status = 404, description = "Order line not found"),
    ),
    tag = "orders"
)]
pub async fn update_order_line(
    service: web::Data<SessionOrderService>,
    path: web::Path<String>,
    body: web::Json<UpdateOrderLineRequest>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let id = path.into_inner();
    let input = UpdateOrderLineInput::from(body.into_inner());
    let line = blocking(move || service.update_order_line(&id, input)).await?;
    Ok(HttpResponse::Ok().json(OrderLineResponse::from(line)))
}

#[utoipa::path(
    delete,
    path = "/api/order-lines/{id}",
    params(("id" = String, Path, description = "Order line UUID")),
    responses(
        (status = 204, description = "Line and its content lines deleted"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Order line not found"),
    ),
    tag = "orders"
)]
pub async fn delete_order_line(
    service: web::Data<SessionOrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let id = path.into_inner();
    blocking(move || service.delete_order_line(&id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ── Content line handlers ────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/order-lines/{id}/content-lines",
    params(("id" = String, Path, description = "Order line UUID")),
    responses(
        (status = 200, description = "Content lines of the line", body = Vec<ContentLineResponse>),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Order line not found"),
    ),
    tag = "orders"
)]
pub async fn list_content_lines(
    service: web::Data<SessionOrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let order_line_id = path.into_inner();
    let content_lines = blocking(move || service.list_content_lines(&order_line_id)).await?;
    let body: Vec<ContentLineResponse> = content_lines.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    post,
    path = "/api/order-lines/{id}/content-lines",
    params(("id" = String, Path, description = "Order line UUID")),
    request_body = CreateContentLineRequest,
    responses(
        (status = 201, description = "Content line added", body = ContentLineResponse),
        (status = 400, description = "Malformed id or quantity below 1"),
        (status = 404, description = "Order line not found"),
    ),
    tag = "orders"
)]
pub async fn add_content_line(
    service: web::Data<SessionOrderService>,
    path: web::Path<String>,
    body: web::Json<CreateContentLineRequest>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let order_line_id = path.into_inner();
    let input = CreateContentLineInput::from(body.into_inner());
    let content_line = blocking(move || service.add_content_line(&order_line_id, input)).await?;
    Ok(HttpResponse::Created().json(ContentLineResponse::from(content_line)))
}

#[utoipa::path(
    patch,
    path = "/api/content-lines/{id}",
    params(("id" = String, Path, description = "Content line UUID")),
    request_body = UpdateContentLineRequest,
    responses(
        (status = 200, description = "Content line updated", body = ContentLineResponse),
        (status = 400, description = "Malformed id or invalid field"),
        (status = 404, description = "Content line not found"),
    ),
    tag = "orders"
)]
pub async fn update_content_line(
    service: web::Data<SessionOrderService>,
    path: web::Path<String>,
    body: web::Json<UpdateContentLineRequest>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let id = path.into_inner();
    let input = UpdateContentLineInput::from(body.into_inner());
    let content_line = blocking(move || service.update_content_line(&id, input)).await?;
    Ok(HttpResponse::Ok().json(ContentLineResponse::from(content_line)))
}

#[utoipa::path(
    delete,
    path = "/api/content-lines/{id}",
    params(("id" = String, Path, description = "Content line UUID")),
    responses(
        (status = 204, description = "Content line deleted"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Content line not found"),
    ),
    tag = "orders"
)]
pub async fn delete_content_line(
    service: web::Data<SessionOrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let id = path.into_inner();
    blocking(move || service.delete_content_line(&id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;

    #[test]
    fn status_string_round_trips_through_update_request() {
        let input = UpdateOrderInput::from(UpdateOrderRequest {
            status: Some("created".to_string()),
            ..Default::default()
        });
        assert_eq!(input.status, Some(OrderStatus::Created));

        let input = UpdateOrderInput::from(UpdateOrderRequest {
            status: Some("shipped".to_string()),
            ..Default::default()
        });
        assert_eq!(input.status, Some(OrderStatus::Other("shipped".to_string())));
    }

    #[test]
    fn details_response_nests_content_lines_under_lines() {
        let order = Order::new(CreateOrderInput {
            session_id: Uuid::new_v4().to_string(),
        })
        .expect("order");
        let line = OrderLine::new(
            order.id,
            CreateOrderLineInput {
                product_id: Uuid::new_v4(),
                price: 5000,
                quantity: 1,
            },
        )
        .expect("line");
        let wheel = OrderLineContentLine::new(
            line.id,
            CreateContentLineInput {
                product_id: Uuid::new_v4(),
                quantity: 4,
            },
        )
        .expect("content line");

        let details = OrderDetails::assemble(order.clone(), vec![line.clone()], vec![wheel]);
        let json = serde_json::to_value(OrderDetailsResponse::from(details)).expect("json");

        assert_eq!(json["id"], order.id.to_string());
        assert_eq!(json["status"], "created");
        assert_eq!(json["order_lines"][0]["id"], line.id.to_string());
        assert_eq!(json["order_lines"][0]["content_lines"][0]["quantity"], 4);
    }
}
