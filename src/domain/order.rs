use std::fmt;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::errors::DomainError;

/// Order status. Only `created` carries meaning to the services: it marks
/// an order still in the cart stage. Any other value is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Created,
    Other(String),
}

impl OrderStatus {
    pub const CREATED: &'static str = "created";

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Created => Self::CREATED,
            OrderStatus::Other(s) => s,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, OrderStatus::Created)
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        if s == Self::CREATED {
            OrderStatus::Created
        } else {
            OrderStatus::Other(s)
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(s: &str) -> Self {
        OrderStatus::from(s.to_string())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Created => OrderStatus::CREATED.to_string(),
            OrderStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: Uuid,
    pub session_id: String,
    pub email: String,
    pub name: String,
    pub address: String,
    pub zip_code: String,
    pub city: String,
    pub company_name: String,
    pub status: OrderStatus,
    pub created_date_time: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    pub session_id: String,
}

/// Partial order update; `None` leaves a field as stored. The creation
/// timestamp is not updatable.
#[derive(Debug, Clone, Default)]
pub struct UpdateOrderInput {
    pub session_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub company_name: Option<String>,
    pub status: Option<OrderStatus>,
}

impl UpdateOrderInput {
    pub fn is_empty(&self) -> bool {
        self.session_id.is_none()
            && self.email.is_none()
            && self.name.is_none()
            && self.address.is_none()
            && self.zip_code.is_none()
            && self.city.is_none()
            && self.company_name.is_none()
            && self.status.is_none()
    }
}

impl Order {
    /// A blank cart order for `input.session_id`, stamped with the current time.
    pub fn new(input: CreateOrderInput) -> Result<Self, DomainError> {
        if input.session_id.trim().is_empty() {
            return Err(DomainError::Validation(
                "session id cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            session_id: input.session_id,
            email: String::new(),
            name: String::new(),
            address: String::new(),
            zip_code: String::new(),
            city: String::new(),
            company_name: String::new(),
            status: OrderStatus::Created,
            created_date_time: Utc::now(),
        })
    }

    pub fn apply(&mut self, input: UpdateOrderInput) {
        if let Some(session_id) = input.session_id {
            self.session_id = session_id;
        }
        if let Some(email) = input.email {
            self.email = email;
        }
        if let Some(name) = input.name {
            self.name = name;
        }
        if let Some(address) = input.address {
            self.address = address;
        }
        if let Some(zip_code) = input.zip_code {
            self.zip_code = zip_code;
        }
        if let Some(city) = input.city {
            self.city = city;
        }
        if let Some(company_name) = input.company_name {
            self.company_name = company_name;
        }
        if let Some(status) = input.status {
            self.status = status;
        }
    }

    /// True for a cart-stage order that has outlived `retention` at `now`.
    pub fn is_abandoned(&self, now: DateTime<Utc>, retention: Duration) -> bool {
        self.status.is_created() && now - self.created_date_time > retention
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    /// Unit price in minor units, captured when the line was created.
    pub price: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct CreateOrderLineInput {
    pub product_id: Uuid,
    pub price: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOrderLineInput {
    pub product_id: Option<Uuid>,
    pub price: Option<i64>,
    pub quantity: Option<i32>,
}

impl UpdateOrderLineInput {
    pub fn is_empty(&self) -> bool {
        self.product_id.is_none() && self.price.is_none() && self.quantity.is_none()
    }
}

impl OrderLine {
    pub fn new(order_id: Uuid, input: CreateOrderLineInput) -> Result<Self, DomainError> {
        validate_line_price(input.price)?;
        validate_quantity(input.quantity)?;
        Ok(Self {
            id: Uuid::new_v4(),
            order_id,
            product_id: input.product_id,
            price: input.price,
            quantity: input.quantity,
        })
    }

    pub fn apply(&mut self, input: UpdateOrderLineInput) -> Result<(), DomainError> {
        if let Some(price) = input.price {
            validate_line_price(price)?;
        }
        if let Some(quantity) = input.quantity {
            validate_quantity(quantity)?;
        }

        if let Some(product_id) = input.product_id {
            self.product_id = product_id;
        }
        if let Some(price) = input.price {
            self.price = price;
        }
        if let Some(quantity) = input.quantity {
            self.quantity = quantity;
        }
        Ok(())
    }
}

/// One resolved component of a configurable product bought on an order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLineContentLine {
    pub id: Uuid,
    pub order_line_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct CreateContentLineInput {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateContentLineInput {
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
}

impl UpdateContentLineInput {
    pub fn is_empty(&self) -> bool {
        self.product_id.is_none() && self.quantity.is_none()
    }
}

impl OrderLineContentLine {
    pub fn new(order_line_id: Uuid, input: CreateContentLineInput) -> Result<Self, DomainError> {
        validate_quantity(input.quantity)?;
        Ok(Self {
            id: Uuid::new_v4(),
            order_line_id,
            product_id: input.product_id,
            quantity: input.quantity,
        })
    }

    pub fn apply(&mut self, input: UpdateContentLineInput) -> Result<(), DomainError> {
        if let Some(quantity) = input.quantity {
            validate_quantity(quantity)?;
            self.quantity = quantity;
        }
        if let Some(product_id) = input.product_id {
            self.product_id = product_id;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLineDetails {
    pub order_line: OrderLine,
    pub content_lines: Vec<OrderLineContentLine>,
}

/// Read model for a cart: the order, its lines and each line's contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDetails {
    pub order: Order,
    pub order_lines: Vec<OrderLineDetails>,
}

impl OrderDetails {
    /// Attach content lines to their owning lines. Both inputs keep the
    /// order they were read in; content lines of unknown lines are dropped.
    pub fn assemble(
        order: Order,
        lines: Vec<OrderLine>,
        content_lines: Vec<OrderLineContentLine>,
    ) -> Self {
        let mut order_lines: Vec<OrderLineDetails> = lines
            .into_iter()
            .map(|order_line| OrderLineDetails {
                order_line,
                content_lines: Vec::new(),
            })
            .collect();

        for content_line in content_lines {
            if let Some(owner) = order_lines
                .iter_mut()
                .find(|l| l.order_line.id == content_line.order_line_id)
            {
                owner.content_lines.push(content_line);
            }
        }

        Self { order, order_lines }
    }
}

fn validate_line_price(price: i64) -> Result<(), DomainError> {
    if price < 0 {
        return Err(DomainError::Validation(
            "line price cannot be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_quantity(quantity: i32) -> Result<(), DomainError> {
    if quantity < 1 {
        return Err(DomainError::Validation(
            "quantity must be at least 1".to_string(),
        ));
    }
    Ok(())
}
