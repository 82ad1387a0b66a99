use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductGroup {
    pub id: Uuid,
    pub name: String,
    pub sort_order: i32,
    /// Whether the group itself can be sold, not only its members.
    pub is_sold: bool,
}

#[derive(Debug, Clone)]
pub struct CreateProductGroupInput {
    pub name: String,
    pub sort_order: i32,
    pub is_sold: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProductGroupInput {
    pub name: Option<String>,
    pub sort_order: Option<i32>,
    pub is_sold: Option<bool>,
}

impl UpdateProductGroupInput {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.sort_order.is_none() && self.is_sold.is_none()
    }
}

impl ProductGroup {
    pub fn new(input: CreateProductGroupInput) -> Result<Self, DomainError> {
        validate_name("product group", &input.name)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: input.name,
            sort_order: input.sort_order,
            is_sold: input.is_sold,
        })
    }

    /// Apply the supplied fields. Nothing is changed when validation fails.
    pub fn apply(&mut self, input: UpdateProductGroupInput) -> Result<(), DomainError> {
        if let Some(name) = &input.name {
            validate_name("product group", name)?;
        }

        if let Some(name) = input.name {
            self.name = name;
        }
        if let Some(sort_order) = input.sort_order {
            self.sort_order = sort_order;
        }
        if let Some(is_sold) = input.is_sold {
            self.is_sold = is_sold;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Minor currency units.
    pub price: i64,
    pub product_group_id: Uuid,
    pub sort_order: i32,
    pub is_configurable: bool,
    /// Group supplying the options of a configurable product.
    pub configured_by_product_group_id: Option<Uuid>,
    /// Number of sub-items the configuration requires.
    pub configured_quantity: i32,
    pub is_sold_separately: bool,
}

#[derive(Debug, Clone)]
pub struct CreateProductInput {
    pub name: String,
    pub price: i64,
    pub product_group_id: Uuid,
    pub sort_order: i32,
    pub is_configurable: bool,
    pub configured_by_product_group_id: Option<Uuid>,
    pub configured_quantity: i32,
    pub is_sold_separately: bool,
}

/// Partial product update. `None` leaves the stored value untouched; there
/// is no way to clear `configured_by_product_group_id` through it.
#[derive(Debug, Clone, Default)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub sort_order: Option<i32>,
    pub is_configurable: Option<bool>,
    pub configured_by_product_group_id: Option<Uuid>,
    pub configured_quantity: Option<i32>,
    pub is_sold_separately: Option<bool>,
}

impl UpdateProductInput {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.sort_order.is_none()
            && self.is_configurable.is_none()
            && self.configured_by_product_group_id.is_none()
            && self.configured_quantity.is_none()
            && self.is_sold_separately.is_none()
    }
}

impl Product {
    pub fn new(input: CreateProductInput) -> Result<Self, DomainError> {
        validate_name("product", &input.name)?;
        validate_price(input.price)?;
        validate_configured_quantity(input.configured_quantity)?;

        Ok(Self {
            id: Uuid::new_v4(),
            name: input.name,
            price: input.price,
            product_group_id: input.product_group_id,
            sort_order: input.sort_order,
            is_configurable: input.is_configurable,
            configured_by_product_group_id: input.configured_by_product_group_id,
            configured_quantity: input.configured_quantity,
            is_sold_separately: input.is_sold_separately,
        })
    }

    /// Apply the supplied fields. Nothing is changed when validation fails.
    pub fn apply(&mut self, input: UpdateProductInput) -> Result<(), DomainError> {
        if let Some(name) = &input.name {
            validate_name("product", name)?;
        }
        if let Some(price) = input.price {
            validate_price(price)?;
        }
        if let Some(quantity) = input.configured_quantity {
            validate_configured_quantity(quantity)?;
        }

        if let Some(name) = input.name {
            self.name = name;
        }
        if let Some(price) = input.price {
            self.price = price;
        }
        if let Some(sort_order) = input.sort_order {
            self.sort_order = sort_order;
        }
        if let Some(is_configurable) = input.is_configurable {
            self.is_configurable = is_configurable;
        }
        if input.configured_by_product_group_id.is_some() {
            self.configured_by_product_group_id = input.configured_by_product_group_id;
        }
        if let Some(quantity) = input.configured_quantity {
            self.configured_quantity = quantity;
        }
        if let Some(is_sold_separately) = input.is_sold_separately {
            self.is_sold_separately = is_sold_separately;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductGroupWithProducts {
    pub product_group: ProductGroup,
    pub products: Vec<Product>,
}

/// Render minor units as a decimal amount with two fraction digits,
/// e.g. `5000` as `"50.00"` and `5` as `"0.05"`.
pub fn format_price(price: i64) -> String {
    let sign = if price < 0 { "-" } else { "" };
    let abs = price.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

fn validate_name(entity: &str, name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::Validation(format!(
            "{} name cannot be empty",
            entity
        )));
    }
    Ok(())
}

fn validate_price(price: i64) -> Result<(), DomainError> {
    if price < 0 {
        return Err(DomainError::Validation(
            "product price cannot be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_configured_quantity(quantity: i32) -> Result<(), DomainError> {
    if quantity < 0 {
        return Err(DomainError::Validation(
            "configured quantity cannot be negative".to_string(),
        ));
    }
    Ok(())
}
