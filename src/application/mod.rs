pub mod cleanup;
pub mod order_service;
pub mod product_service;

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::{parse_id, DomainError};
use crate::domain::ports::{Logger, OrderRepository, ProductRepository};

use self::order_service::OrderService;
use self::product_service::ProductService;

/// Catalog service as wired into the HTTP layer, over any repository.
pub type CatalogService = ProductService<Arc<dyn ProductRepository>>;
pub type SessionOrderService = OrderService<Arc<dyn OrderRepository>>;

/// Log a failed operation with its context and hand the error back unchanged.
fn log_failure(
    logger: &dyn Logger,
    operation: &str,
    id: &dyn fmt::Display,
    err: DomainError,
) -> DomainError {
    logger.error(
        "operation failed",
        &[("operation", &operation), ("id", id), ("error", &err)],
    );
    err
}

fn parse_logged(logger: &dyn Logger, operation: &str, raw: &str) -> Result<Uuid, DomainError> {
    parse_id(raw).map_err(|e| log_failure(logger, operation, &raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::logger::RecordingLogger;

    #[test]
    fn parse_failures_are_logged_with_context() {
        let logger = RecordingLogger::default();
        let err = parse_logged(&logger, "get_product", "nope").unwrap_err();
        assert!(matches!(err, DomainError::InvalidIdentifier(_)));

        let errors = logger.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("operation=get_product"));
        assert!(errors[0].contains("id=nope"));
    }
}
