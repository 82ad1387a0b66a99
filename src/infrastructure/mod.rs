pub mod logger;
pub mod memory;
pub mod models;
pub mod order_repo;
pub mod product_repo;

use uuid::Uuid;

use crate::domain::errors::DomainError;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}

/// Turn a zero-row update/delete into a not-found error.
fn ensure_affected(rows: usize, entity: &str, id: Uuid) -> Result<(), DomainError> {
    if rows == 0 {
        return Err(DomainError::not_found(entity, id));
    }
    Ok(())
}
