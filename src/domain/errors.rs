use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DomainError::NotFound(format!("{} {}", entity, id))
    }
}

/// Parse a caller-supplied identifier.
///
/// A malformed id is an [`DomainError::InvalidIdentifier`], never a
/// [`DomainError::NotFound`].
pub fn parse_id(raw: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw.trim())
        .map_err(|e| DomainError::InvalidIdentifier(format!("'{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_hyphenated_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).expect("valid id"), id);
    }

    #[test]
    fn parse_id_rejects_garbage() {
        let err = parse_id("not-a-uuid").unwrap_err();
        assert!(matches!(err, DomainError::InvalidIdentifier(_)));
    }

    #[test]
    fn not_found_display_names_entity_and_id() {
        let id = Uuid::nil();
        assert_eq!(
            DomainError::not_found("Order", id).to_string(),
            format!("Order {} not found", id)
        );
    }
}
