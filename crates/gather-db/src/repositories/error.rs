//! Error handling utilities for repositories

use gather_core::error::DomainError;
use gather_core::value_objects::EventId;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Create an "event not found" error
pub fn event_not_found(id: EventId) -> DomainError {
    DomainError::EventNotFound(id)
}
