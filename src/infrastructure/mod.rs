pub mod address_repo;
pub mod identity_repo;
pub mod models;
pub mod purchase_repo;

#[cfg(test)]
pub(crate) mod test_support;

use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::domain::errors::DomainError;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<DieselError> for DomainError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                DomainError::Conflict(info.message().to_string())
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                DomainError::invalid(
                    field_for_constraint(info.constraint_name()),
                    "refers to a record that does not exist",
                )
            }
            DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, info) => {
                DomainError::invalid(
                    field_for_constraint(info.constraint_name()),
                    info.message().to_string(),
                )
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

/// Maps a PostgreSQL constraint name to the request field it guards.
fn field_for_constraint(constraint: Option<&str>) -> String {
    match constraint {
        Some("purchase_items_product_id_fkey") => "items.product".to_string(),
        Some("purchase_items_quantity_check") => "items.quantity".to_string(),
        Some("purchases_shipping_address_id_fkey") => "shippingAddressId".to_string(),
        Some(other) => other.to_string(),
        None => "reference".to_string(),
    }
}
