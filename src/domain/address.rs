use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Editable fields of a shipping address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressFields {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub phone_number: String,
}

#[derive(Debug, Clone)]
pub struct NewAddress {
    pub fields: AddressFields,
    pub is_default: bool,
}

#[derive(Debug, Clone)]
pub struct AddressView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub phone_number: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}
