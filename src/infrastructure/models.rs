use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::address::AddressView;
use crate::domain::identity::Identity;
use crate::schema::{products, purchase_items, purchases, shipping_addresses, users};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub api_token: String,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for Identity {
    fn from(row: UserRow) -> Self {
        Identity {
            user_id: row.id,
            username: row.username,
            is_elevated: row.is_staff,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub id: Uuid,
    pub username: String,
    pub api_token: String,
    pub is_staff: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = shipping_addresses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AddressRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub phone_number: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl From<AddressRow> for AddressView {
    fn from(row: AddressRow) -> Self {
        AddressView {
            id: row.id,
            user_id: row.user_id,
            address: row.address,
            city: row.city,
            postal_code: row.postal_code,
            phone_number: row.phone_number,
            is_default: row.is_default,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = shipping_addresses)]
pub struct NewAddressRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub phone_number: String,
    pub is_default: bool,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = shipping_addresses)]
pub struct AddressChangeset {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = purchases)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PurchaseRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total: BigDecimal,
    pub shipping_address_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = purchases)]
pub struct NewPurchaseRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total: BigDecimal,
    pub shipping_address_id: Option<Uuid>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = purchase_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PurchaseItemRow {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub product_id: Uuid,
    pub line_number: i32,
    pub quantity: i32,
    pub price: BigDecimal,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = purchase_items)]
pub struct NewPurchaseItemRow {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub product_id: Uuid,
    pub line_number: i32,
    pub quantity: i32,
    pub price: BigDecimal,
}
