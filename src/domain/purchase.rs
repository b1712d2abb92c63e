use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::address::AddressView;

/// One cart entry as supplied by the client. Missing values fall back to
/// quantity 1 and price 0.
#[derive(Debug, Clone, Default)]
pub struct PurchaseItemInput {
    pub product_id: Uuid,
    pub quantity: Option<i32>,
    pub price: Option<BigDecimal>,
}

impl PurchaseItemInput {
    pub const DEFAULT_QUANTITY: i32 = 1;

    pub fn quantity(&self) -> i32 {
        self.quantity.unwrap_or(Self::DEFAULT_QUANTITY)
    }

    pub fn price(&self) -> BigDecimal {
        self.price.clone().unwrap_or_else(|| BigDecimal::from(0))
    }
}

#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub items: Vec<PurchaseItemInput>,
    /// Taken verbatim from the client; never recomputed from `items`.
    pub total: BigDecimal,
    pub shipping_address_id: Option<Uuid>,
}

/// A freshly inserted purchase header, before items are attached.
#[derive(Debug, Clone)]
pub struct PurchaseHeader {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total: BigDecimal,
    pub shipping_address_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PurchaseItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct PurchaseView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub total: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub items: Vec<PurchaseItemView>,
    /// `None` when no address was chosen or the address was deleted later.
    pub shipping_address: Option<AddressView>,
}
