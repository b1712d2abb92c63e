use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::address::{AddressFields, AddressView, NewAddress};
use super::errors::DomainError;
use super::identity::Identity;
use super::purchase::{PurchaseHeader, PurchaseItemView, PurchaseView};

/// Resolves a bearer credential to the user it belongs to.
pub trait IdentityProvider: Send + Sync + 'static {
    fn resolve_token(&self, token: &str) -> Result<Option<Identity>, DomainError>;
}

/// Shipping addresses, always scoped to their owning user.
///
/// Every operation that can change which address is the default runs in a
/// single transaction that serializes against other such operations for the
/// same user, so at most one default exists per user at any time.
pub trait AddressRepository: Send + Sync + 'static {
    fn create(&self, user_id: Uuid, new: NewAddress) -> Result<AddressView, DomainError>;
    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<AddressView>, DomainError>;
    fn find_for_user(&self, user_id: Uuid, id: Uuid) -> Result<Option<AddressView>, DomainError>;
    fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: AddressFields,
    ) -> Result<AddressView, DomainError>;
    fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), DomainError>;
    fn promote_to_default(&self, user_id: Uuid, id: Uuid) -> Result<AddressView, DomainError>;
}

/// Write operations available inside a purchase transaction.
pub trait PurchaseStore {
    /// Inserts the header row. `shipping_address_id` is stored as given.
    fn create_purchase(
        &mut self,
        user_id: Uuid,
        total: &BigDecimal,
        shipping_address_id: Option<Uuid>,
    ) -> Result<PurchaseHeader, DomainError>;

    /// Appends one line item after the purchase's existing items.
    fn add_item(
        &mut self,
        purchase_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        price: &BigDecimal,
    ) -> Result<PurchaseItemView, DomainError>;
}

pub trait PurchaseRepository: Send + Sync + 'static {
    /// Runs `f` in one transaction. An `Err` from `f` rolls back every write
    /// it made.
    fn transaction<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn PurchaseStore) -> Result<T, DomainError>;

    fn find_by_id(&self, id: Uuid) -> Result<Option<PurchaseView>, DomainError>;
    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<PurchaseView>, DomainError>;
    fn list_all(&self) -> Result<Vec<PurchaseView>, DomainError>;
}
