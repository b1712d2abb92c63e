use uuid::Uuid;

use crate::domain::address::{AddressFields, AddressView, NewAddress};
use crate::domain::errors::{DomainError, FieldError};
use crate::domain::identity::RequestContext;
use crate::domain::ports::AddressRepository;

const MAX_ADDRESS_LEN: usize = 500;
const MAX_CITY_LEN: usize = 100;
const MAX_POSTAL_CODE_LEN: usize = 20;
const MAX_PHONE_NUMBER_LEN: usize = 20;

pub struct AddressService<R> {
    repo: R,
}

impl<R: AddressRepository> AddressService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create(
        &self,
        ctx: &RequestContext,
        fields: AddressFields,
        is_default: bool,
    ) -> Result<AddressView, DomainError> {
        let user = ctx.require_user()?;
        let fields = normalize(fields)?;
        let address = self.repo.create(user.user_id, NewAddress { fields, is_default })?;
        log::info!(
            "Shipping address {} created for user {} (default: {})",
            address.id,
            user.username,
            address.is_default
        );
        Ok(address)
    }

    pub fn list(&self, ctx: &RequestContext) -> Result<Vec<AddressView>, DomainError> {
        let user = ctx.require_user()?;
        self.repo.list_for_user(user.user_id)
    }

    pub fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<AddressView, DomainError> {
        let user = ctx.require_user()?;
        self.repo
            .find_for_user(user.user_id, id)?
            .ok_or(DomainError::NotFound)
    }

    /// Replaces the text fields. The default flag is left untouched.
    pub fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        fields: AddressFields,
    ) -> Result<AddressView, DomainError> {
        let user = ctx.require_user()?;
        let fields = normalize(fields)?;
        self.repo.update(user.user_id, id, fields)
    }

    pub fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), DomainError> {
        let user = ctx.require_user()?;
        self.repo.delete(user.user_id, id)?;
        log::info!("Shipping address {} deleted by user {}", id, user.username);
        Ok(())
    }

    pub fn set_default(&self, ctx: &RequestContext, id: Uuid) -> Result<AddressView, DomainError> {
        let user = ctx.require_user()?;
        let address = self.repo.promote_to_default(user.user_id, id).inspect_err(|e| {
            if matches!(e, DomainError::NotFound) {
                log::warn!(
                    "User {} tried to promote unknown address {}",
                    user.username,
                    id
                );
            }
        })?;
        log::info!(
            "Shipping address {} is now the default for user {}",
            id,
            user.username
        );
        Ok(address)
    }
}

/// Trims every field and checks it is present and within its column width.
fn normalize(fields: AddressFields) -> Result<AddressFields, DomainError> {
    let mut errors = Vec::new();
    let mut check = |name: &str, value: String, max: usize| {
        let value = value.trim().to_string();
        if value.is_empty() {
            errors.push(FieldError::new(name, "must not be blank"));
        } else if value.chars().count() > max {
            errors.push(FieldError::new(
                name,
                format!("must be at most {max} characters"),
            ));
        }
        value
    };

    let normalized = AddressFields {
        address: check("address", fields.address, MAX_ADDRESS_LEN),
        city: check("city", fields.city, MAX_CITY_LEN),
        postal_code: check("postalCode", fields.postal_code, MAX_POSTAL_CODE_LEN),
        phone_number: check("phoneNumber", fields.phone_number, MAX_PHONE_NUMBER_LEN),
    };

    if errors.is_empty() {
        Ok(normalized)
    } else {
        Err(DomainError::InvalidInput(errors))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;
    use uuid::Uuid;

    use super::AddressService;
    use crate::domain::address::{AddressFields, AddressView, NewAddress};
    use crate::domain::errors::{DomainError, FieldError};
    use crate::domain::identity::{Identity, RequestContext};
    use crate::domain::ports::AddressRepository;

    #[derive(Default)]
    struct FakeAddressRepository {
        rows: Mutex<Vec<AddressView>>,
    }

    impl FakeAddressRepository {
        fn demote_all(rows: &mut [AddressView], user_id: Uuid) {
            for row in rows.iter_mut().filter(|r| r.user_id == user_id) {
                row.is_default = false;
            }
        }
    }

    impl AddressRepository for FakeAddressRepository {
        fn create(&self, user_id: Uuid, new: NewAddress) -> Result<AddressView, DomainError> {
            let mut rows = self.rows.lock().unwrap();
            if new.is_default {
                Self::demote_all(&mut rows, user_id);
            }
            let view = AddressView {
                id: Uuid::new_v4(),
                user_id,
                address: new.fields.address,
                city: new.fields.city,
                postal_code: new.fields.postal_code,
                phone_number: new.fields.phone_number,
                is_default: new.is_default,
                created_at: Utc::now(),
            };
            rows.push(view.clone());
            Ok(view)
        }

        fn list_for_user(&self, user_id: Uuid) -> Result<Vec<AddressView>, DomainError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().filter(|r| r.user_id == user_id).cloned().collect())
        }

        fn find_for_user(
            &self,
            user_id: Uuid,
            id: Uuid,
        ) -> Result<Option<AddressView>, DomainError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .find(|r| r.id == id && r.user_id == user_id)
                .cloned())
        }

        fn update(
            &self,
            user_id: Uuid,
            id: Uuid,
            fields: AddressFields,
        ) -> Result<AddressView, DomainError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|r| r.id == id && r.user_id == user_id)
                .ok_or(DomainError::NotFound)?;
            row.address = fields.address;
            row.city = fields.city;
            row.postal_code = fields.postal_code;
            row.phone_number = fields.phone_number;
            Ok(row.clone())
        }

        fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), DomainError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| !(r.id == id && r.user_id == user_id));
            if rows.len() == before {
                return Err(DomainError::NotFound);
            }
            Ok(())
        }

        fn promote_to_default(&self, user_id: Uuid, id: Uuid) -> Result<AddressView, DomainError> {
            let mut rows = self.rows.lock().unwrap();
            if !rows.iter().any(|r| r.id == id && r.user_id == user_id) {
                return Err(DomainError::NotFound);
            }
            Self::demote_all(&mut rows, user_id);
            let row = rows
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(DomainError::NotFound)?;
            row.is_default = true;
            Ok(row.clone())
        }
    }

    fn ctx(username: &str) -> RequestContext {
        RequestContext::authenticated(Identity {
            user_id: Uuid::new_v4(),
            username: username.to_string(),
            is_elevated: false,
        })
    }

    fn fields(city: &str) -> AddressFields {
        AddressFields {
            address: "12 Valiasr St".to_string(),
            city: city.to_string(),
            postal_code: "1234567890".to_string(),
            phone_number: "09120000000".to_string(),
        }
    }

    fn default_count(service: &AddressService<FakeAddressRepository>, ctx: &RequestContext) -> usize {
        service
            .list(ctx)
            .expect("list failed")
            .iter()
            .filter(|a| a.is_default)
            .count()
    }

    #[test]
    fn promoting_moves_the_default_flag() {
        let service = AddressService::new(FakeAddressRepository::default());
        let user = ctx("sara");

        let a1 = service
            .create(&user, fields("Tehran"), true)
            .expect("create failed");
        let a2 = service
            .create(&user, fields("Shiraz"), false)
            .expect("create failed");

        service.set_default(&user, a2.id).expect("promote failed");

        assert!(!service.get(&user, a1.id).expect("get failed").is_default);
        assert!(service.get(&user, a2.id).expect("get failed").is_default);
    }

    #[test]
    fn creating_a_default_demotes_the_previous_one() {
        let service = AddressService::new(FakeAddressRepository::default());
        let user = ctx("sara");

        for city in ["Tehran", "Shiraz", "Tabriz"] {
            service
                .create(&user, fields(city), true)
                .expect("create failed");
            assert_eq!(default_count(&service, &user), 1);
        }
    }

    #[test]
    fn cannot_promote_another_users_address() {
        let service = AddressService::new(FakeAddressRepository::default());
        let owner = ctx("owner");
        let intruder = ctx("intruder");

        let address = service
            .create(&owner, fields("Tehran"), false)
            .expect("create failed");

        assert!(matches!(
            service.set_default(&intruder, address.id),
            Err(DomainError::NotFound)
        ));
        assert!(matches!(
            service.set_default(&intruder, Uuid::new_v4()),
            Err(DomainError::NotFound)
        ));
        assert_eq!(default_count(&service, &owner), 0);
    }

    #[test]
    fn blank_and_oversized_fields_are_rejected() {
        let service = AddressService::new(FakeAddressRepository::default());
        let user = ctx("sara");
        let input = AddressFields {
            address: "   ".to_string(),
            city: "Tehran".to_string(),
            postal_code: "1".repeat(21),
            phone_number: "0912".to_string(),
        };

        let err = service
            .create(&user, input, false)
            .expect_err("should be rejected");

        let DomainError::InvalidInput(errors) = err else {
            panic!("expected InvalidInput, got {err:?}");
        };
        assert_eq!(
            errors,
            vec![
                FieldError::new("address", "must not be blank"),
                FieldError::new("postalCode", "must be at most 20 characters"),
            ]
        );
        assert!(service.list(&user).expect("list failed").is_empty());
    }

    #[test]
    fn fields_are_trimmed_before_storing() {
        let service = AddressService::new(FakeAddressRepository::default());
        let user = ctx("sara");

        let address = service
            .create(&user, fields("  Tehran  "), false)
            .expect("create failed");

        assert_eq!(address.city, "Tehran");
    }

    #[test]
    fn update_keeps_default_flag() {
        let service = AddressService::new(FakeAddressRepository::default());
        let user = ctx("sara");
        let address = service
            .create(&user, fields("Tehran"), true)
            .expect("create failed");

        let updated = service
            .update(&user, address.id, fields("Isfahan"))
            .expect("update failed");

        assert_eq!(updated.city, "Isfahan");
        assert!(updated.is_default);
    }

    #[test]
    fn addresses_are_private_to_their_owner() {
        let service = AddressService::new(FakeAddressRepository::default());
        let owner = ctx("owner");
        let other = ctx("other");
        let address = service
            .create(&owner, fields("Tehran"), false)
            .expect("create failed");

        assert!(service.list(&other).expect("list failed").is_empty());
        assert!(matches!(
            service.get(&other, address.id),
            Err(DomainError::NotFound)
        ));
        assert!(matches!(
            service.delete(&other, address.id),
            Err(DomainError::NotFound)
        ));
        service.delete(&owner, address.id).expect("delete failed");
        assert!(service.list(&owner).expect("list failed").is_empty());
    }

    #[test]
    fn anonymous_callers_are_rejected() {
        let service = AddressService::new(FakeAddressRepository::default());
        let anon = RequestContext::anonymous();

        assert!(matches!(
            service.create(&anon, fields("Tehran"), false),
            Err(DomainError::Unauthorized)
        ));
        assert!(matches!(service.list(&anon), Err(DomainError::Unauthorized)));
    }
}
