use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::address::{AddressFields, AddressView, NewAddress};
use crate::domain::errors::DomainError;
use crate::domain::ports::AddressRepository;
use crate::schema::{shipping_addresses, users};

use super::models::{AddressChangeset, AddressRow, NewAddressRow};

/// Takes a row lock on the owning user. Every default-flag change for that
/// user goes through this lock, which serializes them without touching other
/// users.
fn lock_user(conn: &mut PgConnection, user_id: Uuid) -> Result<(), DomainError> {
    let locked = users::table
        .find(user_id)
        .select(users::id)
        .for_update()
        .load::<Uuid>(conn)?;
    if locked.is_empty() {
        return Err(DomainError::Unauthorized);
    }
    Ok(())
}

fn demote_defaults(conn: &mut PgConnection, user_id: Uuid) -> Result<usize, DomainError> {
    Ok(diesel::update(
        shipping_addresses::table
            .filter(shipping_addresses::user_id.eq(user_id))
            .filter(shipping_addresses::is_default.eq(true)),
    )
    .set(shipping_addresses::is_default.eq(false))
    .execute(conn)?)
}

pub struct DieselAddressRepository {
    pool: DbPool,
}

impl DieselAddressRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl AddressRepository for DieselAddressRepository {
    fn create(&self, user_id: Uuid, new: NewAddress) -> Result<AddressView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            if new.is_default {
                lock_user(conn, user_id)?;
                let demoted = demote_defaults(conn, user_id)?;
                log::debug!("Demoted {} default address(es) of user {}", demoted, user_id);
            }

            let row = diesel::insert_into(shipping_addresses::table)
                .values(&NewAddressRow {
                    id: Uuid::new_v4(),
                    user_id,
                    address: new.fields.address,
                    city: new.fields.city,
                    postal_code: new.fields.postal_code,
                    phone_number: new.fields.phone_number,
                    is_default: new.is_default,
                })
                .returning(AddressRow::as_returning())
                .get_result(conn)?;

            Ok(row.into())
        })
    }

    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<AddressView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = shipping_addresses::table
            .filter(shipping_addresses::user_id.eq(user_id))
            .select(AddressRow::as_select())
            .order((shipping_addresses::created_at.asc(), shipping_addresses::id))
            .load(&mut conn)?;

        Ok(rows.into_iter().map(AddressView::from).collect())
    }

    fn find_for_user(&self, user_id: Uuid, id: Uuid) -> Result<Option<AddressView>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = shipping_addresses::table
            .filter(shipping_addresses::id.eq(id))
            .filter(shipping_addresses::user_id.eq(user_id))
            .select(AddressRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(AddressView::from))
    }

    fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: AddressFields,
    ) -> Result<AddressView, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::update(
            shipping_addresses::table
                .filter(shipping_addresses::id.eq(id))
                .filter(shipping_addresses::user_id.eq(user_id)),
        )
        .set(&AddressChangeset {
            address: fields.address,
            city: fields.city,
            postal_code: fields.postal_code,
            phone_number: fields.phone_number,
        })
        .returning(AddressRow::as_returning())
        .get_result(&mut conn)
        .optional()?
        .ok_or(DomainError::NotFound)?;

        Ok(row.into())
    }

    fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(
            shipping_addresses::table
                .filter(shipping_addresses::id.eq(id))
                .filter(shipping_addresses::user_id.eq(user_id)),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    fn promote_to_default(&self, user_id: Uuid, id: Uuid) -> Result<AddressView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            lock_user(conn, user_id)?;

            let owned = shipping_addresses::table
                .filter(shipping_addresses::id.eq(id))
                .filter(shipping_addresses::user_id.eq(user_id))
                .select(shipping_addresses::id)
                .first::<Uuid>(conn)
                .optional()?;
            if owned.is_none() {
                return Err(DomainError::NotFound);
            }

            demote_defaults(conn, user_id)?;
            let row = diesel::update(shipping_addresses::table.find(id))
                .set(shipping_addresses::is_default.eq(true))
                .returning(AddressRow::as_returning())
                .get_result(conn)?;

            Ok(row.into())
        })
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::DieselAddressRepository;
    use crate::domain::address::{AddressFields, AddressView, NewAddress};
    use crate::domain::errors::DomainError;
    use crate::domain::ports::AddressRepository;
    use crate::infrastructure::test_support::{insert_user, setup_db};

    fn new_address(city: &str, is_default: bool) -> NewAddress {
        NewAddress {
            fields: AddressFields {
                address: "12 Valiasr St".to_string(),
                city: city.to_string(),
                postal_code: "1234567890".to_string(),
                phone_number: "09120000000".to_string(),
            },
            is_default,
        }
    }

    fn defaults(rows: &[AddressView]) -> Vec<&str> {
        rows.iter()
            .filter(|a| a.is_default)
            .map(|a| a.city.as_str())
            .collect()
    }

    #[tokio::test]
    async fn promote_moves_default_between_addresses() {
        let (_container, pool) = setup_db().await;
        let repo = DieselAddressRepository::new(pool.clone());
        let user_id = insert_user(&pool, "sara", false);

        let a1 = repo
            .create(user_id, new_address("Tehran", true))
            .expect("create failed");
        let a2 = repo
            .create(user_id, new_address("Shiraz", false))
            .expect("create failed");

        let promoted = repo
            .promote_to_default(user_id, a2.id)
            .expect("promote failed");
        assert!(promoted.is_default);

        let rows = repo.list_for_user(user_id).expect("list failed");
        assert_eq!(defaults(&rows), vec!["Shiraz"]);
        let a1 = repo
            .find_for_user(user_id, a1.id)
            .expect("find failed")
            .expect("address should exist");
        assert!(!a1.is_default);
    }

    #[tokio::test]
    async fn creating_default_demotes_existing_default() {
        let (_container, pool) = setup_db().await;
        let repo = DieselAddressRepository::new(pool.clone());
        let user_id = insert_user(&pool, "sara", false);

        repo.create(user_id, new_address("Tehran", true))
            .expect("create failed");
        repo.create(user_id, new_address("Shiraz", true))
            .expect("create failed");
        repo.create(user_id, new_address("Tabriz", false))
            .expect("create failed");

        let rows = repo.list_for_user(user_id).expect("list failed");
        assert_eq!(rows.len(), 3);
        assert_eq!(defaults(&rows), vec!["Shiraz"]);
    }

    #[tokio::test]
    async fn promote_rejects_foreign_and_unknown_addresses() {
        let (_container, pool) = setup_db().await;
        let repo = DieselAddressRepository::new(pool.clone());
        let owner = insert_user(&pool, "owner", false);
        let intruder = insert_user(&pool, "intruder", false);

        let address = repo
            .create(owner, new_address("Tehran", false))
            .expect("create failed");
        repo.create(intruder, new_address("Karaj", true))
            .expect("create failed");

        assert!(matches!(
            repo.promote_to_default(intruder, address.id),
            Err(DomainError::NotFound)
        ));
        assert!(matches!(
            repo.promote_to_default(intruder, Uuid::new_v4()),
            Err(DomainError::NotFound)
        ));

        // The failed promotion must not have demoted the intruder's default.
        let rows = repo.list_for_user(intruder).expect("list failed");
        assert_eq!(defaults(&rows), vec!["Karaj"]);
        let rows = repo.list_for_user(owner).expect("list failed");
        assert!(defaults(&rows).is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_are_owner_scoped() {
        let (_container, pool) = setup_db().await;
        let repo = DieselAddressRepository::new(pool.clone());
        let owner = insert_user(&pool, "owner", false);
        let other = insert_user(&pool, "other", false);

        let address = repo
            .create(owner, new_address("Tehran", true))
            .expect("create failed");

        let mut fields = new_address("Isfahan", false).fields;
        assert!(matches!(
            repo.update(other, address.id, fields.clone()),
            Err(DomainError::NotFound)
        ));
        fields.postal_code = "9876543210".to_string();
        let updated = repo
            .update(owner, address.id, fields)
            .expect("update failed");
        assert_eq!(updated.city, "Isfahan");
        assert_eq!(updated.postal_code, "9876543210");
        assert!(updated.is_default);

        assert!(matches!(
            repo.delete(other, address.id),
            Err(DomainError::NotFound)
        ));
        repo.delete(owner, address.id).expect("delete failed");
        assert!(repo
            .find_for_user(owner, address.id)
            .expect("find failed")
            .is_none());
    }

    #[tokio::test]
    async fn concurrent_promotions_leave_exactly_one_default() {
        let (_container, pool) = setup_db().await;
        let user_id = insert_user(&pool, "sara", false);
        let repo = std::sync::Arc::new(DieselAddressRepository::new(pool.clone()));

        let mut ids = Vec::new();
        for i in 0..6 {
            let address = repo
                .create(user_id, new_address(&format!("City {i}"), i == 0))
                .expect("create failed");
            ids.push(address.id);
        }

        let handles: Vec<_> = ids
            .iter()
            .cycle()
            .take(24)
            .map(|&id| {
                let repo = repo.clone();
                std::thread::spawn(move || repo.promote_to_default(user_id, id))
            })
            .collect();
        for handle in handles {
            handle
                .join()
                .expect("thread panicked")
                .expect("promote failed");
        }

        let rows = repo.list_for_user(user_id).expect("list failed");
        assert_eq!(rows.iter().filter(|a| a.is_default).count(), 1);
    }
}
