use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::identity::Identity;
use crate::domain::ports::IdentityProvider;
use crate::schema::users;

use super::models::UserRow;

/// Looks bearer tokens up in the `users` table.
pub struct DieselIdentityProvider {
    pool: DbPool,
}

impl DieselIdentityProvider {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl IdentityProvider for DieselIdentityProvider {
    fn resolve_token(&self, token: &str) -> Result<Option<Identity>, DomainError> {
        let mut conn = self.pool.get()?;

        let user = users::table
            .filter(users::api_token.eq(token))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(user.map(Identity::from))
    }
}

#[cfg(test)]
mod tests {
    use super::DieselIdentityProvider;
    use crate::domain::ports::IdentityProvider;
    use crate::infrastructure::test_support::{insert_user, setup_db};

    #[tokio::test]
    async fn resolves_known_tokens_only() {
        let (_container, pool) = setup_db().await;
        let provider = DieselIdentityProvider::new(pool.clone());
        let staff_id = insert_user(&pool, "admin", true);
        insert_user(&pool, "sara", false);

        let admin = provider
            .resolve_token("token-admin")
            .expect("lookup failed")
            .expect("token should resolve");
        assert_eq!(admin.user_id, staff_id);
        assert!(admin.is_elevated);

        let sara = provider
            .resolve_token("token-sara")
            .expect("lookup failed")
            .expect("token should resolve");
        assert!(!sara.is_elevated);

        assert!(provider
            .resolve_token("token-nobody")
            .expect("lookup failed")
            .is_none());
    }
}
