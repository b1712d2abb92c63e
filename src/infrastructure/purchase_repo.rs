use std::collections::HashMap;

use bigdecimal::BigDecimal;
use diesel::dsl::max;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::address::AddressView;
use crate::domain::errors::DomainError;
use crate::domain::ports::{PurchaseRepository, PurchaseStore};
use crate::domain::purchase::{PurchaseHeader, PurchaseItemView, PurchaseView};
use crate::schema::{products, purchase_items, purchases, shipping_addresses, users};

use super::models::{AddressRow, NewPurchaseItemRow, NewPurchaseRow, PurchaseItemRow, PurchaseRow};

// ── Transactional store ──────────────────────────────────────────────────────

/// Writes issued through a connection that is already inside a transaction.
struct DieselPurchaseStore<'c> {
    conn: &'c mut PgConnection,
}

impl PurchaseStore for DieselPurchaseStore<'_> {
    fn create_purchase(
        &mut self,
        user_id: Uuid,
        total: &BigDecimal,
        shipping_address_id: Option<Uuid>,
    ) -> Result<PurchaseHeader, DomainError> {
        let row = diesel::insert_into(purchases::table)
            .values(&NewPurchaseRow {
                id: Uuid::new_v4(),
                user_id,
                total: total.clone(),
                shipping_address_id,
            })
            .returning(PurchaseRow::as_returning())
            .get_result(self.conn)?;

        log::debug!("Inserted purchase header {}", row.id);

        Ok(PurchaseHeader {
            id: row.id,
            user_id: row.user_id,
            total: row.total,
            shipping_address_id: row.shipping_address_id,
            created_at: row.created_at,
        })
    }

    fn add_item(
        &mut self,
        purchase_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        price: &BigDecimal,
    ) -> Result<PurchaseItemView, DomainError> {
        if quantity <= 0 {
            return Err(DomainError::invalid(
                "quantity",
                "must be a positive integer",
            ));
        }

        let last_line: Option<i32> = purchase_items::table
            .filter(purchase_items::purchase_id.eq(purchase_id))
            .select(max(purchase_items::line_number))
            .get_result(self.conn)?;

        let row = diesel::insert_into(purchase_items::table)
            .values(&NewPurchaseItemRow {
                id: Uuid::new_v4(),
                purchase_id,
                product_id,
                line_number: last_line.unwrap_or(0) + 1,
                quantity,
                price: price.clone(),
            })
            .returning(PurchaseItemRow::as_returning())
            .get_result(self.conn)?;

        let product_name = products::table
            .find(row.product_id)
            .select(products::name)
            .first::<String>(self.conn)?;

        Ok(PurchaseItemView {
            id: row.id,
            product_id: row.product_id,
            product_name,
            quantity: row.quantity,
            price: row.price,
        })
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselPurchaseRepository {
    pool: DbPool,
}

impl DieselPurchaseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl PurchaseRepository for DieselPurchaseRepository {
    fn transaction<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn PurchaseStore) -> Result<T, DomainError>,
    {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let mut store = DieselPurchaseStore { conn };
            f(&mut store)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<PurchaseView>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let rows = purchases::table
                .filter(purchases::id.eq(id))
                .select(PurchaseRow::as_select())
                .load(conn)?;
            Ok(assemble(conn, rows)?.pop())
        })
    }

    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<PurchaseView>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let rows = purchases::table
                .filter(purchases::user_id.eq(user_id))
                .select(PurchaseRow::as_select())
                .order((purchases::created_at.desc(), purchases::id))
                .load(conn)?;
            assemble(conn, rows)
        })
    }

    fn list_all(&self) -> Result<Vec<PurchaseView>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let rows = purchases::table
                .select(PurchaseRow::as_select())
                .order((purchases::created_at.desc(), purchases::id))
                .load(conn)?;
            assemble(conn, rows)
        })
    }
}

/// Resolves usernames, addresses and items for a batch of purchase rows,
/// keeping the order of `rows`.
fn assemble(
    conn: &mut PgConnection,
    rows: Vec<PurchaseRow>,
) -> Result<Vec<PurchaseView>, DomainError> {
    if rows.is_empty() {
        return Ok(vec![]);
    }

    let mut user_ids: Vec<Uuid> = rows.iter().map(|r| r.user_id).collect();
    user_ids.sort_unstable();
    user_ids.dedup();
    let address_ids: Vec<Uuid> = rows.iter().filter_map(|r| r.shipping_address_id).collect();

    let usernames: HashMap<Uuid, String> = users::table
        .filter(users::id.eq_any(user_ids))
        .select((users::id, users::username))
        .load::<(Uuid, String)>(conn)?
        .into_iter()
        .collect();

    let addresses: HashMap<Uuid, AddressView> = shipping_addresses::table
        .filter(shipping_addresses::id.eq_any(address_ids))
        .select(AddressRow::as_select())
        .load(conn)?
        .into_iter()
        .map(|a| (a.id, AddressView::from(a)))
        .collect();

    let purchase_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let item_rows: Vec<(PurchaseItemRow, String)> = purchase_items::table
        .inner_join(products::table)
        .filter(purchase_items::purchase_id.eq_any(purchase_ids))
        .select((PurchaseItemRow::as_select(), products::name))
        .order((purchase_items::purchase_id, purchase_items::line_number))
        .load(conn)?;

    let mut items: HashMap<Uuid, Vec<PurchaseItemView>> = HashMap::new();
    for (item, product_name) in item_rows {
        items.entry(item.purchase_id).or_default().push(PurchaseItemView {
            id: item.id,
            product_id: item.product_id,
            product_name,
            quantity: item.quantity,
            price: item.price,
        });
    }

    Ok(rows
        .into_iter()
        .map(|p| PurchaseView {
            id: p.id,
            user_id: p.user_id,
            username: usernames.get(&p.user_id).cloned().unwrap_or_default(),
            total: p.total,
            created_at: p.created_at,
            items: items.remove(&p.id).unwrap_or_default(),
            // Several purchases may share one address.
            shipping_address: p
                .shipping_address_id
                .and_then(|id| addresses.get(&id).cloned()),
        })
        .collect())
}
