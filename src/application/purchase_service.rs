use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::errors::{DomainError, FieldError};
use crate::domain::identity::RequestContext;
use crate::domain::ports::PurchaseRepository;
use crate::domain::purchase::{NewPurchase, PurchaseView};

/// Largest absolute amount a NUMERIC(10, 2) column holds, exclusive.
const MONEY_LIMIT: i64 = 100_000_000;
const MONEY_SCALE: i64 = 2;

pub struct PurchaseService<R> {
    repo: R,
}

impl<R: PurchaseRepository> PurchaseService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a purchase header and one item per cart entry in a single
    /// transaction, then returns the stored purchase.
    ///
    /// The total is stored exactly as supplied. A shipping address id is
    /// attached without checking who owns it.
    pub fn create(
        &self,
        ctx: &RequestContext,
        input: NewPurchase,
    ) -> Result<PurchaseView, DomainError> {
        let user = ctx.require_user()?;
        validate(&input)?;

        let user_id = user.user_id;
        let purchase_id = self.repo.transaction(|store| {
            let header = store.create_purchase(user_id, &input.total, input.shipping_address_id)?;
            for item in &input.items {
                store.add_item(header.id, item.product_id, item.quantity(), &item.price())?;
            }
            Ok(header.id)
        })?;

        log::info!(
            "Purchase {} created for user {} with {} item(s), total {}",
            purchase_id,
            user.username,
            input.items.len(),
            input.total
        );

        self.repo.find_by_id(purchase_id)?.ok_or_else(|| {
            DomainError::Internal(format!("purchase {purchase_id} vanished after commit"))
        })
    }

    /// Elevated callers see every purchase, everyone else only their own.
    pub fn list(&self, ctx: &RequestContext) -> Result<Vec<PurchaseView>, DomainError> {
        let user = ctx.require_user()?;
        if user.is_elevated {
            self.repo.list_all()
        } else {
            self.repo.list_for_user(user.user_id)
        }
    }

    /// Returns `NotFound` for purchases the caller may not see, so their
    /// existence is not revealed.
    pub fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<PurchaseView, DomainError> {
        let user = ctx.require_user()?;
        match self.repo.find_by_id(id)? {
            Some(purchase) if user.is_elevated || purchase.user_id == user.user_id => Ok(purchase),
            _ => Err(DomainError::NotFound),
        }
    }
}

fn validate(input: &NewPurchase) -> Result<(), DomainError> {
    let mut errors = Vec::new();

    check_money("total", &input.total, &mut errors);
    for (i, item) in input.items.iter().enumerate() {
        if let Some(quantity) = item.quantity {
            if quantity <= 0 {
                errors.push(FieldError::new(
                    format!("items[{i}].quantity"),
                    "must be a positive integer",
                ));
            }
        }
        if let Some(price) = &item.price {
            check_money(&format!("items[{i}].price"), price, &mut errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(DomainError::InvalidInput(errors))
    }
}

fn check_money(field: &str, amount: &BigDecimal, errors: &mut Vec<FieldError>) {
    if *amount < BigDecimal::from(0) {
        errors.push(FieldError::new(field, "must not be negative"));
    } else if *amount >= BigDecimal::from(MONEY_LIMIT) {
        errors.push(FieldError::new(field, "must be less than 100000000"));
    } else if amount.normalized().as_bigint_and_exponent().1 > MONEY_SCALE {
        errors.push(FieldError::new(field, "must have at most 2 decimal places"));
    }
}
