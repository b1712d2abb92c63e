use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::addresses::AddressResponse;
use super::Purchases;
use crate::domain::errors::FieldError;
use crate::domain::identity::RequestContext;
use crate::domain::purchase::{NewPurchase, PurchaseItemInput, PurchaseItemView, PurchaseView};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseItemRequest {
    /// Product UUID.
    pub product: Uuid,
    /// Defaults to 1.
    pub quantity: Option<i32>,
    /// Unit price, as a JSON number or a decimal string, e.g. "9.99".
    /// Defaults to 0.
    #[serde(default, deserialize_with = "optional_decimal_text")]
    #[schema(value_type = Option<String>)]
    pub price: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseRequest {
    #[serde(default)]
    pub items: Vec<CreatePurchaseItemRequest>,
    /// Order total, as a JSON number or a decimal string. Stored as given.
    #[serde(deserialize_with = "decimal_text")]
    #[schema(value_type = String)]
    pub total: String,
    pub shipping_address_id: Option<Uuid>,
}

impl CreatePurchaseRequest {
    /// Parses the decimal strings, reporting every malformed field at once.
    fn into_domain(self) -> Result<NewPurchase, AppError> {
        let mut errors = Vec::new();

        let total = parse_decimal("total", &self.total, &mut errors);
        let items: Vec<PurchaseItemInput> = self
            .items
            .into_iter()
            .enumerate()
            .map(|(i, item)| PurchaseItemInput {
                product_id: item.product,
                quantity: item.quantity,
                price: item
                    .price
                    .as_deref()
                    .and_then(|p| parse_decimal(&format!("items[{i}].price"), p, &mut errors)),
            })
            .collect();

        match total {
            Some(total) if errors.is_empty() => Ok(NewPurchase {
                items,
                total,
                shipping_address_id: self.shipping_address_id,
            }),
            _ => Err(AppError::InvalidInput(errors)),
        }
    }
}

/// Decimals arrive either as strings or as plain JSON numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum DecimalText {
    Text(String),
    Number(serde_json::Number),
}

impl From<DecimalText> for String {
    fn from(value: DecimalText) -> Self {
        match value {
            DecimalText::Text(text) => text,
            DecimalText::Number(number) => number.to_string(),
        }
    }
}

fn decimal_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    DecimalText::deserialize(deserializer).map(String::from)
}

fn optional_decimal_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<DecimalText>::deserialize(deserializer)?.map(String::from))
}

/// Decodes a purchase payload. Runs after authentication so anonymous
/// callers see 401 whatever they send.
fn parse_body(body: &[u8]) -> Result<CreatePurchaseRequest, AppError> {
    serde_json::from_slice(body).map_err(|err| {
        log::warn!("Rejected purchase body: {}", err);
        AppError::InvalidInput(vec![FieldError::new("body", err.to_string())])
    })
}

fn parse_decimal(field: &str, raw: &str, errors: &mut Vec<FieldError>) -> Option<BigDecimal> {
    match BigDecimal::from_str(raw.trim()) {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(FieldError::new(
                field,
                format!("'{raw}' is not a decimal number"),
            ));
            None
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItemResponse {
    pub id: Uuid,
    pub product: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub price: String,
}

impl From<PurchaseItemView> for PurchaseItemResponse {
    fn from(item: PurchaseItemView) -> Self {
        Self {
            id: item.id,
            product: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            price: item.price.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub id: Uuid,
    pub user: UserSummary,
    pub items: Vec<PurchaseItemResponse>,
    pub total: String,
    pub created_at: String,
    pub shipping_address: Option<AddressResponse>,
}

impl From<PurchaseView> for PurchaseResponse {
    fn from(p: PurchaseView) -> Self {
        Self {
            id: p.id,
            user: UserSummary {
                id: p.user_id,
                username: p.username,
            },
            items: p.items.into_iter().map(PurchaseItemResponse::from).collect(),
            total: p.total.to_string(),
            created_at: p.created_at.to_rfc3339(),
            shipping_address: p.shipping_address.map(AddressResponse::from),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /purchases
///
/// Creates a purchase for the caller. The header and every line item are
/// written in one transaction; if any item fails nothing is stored.
#[utoipa::path(
    post,
    path = "/purchases",
    request_body = CreatePurchaseRequest,
    responses(
        (status = 201, description = "Purchase created", body = PurchaseResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Authentication required"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = [])),
    tag = "purchases"
)]
pub async fn create_purchase(
    service: web::Data<Purchases>,
    ctx: RequestContext,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    ctx.require_user()?;
    let input = parse_body(&body)?.into_domain()?;

    let purchase = web::block(move || service.create(&ctx, input)).await??;

    Ok(HttpResponse::Created().json(PurchaseResponse::from(purchase)))
}

/// GET /purchases
///
/// Staff see every purchase; other users see their own.
#[utoipa::path(
    get,
    path = "/purchases",
    responses(
        (status = 200, description = "Purchases visible to the caller", body = Vec<PurchaseResponse>),
        (status = 401, description = "Authentication required"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = [])),
    tag = "purchases"
)]
pub async fn list_purchases(
    service: web::Data<Purchases>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    let purchases = web::block(move || service.list(&ctx)).await??;

    let body: Vec<PurchaseResponse> = purchases.into_iter().map(PurchaseResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /purchases/{id}
#[utoipa::path(
    get,
    path = "/purchases/{id}",
    params(
        ("id" = Uuid, Path, description = "Purchase UUID"),
    ),
    responses(
        (status = 200, description = "Purchase found", body = PurchaseResponse),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Purchase not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = [])),
    tag = "purchases"
)]
pub async fn get_purchase(
    service: web::Data<Purchases>,
    ctx: RequestContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let purchase_id = path.into_inner();

    let purchase = web::block(move || service.get(&ctx, purchase_id)).await??;

    Ok(HttpResponse::Ok().json(PurchaseResponse::from(purchase)))
}
