use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Addresses;
use crate::domain::address::{AddressFields, AddressView};
use crate::domain::identity::RequestContext;
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressRequest {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub phone_number: String,
    /// Makes this the caller's default address, demoting the previous one.
    #[serde(default)]
    pub is_default: bool,
}

/// Text fields only; the default flag changes through `set-default`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAddressRequest {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub phone_number: String,
}

impl From<UpdateAddressRequest> for AddressFields {
    fn from(req: UpdateAddressRequest) -> Self {
        AddressFields {
            address: req.address,
            city: req.city,
            postal_code: req.postal_code,
            phone_number: req.phone_number,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponse {
    pub id: Uuid,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub phone_number: String,
    pub is_default: bool,
    pub created_at: String,
}

impl From<AddressView> for AddressResponse {
    fn from(a: AddressView) -> Self {
        Self {
            id: a.id,
            address: a.address,
            city: a.city,
            postal_code: a.postal_code,
            phone_number: a.phone_number,
            is_default: a.is_default,
            created_at: a.created_at.to_rfc3339(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /shipping-addresses
///
/// Lists the caller's addresses, oldest first.
#[utoipa::path(
    get,
    path = "/shipping-addresses",
    responses(
        (status = 200, description = "The caller's addresses", body = Vec<AddressResponse>),
        (status = 401, description = "Authentication required"),
    ),
    security(("bearer_auth" = [])),
    tag = "shipping-addresses"
)]
pub async fn list_addresses(
    service: web::Data<Addresses>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    let addresses = web::block(move || service.list(&ctx)).await??;

    let body: Vec<AddressResponse> = addresses.into_iter().map(AddressResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /shipping-addresses
#[utoipa::path(
    post,
    path = "/shipping-addresses",
    request_body = CreateAddressRequest,
    responses(
        (status = 201, description = "Address created", body = AddressResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Authentication required"),
    ),
    security(("bearer_auth" = [])),
    tag = "shipping-addresses"
)]
pub async fn create_address(
    service: web::Data<Addresses>,
    ctx: RequestContext,
    body: web::Json<CreateAddressRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let is_default = body.is_default;
    let fields = AddressFields {
        address: body.address,
        city: body.city,
        postal_code: body.postal_code,
        phone_number: body.phone_number,
    };

    let address = web::block(move || service.create(&ctx, fields, is_default)).await??;

    Ok(HttpResponse::Created().json(AddressResponse::from(address)))
}

/// GET /shipping-addresses/{id}
#[utoipa::path(
    get,
    path = "/shipping-addresses/{id}",
    params(("id" = Uuid, Path, description = "Address UUID")),
    responses(
        (status = 200, description = "Address found", body = AddressResponse),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "No such address for the caller"),
    ),
    security(("bearer_auth" = [])),
    tag = "shipping-addresses"
)]
pub async fn get_address(
    service: web::Data<Addresses>,
    ctx: RequestContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let address = web::block(move || service.get(&ctx, id)).await??;

    Ok(HttpResponse::Ok().json(AddressResponse::from(address)))
}

/// PUT /shipping-addresses/{id}
#[utoipa::path(
    put,
    path = "/shipping-addresses/{id}",
    params(("id" = Uuid, Path, description = "Address UUID")),
    request_body = UpdateAddressRequest,
    responses(
        (status = 200, description = "Address updated", body = AddressResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "No such address for the caller"),
    ),
    security(("bearer_auth" = [])),
    tag = "shipping-addresses"
)]
pub async fn update_address(
    service: web::Data<Addresses>,
    ctx: RequestContext,
    path: web::Path<Uuid>,
    body: web::Json<UpdateAddressRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let fields = AddressFields::from(body.into_inner());

    let address = web::block(move || service.update(&ctx, id, fields)).await??;

    Ok(HttpResponse::Ok().json(AddressResponse::from(address)))
}

/// DELETE /shipping-addresses/{id}
///
/// Purchases that used the address keep existing without one.
#[utoipa::path(
    delete,
    path = "/shipping-addresses/{id}",
    params(("id" = Uuid, Path, description = "Address UUID")),
    responses(
        (status = 204, description = "Address deleted"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "No such address for the caller"),
    ),
    security(("bearer_auth" = [])),
    tag = "shipping-addresses"
)]
pub async fn delete_address(
    service: web::Data<Addresses>,
    ctx: RequestContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    web::block(move || service.delete(&ctx, id)).await??;

    Ok(HttpResponse::NoContent().finish())
}

/// POST /shipping-addresses/{id}/set-default
#[utoipa::path(
    post,
    path = "/shipping-addresses/{id}/set-default",
    params(("id" = Uuid, Path, description = "Address UUID")),
    responses(
        (status = 200, description = "Address is now the default", body = AddressResponse),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "No such address for the caller"),
    ),
    security(("bearer_auth" = [])),
    tag = "shipping-addresses"
)]
pub async fn set_default_address(
    service: web::Data<Addresses>,
    ctx: RequestContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let address = web::block(move || service.set_default(&ctx, id)).await??;

    Ok(HttpResponse::Ok().json(AddressResponse::from(address)))
}
