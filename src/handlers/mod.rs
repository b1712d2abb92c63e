pub mod addresses;
pub mod auth;
pub mod purchases;

use actix_web::web;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::application::address_service::AddressService;
use crate::application::purchase_service::PurchaseService;
use crate::domain::errors::FieldError;
use crate::errors::AppError;
use crate::infrastructure::address_repo::DieselAddressRepository;
use crate::infrastructure::purchase_repo::DieselPurchaseRepository;

pub type Purchases = PurchaseService<DieselPurchaseRepository>;
pub type Addresses = AddressService<DieselAddressRepository>;

/// Registers every route under the given config.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/purchases")
            .route("", web::post().to(purchases::create_purchase))
            .route("", web::get().to(purchases::list_purchases))
            .route("/{id}", web::get().to(purchases::get_purchase)),
    )
    .service(
        web::scope("/shipping-addresses")
            .route("", web::get().to(addresses::list_addresses))
            .route("", web::post().to(addresses::create_address))
            .route("/{id}", web::get().to(addresses::get_address))
            .route("/{id}", web::put().to(addresses::update_address))
            .route("/{id}", web::delete().to(addresses::delete_address))
            .route(
                "/{id}/set-default",
                web::post().to(addresses::set_default_address),
            ),
    );
}

/// Malformed JSON bodies are reported as field errors rather than plain text.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("Rejected request body: {}", err);
        AppError::InvalidInput(vec![FieldError::new("body", err.to_string())]).into()
    })
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        purchases::create_purchase,
        purchases::list_purchases,
        purchases::get_purchase,
        addresses::list_addresses,
        addresses::create_address,
        addresses::get_address,
        addresses::update_address,
        addresses::delete_address,
        addresses::set_default_address,
    ),
    components(schemas(
        purchases::CreatePurchaseRequest,
        purchases::CreatePurchaseItemRequest,
        purchases::PurchaseResponse,
        purchases::PurchaseItemResponse,
        purchases::UserSummary,
        addresses::CreateAddressRequest,
        addresses::UpdateAddressRequest,
        addresses::AddressResponse,
        FieldError,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "purchases", description = "Purchases and their line items"),
        (name = "shipping-addresses", description = "The caller's shipping addresses"),
    )
)]
pub struct ApiDoc;
