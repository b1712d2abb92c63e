use std::future::Future;
use std::pin::Pin;

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};

use crate::domain::identity::RequestContext;
use crate::domain::ports::IdentityProvider;
use crate::errors::AppError;

/// Extracts the token from an `Authorization: Bearer <token>` header.
fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

/// Builds the caller context for a request. A missing or unknown token
/// produces an anonymous context; services decide whether that is allowed.
impl FromRequest for RequestContext {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let provider = req.app_data::<web::Data<dyn IdentityProvider>>().cloned();

        Box::pin(async move {
            let Some(token) = token else {
                return Ok(RequestContext::anonymous());
            };
            let provider = provider.ok_or_else(|| {
                AppError::Internal("identity provider is not registered".to_string())
            })?;

            let identity = web::block(move || provider.resolve_token(&token)).await??;
            if identity.is_none() {
                log::warn!("Rejected unknown bearer token");
            }
            Ok(RequestContext {
                current_user: identity,
            })
        })
    }
}
