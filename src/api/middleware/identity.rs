//! Bearer token extractors
//!
//! `RequireIdentity` accepts any valid token. `RequireRole<P>` additionally
//! checks the identity against the role policy `P`.

use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::{Identity, RoleGuard};

/// Extractor that requires a valid bearer token
#[derive(Debug, Clone)]
pub struct RequireIdentity(pub Identity);

impl FromRequestParts<AppState> for RequireIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;
        let identity = state.auth_service.authenticate(token)?;

        Ok(RequireIdentity(identity))
    }
}

/// Static role policy for `RequireRole`
pub trait RolePolicy: Send + Sync + 'static {
    fn guard() -> RoleGuard;
}

/// Only administrators
#[derive(Debug, Clone, Copy)]
pub struct AdminOnly;

impl RolePolicy for AdminOnly {
    fn guard() -> RoleGuard {
        RoleGuard::admin_only()
    }
}

/// Extractor that requires a valid bearer token whose roles satisfy `P`
#[derive(Debug, Clone)]
pub struct RequireRole<P: RolePolicy>(pub Identity, PhantomData<fn() -> P>);

impl<P: RolePolicy> RequireRole<P> {
    pub fn identity(&self) -> &Identity {
        &self.0
    }
}

impl<P: RolePolicy> FromRequestParts<AppState> for RequireRole<P> {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireIdentity(identity) = RequireIdentity::from_request_parts(parts, state).await?;

        state.auth_service.authorize(&identity, &P::guard())?;

        Ok(RequireRole(identity, PhantomData))
    }
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Err(ApiError::missing_token());
    };

    let value = value
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?;

    let token = value
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("Bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty());

    token.ok_or_else(ApiError::missing_token)
}
