// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::UserRole,
};

/// 1. O Trait que define quais papéis passam pelo guardião
pub trait RoleDef: Send + Sync + 'static {
    fn name() -> &'static str;
    fn allows(role: UserRole) -> bool;
}

/// 2. O Extractor (Guardião). Depende do `auth_guard` ter rodado antes.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !T::allows(user.role) {
            tracing::warn!(
                "Acesso negado: usuário {} ({}) precisa do papel '{}'",
                user.id,
                user.role.as_str(),
                T::name()
            );
            let app_state = AppState::from_ref(state);
            let locale = Locale::from_parts(parts);
            return Err(AppError::InsufficientRole(T::name()).to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS (TIPOS)
// ---

pub struct Admin;
impl RoleDef for Admin {
    fn name() -> &'static str { "admin" }
    fn allows(role: UserRole) -> bool {
        role == UserRole::Admin
    }
}
