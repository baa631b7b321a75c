use std::sync::Arc;

use askama_axum::IntoResponse;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap, StatusCode},
    routing::get,
    Router,
};
use axum_extra::extract::CookieJar;

use crate::{
    routes::{error::ErrorTemplate, my_profile::RedirectTo},
    AppState,
};

pub(crate) mod cookie;
pub(crate) mod header;

/// The identity of the caller behind the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CallerIdentity {
    pub(crate) id: Arc<str>,
}

impl CallerIdentity {
    pub(crate) fn new(id: impl Into<Arc<str>>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(thiserror::Error, Debug)]
pub(crate) enum AuthError {
    #[error("Identity header {header} does not contain a valid string: {source}")]
    MalformedIdentity {
        header: Arc<str>,
        #[source]
        source: axum::http::header::ToStrError,
    },
}

impl IntoResponse for AuthError {
    fn into_response(self) -> askama_axum::Response {
        tracing::error!("Error looking up current user: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, ErrorTemplate {}).into_response()
    }
}

/// Looks up who is making a request from the request's credentials.
#[async_trait]
pub(crate) trait AuthProvider: Send + Sync {
    /// Returns `None` when the request carries no (valid) credentials.
    async fn current_user(&self, headers: &HeaderMap) -> Result<Option<CallerIdentity>, AuthError>;
}

/// Extracts the result of the identity lookup without deciding anything about it.
pub(crate) struct CurrentUser(pub(crate) Option<CallerIdentity>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let identity = state.auth_provider.current_user(&parts.headers).await?;
        Ok(Self(identity))
    }
}

// Signature is not checked so tampered and foreign cookies are removed as well
async fn sign_out(jar: CookieJar) -> (CookieJar, RedirectTo) {
    (jar.remove(cookie::NAME), RedirectTo::Login)
}

pub(crate) fn create_router() -> Router<AppState> {
    Router::new().route("/signout", get(sign_out))
}
