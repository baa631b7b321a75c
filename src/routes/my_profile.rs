use std::sync::Arc;

use askama_axum::{IntoResponse, Response};
use axum::http::{header, HeaderValue, StatusCode};

use crate::{
    auth::{CallerIdentity, CurrentUser},
    routes::error::ErrorTemplate,
};

pub(crate) const LOGIN_PATH: &str = "/login";

/// Where a request ends up. Returning one of these ends the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RedirectTo {
    Login,
    Profile(Arc<str>),
}

impl RedirectTo {
    pub(crate) fn for_identity(identity: Option<&CallerIdentity>) -> Self {
        let Some(identity) = identity else {
            return Self::Login;
        };

        Self::Profile(identity.id.clone())
    }

    /// The id is put into the path as is.
    pub(crate) fn location(&self) -> String {
        match self {
            Self::Login => LOGIN_PATH.to_owned(),
            Self::Profile(id) => format!("/profile/{id}"),
        }
    }
}

impl IntoResponse for RedirectTo {
    fn into_response(self) -> Response {
        let location = self.location();
        match HeaderValue::try_from(&location) {
            Ok(location) => (StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response(),
            Err(error) => {
                tracing::error!("Can't redirect to {:?}: {}", location, error);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorTemplate {}).into_response()
            }
        }
    }
}

pub(crate) async fn get_my_profile_page(CurrentUser(identity): CurrentUser) -> RedirectTo {
    let redirect = RedirectTo::for_identity(identity.as_ref());
    tracing::debug!("Redirecting to {}", redirect.location());
    redirect
}
