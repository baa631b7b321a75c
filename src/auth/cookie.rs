use axum::{async_trait, http::HeaderMap};
use axum_extra::extract::{
    cookie::{Cookie, Key as AxumKey},
    SignedCookieJar,
};
use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

use super::{AuthError, AuthProvider, CallerIdentity};

pub(super) const NAME: &str = "session";

/// Key used to sign and verify the session cookie.
#[derive(Clone)]
pub(crate) struct Key(AxumKey);

impl Key {
    #[cfg(test)]
    pub(crate) fn try_generate() -> Option<Self> {
        AxumKey::try_generate().map(Self)
    }
}

impl TryFrom<&[u8]> for Key {
    type Error = ::cookie::KeyError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        AxumKey::try_from(bytes).map(Self)
    }
}

#[derive(Deserialize, Serialize, Debug)]
struct Session {
    #[serde(with = "time::serde::timestamp")]
    expires_at: OffsetDateTime,
    user_id: String,
}

impl Session {
    fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }
}

#[derive(Error, Debug)]
enum Error {
    #[error("Bad cookie encoding: {0}")]
    BadCookieEncoding(#[from] base64::DecodeError),
    #[error("Bad cookie: {0}")]
    BadCookieFormat(#[from] postcard::Error),
}

impl<'a, 'c> TryFrom<&'a Cookie<'c>> for Session {
    type Error = Error;

    fn try_from(cookie: &'a Cookie<'c>) -> Result<Self, Self::Error> {
        let encoded = cookie.value();
        let serialized = BASE64_URL_SAFE_NO_PAD.decode(encoded)?;
        let value = postcard::from_bytes(&serialized)?;
        Ok(value)
    }
}

/// Reads the caller from the signed session cookie issued by the sign in service.
pub(crate) struct SessionCookieProvider {
    key: Key,
}

impl SessionCookieProvider {
    pub(crate) fn new(key: Key) -> Self {
        Self { key }
    }
}

#[async_trait]
impl AuthProvider for SessionCookieProvider {
    async fn current_user(&self, headers: &HeaderMap) -> Result<Option<CallerIdentity>, AuthError> {
        // Cookies with an invalid signature are dropped by the jar
        let jar: SignedCookieJar = SignedCookieJar::from_headers(headers, self.key.0.clone());
        let Some(cookie) = jar.get(NAME) else {
            return Ok(None);
        };

        let session = match Session::try_from(&cookie) {
            Ok(session) => session,
            Err(error) => {
                tracing::warn!("Ignoring unreadable session cookie: {}", error);
                return Ok(None);
            }
        };

        if session.is_expired() {
            tracing::debug!("Session for {} expired", session.user_id);
            return Ok(None);
        }

        Ok(Some(CallerIdentity::new(session.user_id)))
    }
}
