use std::sync::Arc;

use axum::{
    async_trait,
    http::{HeaderMap, HeaderName},
};

use super::{AuthError, AuthProvider, CallerIdentity};

pub(crate) const DEFAULT_NAME: HeaderName = HeaderName::from_static("x-forwarded-user");

/// Trusts the identity an authenticating reverse proxy puts into a request header.
///
/// Only use this behind a proxy that strips the header from incoming requests.
pub(crate) struct TrustedHeaderProvider {
    name: HeaderName,
}

impl TrustedHeaderProvider {
    pub(crate) fn new(name: HeaderName) -> Self {
        Self { name }
    }
}

#[async_trait]
impl AuthProvider for TrustedHeaderProvider {
    async fn current_user(&self, headers: &HeaderMap) -> Result<Option<CallerIdentity>, AuthError> {
        let Some(value) = headers.get(&self.name) else {
            return Ok(None);
        };

        let value = value
            .to_str()
            .map_err(|source| AuthError::MalformedIdentity {
                header: Arc::from(self.name.as_str()),
                source,
            })?
            .trim();

        if value.is_empty() {
            tracing::warn!("Expected {} header to contain a user id", self.name);
            return Ok(None);
        }

        Ok(Some(CallerIdentity::new(value)))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: HeaderValue) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(DEFAULT_NAME, value);
        headers
    }

    #[tokio::test]
    async fn header_value_is_the_user() {
        let provider = TrustedHeaderProvider::new(DEFAULT_NAME);

        let identity = provider
            .current_user(&headers(HeaderValue::from_static(" abc123 ")))
            .await
            .unwrap();

        assert_eq!(identity, Some(CallerIdentity::new("abc123")));
    }

    #[tokio::test]
    async fn missing_or_empty_header_is_nobody() {
        let provider = TrustedHeaderProvider::new(DEFAULT_NAME);

        let missing = provider.current_user(&HeaderMap::new()).await.unwrap();
        let empty = provider
            .current_user(&headers(HeaderValue::from_static("  ")))
            .await
            .unwrap();

        assert_eq!(missing, None);
        assert_eq!(empty, None);
    }

    #[tokio::test]
    async fn custom_header_name() {
        let provider = TrustedHeaderProvider::new(HeaderName::from_static("x-auth-request-user"));
        let mut headers = HeaderMap::new();
        headers.insert("x-auth-request-user", HeaderValue::from_static("u-42"));

        let identity = provider.current_user(&headers).await.unwrap();

        assert_eq!(identity, Some(CallerIdentity::new("u-42")));
    }

    #[tokio::test]
    async fn opaque_header_is_an_error() {
        let provider = TrustedHeaderProvider::new(DEFAULT_NAME);
        let value = HeaderValue::from_bytes(&[0xfa, 0xfb]).unwrap();

        let result = provider.current_user(&headers(value)).await;

        assert!(matches!(result, Err(AuthError::MalformedIdentity { .. })));
    }
}
