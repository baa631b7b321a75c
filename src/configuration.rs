use std::{
    env,
    net::{AddrParseError, SocketAddr},
};

use axum::http::{header::InvalidHeaderName, HeaderName};
use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use thiserror::Error;

use crate::auth::{cookie::Key, header};

const LISTEN_ADDRESS: &str = "LISTEN_ADDRESS";
const AUTH_PROVIDER: &str = "AUTH_PROVIDER";
const SESSION_SIGNING_KEY: &str = "SESSION_SIGNING_KEY";
const IDENTITY_HEADER: &str = "IDENTITY_HEADER";

const DEFAULT_ADDRESS: &str = "127.0.0.1:3000";

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("Invalid LISTEN_ADDRESS {value:?}: {source}")]
    InvalidAddress {
        value: String,
        #[source]
        source: AddrParseError,
    },
    #[error("Unknown AUTH_PROVIDER {0:?}, expected \"session\" or \"header\"")]
    UnknownProvider(String),
    #[error("SESSION_SIGNING_KEY must be set when using the session provider")]
    MissingSigningKey,
    #[error("Error decoding SESSION_SIGNING_KEY: {0}")]
    SigningKeyEncoding(#[from] base64::DecodeError),
    #[error("Invalid SESSION_SIGNING_KEY: {0}")]
    SigningKey(#[from] ::cookie::KeyError),
    #[error("Invalid IDENTITY_HEADER: {0}")]
    IdentityHeader(#[from] InvalidHeaderName),
}

/// How callers are identified.
pub(crate) enum ProviderConfiguration {
    /// Signed session cookie
    Session { key: Key },
    /// Header set by an authenticating reverse proxy
    Header { name: HeaderName },
}

pub(crate) struct Configuration {
    pub(crate) address: SocketAddr,
    pub(crate) provider: ProviderConfiguration,
}

impl Configuration {
    /// Reads the configuration from environment variables. Call [`dotenvy::dotenv`] first to
    /// pick up a `.env` file.
    pub(crate) fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|variable| env::var(variable).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let address = lookup(LISTEN_ADDRESS).unwrap_or_else(|| DEFAULT_ADDRESS.to_owned());
        let address: SocketAddr = address
            .parse()
            .map_err(|source| Error::InvalidAddress {
                value: address.clone(),
                source,
            })?;

        let provider = match lookup(AUTH_PROVIDER).as_deref() {
            None | Some("session") => {
                let encoded = lookup(SESSION_SIGNING_KEY).ok_or(Error::MissingSigningKey)?;
                let bytes = BASE64_URL_SAFE_NO_PAD.decode(encoded.trim())?;
                let key = Key::try_from(bytes.as_slice())?;
                ProviderConfiguration::Session { key }
            }
            Some("header") => {
                let name = match lookup(IDENTITY_HEADER) {
                    Some(name) => HeaderName::try_from(name.trim())?,
                    None => header::DEFAULT_NAME,
                };
                ProviderConfiguration::Header { name }
            }
            Some(other) => return Err(Error::UnknownProvider(other.to_owned())),
        };

        Ok(Self { address, provider })
    }
}
