use std::{io, net::SocketAddr, process::ExitCode, sync::Arc};

use auth::{
    cookie::SessionCookieProvider,
    header::TrustedHeaderProvider,
    AuthProvider,
};
use axum::{routing::get, Router};
use configuration::{Configuration, ProviderConfiguration};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

mod auth;
mod configuration;
mod routes;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_provider: Arc<dyn AuthProvider>,
}

impl AppState {
    pub(crate) fn new(auth_provider: Arc<dyn AuthProvider>) -> Self {
        Self { auth_provider }
    }
}

pub(crate) fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/me", get(routes::my_profile::get_my_profile_page))
        .merge(auth::create_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(thiserror::Error, Debug)]
enum StartupError {
    #[error("Error loading configuration: {0}")]
    Configuration(#[from] configuration::Error),
    #[error("Error binding to {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("Error serving requests: {0}")]
    Serve(#[source] io::Error),
}

fn create_state(provider: ProviderConfiguration) -> AppState {
    match provider {
        ProviderConfiguration::Session { key } => {
            tracing::info!("Identifying callers by session cookie");
            AppState::new(Arc::new(SessionCookieProvider::new(key)))
        }
        ProviderConfiguration::Header { name } => {
            tracing::info!("Identifying callers by {} header", name);
            AppState::new(Arc::new(TrustedHeaderProvider::new(name)))
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let Configuration { address, provider } = Configuration::from_env()?;
    let app = create_router(create_state(provider));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;
    tracing::info!("listening on http://{}", address);

    axum::serve(listener, app)
        .await
        .map_err(StartupError::Serve)
}

#[tokio::main]
async fn main() -> ExitCode {
    // The .env file is optional
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{}", error);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_errors_read_as_sentences() {
        let error = StartupError::from(configuration::Error::MissingSigningKey);

        assert_eq!(
            error.to_string(),
            "Error loading configuration: SESSION_SIGNING_KEY must be set when using the session provider"
        );
    }

    #[test]
    fn bind_error_names_the_address() {
        let error = StartupError::Bind {
            address: "127.0.0.1:3000".parse().unwrap(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        };

        assert_eq!(
            error.to_string(),
            "Error binding to 127.0.0.1:3000: address in use"
        );
    }
}
