//! CLI command implementations.

pub mod menu;
pub mod orders;
pub mod seed;

use bistro_storefront::backend::{AdminLoginRequest, ApiError, BackendClient};
use bistro_storefront::config::{ConfigError, StorefrontConfig};
use secrecy::SecretString;
use thiserror::Error;

/// Environment variable holding the admin login email.
pub const ADMIN_EMAIL_VAR: &str = "BISTRO_ADMIN_EMAIL";

/// Environment variable holding the admin login password.
pub const ADMIN_PASSWORD_VAR: &str = "BISTRO_ADMIN_PASSWORD";

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Bad command-line input or seed file contents.
    #[error("{0}")]
    Invalid(String),
}

/// Build a backend client from the storefront's environment configuration.
///
/// # Errors
///
/// Returns an error if `BACKEND_API_URL` is missing or the client cannot be
/// built.
pub fn connect() -> Result<BackendClient, CliError> {
    let config = StorefrontConfig::from_env()?;
    Ok(BackendClient::new(&config.backend)?)
}

/// Log in as admin with the credentials from the environment.
///
/// # Errors
///
/// Returns an error if the credentials are missing or refused.
pub async fn admin_token(client: &BackendClient) -> Result<SecretString, CliError> {
    let email = env_var(ADMIN_EMAIL_VAR)?;
    let password = env_var(ADMIN_PASSWORD_VAR)?;

    let response = client
        .admin_login(&AdminLoginRequest { email, password })
        .await?;
    response
        .token
        .map(SecretString::from)
        .ok_or(CliError::Api(ApiError::MissingField("token")))
}

fn env_var(key: &'static str) -> Result<String, CliError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(CliError::MissingEnvVar(key))
}
