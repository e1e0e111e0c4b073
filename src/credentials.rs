use std::env::{self, VarError};
use std::fmt;

use clap::ValueEnum;
use thiserror::Error;

/// Prefix of the environment variables holding the credentials.
const ENV_VAR_PREFIX: &str = "TOKEN_CACHE";

/// Selects which set of credentials (and which TLS policy) applies.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[value(name = "testing")]
    Testing,
    #[default]
    #[value(name = "production")]
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    fn var_infix(&self) -> &'static str {
        match self {
            Environment::Testing => "TESTING",
            Environment::Production => "PRODUCTION",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Testing => write!(f, "testing"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct ClientSecret(String);

impl<S: AsRef<str>> From<S> for ClientSecret {
    fn from(secret: S) -> Self {
        ClientSecret(secret.as_ref().to_string())
    }
}

impl ClientSecret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClientSecret: redacted")
    }
}

#[derive(Clone, PartialEq)]
pub struct Password(String);

impl<S: AsRef<str>> From<S> for Password {
    fn from(password: S) -> Self {
        Password(password.as_ref().to_string())
    }
}

impl Password {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password: redacted")
    }
}

/// Long-lived secret material exchanged for an access token.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: ClientSecret,
    pub username: String,
    pub password: Password,
}

#[derive(Error, Debug, PartialEq)]
pub enum CredentialsError {
    #[error("missing credential variable `{0}`")]
    Missing(String),
    #[error("invalid credential variable `{0}`: `{1}`")]
    Invalid(String, String),
}

/// Supplies the credentials for a given environment.
pub trait CredentialsProvider {
    fn credentials(&self, environment: Environment) -> Result<Credentials, CredentialsError>;
}

impl CredentialsProvider for Credentials {
    fn credentials(&self, _environment: Environment) -> Result<Credentials, CredentialsError> {
        Ok(self.clone())
    }
}

type EnvLookup = fn(&str) -> Result<String, VarError>;

fn process_env(key: &str) -> Result<String, VarError> {
    env::var(key)
}

/// Reads `TOKEN_CACHE_<ENV>_{CLIENT_ID,CLIENT_SECRET,USERNAME,PASSWORD}` where `<ENV>` is
/// `TESTING` or `PRODUCTION`.
///
/// Nothing is read until credentials are requested, and nothing is kept afterwards.
pub struct EnvCredentialsProvider<F = EnvLookup> {
    env_var: F,
}

impl EnvCredentialsProvider {
    pub fn new() -> Self {
        Self {
            env_var: process_env,
        }
    }
}

impl Default for EnvCredentialsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> EnvCredentialsProvider<F>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    /// Uses `env_var` instead of the process environment to look variables up.
    pub fn with_lookup(env_var: F) -> Self {
        Self { env_var }
    }

    pub fn var_name(environment: Environment, field: &str) -> String {
        format!("{ENV_VAR_PREFIX}_{}_{field}", environment.var_infix())
    }

    fn required(&self, environment: Environment, field: &str) -> Result<String, CredentialsError> {
        let name = Self::var_name(environment, field);
        match (self.env_var)(&name) {
            Ok(value) if !value.is_empty() => Ok(value),
            Ok(_) | Err(VarError::NotPresent) => Err(CredentialsError::Missing(name)),
            Err(e @ VarError::NotUnicode(_)) => Err(CredentialsError::Invalid(name, e.to_string())),
        }
    }
}

impl<F> CredentialsProvider for EnvCredentialsProvider<F>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    fn credentials(&self, environment: Environment) -> Result<Credentials, CredentialsError> {
        Ok(Credentials {
            client_id: self.required(environment, "CLIENT_ID")?,
            client_secret: self.required(environment, "CLIENT_SECRET")?.into(),
            username: self.required(environment, "USERNAME")?,
            password: self.required(environment, "PASSWORD")?.into(),
        })
    }
}

impl<F> fmt::Debug for EnvCredentialsProvider<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvCredentialsProvider").finish_non_exhaustive()
    }
}
