use std::path::PathBuf;

use http::Uri;
use thiserror::Error;
use tracing::debug;

use crate::authenticator::HttpAuthenticator;
use crate::credentials::{CredentialsProvider, Environment};
use crate::http::client::{HttpBuildError, HttpClient};
use crate::http::config::{HttpConfig, TlsVerification};
use crate::manager::TokenManager;
use crate::store::Slot;
use crate::store::file::FileStore;
use crate::validator::HttpValidator;

/// Directory holding the slot files when none is configured.
pub const DEFAULT_STORE_DIR: &str = "tokens";

/// Token manager talking to the service over HTTP and caching in plain files.
pub type HttpTokenManager<P> =
    TokenManager<FileStore, HttpValidator<HttpClient>, HttpAuthenticator<HttpClient>, P>;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("{0} url `{1}` must use https in production")]
    InsecureUrl(&'static str, String),
    #[error("TLS verification cannot be disabled in production")]
    InsecureTlsInProduction,
    #[error("{0}")]
    HttpClient(#[from] HttpBuildError),
}

/// Everything needed to build an [`HttpTokenManager`].
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerSettings {
    pub slot: Slot,
    pub validation_uri: Uri,
    pub token_uri: Uri,
    pub environment: Environment,
    pub store_dir: PathBuf,
    pub http: HttpConfig,
}

impl ManagerSettings {
    pub fn new(slot: Slot, validation_uri: Uri, token_uri: Uri, environment: Environment) -> Self {
        Self {
            slot,
            validation_uri,
            token_uri,
            environment,
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            http: HttpConfig::default(),
        }
    }

    pub fn with_store_dir(self, store_dir: PathBuf) -> Self {
        Self { store_dir, ..self }
    }

    pub fn with_http_config(self, http: HttpConfig) -> Self {
        Self { http, ..self }
    }

    /// Production settings must keep tokens and credentials on verified, encrypted channels.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.environment.is_production() {
            return Ok(());
        }
        if self.http.tls_verification() == TlsVerification::Disabled {
            return Err(SettingsError::InsecureTlsInProduction);
        }
        for (name, uri) in [("validation", &self.validation_uri), ("token", &self.token_uri)] {
            if uri.scheme_str() != Some("https") {
                return Err(SettingsError::InsecureUrl(name, uri.to_string()));
            }
        }
        Ok(())
    }
}

impl<P> HttpTokenManager<P>
where
    P: CredentialsProvider,
{
    pub fn try_from_settings(
        settings: ManagerSettings,
        credentials: P,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;

        debug!(
            slot = %settings.slot,
            environment = %settings.environment,
            store_dir = %settings.store_dir.display(),
            "building token manager"
        );

        let http_client = HttpClient::new(&settings.http)?;

        Ok(TokenManager::new(
            settings.slot,
            settings.environment,
            FileStore::new(settings.store_dir),
            HttpValidator::new(http_client.clone(), settings.validation_uri),
            HttpAuthenticator::new(http_client, settings.token_uri),
            credentials,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use rstest::rstest;

    use super::*;
    use crate::credentials::tests::fake_credentials;

    fn settings(environment: Environment, validation: &str, token: &str) -> ManagerSettings {
        ManagerSettings::new(
            Slot::try_from("salesforce").unwrap(),
            validation.parse().unwrap(),
            token.parse().unwrap(),
            environment,
        )
    }

    fn insecure_http() -> HttpConfig {
        HttpConfig::new(
            Duration::from_secs(1),
            Duration::from_secs(1),
            TlsVerification::Disabled,
        )
    }

    #[test]
    fn defaults() {
        let settings = settings(
            Environment::Production,
            "https://example.my.salesforce.com/services/data",
            "https://login.salesforce.com/services/oauth2/token",
        );
        assert_eq!(settings.store_dir, PathBuf::from(DEFAULT_STORE_DIR));
        assert_eq!(settings.http, HttpConfig::default());
        assert!(settings.validate().is_ok());
    }

    #[rstest]
    #[case("http://example.com/probe", "https://example.com/token", "validation")]
    #[case("https://example.com/probe", "http://example.com/token", "token")]
    fn production_requires_https(
        #[case] validation: &str,
        #[case] token: &str,
        #[case] offending: &str,
    ) {
        let error = settings(Environment::Production, validation, token)
            .validate()
            .unwrap_err();
        assert_matches!(error, SettingsError::InsecureUrl(name, _) => assert_eq!(name, offending));
    }

    #[test]
    fn production_rejects_disabled_tls() {
        let settings = settings(
            Environment::Production,
            "https://example.com/probe",
            "https://example.com/token",
        )
        .with_http_config(insecure_http());

        assert_matches!(
            settings.validate(),
            Err(SettingsError::InsecureTlsInProduction)
        );
        assert_matches!(
            HttpTokenManager::try_from_settings(settings, fake_credentials()),
            Err(SettingsError::InsecureTlsInProduction)
        );
    }

    #[test]
    fn testing_allows_plain_http_and_disabled_tls() {
        let settings = settings(
            Environment::Testing,
            "http://localhost:8080/probe",
            "http://localhost:8080/token",
        )
        .with_http_config(insecure_http())
        .with_store_dir(PathBuf::from("/tmp/token-cache-tests"));

        let manager = HttpTokenManager::try_from_settings(settings, fake_credentials()).unwrap();

        assert_eq!(manager.slot().as_str(), "salesforce");
        assert_eq!(manager.environment(), Environment::Testing);
    }
}
