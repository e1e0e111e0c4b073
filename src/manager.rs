use tracing::{debug, info, warn};

use crate::authenticator::Authenticator;
use crate::credentials::{CredentialsProvider, Environment};
use crate::store::{Slot, TokenStore};
use crate::token::{AccessToken, TokenRecord};
use crate::validator::{ValidationOutcome, Validator};
use crate::{TokenManagerError, TokenRetriever};

pub mod http_impl;

/// What a single manager run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    pub slot: Slot,
    /// Empty when re-authentication was needed and failed.
    pub token: AccessToken,
    /// How the cached token fared against the service.
    pub outcome: ValidationOutcome,
    pub reauthenticated: bool,
}

impl Activation {
    pub fn is_usable(&self) -> bool {
        !self.token.is_empty()
    }

    pub fn record(&self) -> TokenRecord {
        TokenRecord::new(self.slot.clone(), self.token.clone())
    }
}

/// Keeps the token of one slot usable.
///
/// Every activation reads the slot, probes the service with the cached token, authenticates
/// again if the probe did not succeed, and writes the resulting token back to the slot.
/// The slot is rewritten even when the token did not change, so after a successful run the
/// store always matches the returned token.
#[derive(Debug)]
pub struct TokenManager<S, V, A, P> {
    slot: Slot,
    environment: Environment,
    store: S,
    validator: V,
    authenticator: A,
    credentials: P,
    retries: u8,
}

impl<S, V, A, P> TokenManager<S, V, A, P>
where
    S: TokenStore,
    V: Validator,
    A: Authenticator,
    P: CredentialsProvider,
{
    pub fn new(
        slot: Slot,
        environment: Environment,
        store: S,
        validator: V,
        authenticator: A,
        credentials: P,
    ) -> Self {
        Self {
            slot,
            environment,
            store,
            validator,
            authenticator,
            credentials,
            retries: 0,
        }
    }

    /// Number of extra authentication attempts after a failed one.
    pub fn with_retries(self, retries: u8) -> Self {
        Self { retries, ..self }
    }

    pub fn slot(&self) -> &Slot {
        &self.slot
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Runs the whole check-and-refresh cycle once.
    ///
    /// Only store failures are returned as errors. A failed authentication results in an
    /// empty token, which is persisted and returned.
    pub fn activate(&self) -> Result<Activation, TokenManagerError> {
        let cached = self.store.read(&self.slot)?;

        let outcome = self.validator.validate(&cached);
        let (token, reauthenticated) = if outcome.is_valid() {
            debug!(slot = %self.slot, "cached token is still valid");
            (cached, false)
        } else {
            info!(slot = %self.slot, %outcome, "cached token unusable, re-authenticating");
            (self.reauthenticate(), true)
        };

        self.store.write(&self.slot, &token)?;

        if token.is_empty() {
            warn!(slot = %self.slot, "no usable token, authentication currently unavailable");
        }

        Ok(Activation {
            slot: self.slot.clone(),
            token,
            outcome,
            reauthenticated,
        })
    }

    fn reauthenticate(&self) -> AccessToken {
        let credentials = match self.credentials.credentials(self.environment) {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!(environment = %self.environment, "loading credentials: {e}");
                return AccessToken::empty();
            }
        };

        for attempt in 0..=self.retries {
            match self.authenticator.authenticate(&credentials) {
                Ok(token) => {
                    info!(slot = %self.slot, "access token obtained");
                    return token;
                }
                Err(e) if attempt < self.retries => {
                    debug!(slot = %self.slot, attempt, "authentication failed, retrying: {e}");
                }
                Err(e) => {
                    warn!(slot = %self.slot, attempt, "authentication failed: {e}");
                }
            }
        }
        AccessToken::empty()
    }
}

impl<S, V, A, P> TokenRetriever for TokenManager<S, V, A, P>
where
    S: TokenStore,
    V: Validator,
    A: Authenticator,
    P: CredentialsProvider,
{
    fn retrieve(&self) -> Result<AccessToken, TokenManagerError> {
        self.activate().map(|activation| activation.token)
    }
}
