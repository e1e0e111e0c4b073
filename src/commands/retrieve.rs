use serde::Serialize;
use thiserror::Error;

use crate::TokenManagerError;
use crate::authenticator::Authenticator;
use crate::credentials::CredentialsProvider;
use crate::manager::{Activation, TokenManager};
use crate::parameters::OutPutTokenFormat;
use crate::store::{Slot, TokenStore};
use crate::token::TokenRecord;
use crate::validator::Validator;

#[derive(Error, Debug)]
pub enum RetrieveError {
    #[error(transparent)]
    Manager(#[from] TokenManagerError),
    #[error("authentication currently unavailable for slot `{0}`")]
    Unavailable(Slot),
    #[error("encoding output: `{0}`")]
    Encode(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct RetrieveOutput {
    #[serde(flatten)]
    record: TokenRecord,
    validation: String,
    reauthenticated: bool,
}

impl From<&Activation> for RetrieveOutput {
    fn from(activation: &Activation) -> Self {
        Self {
            record: activation.record(),
            validation: activation.outcome.to_string(),
            reauthenticated: activation.reauthenticated,
        }
    }
}

pub struct RetrieveTokenCommand<S, V, A, P> {
    manager: TokenManager<S, V, A, P>,
}

impl<S, V, A, P> RetrieveTokenCommand<S, V, A, P>
where
    S: TokenStore,
    V: Validator,
    A: Authenticator,
    P: CredentialsProvider,
{
    pub fn new(manager: TokenManager<S, V, A, P>) -> Self {
        Self { manager }
    }

    /// Runs the manager once and renders its token.
    ///
    /// An empty token is reported as [`RetrieveError::Unavailable`] after it has been persisted.
    pub fn retrieve_token(&self, format: OutPutTokenFormat) -> Result<String, RetrieveError> {
        let activation = self.manager.activate()?;

        if !activation.is_usable() {
            return Err(RetrieveError::Unavailable(activation.slot));
        }

        match format {
            OutPutTokenFormat::Plain => Ok(activation.token.as_str().to_string()),
            OutPutTokenFormat::Json => Ok(serde_json::to_string_pretty(&RetrieveOutput::from(
                &activation,
            ))?),
        }
    }
}
