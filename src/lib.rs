pub mod authenticator;
pub mod commands;
pub mod credentials;
pub mod http;
pub mod http_client;
pub mod manager;
pub mod parameters;
pub mod store;
pub mod token;
pub mod validator;

use crate::store::StoreError;
use crate::token::AccessToken;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenManagerError {
    /// The slot could not be read or written. No token can be produced or cached.
    #[error("token store unavailable: `{0}`")]
    StoreUnavailable(#[from] StoreError),
}

/// The TokenRetriever is responsible for handing out the current access token.
///
/// An empty token is a valid return value: it means authentication is currently
/// unavailable and the caller must not proceed with the protected action.
pub trait TokenRetriever {
    fn retrieve(&self) -> Result<AccessToken, TokenManagerError>;
}
