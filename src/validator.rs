use std::fmt;

use http::{
    HeaderValue, Request, Response, Uri,
    header::{ACCEPT, AUTHORIZATION},
};
use serde_json::Value;
use tracing::debug;

use crate::http_client::HttpClient;
use crate::token::AccessToken;

/// Field the service uses to report a rejected session.
const ERROR_CODE_FIELD: &str = "errorCode";

/// Result of probing the service with a cached token.
///
/// Every variant other than `Valid` leads to re-authentication; the distinction is kept
/// for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    /// The service answered and rejected the token, carrying its error code.
    Invalid(String),
    /// No response was received.
    NetworkFailure(String),
    /// There was no token to check. No request is sent in this case.
    EmptyToken,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationOutcome::Valid => write!(f, "valid"),
            ValidationOutcome::Invalid(code) => write!(f, "invalid ({code})"),
            ValidationOutcome::NetworkFailure(reason) => write!(f, "network failure ({reason})"),
            ValidationOutcome::EmptyToken => write!(f, "empty token"),
        }
    }
}

/// Decides whether a token is still accepted by the remote service.
pub trait Validator {
    fn validate(&self, token: &AccessToken) -> ValidationOutcome;
}

/// Validates tokens by presenting them to a probe endpoint of the service.
pub struct HttpValidator<C> {
    http_client: C,
    probe_uri: Uri,
}

impl<C> fmt::Debug for HttpValidator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpValidator")
            .field("probe_uri", &self.probe_uri)
            .finish_non_exhaustive()
    }
}

impl<C> HttpValidator<C> {
    pub fn new(http_client: C, probe_uri: Uri) -> Self {
        Self {
            http_client,
            probe_uri,
        }
    }
}

impl<C> Validator for HttpValidator<C>
where
    C: HttpClient,
{
    fn validate(&self, token: &AccessToken) -> ValidationOutcome {
        if token.is_empty() {
            return ValidationOutcome::EmptyToken;
        }

        let request = match build_request(token, &self.probe_uri) {
            Ok(request) => request,
            Err(outcome) => return outcome,
        };

        match self.http_client.send(request) {
            Ok(response) => evaluate_response(response),
            Err(e) => {
                debug!("validation probe failed: {e}");
                ValidationOutcome::NetworkFailure(e.to_string())
            }
        }
    }
}

fn build_request(token: &AccessToken, uri: &Uri) -> Result<Request<Vec<u8>>, ValidationOutcome> {
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
        .map_err(|_| ValidationOutcome::Invalid("token is not a valid header value".into()))?;
    bearer.set_sensitive(true);

    Request::builder()
        .uri(uri)
        .method("GET")
        .header(ACCEPT, "application/json")
        .header(AUTHORIZATION, bearer)
        .body(Vec::new())
        .map_err(|e| ValidationOutcome::NetworkFailure(format!("building probe request: {e}")))
}

fn evaluate_response(response: Response<Vec<u8>>) -> ValidationOutcome {
    match error_code(response.body()) {
        Some(code) => ValidationOutcome::Invalid(code),
        None => ValidationOutcome::Valid,
    }
}

/// Extracts a non-null `errorCode` from either an error object or a list of them.
/// Bodies that are not JSON, or lack the field, carry no error.
fn error_code(body: &[u8]) -> Option<String> {
    let decoded: Value = serde_json::from_slice(body).ok()?;

    let code = match &decoded {
        Value::Array(errors) => errors.iter().find_map(non_null_error_code),
        other => non_null_error_code(other),
    }?;

    Some(match code {
        Value::String(code) => code.to_owned(),
        other => other.to_string(),
    })
}

fn non_null_error_code(value: &Value) -> Option<&Value> {
    value.get(ERROR_CODE_FIELD).filter(|code| !code.is_null())
}
