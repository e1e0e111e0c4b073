use http::{Request, Response};
use reqwest::blocking::{Client, Response as BlockingResponse};
use tracing::warn;

use crate::http::config::HttpConfig;
use crate::http_client::{HttpClient as TokenHttpClient, HttpClientError};

/// Blocking reqwest client backing the validation probe and the grant exchange.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self, HttpBuildError> {
        let mut builder = Client::builder()
            .use_rustls_tls()
            .tls_built_in_native_certs(true)
            .timeout(config.timeout())
            .connect_timeout(config.conn_timeout());

        if !config.tls_verification().is_enabled() {
            warn!("TLS certificate verification is DISABLED, server identity is not checked");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|err| HttpBuildError::ClientBuilder(err.to_string()))?;

        Ok(Self { client })
    }

    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpResponseError> {
        let (parts, body) = request.into_parts();
        let res = self
            .client
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers)
            .body(body)
            .send()
            .map_err(|err| HttpResponseError::TransportError(err.to_string()))?;

        try_build_response(res)
    }
}

fn try_build_response(res: BlockingResponse) -> Result<Response<Vec<u8>>, HttpResponseError> {
    let status = res.status();
    let version = res.version();

    let body: Vec<u8> = res
        .bytes()
        .map_err(|err| HttpResponseError::ReadingResponse(err.to_string()))?
        .into();

    http::Response::builder()
        .status(status)
        .version(version)
        .body(body)
        .map_err(|err| HttpResponseError::BuildingResponse(err.to_string()))
}

impl TokenHttpClient for HttpClient {
    fn send(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpClientError> {
        let response = self.send(req)?;

        Ok(response)
    }
}

impl From<HttpResponseError> for HttpClientError {
    fn from(err: HttpResponseError) -> Self {
        match err {
            HttpResponseError::TransportError(msg) => HttpClientError::TransportError(msg),
            HttpResponseError::BuildingResponse(msg) | HttpResponseError::ReadingResponse(msg) => {
                HttpClientError::InvalidResponse(msg)
            }
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum HttpBuildError {
    #[error("could not build the http client: {0}")]
    ClientBuilder(String),
}

#[derive(thiserror::Error, Debug)]
enum HttpResponseError {
    #[error("could not read response body: {0}")]
    ReadingResponse(String),
    #[error("could not build response: {0}")]
    BuildingResponse(String),
    #[error("http transport error: `{0}`")]
    TransportError(String),
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use http::header::AUTHORIZATION;
    use httpmock::{Method::GET, Method::POST, MockServer};

    use super::*;
    use crate::http::config::TlsVerification;

    fn client(timeout: Duration) -> HttpClient {
        HttpClient::new(&HttpConfig::new(
            timeout,
            timeout,
            TlsVerification::Enabled,
        ))
        .unwrap()
    }

    #[test]
    fn forwards_method_headers_and_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/services/oauth2/token")
                .header("content-type", "application/x-www-form-urlencoded")
                .body("grant_type=password");
            then.status(200).body(r#"{"access_token":"abc123"}"#);
        });

        let request = Request::builder()
            .method("POST")
            .uri(server.url("/services/oauth2/token"))
            .header("content-type", "application/x-www-form-urlencoded")
            .body(b"grant_type=password".to_vec())
            .unwrap();

        let response = TokenHttpClient::send(&client(Duration::from_secs(1)), request).unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(response.body(), br#"{"access_token":"abc123"}"#);
        mock.assert();
    }

    #[test]
    fn unsuccessful_status_is_not_an_error() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/probe")
                .header("authorization", "Bearer expired");
            then.status(401)
                .body(r#"[{"errorCode":"INVALID_SESSION_ID"}]"#);
        });

        let request = Request::builder()
            .uri(server.url("/probe"))
            .header(AUTHORIZATION, "Bearer expired")
            .body(Vec::new())
            .unwrap();

        let response = TokenHttpClient::send(&client(Duration::from_secs(1)), request).unwrap();

        assert_eq!(response.status(), 401);
        mock.assert();
    }

    #[test]
    fn timeout_is_a_transport_error() {
        let timeout = Duration::from_millis(50);
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200)
                .delay(timeout.saturating_add(Duration::from_millis(200)));
        });

        let request = Request::builder()
            .uri(server.url("/slow"))
            .body(Vec::new())
            .unwrap();

        let error = TokenHttpClient::send(&client(timeout), request).unwrap_err();

        assert_matches!(error, HttpClientError::TransportError(_));
        mock.assert();
    }

    #[test]
    fn insecure_client_can_be_built() {
        let config = HttpConfig::new(
            Duration::from_secs(1),
            Duration::from_secs(1),
            TlsVerification::Disabled,
        );
        assert!(HttpClient::new(&config).is_ok());
    }
}
