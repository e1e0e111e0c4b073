use std::fmt;

use http::{Request, Uri, header::ACCEPT, header::CONTENT_TYPE};
use serde::Deserialize;
use thiserror::Error;
use url::form_urlencoded;

use crate::credentials::Credentials;
use crate::http_client::HttpClient;
use crate::token::AccessToken;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Error, Debug)]
pub enum AuthenticateError {
    #[error("unable to build request: `{0}`")]
    EncodeError(String),
    #[error("unable to deserialize token response: `{0}`")]
    DeserializeError(String),
    #[error("token endpoint error: Status code: `{0}`, Reason: `{1}`")]
    HttpResponseError(u16, String),
    #[error("http transport error: `{0}`")]
    HttpTransportError(String),
    #[error("token response does not contain an access token")]
    MissingAccessToken,
}

/// Exchanges long-lived credentials for a fresh access token.
pub trait Authenticator {
    fn authenticate(&self, credentials: &Credentials) -> Result<AccessToken, AuthenticateError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrantType {
    Password,
}

impl GrantType {
    fn as_str(&self) -> &'static str {
        match self {
            GrantType::Password => "password",
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Performs the OAuth2 resource owner password grant against the token endpoint.
pub struct HttpAuthenticator<C> {
    http_client: C,
    token_uri: Uri,
}

impl<C> fmt::Debug for HttpAuthenticator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpAuthenticator")
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl<C> HttpAuthenticator<C> {
    pub fn new(http_client: C, token_uri: Uri) -> Self {
        Self {
            http_client,
            token_uri,
        }
    }
}

impl<C> Authenticator for HttpAuthenticator<C>
where
    C: HttpClient,
{
    /// Executes a form-encoded POST to the token endpoint and extracts `access_token`.
    fn authenticate(&self, credentials: &Credentials) -> Result<AccessToken, AuthenticateError> {
        let request = build_request(credentials, &self.token_uri)?;

        let response = self
            .http_client
            .send(request)
            .map_err(|e| AuthenticateError::HttpTransportError(e.to_string()))?;

        let body = response.body();
        if !response.status().is_success() {
            return Err(AuthenticateError::HttpResponseError(
                response.status().as_u16(),
                String::from_utf8_lossy(body).to_string(),
            ));
        }

        let decoded: TokenResponse = serde_json::from_slice(body)
            .map_err(|e| AuthenticateError::DeserializeError(e.to_string()))?;

        decoded
            .access_token
            .filter(|token| !token.is_empty())
            .map(AccessToken::from)
            .ok_or(AuthenticateError::MissingAccessToken)
    }
}

fn encode_form(credentials: &Credentials) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("grant_type", GrantType::Password.as_str())
        .append_pair("client_id", &credentials.client_id)
        .append_pair("client_secret", credentials.client_secret.expose())
        .append_pair("username", &credentials.username)
        .append_pair("password", credentials.password.expose())
        .finish()
}

fn build_request(
    credentials: &Credentials,
    uri: &Uri,
) -> Result<Request<Vec<u8>>, AuthenticateError> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
        .header(ACCEPT, "application/json")
        .body(encode_form(credentials).into_bytes())
        .map_err(|e| AuthenticateError::EncodeError(e.to_string()))
}

#[cfg(test)]
pub mod test {
    use std::collections::HashMap;

    use assert_matches::assert_matches;
    use mockall::mock;

    use super::*;
    use crate::credentials::tests::fake_credentials;
    use crate::http_client::HttpClientError;
    use crate::http_client::tests::{MockHttpClient, response};

    mock! {
        pub AuthenticatorMock {}

        impl Authenticator for AuthenticatorMock
        {
            fn authenticate(&self, credentials: &Credentials) -> Result<AccessToken, AuthenticateError>;
        }
    }

    fn token_uri() -> Uri {
        "https://login.salesforce.com/services/oauth2/token"
            .parse()
            .unwrap()
    }

    fn authenticator_answering(
        status: u16,
        body: &'static str,
    ) -> HttpAuthenticator<MockHttpClient> {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_send()
            .once()
            .returning(move |_| Ok(response(status, body)));
        HttpAuthenticator::new(http_client, token_uri())
    }

    #[test]
    fn request_is_a_form_encoded_password_grant() {
        let request = build_request(&fake_credentials(), &token_uri()).unwrap();

        assert_eq!(request.method(), http::Method::POST);
        assert_eq!(request.uri(), &token_uri());
        assert_eq!(
            request.headers().get(CONTENT_TYPE).unwrap(),
            FORM_CONTENT_TYPE
        );

        let fields: HashMap<String, String> = form_urlencoded::parse(request.body())
            .into_owned()
            .collect();
        assert_eq!(
            fields,
            HashMap::from([
                ("grant_type".to_string(), "password".to_string()),
                ("client_id".to_string(), "3MVG9fake".to_string()),
                ("client_secret".to_string(), "s3cr3t".to_string()),
                ("username".to_string(), "api@example.com".to_string()),
                ("password".to_string(), "p&ss=word".to_string()),
            ])
        );
    }

    #[test]
    fn special_characters_are_percent_encoded() {
        let body = encode_form(&fake_credentials());
        assert!(body.contains("password=p%26ss%3Dword"));
        assert!(body.contains("username=api%40example.com"));
        assert!(body.starts_with("grant_type=password&"));
    }

    #[test]
    fn authentication_succeed() {
        let authenticator = authenticator_answering(
            200,
            r#"{"access_token":"new456","instance_url":"https://example.my.salesforce.com","token_type":"Bearer"}"#,
        );

        let token = authenticator.authenticate(&fake_credentials()).unwrap();

        assert_eq!(token.as_str(), "new456");
    }

    #[test]
    fn authentication_missing_access_token() {
        for body in [
            r#"{"token_type":"Bearer"}"#,
            r#"{"access_token":null}"#,
            r#"{"access_token":""}"#,
        ] {
            let error = authenticator_answering(200, body)
                .authenticate(&fake_credentials())
                .unwrap_err();
            assert_matches!(error, AuthenticateError::MissingAccessToken);
        }
    }

    #[test]
    fn authentication_deserialize_error() {
        let error = authenticator_answering(200, "this body should fail to be deserialized")
            .authenticate(&fake_credentials())
            .unwrap_err();

        assert_matches!(error, AuthenticateError::DeserializeError(_));
    }

    #[test]
    fn authentication_server_response_error() {
        let error = authenticator_answering(
            400,
            r#"{"error":"invalid_grant","error_description":"authentication failure"}"#,
        )
        .authenticate(&fake_credentials())
        .unwrap_err();

        assert_matches!(error, AuthenticateError::HttpResponseError(400, reason) => {
            assert!(reason.contains("invalid_grant"))
        });
    }

    #[test]
    fn authentication_transport_error() {
        let mut http_client = MockHttpClient::new();
        http_client.expect_send().once().returning(|_| {
            Err(HttpClientError::TransportError(
                "Connection refused".to_string(),
            ))
        });
        let authenticator = HttpAuthenticator::new(http_client, token_uri());

        let error = authenticator.authenticate(&fake_credentials()).unwrap_err();

        assert!(error.to_string().contains("Connection refused"));
        assert_matches!(error, AuthenticateError::HttpTransportError(_));
    }
}
