//! HTTP client for the Eye2Heart backend.
//!
//! Every call that needs authorization takes a [`Session`] argument; the
//! client itself holds no credentials.
//!
//! ## Example
//!
//! ```rust,no_run
//! use eye2heart_client::{ApiClient, Credentials};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::builder()
//!         .endpoint("http://localhost:5000")
//!         .build()?;
//!
//!     let session = client
//!         .login(&Credentials {
//!             email: "ana@example.com".into(),
//!             password: "secret".into(),
//!         })
//!         .await?;
//!
//!     let records = client.vitals(&session).await?;
//!     println!("Fetched {} records", records.len());
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use eye2heart_types::VitalRecord;

use crate::models::{ApiMessage, LoginResponse};
use crate::{
    ClientError, ContactMessage, Credentials, Prediction, PredictionRequest, Profile,
    Registration, Session,
};

/// Default backend address.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the Eye2Heart REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    endpoint: String,
}

impl ApiClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Base URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Create a new account.
    pub async fn register(&self, registration: &Registration) -> Result<(), ClientError> {
        debug!(email = %registration.email, "Registering account");
        let response = self
            .send(self.client.post(self.url("/api/register")).json(registration))
            .await?;
        check_status(response, Access::Public).await?;
        Ok(())
    }

    /// Log in and obtain a session.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, ClientError> {
        debug!(email = %credentials.email, "Logging in");
        let response = self
            .send(self.client.post(self.url("/api/login")).json(credentials))
            .await?;
        let response = check_status(response, Access::Public).await?;
        let body: LoginResponse = parse_json(response).await?;

        match body.token {
            Some(token) if !token.is_empty() => Ok(Session::new(token)),
            _ => Err(ClientError::Auth(
                body.message
                    .unwrap_or_else(|| "No token in login response".to_string()),
            )),
        }
    }

    /// Fetch the logged-in user's profile.
    pub async fn profile(&self, session: &Session) -> Result<Profile, ClientError> {
        let response = self
            .send(self.authorized(self.client.get(self.url("/api/profile")), session))
            .await?;
        let response = check_status(response, Access::Session).await?;
        parse_json(response).await
    }

    /// Fetch the user's stored vital records, newest first.
    ///
    /// A body that is not a JSON array yields no records, and array entries
    /// that are not objects are skipped.
    pub async fn vitals(&self, session: &Session) -> Result<Vec<VitalRecord>, ClientError> {
        let response = self
            .send(self.authorized(self.client.get(self.url("/api/vitals")), session))
            .await?;
        let response = check_status(response, Access::Session).await?;
        let body: serde_json::Value = parse_json(response).await?;
        Ok(records_from_value(body))
    }

    /// Submit a retinal image and clinical features for risk prediction.
    pub async fn predict(
        &self,
        session: &Session,
        request: &PredictionRequest,
    ) -> Result<Prediction, ClientError> {
        let missing = request.features.missing();
        if !missing.is_empty() {
            warn!(?missing, "Clinical features not supplied, the server will use 0");
        }

        let image = Part::bytes(request.image.bytes.clone())
            .file_name(request.image.file_name.clone());
        let mut form = Form::new().part("image", image);
        for (name, value) in request.features.iter() {
            form = form.text(name.to_string(), value.to_string());
        }

        debug!(image = %request.image.file_name, "Submitting prediction");
        let response = self
            .send(self.authorized(
                self.client.post(self.url("/api/predict")).multipart(form),
                session,
            ))
            .await?;
        let response = check_status(response, Access::Session).await?;
        parse_json(response).await
    }

    /// Send a message to the support team.
    ///
    /// Returns the confirmation text from the server.
    pub async fn contact(&self, message: &ContactMessage) -> Result<String, ClientError> {
        message.validate()?;
        let response = self
            .send(self.client.post(self.url("/api/contact")).json(message))
            .await?;
        let response = check_status(response, Access::Public).await?;
        let body: ApiMessage = parse_json(response).await.unwrap_or_default();
        Ok(body
            .into_text()
            .unwrap_or_else(|| "Message sent".to_string()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    fn authorized(&self, request: RequestBuilder, session: &Session) -> RequestBuilder {
        request.header(reqwest::header::AUTHORIZATION, session.bearer())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Request failed");
            ClientError::from(e)
        })?;
        debug!(status = %response.status(), url = %response.url(), "Response received");
        Ok(response)
    }
}

/// Whether a request was made with a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    Session,
}

async fn check_status(response: Response, access: Access) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ApiMessage>()
        .await
        .ok()
        .and_then(ApiMessage::into_text);

    Err(status_error(status, access, message))
}

fn status_error(status: StatusCode, access: Access, message: Option<String>) -> ClientError {
    let message = message.unwrap_or_else(|| format!("API returned status {}", status));

    match (status, access) {
        // Missing, expired and malformed tokens come back as 401 or 422
        (StatusCode::UNAUTHORIZED | StatusCode::UNPROCESSABLE_ENTITY, Access::Session) => {
            ClientError::Unauthorized
        }
        (StatusCode::UNAUTHORIZED, Access::Public) => ClientError::Auth(message),
        (StatusCode::NOT_FOUND, _) => ClientError::NotFound(message),
        (StatusCode::BAD_REQUEST, _) => ClientError::Rejected(message),
        _ => ClientError::Http(format!("{} ({})", message, status)),
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    response
        .json()
        .await
        .map_err(|e| ClientError::Parse(e.to_string()))
}

/// Read a vitals list leniently.
///
/// A document that is not an array yields no records. Entries that are not
/// records become empty records, so every entry still counts.
pub fn records_from_value(body: serde_json::Value) -> Vec<VitalRecord> {
    let serde_json::Value::Array(items) = body else {
        warn!("Vitals document is not a list, treating as empty");
        return Vec::new();
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).unwrap_or_else(|e| {
                warn!(index, error = %e, "Malformed vital record, keeping it empty");
                VitalRecord::new()
            })
        })
        .collect()
}

/// Builder for ApiClient.
#[derive(Debug, Default)]
pub struct ApiClientBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl ApiClientBuilder {
    /// Set the API base URL (e.g., "http://localhost:5000").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(|e| ClientError::Http(format!("Failed to build HTTP client: {}", e)))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(ApiClient { client, endpoint })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_defaults() {
        let client = ApiClient::builder().build().unwrap();
        assert_eq!(client.endpoint(), "http://localhost:5000");
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let client = ApiClient::builder()
            .endpoint("http://api.local:8080/")
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        assert_eq!(client.endpoint(), "http://api.local:8080");
        assert_eq!(client.url("/api/vitals"), "http://api.local:8080/api/vitals");
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, Access::Session, None),
            ClientError::Unauthorized
        ));
        assert!(matches!(
            status_error(StatusCode::UNPROCESSABLE_ENTITY, Access::Session, None),
            ClientError::Unauthorized
        ));
        match status_error(
            StatusCode::UNAUTHORIZED,
            Access::Public,
            Some("Invalid credentials".to_string()),
        ) {
            ClientError::Auth(msg) => assert_eq!(msg, "Invalid credentials"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, Access::Session, None),
            ClientError::NotFound(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, Access::Public, None),
            ClientError::Rejected(_)
        ));
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, Access::Session, None),
            ClientError::Http(_)
        ));
    }

    #[test]
    fn test_records_from_non_array() {
        assert!(records_from_value(json!({"error": "oops"})).is_empty());
        assert!(records_from_value(json!(null)).is_empty());
    }

    #[test]
    fn test_records_keep_non_objects_as_empty() {
        let records = records_from_value(json!([
            {"heart_rate": 70, "risk_level": "Low"},
            42,
            {"heart_rate": "x"},
            null
        ]));
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].bpm(), Some(70.0));
        assert_eq!(records[1], VitalRecord::new());
        assert_eq!(records[2].bpm(), None);
        assert_eq!(records[3], VitalRecord::new());
    }
}
