//! Request gateway: every call to the admin service goes through here.
//!
//! Before dispatch the current session token (if any) is attached as a bearer
//! credential. A `403` reply clears the session and broadcasts a
//! [`SessionEvent`] for the navigation layer; the caller still gets the error.
//! Nothing is retried.

use std::time::Duration;

use reqwest::{header, Client, Method, StatusCode};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::auth::CredentialStore;
use crate::config::Config;
use crate::router::routes::LOGIN_PATH;

use super::ApiError;

/// Capacity of the session event channel. Events are rare (one per `403`),
/// slow subscribers only lose duplicates.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Emitted by the gateway when the service rejects the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Session was cleared after a `403`; navigate to `redirect_to`.
    Invalidated { redirect_to: &'static str },
}

/// A request before decoration. Paths are relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
}

impl OutboundRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// HTTP gateway to the admin service.
/// Clone is cheap - the reqwest client, store and event sender are all shared.
#[derive(Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
    store: CredentialStore,
    events: broadcast::Sender<SessionEvent>,
}

impl Gateway {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        store: CredentialStore,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
            events,
        })
    }

    pub fn from_config(config: &Config, store: CredentialStore) -> Result<Self, ApiError> {
        Self::new(config.api_base_url.clone(), config.timeout(), store)
    }

    /// Subscribe to session events. Only events sent after subscribing are seen.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `Authorization` value carrying `token`
    pub fn bearer_value(token: &str) -> Result<header::HeaderValue, ApiError> {
        header::HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            ApiError::InvalidCredentials("token is not a valid header value".into())
        })
    }

    /// Headers for the next request: the bearer token if a session is present.
    pub fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.store.get().value() {
            headers.insert(header::AUTHORIZATION, Self::bearer_value(token)?);
        }
        Ok(headers)
    }

    /// Send an authenticated request and return the parsed JSON body.
    pub async fn send(&self, request: OutboundRequest) -> Result<Value, ApiError> {
        // A stored token that cannot be sent is as dead as a rejected one
        let headers = match self.auth_headers() {
            Ok(headers) => headers,
            Err(e) => {
                self.invalidate_session(&request, "Stored token is unusable");
                return Err(e);
            }
        };
        debug!(
            method = %request.method,
            path = %request.path,
            authenticated = headers.contains_key(header::AUTHORIZATION),
            "Dispatching request"
        );

        let response = self.dispatch(&request, headers).await.map_err(|e| {
            warn!(method = %request.method, path = %request.path, error = %e, "Request failed");
            ApiError::Transport(e)
        })?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            self.invalidate_session(&request, "Forbidden response");
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        let response = Self::check_response(response).await?;
        Self::read_body(response).await
    }

    /// Send a request to a public endpoint. No token is attached and the
    /// session is never touched; every failure becomes `PublicFetch`.
    pub async fn send_public(&self, request: OutboundRequest) -> Result<Value, ApiError> {
        debug!(method = %request.method, path = %request.path, "Dispatching public request");

        let result: Result<Value, ApiError> = async {
            let response = self.dispatch(&request, header::HeaderMap::new()).await?;
            let response = Self::check_response(response).await?;
            Self::read_body(response).await
        }
        .await;

        result.map_err(|e| {
            warn!(path = %request.path, error = %e, "Public request failed");
            ApiError::PublicFetch(e.to_string())
        })
    }

    async fn dispatch(
        &self,
        request: &OutboundRequest,
        headers: header::HeaderMap,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.path))
            .headers(headers);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        builder.send().await
    }

    fn invalidate_session(&self, request: &OutboundRequest, reason: &str) {
        warn!(method = %request.method, path = %request.path, reason, "Clearing session");
        self.store.clear();

        let event = SessionEvent::Invalidated {
            redirect_to: LOGIN_PATH,
        };
        if self.events.send(event).is_err() {
            debug!("No navigation subscriber for session event");
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn read_body(response: reqwest::Response) -> Result<Value, ApiError> {
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("body is not JSON: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header as header_eq, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer, store: CredentialStore) -> Gateway {
        Gateway::new(format!("{}/api", server.uri()), Duration::from_secs(10), store).unwrap()
    }

    #[test]
    fn test_url_joining() {
        let store = CredentialStore::in_memory();
        let gw = Gateway::new("http://localhost:8000/api/", Duration::from_secs(1), store).unwrap();
        assert_eq!(gw.base_url(), "http://localhost:8000/api");
        assert_eq!(gw.url("/users"), "http://localhost:8000/api/users");
        assert_eq!(gw.url("users/3"), "http://localhost:8000/api/users/3");
    }

    #[test]
    fn test_auth_headers_follow_session() {
        let store = CredentialStore::in_memory();
        let gw = Gateway::new("http://localhost", Duration::from_secs(1), store.clone()).unwrap();

        assert!(gw.auth_headers().unwrap().get(header::AUTHORIZATION).is_none());

        store.set("admin_42");
        let headers = gw.auth_headers().unwrap();
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer admin_42");

        store.clear();
        assert!(gw.auth_headers().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unusable_stored_token_clears_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        // Written behind the client's back, e.g. by another process sharing the file
        let store = CredentialStore::in_memory();
        store.set("admin_4\u{7f}2");
        let gw = gateway(&server, store.clone());
        let mut events = gw.subscribe();

        let err = gw.send(OutboundRequest::get("/users")).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials(_)));
        assert!(!store.get().present());
        assert_eq!(
            events.try_recv().unwrap(),
            SessionEvent::Invalidated { redirect_to: "/admin/login" }
        );
    }

    #[tokio::test]
    async fn test_send_attaches_stored_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users"))
            .and(header_eq("authorization", "Bearer admin_42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": []})))
            .expect(1)
            .mount(&server)
            .await;

        let store = CredentialStore::in_memory();
        store.set("admin_42");
        let body = gateway(&server, store).send(OutboundRequest::get("/users")).await.unwrap();
        assert_eq!(body, json!({"users": []}));
    }

    #[tokio::test]
    async fn test_send_without_session_has_no_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/dashboard/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total_users": 0})))
            .mount(&server)
            .await;

        let store = CredentialStore::in_memory();
        gateway(&server, store)
            .send(OutboundRequest::get("dashboard/stats"))
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_send_forwards_body_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/orders/5/status"))
            .and(query_param("status", "completed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"order_id": 5})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/products"))
            .and(body_json(json!({"name": "Tea", "price": 100, "description": ""})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"product_id": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let gw = gateway(&server, CredentialStore::in_memory());
        gw.send(OutboundRequest::new(Method::PUT, "/orders/5/status").with_query("status", "completed"))
            .await
            .unwrap();
        gw.send(OutboundRequest::post(
            "/products",
            json!({"name": "Tea", "price": 100, "description": ""}),
        ))
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_forbidden_clears_session_and_emits_event() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"detail": "denied"})))
            .mount(&server)
            .await;

        for resource in ["/users", "/orders", "/admin/products", "/notifications"] {
            let store = CredentialStore::in_memory();
            store.set("admin_1");
            let gw = gateway(&server, store.clone());
            let mut events = gw.subscribe();

            let err = gw.send(OutboundRequest::get(resource)).await.unwrap_err();

            assert!(err.is_forbidden(), "{resource}: {err}");
            assert!(!store.get().present(), "{resource}: session not cleared");
            assert_eq!(
                events.try_recv().unwrap(),
                SessionEvent::Invalidated { redirect_to: "/admin/login" }
            );
        }
    }

    #[tokio::test]
    async fn test_forbidden_without_subscriber_still_clears() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let store = CredentialStore::in_memory();
        store.set("admin_1");
        let err = gateway(&server, store.clone())
            .send(OutboundRequest::delete("/products/3"))
            .await
            .unwrap_err();

        assert!(err.is_forbidden());
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_other_errors_leave_session_alone() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users"))
            .respond_with(ResponseTemplate::new(401).set_body_string("no"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/orders"))
            .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
            .mount(&server)
            .await;

        let store = CredentialStore::in_memory();
        store.set("admin_1");
        let gw = gateway(&server, store.clone());
        let mut events = gw.subscribe();

        let err = gw.send(OutboundRequest::get("/users")).await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        let err = gw.send(OutboundRequest::get("/orders")).await.unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 500, ref body } if body == "db down"));

        assert_eq!(store.get().value(), Some("admin_1"));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let store = CredentialStore::in_memory();
        store.set("admin_1");
        let gw = Gateway::new(server.uri(), Duration::from_millis(50), store.clone()).unwrap();

        let err = gw.send(OutboundRequest::get("/users")).await.unwrap_err();
        assert!(err.is_timeout(), "expected timeout, got {err}");
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn test_empty_body_is_null_and_bad_json_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let gw = gateway(&server, CredentialStore::in_memory());
        let body = gw.send(OutboundRequest::delete("/products/1")).await.unwrap();
        assert_eq!(body, Value::Null);

        let err = gw.send(OutboundRequest::get("/users")).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_send_public_never_sends_token_or_clears() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let store = CredentialStore::in_memory();
        store.set("admin_1");
        let gw = gateway(&server, store.clone());
        let mut events = gw.subscribe();

        let err = gw.send_public(OutboundRequest::get("/products")).await.unwrap_err();
        assert!(matches!(err, ApiError::PublicFetch(_)));
        assert!(store.is_authenticated());
        assert!(events.try_recv().is_err());

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }
}
