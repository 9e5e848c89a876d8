use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::SubscriptionService;
use super::error::ApiError;
use super::types::{
    CheckoutResponse, CheckoutSession, CreateOrderRequest, Envelope, ErrorBody, LoginRequest,
    Order, RegisterRequest, RegisteredUser, Subscription, Tier, TokenPair,
};
use crate::config::BcConfig;

const API_PREFIX: &str = "/api/core/v1";

/// Body fields never written to the debug log.
const REDACTED_FIELDS: &[&str] = &["password", "access_token", "refresh_token"];

/// HTTP client for the Butler Coffee API.
pub struct ButlerClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
    /// Log full request and response bodies.
    debug: bool,
}

impl ButlerClient {
    pub fn new(
        base_url: impl Into<String>,
        access_token: Option<String>,
        debug: bool,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.filter(|t| !t.is_empty()),
            debug,
        })
    }

    /// Client for the configured endpoint and stored access token.
    pub fn from_config(config: &BcConfig) -> Result<Self, ApiError> {
        Self::new(
            config.api_url.clone(),
            Some(config.access_token.clone()),
            config.debug,
        )
    }

    /// Exchange credentials for a token pair. Persisting the tokens is the
    /// caller's job.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ApiError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.post("/users/token", &body, false).await
    }

    /// Create an account. The response carries tokens for the new user;
    /// persisting them is the caller's job.
    pub async fn register(&self, req: &RegisterRequest) -> Result<RegisteredUser, ApiError> {
        self.post("/users", req, false).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, auth: bool) -> Result<T, ApiError> {
        let builder = self.request(Method::GET, path, auth)?;
        self.send(builder, Method::GET, path, None).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        auth: bool,
    ) -> Result<T, ApiError> {
        let json = serde_json::to_value(body).map_err(|e| ApiError::Parse(e.to_string()))?;
        let builder = self.request(Method::POST, path, auth)?.json(&json);
        self.send(builder, Method::POST, path, Some(&json)).await
    }

    fn request(&self, method: Method, path: &str, auth: bool) -> Result<RequestBuilder, ApiError> {
        let url = format!("{}{API_PREFIX}{path}", self.base_url);
        let builder = self
            .client
            .request(method, url)
            .header("accept", "application/json");
        if !auth {
            return Ok(builder);
        }
        match &self.access_token {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Err(ApiError::NotAuthenticated),
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, ApiError> {
        if self.debug {
            let body = body.cloned().map(redact);
            debug!(%method, path, body = ?body, "api request");
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if self.debug {
            match serde_json::from_str::<serde_json::Value>(&text) {
                Ok(value) => debug!(status = status.as_u16(), body = %redact(value), "api response"),
                Err(_) => debug!(status = status.as_u16(), body = %text, "api response"),
            }
        }

        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: error_message(status.as_u16(), &text),
            });
        }

        serde_json::from_str::<Envelope<T>>(&text)
            .map(|env| env.data)
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

/// Mask credentials anywhere in a JSON body.
fn redact(mut value: serde_json::Value) -> serde_json::Value {
    match &mut value {
        serde_json::Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if REDACTED_FIELDS.contains(&key.as_str()) {
                    *field = serde_json::Value::String("[redacted]".into());
                } else {
                    *field = redact(field.take());
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items.iter_mut() {
                *item = redact(item.take());
            }
        }
        _ => {}
    }
    value
}

/// Extract the most useful message from an error body.
///
/// Field errors win over `meta.message`, which wins over a bare `detail`
/// string; anything else falls back to the raw body.
fn error_message(status: u16, body: &str) -> String {
    if let Ok(err) = serde_json::from_str::<ErrorBody>(body) {
        let fields: Vec<String> = err
            .meta
            .errors
            .iter()
            .map(|e| {
                if e.field.is_empty() {
                    e.error.clone()
                } else {
                    format!("{}: {}", e.field, e.error)
                }
            })
            .collect();
        if !fields.is_empty() {
            return fields.join("\n");
        }
        if !err.meta.message.is_empty() {
            return err.meta.message;
        }
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(detail) = value.get("detail").and_then(|d| d.as_str())
    {
        return detail.to_string();
    }

    format!("request failed (status {status}): {body}")
}

impl SubscriptionService for ButlerClient {
    async fn available_tiers(&self) -> Result<Vec<Tier>, ApiError> {
        self.get("/subscriptions/available", false).await
    }

    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, ApiError> {
        self.get("/subscriptions", true).await
    }

    async fn create_order(&self, req: &CreateOrderRequest) -> Result<Order, ApiError> {
        self.post("/orders", req, true).await
    }

    async fn get_order(&self, order_id: &str) -> Result<Order, ApiError> {
        self.get(&format!("/orders/{order_id}"), true).await
    }

    async fn create_checkout_session(&self, order_id: &str) -> Result<CheckoutSession, ApiError> {
        let resp: CheckoutResponse = self
            .post(
                &format!("/orders/{order_id}/checkout"),
                &serde_json::json!({}),
                true,
            )
            .await?;
        Ok(CheckoutSession {
            order_id: order_id.to_string(),
            checkout_url: resp.checkout_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{OrderStatus, SubscriptionStatus};
    use crate::order::{BrewingMethod, GrindType, LineItem};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, token: Option<&str>) -> ButlerClient {
        ButlerClient::new(server.uri(), token.map(str::to_string), false).unwrap()
    }

    #[tokio::test]
    async fn available_tiers_without_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/core/v1/subscriptions/available"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "meta": {"code": 200, "message": "Success"},
                "data": [{
                    "tier": "explorer",
                    "name": "Explorer",
                    "price": "4.50",
                    "currency": "EUR",
                    "billing_period": "month"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tiers = client(&server, None).available_tiers().await.unwrap();
        assert_eq!(tiers.len(), 1);
        assert_eq!(tiers[0].name, "Explorer");

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn authenticated_call_without_token_fails_locally() {
        let server = MockServer::start().await;
        let err = client(&server, None).list_subscriptions().await.unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_order_sends_bearer_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/core/v1/orders"))
            .and(header("authorization", "Bearer tok-1"))
            .and(body_json(json!({
                "tier": "explorer",
                "total_quantity_kg": 2,
                "line_items": [{
                    "quantity_kg": 2,
                    "grind_type": "whole_bean",
                    "brewing_method": "v60",
                    "notes": "light roast"
                }]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "meta": {"code": 201, "message": "Created"},
                "data": {"id": "ord-9", "status": "pending"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let req = CreateOrderRequest {
            tier: "explorer".into(),
            total_quantity_kg: 2,
            line_items: vec![LineItem {
                quantity_kg: 2,
                grind_type: GrindType::WholeBean,
                brewing_method: BrewingMethod::V60,
                notes: Some("light roast".into()),
            }],
        };
        let order = client(&server, Some("tok-1")).create_order(&req).await.unwrap();
        assert_eq!(order.id, "ord-9");
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn checkout_session_carries_order_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/core/v1/orders/ord-9/checkout"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "meta": {"code": 200, "message": "ok"},
                "data": {"checkout_url": "https://pay.example/cs_1"}
            })))
            .mount(&server)
            .await;

        let session = client(&server, Some("tok"))
            .create_checkout_session("ord-9")
            .await
            .unwrap();
        assert_eq!(session.order_id, "ord-9");
        assert_eq!(session.checkout_url, "https://pay.example/cs_1");
    }

    #[tokio::test]
    async fn list_subscriptions_decodes_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/core/v1/subscriptions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "meta": {"code": 200, "message": "ok"},
                "data": [
                    {"id": "s1", "tier": "explorer", "status": "active",
                     "started_at": "2025-11-29T15:39:50Z", "expires_at": null}
                ]
            })))
            .mount(&server)
            .await;

        let subs = client(&server, Some("tok")).list_subscriptions().await.unwrap();
        assert_eq!(subs[0].status, SubscriptionStatus::Active);
        assert_eq!(subs[0].started_at.as_deref(), Some("2025-11-29T15:39:50Z"));
        assert!(subs[0].expires_at.is_none());
    }

    #[tokio::test]
    async fn field_errors_are_joined() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/core/v1/orders"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "meta": {
                    "code": 422,
                    "message": "Validation failed",
                    "errors": [
                        {"error": "unknown tier", "field": "tier", "type": "invalid"},
                        {"error": "quantity mismatch", "field": "", "type": "invalid"}
                    ]
                },
                "data": {}
            })))
            .mount(&server)
            .await;

        let req = CreateOrderRequest {
            tier: "nope".into(),
            total_quantity_kg: 1,
            line_items: vec![],
        };
        let err = client(&server, Some("tok")).create_order(&req).await.unwrap_err();
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "tier: unknown tier\nquantity mismatch");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn error_message_fallbacks() {
        assert_eq!(
            error_message(400, r#"{"meta": {"code": 400, "message": "Bad tier"}}"#),
            "Bad tier"
        );
        assert_eq!(
            error_message(401, r#"{"detail": "Token expired"}"#),
            "Token expired"
        );
        assert_eq!(
            error_message(502, "upstream down"),
            "request failed (status 502): upstream down"
        );
    }

    #[tokio::test]
    async fn login_posts_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/core/v1/users/token"))
            .and(body_json(json!({"username": "ana", "password": "secret"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "meta": {"code": 200, "message": "ok"},
                "data": {
                    "access_token": "a1",
                    "refresh_token": "r1",
                    "expires_at": "1764427190000",
                    "refresh_token_expires_at": "1765427190000",
                    "user_id": "u1"
                }
            })))
            .mount(&server)
            .await;

        let tokens = client(&server, None).login("ana", "secret").await.unwrap();
        assert_eq!(tokens.access_token, "a1");
        assert_eq!(tokens.refresh_token, "r1");
        assert_eq!(tokens.expires_at, "1764427190000");
    }

    #[tokio::test]
    async fn register_posts_new_account() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/core/v1/users"))
            .and(body_json(json!({
                "username": "ana",
                "email": "ana@example.com",
                "password": "secret",
                "code": "BETA"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "meta": {"code": 201, "message": "created"},
                "data": {"id": "u1", "access_token": "a1", "refresh_token": "r1"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let req = RegisterRequest {
            username: "ana".into(),
            email: "ana@example.com".into(),
            password: "secret".into(),
            code: Some("BETA".into()),
        };
        let user = client(&server, None).register(&req).await.unwrap();
        assert_eq!(user.id, "u1");

        let tokens = TokenPair::from(user);
        assert_eq!(tokens.access_token, "a1");
        assert_eq!(tokens.refresh_token, "r1");
        assert!(tokens.expires_at.is_empty());
    }

    #[tokio::test]
    async fn register_surfaces_field_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/core/v1/users"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "meta": {
                    "code": 400,
                    "message": "validation failed",
                    "errors": [{"field": "username", "error": "already taken"}]
                }
            })))
            .mount(&server)
            .await;

        let req = RegisterRequest {
            username: "ana".into(),
            email: "ana@example.com".into(),
            password: "secret".into(),
            code: None,
        };
        let err = client(&server, None).register(&req).await.unwrap_err();
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "username: already taken");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn debug_bodies_hide_credentials() {
        let body = json!({
            "username": "ana",
            "password": "secret",
            "data": [{"access_token": "a1", "refresh_token": "r1", "id": "u1"}]
        });
        let shown = redact(body);
        assert_eq!(shown["username"], "ana");
        assert_eq!(shown["password"], "[redacted]");
        assert_eq!(shown["data"][0]["access_token"], "[redacted]");
        assert_eq!(shown["data"][0]["refresh_token"], "[redacted]");
        assert_eq!(shown["data"][0]["id"], "u1");
        assert!(!shown.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn malformed_success_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/core/v1/orders/ord-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server, Some("tok")).get_order("ord-1").await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }
}
