//! Wire types for the Butler Coffee REST API.
//!
//! Every response is wrapped in an [`Envelope`] carrying a `meta` block and
//! the actual `data` payload. Status strings that drive control flow are
//! decoded into closed enums with an `Other` fallback so an unknown status
//! from the server never fails deserialization.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::order::LineItem;

/// Standard response wrapper: `{"meta": {...}, "data": ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[allow(dead_code)]
    #[serde(default)]
    pub meta: Meta,
    pub data: T,
}

/// Metadata block present on success and error responses alike.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

/// One validation failure reported by the server.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldError {
    pub error: String,
    #[serde(default)]
    pub field: String,
}

/// Error body: only the `meta` block matters.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub meta: Meta,
}

/// A subscription plan that can be ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    /// Tier code sent back when ordering (e.g. "explorer").
    pub tier: String,
    pub name: String,
    /// Price per kilogram, as a decimal string.
    pub price: String,
    pub currency: String,
    pub billing_period: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Lifecycle status of a user's subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionStatus {
    Pending,
    Active,
    Expired,
    Cancelled,
    Other(String),
}

impl From<String> for SubscriptionStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => Self::Pending,
            "active" => Self::Active,
            "expired" => Self::Expired,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Other(value),
        }
    }
}

impl From<SubscriptionStatus> for String {
    fn from(value: SubscriptionStatus) -> Self {
        value.to_string()
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Active => write!(f, "active"),
            Self::Expired => write!(f, "expired"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Read snapshot of one of the user's subscriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub tier: String,
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

impl Subscription {
    /// Whether the subscription is currently running.
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}

/// Payment status of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Cancelled,
    Other(String),
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => Self::Pending,
            "paid" => Self::Paid,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Other(value),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(value: OrderStatus) -> Self {
        match value {
            OrderStatus::Pending => "pending".into(),
            OrderStatus::Paid => "paid".into(),
            OrderStatus::Cancelled => "cancelled".into(),
            OrderStatus::Other(s) => s,
        }
    }
}

/// Server-side order record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub status: OrderStatus,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest {
    pub tier: String,
    pub total_quantity_kg: u32,
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CheckoutResponse {
    pub checkout_url: String,
}

/// Browser-redirectable payment flow for one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub order_id: String,
    pub checkout_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// New account. `code` is the optional invitation code and is left out of
/// the body when absent.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Account created by the signup endpoint, already logged in.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredUser {
    #[serde(default)]
    pub id: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl From<RegisteredUser> for TokenPair {
    fn from(user: RegisteredUser) -> Self {
        TokenPair {
            access_token: user.access_token,
            refresh_token: user.refresh_token,
            expires_at: String::new(),
            refresh_token_expires_at: String::new(),
        }
    }
}

/// Tokens issued by the login endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_at: String,
    #[serde(default)]
    pub refresh_token_expires_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{BrewingMethod, GrindType};

    #[test]
    fn register_request_omits_missing_code() {
        let mut req = RegisterRequest {
            username: "ana".into(),
            email: "ana@example.com".into(),
            password: "secret".into(),
            code: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("code").is_none());

        req.code = Some("BETA".into());
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["code"], "BETA");
    }

    #[test]
    fn tier_deserializes_from_api_format() {
        let json = r#"{
            "meta": {"code": 200, "message": "ok"},
            "data": [{
                "tier": "explorer",
                "name": "Explorer",
                "price": "4.50",
                "currency": "EUR",
                "billing_period": "month",
                "description": "Rotating single origins",
                "features": ["Free shipping"]
            }]
        }"#;
        let env: Envelope<Vec<Tier>> = serde_json::from_str(json).unwrap();
        assert_eq!(env.data.len(), 1);
        assert_eq!(env.data[0].price, "4.50");
        assert_eq!(env.data[0].features, vec!["Free shipping"]);
    }

    #[test]
    fn unknown_subscription_status_is_preserved() {
        let json = r#"{"id": "s1", "tier": "explorer", "status": "paused"}"#;
        let sub: Subscription = serde_json::from_str(json).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Other("paused".into()));
        assert!(!sub.is_active());
        assert!(sub.started_at.is_none());
    }

    #[test]
    fn order_status_parses_paid() {
        let order: Order = serde_json::from_str(r#"{"id": "o1", "status": "paid"}"#).unwrap();
        assert_eq!(order.status, OrderStatus::Paid);

        let order: Order = serde_json::from_str(r#"{"id": "o2"}"#).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn create_order_request_uses_wire_names() {
        let req = CreateOrderRequest {
            tier: "explorer".into(),
            total_quantity_kg: 3,
            line_items: vec![LineItem {
                quantity_kg: 3,
                grind_type: GrindType::Ground,
                brewing_method: BrewingMethod::FrenchPress,
                notes: None,
            }],
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["total_quantity_kg"], 3);
        assert_eq!(value["line_items"][0]["grind_type"], "ground");
        assert_eq!(value["line_items"][0]["brewing_method"], "french_press");
        assert!(value["line_items"][0].get("notes").is_none());
    }
}
