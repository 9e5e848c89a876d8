pub mod client;
pub mod error;
pub mod types;

pub use client::ButlerClient;
pub use error::ApiError;
pub use types::{
    CheckoutSession, CreateOrderRequest, Order, OrderStatus, RegisterRequest, Subscription,
    SubscriptionStatus, Tier, TokenPair,
};

/// Remote operations the ordering workflow depends on.
///
/// Implemented by [`ButlerClient`] over HTTP and by scripted fakes in tests.
/// None of these retry; a failed call is reported once to the caller.
pub trait SubscriptionService {
    async fn available_tiers(&self) -> Result<Vec<Tier>, ApiError>;
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, ApiError>;
    async fn create_order(&self, req: &CreateOrderRequest) -> Result<Order, ApiError>;
    async fn get_order(&self, order_id: &str) -> Result<Order, ApiError>;
    async fn create_checkout_session(&self, order_id: &str) -> Result<CheckoutSession, ApiError>;
}
