use tracing::{info, warn};

use super::line_item::LineItem;
use crate::api::{CheckoutSession, CreateOrderRequest, Order, SubscriptionService};
use crate::error::OrderError;

/// Opens a URL for the user. Best effort only.
pub trait BrowserOpener {
    fn open(&self, url: &str) -> std::io::Result<()>;
}

/// Result of [`OrderSubmitter::create_checkout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub session: CheckoutSession,
    /// False when the browser could not be launched and the URL has to be
    /// shown for manual use.
    pub browser_opened: bool,
}

/// Sends a finished order and its checkout session to the service.
/// Each call hits the service exactly once.
pub struct OrderSubmitter<'a, S, B> {
    service: &'a S,
    browser: &'a B,
}

impl<'a, S: SubscriptionService, B: BrowserOpener> OrderSubmitter<'a, S, B> {
    pub fn new(service: &'a S, browser: &'a B) -> Self {
        Self { service, browser }
    }

    /// Create the order remotely. `items` must add up to `total_quantity_kg`.
    pub async fn submit(
        &self,
        tier: &str,
        total_quantity_kg: u32,
        line_items: &[LineItem],
    ) -> Result<Order, OrderError> {
        let req = CreateOrderRequest {
            tier: tier.to_string(),
            total_quantity_kg,
            line_items: line_items.to_vec(),
        };
        let order = self.service.create_order(&req).await?;
        info!(order_id = %order.id, tier, total_quantity_kg, items = line_items.len(), "order created");
        Ok(order)
    }

    /// Create the checkout session, then try to open it in a browser.
    pub async fn create_checkout(&self, order_id: &str) -> Result<Checkout, OrderError> {
        let session = self.service.create_checkout_session(order_id).await?;
        let browser_opened = match self.browser.open(&session.checkout_url) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "could not open browser");
                false
            }
        };
        Ok(Checkout {
            session,
            browser_opened,
        })
    }
}
