use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::api::{OrderStatus, Subscription, SubscriptionService};

/// Delay between two payment checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// How long to wait for payment before giving up.
pub const DEFAULT_ACTIVATION_TIMEOUT: Duration = Duration::from_secs(300);
/// Shortest accepted interval between two status checks.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Terminal outcome of an activation poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The order was paid and an active subscription showed up.
    Activated(Subscription),
    /// The deadline passed first.
    TimedOut,
    /// The user interrupted the wait.
    Aborted,
}

impl fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollOutcome::Activated(sub) => write!(f, "ACTIVATED ({})", sub.id),
            PollOutcome::TimedOut => write!(f, "TIMED_OUT"),
            PollOutcome::Aborted => write!(f, "ABORTED"),
        }
    }
}

/// Waits for a submitted order to be paid and its subscription activated.
///
/// Three sources race on every iteration: the abort signal, the deadline
/// and the current tick (interval sleep followed by the status queries).
/// The first to complete wins and the others are dropped, so a deadline
/// that fires mid-tick discards that tick's result. Ticks run strictly one
/// after another: the next interval only starts once the previous tick's
/// queries have returned, so at most one query is ever in flight.
pub struct ActivationPoller<'a, S> {
    service: &'a S,
    interval: Duration,
    timeout: Duration,
}

impl<'a, S: SubscriptionService> ActivationPoller<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self {
            service,
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_ACTIVATION_TIMEOUT,
        }
    }

    /// Intervals below [`MIN_POLL_INTERVAL`] are raised to it.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Poll until activation, deadline or `abort` completes.
    ///
    /// `on_pending` is called after every tick that did not activate, with
    /// the 1-based tick number, to drive a progress indicator.
    pub async fn wait_for_activation<A, F>(
        &self,
        order_id: &str,
        abort: A,
        mut on_pending: F,
    ) -> PollOutcome
    where
        A: Future<Output = ()>,
        F: FnMut(u32),
    {
        let deadline = sleep(self.timeout);
        tokio::pin!(deadline);
        tokio::pin!(abort);

        let mut ticks = 0u32;
        let outcome = loop {
            tokio::select! {
                biased;

                _ = &mut abort => break PollOutcome::Aborted,
                _ = &mut deadline => break PollOutcome::TimedOut,
                found = self.tick(order_id) => {
                    ticks += 1;
                    if let Some(sub) = found {
                        break PollOutcome::Activated(sub);
                    }
                    on_pending(ticks);
                }
            }
        };

        info!(order_id, ticks, %outcome, "activation poll finished");
        outcome
    }

    async fn tick(&self, order_id: &str) -> Option<Subscription> {
        sleep(self.interval).await;
        self.check(order_id).await
    }

    /// One status check. Query errors count as "not paid yet".
    async fn check(&self, order_id: &str) -> Option<Subscription> {
        let order = match self.service.get_order(order_id).await {
            Ok(order) => order,
            Err(e) => {
                debug!(order_id, error = %e, "order status query failed");
                return None;
            }
        };
        if order.status != OrderStatus::Paid {
            return None;
        }

        match self.service.list_subscriptions().await {
            Ok(subs) => subs.into_iter().find(Subscription::is_active),
            Err(e) => {
                debug!(order_id, error = %e, "subscription query failed");
                None
            }
        }
    }
}
