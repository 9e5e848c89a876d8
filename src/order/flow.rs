use std::future::Future;
use std::time::Duration;

use tracing::{debug, info};

use super::allocator::QuantityAllocator;
use super::line_item::{LineItem, LineItemBuilder};
use super::poller::{ActivationPoller, PollOutcome};
use super::submit::{BrowserOpener, OrderSubmitter};
use super::summary::{OrderSummary, parse_price};
use crate::api::{Subscription, SubscriptionService, Tier};
use crate::config::BcConfig;
use crate::error::OrderError;
use crate::prompt::Prompter;
use crate::ui;

/// Knobs of the ordering workflow, taken from [`BcConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSettings {
    pub min_quantity_kg: u32,
    pub max_quantity_kg: u32,
    pub poll_interval: Duration,
    pub activation_timeout: Duration,
}

impl FlowSettings {
    /// Settings from the config file, with the minimum quantity at least 1
    /// and the maximum at least the minimum.
    pub fn from_config(config: &BcConfig) -> Self {
        let min = config.min_quantity_kg.max(1);
        Self {
            min_quantity_kg: min,
            max_quantity_kg: config.max_quantity_kg.max(min),
            poll_interval: config.poll_interval(),
            activation_timeout: config.activation_timeout(),
        }
    }
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self::from_config(&BcConfig::default())
    }
}

/// Quantity and line items chosen by the user, not yet submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguredOrder {
    pub total_quantity_kg: u32,
    pub line_items: Vec<LineItem>,
}

/// How an [`OrderFlow::run`] ended without error.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome {
    /// The user backed out at the confirmation step. Nothing was submitted.
    Declined,
    Activated {
        subscription: Subscription,
        total_quantity_kg: u32,
    },
    /// The order exists remotely but payment was not seen in time, or the
    /// user stopped waiting.
    AwaitingPayment {
        order_id: String,
        outcome: PollOutcome,
    },
}

/// Ask for the monthly total and how it should be prepared.
pub fn configure_order<P: Prompter>(
    prompter: &mut P,
    settings: &FlowSettings,
) -> Result<ConfiguredOrder, OrderError> {
    ui::print_order_intro(settings.min_quantity_kg, settings.max_quantity_kg);
    let total = prompter.prompt_int(
        "Total quantity per month (kg)",
        settings.min_quantity_kg,
        settings.max_quantity_kg,
        settings.min_quantity_kg,
    )?;
    ui::ok(&format!("Total: {total} kg per month"));

    ui::print_split_intro();
    let wants_split = prompter.prompt_confirm("Would you like different grind methods?", true)?;

    let line_items = if wants_split {
        configure_split(prompter, total)?
    } else {
        configure_uniform(prompter, total)?
    };
    Ok(ConfiguredOrder {
        total_quantity_kg: total,
        line_items,
    })
}

fn configure_uniform<P: Prompter>(prompter: &mut P, total: u32) -> Result<Vec<LineItem>, OrderError> {
    ui::print_uniform_intro(total);
    let item = LineItemBuilder::new(prompter).build(total)?;
    ui::print_item_added(&item);
    Ok(vec![item])
}

/// Split `total` into line items until every kilogram is allocated.
fn configure_split<P: Prompter>(prompter: &mut P, total: u32) -> Result<Vec<LineItem>, OrderError> {
    ui::print_split_order_intro(total);

    let mut allocator = QuantityAllocator::new(total);
    let mut items = Vec::new();
    let mut step = 1;

    while !allocator.is_exhausted() {
        ui::print_preference_header(step, &allocator);
        let requested = prompter.prompt_int(
            "How much for this preference? (kg)",
            1,
            allocator.remaining(),
            allocator.propose(),
        )?;
        let remaining = match allocator.allocate(requested) {
            Ok(remaining) => remaining,
            Err(e @ OrderError::OutOfRange { .. }) => {
                ui::warn(&e.to_string());
                continue;
            }
            Err(e) => return Err(e),
        };
        debug!(step, requested, remaining, "allocated");
        if remaining == 0 {
            ui::ok(&format!("Allocating {requested} kg (this will complete your order!)"));
        } else {
            ui::ok(&format!("Allocating {requested} kg"));
        }

        let item = LineItemBuilder::new(prompter).build(requested)?;
        ui::print_item_added(&item);
        items.push(item);
        ui::print_progress(allocator.allocated(), total);
        step += 1;
    }

    ui::ok(&format!("Perfect! You've allocated all {total} kg!"));
    Ok(items)
}

/// One run of the subscribe workflow for a chosen tier.
pub struct OrderFlow<'a, S, P, B> {
    service: &'a S,
    prompter: &'a mut P,
    browser: &'a B,
    settings: FlowSettings,
}

impl<'a, S, P, B> OrderFlow<'a, S, P, B>
where
    S: SubscriptionService,
    P: Prompter,
    B: BrowserOpener,
{
    pub fn new(service: &'a S, prompter: &'a mut P, browser: &'a B, settings: FlowSettings) -> Self {
        Self {
            service,
            prompter,
            browser,
            settings,
        }
    }

    /// Configure, confirm, submit and wait for activation.
    ///
    /// `abort` completing while waiting for payment ends the wait with
    /// [`PollOutcome::Aborted`]. Configuration and submission errors are
    /// returned; a missing payment is not an error.
    pub async fn run<A>(&mut self, tier: &Tier, abort: A) -> Result<FlowOutcome, OrderError>
    where
        A: Future<Output = ()>,
    {
        // A broken tier price should stop us before the user spends time
        // configuring anything.
        parse_price(&tier.price)?;

        let order = configure_order(&mut *self.prompter, &self.settings)?;
        let summary = OrderSummary::calculate(tier, order.total_quantity_kg, &order.line_items)?;
        ui::print_summary(&summary);

        if !self
            .prompter
            .prompt_confirm("Looks good! Proceed to checkout?", true)?
        {
            println!("\nOrder cancelled.");
            return Ok(FlowOutcome::Declined);
        }

        let submitter = OrderSubmitter::new(self.service, self.browser);
        let created = submitter
            .submit(&tier.tier, order.total_quantity_kg, &order.line_items)
            .await?;
        ui::ok(&format!("Order created (ID: {})", created.id));

        let checkout = submitter.create_checkout(&created.id).await?;
        if checkout.browser_opened {
            ui::ok("Opened checkout in your browser");
        } else {
            ui::warn("Couldn't open browser automatically. Please visit:");
            println!("{}", checkout.session.checkout_url);
        }

        let progress = ui::PaymentProgress::start(self.settings.activation_timeout);
        let outcome = ActivationPoller::new(self.service)
            .with_interval(self.settings.poll_interval)
            .with_timeout(self.settings.activation_timeout)
            .wait_for_activation(&created.id, abort, |tick| progress.advance(tick))
            .await;
        progress.finish();

        info!(order_id = %created.id, %outcome, "order flow finished");
        Ok(match outcome {
            PollOutcome::Activated(subscription) => FlowOutcome::Activated {
                subscription,
                total_quantity_kg: order.total_quantity_kg,
            },
            other => FlowOutcome::AwaitingPayment {
                order_id: created.id,
                outcome: other,
            },
        })
    }
}
