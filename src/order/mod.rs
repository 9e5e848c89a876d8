//! Interactive order configuration and payment activation.
//!
//! [`OrderFlow`] ties the pieces together. The [`QuantityAllocator`] splits
//! the monthly total and each share is filled in by a line item builder.
//! [`OrderSummary`] prices the result before the order is submitted, then
//! the activation poller waits for payment.

mod allocator;
pub mod flow;
mod line_item;
mod poller;
mod submit;
mod summary;

pub use allocator::QuantityAllocator;
pub use flow::{FlowOutcome, FlowSettings, OrderFlow};
pub use line_item::{BrewingMethod, GrindType, LineItem};
pub use poller::PollOutcome;
pub use submit::BrowserOpener;
pub use summary::OrderSummary;
