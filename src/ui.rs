//! Terminal output for bc-cli: spinners and styled text.
//!
//! Uses `indicatif` for the payment wait spinner and `console` for colors.
//! Layout helpers that are worth testing return `String`s; the `print_*`
//! wrappers write them to stdout.

use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use console::{Style, style};
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::{Subscription, SubscriptionStatus, Tier};
use crate::config::parse_timestamp;
use crate::order::{GrindType, LineItem, OrderSummary, QuantityAllocator};

const RULE_WIDTH: usize = 60;
const BAR_WIDTH: usize = 30;

fn rule() -> String {
    "─".repeat(RULE_WIDTH)
}

/// Green check mark followed by `msg`.
pub fn ok(msg: &str) {
    println!("{} {msg}", style("✓").green().bold());
}

/// Yellow `!` followed by `msg`. Used for recoverable problems.
pub fn warn(msg: &str) {
    println!("{} {msg}", style("!").yellow().bold());
}

/// Banner opening the order configuration.
pub fn print_order_intro(min_kg: u32, max_kg: u32) {
    println!();
    println!("{}", rule());
    println!("{}", style("Let's configure your coffee order!").bold());
    println!("{}", rule());
    println!();
    println!("How much coffee would you like per month?");
    println!("You can order anywhere from {min_kg} kg to {max_kg} kg.");
}

/// Explain the choice between one preparation and a split order.
pub fn print_split_intro() {
    println!("{}", rule());
    println!();
    println!("Would you like your coffee prepared different ways?");
    println!("For example, you could get:");
    println!("  • 2 kg whole bean + 3 kg ground for espresso");
    println!("  • 2 kg ground for moka + 2 kg ground for v60 + 1 kg whole bean");
    println!();
    println!("Or keep it simple with everything the same way.");
}

/// Header for an order prepared one way only.
pub fn print_uniform_intro(total_kg: u32) {
    println!("{}", rule());
    println!();
    println!("Great! Let's prepare all {total_kg} kg the same way.");
    println!();
}

/// Header for a split order of `total_kg`.
pub fn print_split_order_intro(total_kg: u32) {
    println!("{}", rule());
    println!();
    println!("Great! Now let's split your {total_kg} kg into different grinding preferences.");
    println!("  • Whole beans (you grind at home)");
    println!("  • Pre-ground for specific brewing methods");
    println!("We'll help you allocate all {total_kg} kg across your preferences.");
}

/// Step header with the remaining budget, warning when it runs low.
pub fn print_preference_header(step: u32, allocator: &QuantityAllocator) {
    println!("{}", rule());
    println!("{}", style(format!("Preference #{step}")).cyan().bold());
    println!("  Allocating from: {} kg total", allocator.total());
    let remaining = format!("  Remaining: {} kg", allocator.remaining());
    if allocator.is_running_low() {
        println!("{remaining} {}", style("(almost done!)").yellow());
    } else {
        println!("{remaining}");
    }
}

/// `█` for the allocated share, `░` for the rest.
pub fn render_progress_bar(current: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let filled = ((u64::from(current.min(total)) * width as u64) / u64::from(total)) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Progress bar of allocated kilograms.
pub fn print_progress(current: u32, total: u32) {
    let done = if current >= total { " ✓" } else { "" };
    println!(
        "\n  Progress: {} {current}/{total} kg{done}\n",
        render_progress_bar(current, total, BAR_WIDTH)
    );
}

/// Confirmation line for a finished line item.
pub fn print_item_added(item: &LineItem) {
    let how = match item.grind_type {
        GrindType::WholeBean => "whole beans",
        GrindType::Ground => "ground",
    };
    ok(&format!(
        "Added: {} kg {how} for {}",
        item.quantity_kg,
        item.brewing_method.display()
    ));
}

/// Order summary box: tier, quantity, price and one line per item.
pub fn render_summary(summary: &OrderSummary) -> String {
    let mut out = String::new();
    out.push_str("Your Order Summary:\n");
    out.push_str(&format!("  Tier:  {}\n", summary.tier_name));
    out.push_str(&format!("  Total: {} kg/month\n", summary.total_quantity_kg));
    out.push_str(&format!("  Price: {}\n", summary.price_label()));
    out.push_str("\n  How your coffee will be prepared:\n");
    for (i, (line, notes)) in summary.lines.iter().enumerate() {
        out.push_str(&format!("    {}. {line}\n", i + 1));
        if let Some(notes) = notes {
            out.push_str(&format!("       Notes: {notes}\n"));
        }
    }
    out
}

pub fn print_summary(summary: &OrderSummary) {
    println!("{}", rule());
    println!("{}", render_summary(summary));
}

/// Tier card. `active` is the user's subscription to this tier, if any.
pub fn print_tier_details(tier: &Tier, active: Option<&Subscription>) {
    println!();
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("{}", style(&tier.name).bold());
    println!("{}", "=".repeat(RULE_WIDTH));
    println!();
    println!("Price: {} {}/{}", tier.currency, tier.price, tier.billing_period);
    if !tier.description.is_empty() {
        println!("Description: {}", tier.description);
    }
    if let Some(sub) = active {
        println!();
        print_subscription(sub);
    }
    if !tier.features.is_empty() {
        println!();
        println!("Features:");
        for feature in &tier.features {
            println!("  • {feature}");
        }
    }
    println!();
}

/// One subscription as shown by `bc-cli status`.
pub fn print_subscription(sub: &Subscription) {
    let status = sub.status.to_string().to_uppercase();
    if sub.status == SubscriptionStatus::Active {
        println!("┌─ {} {}", sub.tier.to_uppercase(), style("✓").green());
        println!("│  Status: {}", style(status).green());
    } else {
        println!("┌─ {}", sub.tier.to_uppercase());
        println!("│  Status: {status}");
    }
    if let Some(started) = &sub.started_at {
        println!("│  Started: {}", format_timestamp(started));
    }
    if let Some(expires) = &sub.expires_at {
        println!("│  Expires: {}", format_timestamp(expires));
    }
    println!("└─ ID: {}", sub.id);
}

/// Success banner once payment went through.
pub fn print_activated(total_kg: u32, tier_name: &str) {
    let green = Style::new().green().bold();
    println!();
    println!(
        "{}",
        green.apply_to("🎉 Congratulations! Your subscription is now active!")
    );
    println!();
    println!("📦 Your first shipment of {total_kg} kg of fresh {tier_name} coffee");
    println!("   will be shipped within the next 7 days.");
    println!();
    println!("☕ Get ready for an amazing coffee experience!");
}

/// Payment not seen yet: how to check again later.
pub fn print_payment_pending(order_id: &str) {
    println!();
    println!(
        "{}",
        style("Complete your payment to activate your subscription.").yellow()
    );
    println!("Your order {order_id} is saved and will be processed once payment is received.");
}

/// Spinner shown while the activation poll waits for payment.
pub struct PaymentProgress {
    pb: ProgressBar,
}

impl PaymentProgress {
    /// Show the spinner with the time the user has to pay.
    pub fn start(timeout: Duration) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!(
            "Waiting for payment confirmation (you have {} minutes)",
            timeout.as_secs().div_ceil(60)
        ));
        pb.enable_steady_tick(Duration::from_millis(100));
        Self { pb }
    }

    /// Called after each status check that found nothing yet.
    pub fn advance(&self, tick: u32) {
        let dots = ".".repeat((tick.saturating_sub(1) % 3 + 1) as usize);
        self.pb.set_message(format!("Checking payment status{dots}"));
    }

    /// Remove the spinner from the terminal.
    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

/// Render an API timestamp as e.g. `November 29, 2025 at 2:39 PM` (UTC).
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD` and unix
/// milliseconds strictly between the years 2000 and 2100. Anything else is
/// returned unchanged.
pub fn format_timestamp(raw: &str) -> String {
    const OUT: &str = "%B %-d, %Y at %-I:%M %p";
    // 2000-01-01T00:00:00Z and 2100-01-01T00:00:00Z, exclusive.
    const MILLIS_RANGE: (i64, i64) = (946_684_800_000, 4_102_444_800_000);

    if raw.is_empty() {
        return String::new();
    }
    let is_millis = raw
        .parse::<i64>()
        .is_ok_and(|ms| ms > MILLIS_RANGE.0 && ms < MILLIS_RANGE.1);
    if is_millis || raw.contains('T') {
        if let Some(dt) = parse_timestamp(raw) {
            return dt.format(OUT).to_string();
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.format(OUT).to_string();
    }
    if let Some(dt) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return dt.format(OUT).to_string();
    }
    raw.to_string()
}
