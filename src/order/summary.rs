use super::line_item::{GrindType, LineItem};
use crate::api::Tier;
use crate::error::OrderError;

/// Parse a per-kilogram price string. Never defaults to zero.
pub fn parse_price(raw: &str) -> Result<f64, OrderError> {
    match raw.trim().parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Ok(price),
        _ => Err(OrderError::InvalidPrice(raw.to_string())),
    }
}

/// Parse `price_per_kg` and multiply it by the quantity.
pub fn total_price(price_per_kg: &str, total_quantity_kg: u32) -> Result<f64, OrderError> {
    Ok(parse_price(price_per_kg)? * f64::from(total_quantity_kg))
}

/// Human-readable description of one line item.
pub fn describe(item: &LineItem) -> String {
    let method = item.brewing_method.display();
    match item.grind_type {
        GrindType::WholeBean => format!("{} kg → Whole beans for {method}", item.quantity_kg),
        GrindType::Ground => format!(
            "{} kg → Ground for {method} ({})",
            item.quantity_kg,
            item.brewing_method.grind_description()
        ),
    }
}

/// Confirmation view of a configured order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub tier_name: String,
    pub currency: String,
    pub billing_period: String,
    pub total_quantity_kg: u32,
    pub total_price: f64,
    /// Descriptions in build order, paired with the item's notes.
    pub lines: Vec<(String, Option<String>)>,
}

impl OrderSummary {
    pub fn calculate(
        tier: &Tier,
        total_quantity_kg: u32,
        items: &[LineItem],
    ) -> Result<Self, OrderError> {
        let total_price = total_price(&tier.price, total_quantity_kg)?;
        let lines = items
            .iter()
            .map(|item| (describe(item), item.notes.clone()))
            .collect();
        Ok(Self {
            tier_name: tier.name.clone(),
            currency: tier.currency.clone(),
            billing_period: tier.billing_period.clone(),
            total_quantity_kg,
            total_price,
            lines,
        })
    }

    /// e.g. `EUR 45.00/month`
    pub fn price_label(&self) -> String {
        format!(
            "{} {:.2}/{}",
            self.currency, self.total_price, self.billing_period
        )
    }
}
