//! Order rows for the admin order table.

use spacemarket_core::{Order, Price};

/// Placeholder for missing customer fields.
pub const NOT_AVAILABLE: &str = "N/A";

/// One display row of the order table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub short_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub item_count: usize,
    pub total: Option<Price>,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        let contact = order.customer_info.as_ref();

        Self {
            short_id: order.short_id().to_string(),
            customer_name: or_not_available(contact.and_then(|c| c.name.as_deref())),
            customer_email: or_not_available(contact.and_then(|c| c.email.as_deref())),
            item_count: order.items.len(),
            total: order.total_price,
        }
    }
}

fn or_not_available(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

impl OrderRow {
    /// Total as displayed, or [`NOT_AVAILABLE`].
    #[must_use]
    pub fn total_label(&self) -> String {
        self.total
            .map_or_else(|| NOT_AVAILABLE.to_string(), |total| total.display())
    }
}
