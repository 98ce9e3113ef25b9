//! Order submission and order listing types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::email::{Email, EmailError};
use super::id::{OrderId, ProductId};
use super::price::Price;

/// Errors from validating checkout contact details.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CustomerInfoError {
    /// Name or email left blank.
    #[error("Please fill name and email")]
    MissingRequired,
    /// Email present but malformed.
    #[error("Invalid email address: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// Contact details collected at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

impl CustomerInfo {
    /// Validate raw form fields.
    ///
    /// Name and email are required; blank optional fields become `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CustomerInfoError::MissingRequired`] when name or email is
    /// blank, and [`CustomerInfoError::InvalidEmail`] when the email is
    /// malformed.
    pub fn new(
        name: &str,
        email: &str,
        phone: Option<&str>,
        organization: Option<&str>,
    ) -> Result<Self, CustomerInfoError> {
        let name = name.trim();
        if name.is_empty() || email.trim().is_empty() {
            return Err(CustomerInfoError::MissingRequired);
        }
        let email = Email::parse(email)?;

        Ok(Self {
            name: name.to_owned(),
            email,
            phone: non_blank(phone),
            organization: non_blank(organization),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// One product/quantity pair in an order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product: ProductId,
    pub quantity: u32,
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub items: Vec<OrderLine>,
    pub customer_info: CustomerInfo,
}

/// An order line as reported back by the API.
///
/// The server may return the product as an ID or as a populated document, so
/// it is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub product: serde_json::Value,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub price: Option<Price>,
}

/// Contact details as stored on a persisted order.
///
/// Stored orders are not guaranteed to carry every field, so nothing here is
/// required and the email is not re-validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderContact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
}

/// A persisted order, owned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(default)]
    pub customer_info: Option<OrderContact>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub total_price: Option<Price>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Last eight characters of the order ID, for compact listings.
    #[must_use]
    pub fn short_id(&self) -> &str {
        let id = self.id.as_str();
        let skip = id.chars().count().saturating_sub(8);
        id.char_indices().nth(skip).map_or(id, |(at, _)| &id[at..])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_customer_info_requires_name_and_email() {
        assert_eq!(
            CustomerInfo::new("", "a@b.c", None, None),
            Err(CustomerInfoError::MissingRequired)
        );
        assert_eq!(
            CustomerInfo::new("Kalpana", "   ", None, None),
            Err(CustomerInfoError::MissingRequired)
        );
        assert!(matches!(
            CustomerInfo::new("Kalpana", "not-an-email", None, None),
            Err(CustomerInfoError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_customer_info_drops_blank_optionals() {
        let info =
            CustomerInfo::new(" Kalpana ", "k@lab.example", Some("  "), Some("ISRO")).unwrap();
        assert_eq!(info.name, "Kalpana");
        assert_eq!(info.phone, None);
        assert_eq!(info.organization.as_deref(), Some("ISRO"));

        let value = serde_json::to_value(&info).unwrap();
        assert!(value.get("phone").is_none());
    }

    #[test]
    fn test_order_request_wire_shape() {
        let request = OrderRequest {
            items: vec![OrderLine {
                product: ProductId::new("p1"),
                quantity: 2,
            }],
            customer_info: CustomerInfo::new("A", "a@b.c", None, None).unwrap(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "items": [{"product": "p1", "quantity": 2}],
                "customerInfo": {"name": "A", "email": "a@b.c"}
            })
        );
    }

    #[test]
    fn test_order_listing_tolerates_sparse_documents() {
        let order: Order = serde_json::from_value(json!({
            "_id": "65a1f0c2e4b0a1b2c3d4e5f6",
            "items": [{"product": {"_id": "p1", "name": "X"}, "quantity": 1}],
            "totalPrice": 350,
            "createdAt": "2024-03-01T10:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(order.short_id(), "c3d4e5f6");
        assert!(order.customer_info.is_none());
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total_price, Some(Price::from_units(350)));
        assert!(order.created_at.is_some());
    }

    #[test]
    fn test_order_listing_tolerates_partial_contact() {
        let orders: Vec<Order> = serde_json::from_value(json!([
            {
                "_id": "o-1",
                "customerInfo": {"name": "Kalpana", "email": "k@lab.example"}
            },
            {"_id": "o-2", "customerInfo": {"name": "NoEmail"}},
            {"_id": "o-3", "customerInfo": {"email": "not an email"}}
        ]))
        .unwrap();

        assert_eq!(orders.len(), 3);
        let contact = orders[1].customer_info.as_ref().unwrap();
        assert_eq!(contact.name.as_deref(), Some("NoEmail"));
        assert_eq!(contact.email, None);
        let contact = orders[2].customer_info.as_ref().unwrap();
        assert_eq!(contact.name, None);
        assert_eq!(contact.email.as_deref(), Some("not an email"));
    }

    #[test]
    fn test_short_id_of_short_ids() {
        let order: Order = serde_json::from_value(json!({"_id": "abc"})).unwrap();
        assert_eq!(order.short_id(), "abc");
    }
}
