//! Product types as exchanged with the catalog API.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A product listed in the catalog.
///
/// Owned by the remote API. The client only ever reads products, apart from
/// admin creation via [`NewProduct`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Opaque identifier issued by the API.
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Plain text description.
    #[serde(default)]
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Image URI.
    #[serde(default)]
    pub image: String,
    /// Category name, free-form.
    #[serde(default)]
    pub category: String,
    /// Units on hand.
    #[serde(default)]
    pub stock: u32,
    /// Whether the product can be added to a cart.
    ///
    /// Expected to agree with `stock > 0` but the API does not enforce it.
    #[serde(default)]
    pub in_stock: bool,
}

/// Payload for creating a product through the admin API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub description: String,
    pub price: Price,
    pub image: String,
    pub stock: u32,
    pub in_stock: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_api_product() {
        let value = json!({
            "_id": "65a1f0c2e4b0a1b2c3d4e5f6",
            "name": "Star Tracker",
            "description": "Attitude determination sensor",
            "price": 125000,
            "image": "https://img.example/tracker.jpg",
            "category": "Sensors",
            "stock": 3,
            "inStock": true,
            "__v": 0
        });

        let product: Product = serde_json::from_value(value).unwrap();
        assert_eq!(product.id.as_str(), "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(product.price, Price::from_units(125_000));
        assert_eq!(product.stock, 3);
        assert!(product.in_stock);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let product: Product =
            serde_json::from_value(json!({"_id": "p1", "name": "Bare", "price": 10})).unwrap();
        assert!(product.description.is_empty());
        assert!(product.category.is_empty());
        assert_eq!(product.stock, 0);
        assert!(!product.in_stock);
    }

    #[test]
    fn test_new_product_wire_names() {
        let new = NewProduct {
            name: "Solar Array".to_string(),
            category: "Power Systems".to_string(),
            description: "Deployable panel".to_string(),
            price: Price::from_units(90_000),
            image: "https://img.example/array.jpg".to_string(),
            stock: 10,
            in_stock: true,
        };
        let value = serde_json::to_value(&new).unwrap();
        assert_eq!(value["inStock"], json!(true));
        assert_eq!(value["price"], json!(90000));
    }
}
