//! The "add product" form and its validation.

use spacemarket_core::{NewProduct, Price, PriceError};
use thiserror::Error;
use url::Url;

/// Stock assigned when the stock field is left blank.
pub const DEFAULT_STOCK: u32 = 10;

/// Errors from validating the product form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProductFormError {
    #[error("Please fill all required fields")]
    MissingRequired,

    #[error("Invalid price: {0}")]
    InvalidPrice(#[from] PriceError),

    #[error("Invalid image URL: {0}")]
    InvalidImage(String),

    #[error("Invalid stock: {0}")]
    InvalidStock(String),
}

/// Category picked on the form: one from the list, or a new one typed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryChoice {
    Existing(String),
    Custom(String),
}

impl CategoryChoice {
    fn name(&self) -> &str {
        match self {
            Self::Existing(name) | Self::Custom(name) => name.trim(),
        }
    }
}

impl Default for CategoryChoice {
    fn default() -> Self {
        Self::Existing(String::new())
    }
}

/// Raw form fields, as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub description: String,
    pub image: String,
    pub category: CategoryChoice,
    /// Blank means [`DEFAULT_STOCK`].
    pub stock: String,
    pub in_stock: bool,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            price: String::new(),
            description: String::new(),
            image: String::new(),
            category: CategoryChoice::default(),
            stock: String::new(),
            in_stock: true,
        }
    }
}

impl ProductForm {
    /// Validate the form into a creation payload.
    ///
    /// # Errors
    ///
    /// Returns [`ProductFormError::MissingRequired`] if any required field is
    /// blank after trimming, or a field-specific error if a value does not
    /// parse.
    pub fn validate(&self) -> Result<NewProduct, ProductFormError> {
        let name = self.name.trim();
        let price = self.price.trim();
        let description = self.description.trim();
        let image = self.image.trim();
        let category = self.category.name();

        if [name, price, description, image, category]
            .iter()
            .any(|field| field.is_empty())
        {
            return Err(ProductFormError::MissingRequired);
        }

        let price = Price::parse(price)?;
        let image = parse_image_url(image)?;

        let stock = match self.stock.trim() {
            "" => DEFAULT_STOCK,
            raw => raw
                .parse::<u32>()
                .map_err(|e| ProductFormError::InvalidStock(e.to_string()))?,
        };

        Ok(NewProduct {
            name: name.to_owned(),
            category: category.to_owned(),
            description: description.to_owned(),
            price,
            image,
            stock,
            in_stock: self.in_stock,
        })
    }
}

fn parse_image_url(raw: &str) -> Result<String, ProductFormError> {
    let url = Url::parse(raw).map_err(|e| ProductFormError::InvalidImage(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ProductFormError::InvalidImage(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }
    Ok(url.into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filled() -> ProductForm {
        ProductForm {
            name: "  Star Tracker ".to_string(),
            price: "125000".to_string(),
            description: "Attitude determination sensor".to_string(),
            image: "https://img.spacemarket.test/star-tracker.png".to_string(),
            category: CategoryChoice::Existing("Sensors".to_string()),
            ..ProductForm::default()
        }
    }

    #[test]
    fn test_valid_form_with_defaults() {
        let product = filled().validate().unwrap();
        assert_eq!(product.name, "Star Tracker");
        assert_eq!(product.category, "Sensors");
        assert_eq!(product.price, Price::from_units(125_000));
        assert_eq!(product.stock, DEFAULT_STOCK);
        assert!(product.in_stock);
    }

    #[test]
    fn test_custom_category_used() {
        let form = ProductForm {
            category: CategoryChoice::Custom(" Propulsion ".to_string()),
            ..filled()
        };
        assert_eq!(form.validate().unwrap().category, "Propulsion");

        let form = ProductForm {
            category: CategoryChoice::Custom("   ".to_string()),
            ..filled()
        };
        assert_eq!(form.validate(), Err(ProductFormError::MissingRequired));
    }

    #[test]
    fn test_blank_required_field() {
        let form = ProductForm {
            description: "  ".to_string(),
            ..filled()
        };
        assert_eq!(form.validate(), Err(ProductFormError::MissingRequired));
    }

    #[test]
    fn test_bad_values() {
        let form = ProductForm {
            price: "-5".to_string(),
            ..filled()
        };
        assert!(matches!(form.validate(), Err(ProductFormError::InvalidPrice(_))));

        let form = ProductForm {
            image: "star-tracker.png".to_string(),
            ..filled()
        };
        assert!(matches!(form.validate(), Err(ProductFormError::InvalidImage(_))));

        let form = ProductForm {
            stock: "lots".to_string(),
            ..filled()
        };
        assert!(matches!(form.validate(), Err(ProductFormError::InvalidStock(_))));
    }

    #[test]
    fn test_explicit_stock_and_out_of_stock() {
        let form = ProductForm {
            stock: "0".to_string(),
            in_stock: false,
            ..filled()
        };
        let product = form.validate().unwrap();
        assert_eq!(product.stock, 0);
        assert!(!product.in_stock);
    }
}
