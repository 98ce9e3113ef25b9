//! Admin commands: products, orders, categories and product creation.
//!
//! # Environment Variables
//!
//! - `SPACEMARKET_API_URL` - Base URL of the products/orders API
//! - `SPACEMARKET_ADMIN_KEY` - Admin credential sent as `x-admin-key`

use std::error::Error;
use std::io::Write;

use spacemarket_admin::{AdminClient, AdminConfig, CategorySource, OrderRow, ProductForm};
use tracing::{info, warn};

type CommandResult = Result<(), Box<dyn Error>>;

/// Build an admin client from the environment.
///
/// # Errors
///
/// Returns an error if configuration is missing, invalid or insecure.
pub fn open() -> Result<AdminClient, Box<dyn Error>> {
    let config = AdminConfig::from_env()?;
    info!(api_url = %config.api_url, "Admin client configured");
    Ok(AdminClient::new(&config)?)
}

/// List every product.
///
/// # Errors
///
/// Returns an error if the request fails or output cannot be written.
pub async fn list_products(admin: &AdminClient, out: &mut impl Write) -> CommandResult {
    let products = admin.list_products().await?;
    writeln!(out, "Products ({})", products.len())?;
    for product in &products {
        writeln!(
            out,
            "{:<26} {:<32} {:>14}  {:<24} stock {}",
            product.id.as_str(),
            product.name,
            product.price.display(),
            product.category,
            product.stock
        )?;
    }
    Ok(())
}

/// List every order.
///
/// # Errors
///
/// Returns an error if the request fails or output cannot be written.
pub async fn list_orders(admin: &AdminClient, out: &mut impl Write) -> CommandResult {
    let orders = admin.list_orders().await?;
    writeln!(out, "Orders ({})", orders.len())?;
    for row in orders.iter().map(OrderRow::from) {
        writeln!(
            out,
            "#{:<8} {:<24} {:<32} {:>3} items {:>14}",
            row.short_id,
            row.customer_name,
            row.customer_email,
            row.item_count,
            row.total_label()
        )?;
    }
    Ok(())
}

/// List categories, noting when the built-in list is shown.
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub async fn list_categories(admin: &AdminClient, out: &mut impl Write) -> CommandResult {
    let categories = admin.list_categories().await;
    if categories.source == CategorySource::Fallback {
        warn!("Showing built-in categories; the API did not answer");
    }
    for name in &categories.names {
        writeln!(out, "{name}")?;
    }
    Ok(())
}

/// Create a product from the form.
///
/// # Errors
///
/// Returns an error if the form is invalid or the API rejects the product.
pub async fn create_product(
    admin: &AdminClient,
    form: &ProductForm,
    out: &mut impl Write,
) -> CommandResult {
    let product = admin
        .create_product(form)
        .await
        .map_err(|e| format!("Failed to add product: {}", e.user_message()))?;
    writeln!(out, "Product added: {} ({})", product.name, product.id)?;
    Ok(())
}
