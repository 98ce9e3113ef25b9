//! Storefront commands: browsing, cart and checkout.
//!
//! # Environment Variables
//!
//! - `SPACEMARKET_API_URL` - Base URL of the products/orders API
//! - `SPACEMARKET_DATA_DIR` - Where the cart is kept (default: .spacemarket)

use std::error::Error;
use std::io::Write;

use spacemarket_core::{Product, ProductId};
use spacemarket_storefront::Storefront;
use spacemarket_storefront::catalog::Listing;
use spacemarket_storefront::checkout::CustomerForm;
use spacemarket_storefront::config::StorefrontConfig;
use tracing::info;

type CommandResult = Result<(), Box<dyn Error>>;

/// Open a storefront session from the environment.
///
/// # Errors
///
/// Returns an error if configuration is missing or invalid.
pub fn open() -> Result<Storefront, Box<dyn Error>> {
    let config = StorefrontConfig::from_env()?;
    info!(api_url = %config.api_url, data_dir = %config.data_dir.display(), "Storefront configured");
    Ok(Storefront::new(config)?)
}

/// List products, optionally filtered by search.
///
/// # Errors
///
/// Returns an error if the listing fails or output cannot be written.
pub async fn list_products(
    shop: &Storefront,
    search: Option<&str>,
    out: &mut impl Write,
) -> CommandResult {
    let Listing::Current(products) = shop.catalog().list(search).await? else {
        return Ok(());
    };

    if products.is_empty() {
        writeln!(out, "No products found")?;
        return Ok(());
    }
    for product in &products {
        write_product_line(out, product)?;
    }
    Ok(())
}

/// Show a product with its related products.
///
/// # Errors
///
/// Returns an error if the product cannot be fetched or output cannot be
/// written.
pub async fn show_product(shop: &Storefront, id: &str, out: &mut impl Write) -> CommandResult {
    let detail = shop.catalog().detail(&ProductId::new(id)).await?;
    let product = &detail.product;

    writeln!(out, "{}", product.name)?;
    writeln!(out, "  Price:    {}", product.price.display())?;
    writeln!(out, "  Category: {}", product.category)?;
    writeln!(out, "  Stock:    {}", stock_label(product))?;
    if !product.image.is_empty() {
        writeln!(out, "  Image:    {}", product.image)?;
    }
    if !product.description.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", product.description)?;
    }

    if !detail.related.is_empty() {
        writeln!(out)?;
        writeln!(out, "Related products:")?;
        for related in &detail.related {
            write_product_line(out, related)?;
        }
    }
    Ok(())
}

/// Print the cart with positions and total.
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub fn show_cart(shop: &Storefront, out: &mut impl Write) -> CommandResult {
    let cart = shop.cart().read();
    let Some(count) = shop.badge().label() else {
        writeln!(out, "Cart is empty")?;
        return Ok(());
    };

    writeln!(out, "Cart ({count})")?;
    for (position, item) in cart.items().iter().enumerate() {
        writeln!(
            out,
            "{:>3}. {:<40} {:>14}",
            position + 1,
            item.product.name,
            item.price().display()
        )?;
    }
    writeln!(out, "Total: {}", cart.total().display())?;
    Ok(())
}

/// Add a product to the cart by ID.
///
/// # Errors
///
/// Returns an error if the product cannot be fetched, is out of stock, or the
/// cart cannot be written.
pub async fn add_to_cart(shop: &Storefront, id: &str, out: &mut impl Write) -> CommandResult {
    let item = shop.catalog().add_to_cart_by_id(&ProductId::new(id)).await?;
    writeln!(
        out,
        "Added {} to cart ({} items)",
        item.product.name,
        shop.badge().count()
    )?;
    Ok(())
}

/// Remove the entry at a 1-based position as printed by `cart show`.
///
/// # Errors
///
/// Returns an error if the position is out of range or the cart cannot be
/// written.
pub fn remove_from_cart(shop: &Storefront, position: usize, out: &mut impl Write) -> CommandResult {
    let removed = match position.checked_sub(1) {
        Some(index) => shop.cart().remove_at(index)?,
        None => None,
    };
    let Some(item) = removed else {
        return Err(format!("No cart entry at position {position}").into());
    };

    writeln!(out, "Removed {} from cart", item.product.name)?;
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be cleared.
pub fn clear_cart(shop: &Storefront, out: &mut impl Write) -> CommandResult {
    shop.cart().clear()?;
    writeln!(out, "Cart cleared")?;
    Ok(())
}

/// Place an order for the cart.
///
/// # Errors
///
/// Returns an error if the form is invalid, the cart is empty, or the order
/// is rejected. The cart is left untouched in every error case.
pub async fn checkout(shop: &Storefront, form: &CustomerForm, out: &mut impl Write) -> CommandResult {
    let mut checkout = shop.checkout();
    writeln!(out, "Total: {}", checkout.total().display())?;

    let confirmation = checkout.submit(form).await?;
    match confirmation.order_id() {
        Some(id) => writeln!(out, "Order placed: {id}")?,
        None => writeln!(out, "Order placed")?,
    }
    if let Some(message) = &confirmation.message {
        writeln!(out, "{message}")?;
    }
    Ok(())
}

fn write_product_line(out: &mut impl Write, product: &Product) -> std::io::Result<()> {
    writeln!(
        out,
        "{:<26} {:<32} {:>14}  {:<24} {}",
        product.id.as_str(),
        product.name,
        product.price.display(),
        product.category,
        stock_label(product)
    )
}

fn stock_label(product: &Product) -> String {
    if product.in_stock {
        format!("{} in stock", product.stock)
    } else {
        "Out of stock".to_string()
    }
}
