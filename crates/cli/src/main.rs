//! SpaceMarket terminal client.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! spacemarket products --search tracker
//! spacemarket product 65a1f0c2e4b0a1b2c3d4e5f6
//!
//! # Cart
//! spacemarket cart add 65a1f0c2e4b0a1b2c3d4e5f6
//! spacemarket cart show
//! spacemarket cart remove 1
//!
//! # Checkout
//! spacemarket checkout --name "Kalpana" --email k@lab.example --organization ISRO
//!
//! # Admin
//! spacemarket admin orders
//! spacemarket admin create --name "Star Tracker" --price 125000 \
//!     --description "Attitude sensor" --image https://img.example/st.png --category Sensors
//! ```
//!
//! Command output goes to stdout; logs go to stderr (filter with `RUST_LOG`,
//! set `SPACEMARKET_LOG_JSON=1` for JSON lines).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};
use spacemarket_admin::{CategoryChoice, ProductForm};
use spacemarket_storefront::checkout::CustomerForm;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "spacemarket")]
#[command(author, version, about = "SpaceMarket storefront and admin client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show a product and related products
    Product {
        /// Product ID
        id: String,
    },
    /// Manage the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the cart contents
    Checkout(CheckoutArgs),
    /// Admin operations (requires `SPACEMARKET_ADMIN_KEY`)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and total
    Show,
    /// Add a product by ID
    Add {
        /// Product ID
        id: String,
    },
    /// Remove the entry at a position shown by `cart show` (starting at 1)
    Remove {
        position: usize,
    },
    /// Empty the cart
    Clear,
}

#[derive(Args)]
struct CheckoutArgs {
    /// Full name
    #[arg(short, long)]
    name: String,

    /// Email address
    #[arg(short, long)]
    email: String,

    /// Phone number
    #[arg(short, long)]
    phone: Option<String>,

    /// Organization
    #[arg(short, long)]
    organization: Option<String>,
}

impl CheckoutArgs {
    fn into_form(self) -> CustomerForm {
        CustomerForm {
            name: self.name,
            email: self.email,
            phone: self.phone.unwrap_or_default(),
            organization: self.organization.unwrap_or_default(),
        }
    }
}

#[derive(Subcommand)]
enum AdminAction {
    /// List all products
    Products,
    /// List all orders
    Orders,
    /// List product categories
    Categories,
    /// Create a product
    Create(CreateProductArgs),
}

#[derive(Args)]
#[command(group(
    clap::ArgGroup::new("category_choice")
        .required(true)
        .args(["category", "new_category"]),
))]
struct CreateProductArgs {
    /// Product name
    #[arg(long)]
    name: String,

    /// Price in rupees
    #[arg(long)]
    price: String,

    /// Description
    #[arg(long)]
    description: String,

    /// Absolute image URL
    #[arg(long)]
    image: String,

    /// Existing category
    #[arg(long)]
    category: Option<String>,

    /// New category name
    #[arg(long)]
    new_category: Option<String>,

    /// Units in stock (default: 10)
    #[arg(long)]
    stock: Option<String>,

    /// Mark the product as out of stock
    #[arg(long)]
    out_of_stock: bool,
}

impl CreateProductArgs {
    fn into_form(self) -> ProductForm {
        // clap guarantees exactly one of the two is set
        let category = match (self.new_category, self.category) {
            (Some(custom), _) => CategoryChoice::Custom(custom),
            (None, existing) => CategoryChoice::Existing(existing.unwrap_or_default()),
        };

        ProductForm {
            name: self.name,
            price: self.price,
            description: self.description,
            image: self.image,
            category,
            stock: self.stock.unwrap_or_default(),
            in_stock: !self.out_of_stock,
        }
    }
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "spacemarket=info".into());

    // JSON lines when SPACEMARKET_LOG_JSON is set, text otherwise; stdout is for command output
    let json = std::env::var_os("SPACEMARKET_LOG_JSON").is_some();
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Products { search } => {
            let shop = commands::shop::open()?;
            commands::shop::list_products(&shop, search.as_deref(), &mut out).await?;
        }
        Commands::Product { id } => {
            let shop = commands::shop::open()?;
            commands::shop::show_product(&shop, &id, &mut out).await?;
        }
        Commands::Cart { action } => {
            let shop = commands::shop::open()?;
            match action {
                CartAction::Show => commands::shop::show_cart(&shop, &mut out)?,
                CartAction::Add { id } => commands::shop::add_to_cart(&shop, &id, &mut out).await?,
                CartAction::Remove { position } => {
                    commands::shop::remove_from_cart(&shop, position, &mut out)?;
                }
                CartAction::Clear => commands::shop::clear_cart(&shop, &mut out)?,
            }
        }
        Commands::Checkout(args) => {
            let shop = commands::shop::open()?;
            commands::shop::checkout(&shop, &args.into_form(), &mut out).await?;
        }
        Commands::Admin { action } => {
            let admin = commands::admin::open()?;
            match action {
                AdminAction::Products => commands::admin::list_products(&admin, &mut out).await?,
                AdminAction::Orders => commands::admin::list_orders(&admin, &mut out).await?,
                AdminAction::Categories => {
                    commands::admin::list_categories(&admin, &mut out).await?;
                }
                AdminAction::Create(args) => {
                    commands::admin::create_product(&admin, &args.into_form(), &mut out).await?;
                }
            }
        }
    }
    Ok(())
}
