//! storefront - command-line front end for the storefront API

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use storefront_client::{
    clamp_requested_quantity, CartReconciler, CatalogStore, CatalogWindow, ClientConfig, Confirmed,
    CreateProductRequest, HttpApi, ListIdentity, Price, Product, ProductFilter, ProductId, Quantity,
    StorefrontError,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Browse the catalog, manage the cart and administer products")]
struct Cli {
    /// Base URL of the API, including the `/api` path
    #[arg(long, env = "STOREFRONT_API_URL")]
    api_url: Option<String>,

    /// Products revealed per page when listing
    #[arg(long, env = "STOREFRONT_PAGE_SIZE")]
    page_size: Option<usize>,

    /// Skip confirmation prompts for destructive actions
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List products, one page at a time
    Products {
        #[arg(long)]
        category: Option<String>,
        /// Number of pages to reveal
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Show one product with its cart availability
    Product { id: u64 },
    /// Show the cart
    Cart,
    /// Add units of a product to the cart
    Add {
        product_id: u64,
        #[arg(long, default_value_t = 1)]
        qty: u32,
    },
    /// Remove a whole cart line
    Remove { item_id: u64 },
    /// Remove every cart line
    Clear,
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Debug, Subcommand)]
enum AdminCommand {
    Create(ProductFields),
    Update {
        id: u64,
        #[command(flatten)]
        fields: ProductPatch,
    },
    Delete { id: u64 },
    Stats,
}

#[derive(Debug, Args)]
struct ProductFields {
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    price: Decimal,
    #[arg(long)]
    category: String,
    #[arg(long, default_value_t = 0)]
    quantity: u32,
    #[arg(long)]
    image_url: Option<String>,
}

#[derive(Debug, Args)]
struct ProductPatch {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    price: Option<Decimal>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    quantity: Option<u32>,
}

fn ask_on_stdin(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes"),
        Err(_) => false,
    }
}

struct App {
    catalog: CatalogStore<HttpApi>,
    cart: CartReconciler<HttpApi>,
    page_size: usize,
    yes: bool,
}

impl App {
    fn confirmed(&self, prompt: &str) -> Option<Confirmed> {
        if self.yes { Some(Confirmed::pre_approved()) } else { Confirmed::ask(&ask_on_stdin, prompt) }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url { config = config.with_api_url(url)?; }
    if let Some(size) = cli.page_size { config.page_size = size.max(1); }
    tracing::info!(api_url = %config.api_url, "storefront client starting");

    let api = Arc::new(HttpApi::new(&config)?);
    let app = App {
        catalog: CatalogStore::new(Arc::clone(&api)),
        cart: CartReconciler::new(api),
        page_size: config.page_size,
        yes: cli.yes,
    };

    match cli.command {
        Command::Products { category, pages } => list_products(&app, category, pages).await,
        Command::Product { id } => show_product(&app, ProductId::new(id)).await,
        Command::Cart => show_cart(&app).await,
        Command::Add { product_id, qty } => add_to_cart(&app, ProductId::new(product_id), qty).await,
        Command::Remove { item_id } => {
            app.cart.remove_line(storefront_client::CartItemId::new(item_id)).await?;
            println!("Removed line {item_id}");
            Ok(())
        }
        Command::Clear => {
            let Some(confirmed) = app.confirmed("Clear the whole cart?") else { return Ok(()) };
            app.cart.clear(confirmed).await?;
            println!("Cart cleared");
            Ok(())
        }
        Command::Admin(cmd) => admin(&app, cmd).await,
    }
}

async fn list_products(app: &App, category: Option<String>, pages: usize) -> Result<()> {
    let products = app.catalog.list_products().await?;
    let cart = app.cart.load().await?;
    let filter = category.map(ProductFilter::category).unwrap_or_default();
    let shown = filter.apply(&products);
    if shown.is_empty() {
        println!("No products");
        return Ok(());
    }

    let generation = app.catalog.products_generation().unwrap_or_default();
    let mut window = CatalogWindow::new(app.page_size);
    window.sync(ListIdentity::new(generation, filter), shown.len());
    for _ in 1..pages {
        if !window.on_sentinel_visible() { break; }
    }

    for product in window.visible(&shown) {
        let availability = cart.availability(product);
        let note = if availability.is_maxed_out() {
            " (all remaining units in cart)".to_string()
        } else if availability.in_cart {
            format!(" (in cart: {}, can add {})", availability.reserved, availability.available)
        } else {
            String::new()
        };
        println!("{:>5}  {:<30} {:>10}  {:<12} {:>4} pcs{}", product.id, product.name, product.price, product.category, product.quantity, note);
    }
    if window.is_fully_loaded() {
        println!("All products shown ({})", window.len());
    } else {
        println!("Showing {} of {}; pass --pages {} for more", window.visible_count(), window.len(), pages + 1);
    }
    Ok(())
}

async fn show_product(app: &App, id: ProductId) -> Result<()> {
    let product = match app.catalog.get_product(id).await {
        Ok(p) => p,
        Err(StorefrontError::NotFound(_)) => {
            println!("Product {id} not found");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let cart = app.cart.load().await?;
    let availability = cart.availability(&product);

    println!("{} [{}]", product.name, product.category);
    println!("{}", product.description);
    println!("Price: {}", product.price);
    if availability.available > 0 {
        println!("Available: {} pcs", availability.available);
    } else {
        println!("Out of stock");
    }
    if availability.in_cart {
        println!("Already in cart: {} pcs (line {})", availability.reserved, availability.cart_item_id.map(|i| i.to_string()).unwrap_or_default());
    }
    if availability.available == 0 && product.is_in_stock() {
        println!("All available units of this product are already in your cart");
    }
    Ok(())
}

async fn show_cart(app: &App) -> Result<()> {
    let cart = app.cart.load().await?;
    if cart.is_empty() {
        println!("Cart is empty");
        return Ok(());
    }
    for item in cart.items() {
        println!("{:>5}  {:<30} {:>4} x {:>10} = {:>10}", item.id, item.product.name, item.quantity, item.product.price, item.line_total().round_dp(2));
    }
    println!("Lines: {}  Units: {}  Total: {}", cart.line_count(), cart.items_count(), cart.total().round_dp(2));
    Ok(())
}

async fn add_to_cart(app: &App, product_id: ProductId, qty: u32) -> Result<()> {
    let product = app.catalog.get_product(product_id).await?;
    let cart = app.cart.load().await?;
    let available = cart.available_quantity(&product);
    let qty = clamp_requested_quantity(qty, available);
    if qty == 0 {
        bail!("no units of '{}' left to add", product.name);
    }
    let line = app.cart.add_one(product_id, qty).await?;
    println!("Added {qty} x {} (line {})", product.name, line.id);
    Ok(())
}

async fn admin(app: &App, cmd: AdminCommand) -> Result<()> {
    match cmd {
        AdminCommand::Create(fields) => {
            let request = CreateProductRequest {
                name: fields.name,
                description: fields.description,
                price: Price::new(fields.price).context("invalid --price")?,
                category: fields.category,
                quantity: Quantity::new(fields.quantity),
                image_url: fields.image_url,
            };
            let product = app.catalog.create(&request).await?;
            println!("Created product {}", product.id);
        }
        AdminCommand::Update { id, fields } => {
            let mut product = app.catalog.get_product(ProductId::new(id)).await?;
            patch(&mut product, fields)?;
            let product = app.catalog.update(&product).await?;
            println!("Updated product {}", product.id);
        }
        AdminCommand::Delete { id } => {
            let Some(confirmed) = app.confirmed("Delete this product?") else { return Ok(()) };
            app.catalog.delete(ProductId::new(id), confirmed).await?;
            println!("Deleted product {id}");
        }
        AdminCommand::Stats => {
            app.catalog.list_products().await?;
            let stats = app.catalog.stats();
            println!("Products: {}  In stock: {}  Out of stock: {}  Units: {}", stats.total_products, stats.in_stock, stats.out_of_stock, stats.total_units);
        }
    }
    Ok(())
}

fn patch(product: &mut Product, fields: ProductPatch) -> Result<()> {
    let mut draft = product.draft();
    if let Some(v) = fields.name { draft.name = v; }
    if let Some(v) = fields.description { draft.description = v; }
    if let Some(v) = fields.price { draft.price = Price::new(v).context("invalid --price")?; }
    if let Some(v) = fields.category { draft.category = v; }
    if let Some(v) = fields.quantity { draft.quantity = Quantity::new(v); }
    product.apply(draft);
    Ok(())
}
