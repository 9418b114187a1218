//! Shopfront CLI - the storefront from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! shopfront products --sort-by price --sort-order asc --max-price 150
//! shopfront product 1
//!
//! # Cart and wishlist (persisted under SHOPFRONT_DATA_DIR)
//! shopfront cart add 1 -q 2
//! shopfront wishlist toggle 3
//! shopfront wishlist to-cart 3
//!
//! # Account
//! shopfront auth login -e demo@example.com -p password123
//! shopfront auth whoami
//! ```
//!
//! When the backend at `SHOPFRONT_API_URL` is unreachable, catalog and auth
//! commands answer from bundled fixture data and say so.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use shopfront_core::catalog::{SortField, SortOrder};
use shopfront_core::{CategoryId, Price, ProductId};

mod commands;

use commands::catalog::ListArgs;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Products per page
        #[arg(long, default_value_t = 12)]
        limit: u32,

        /// Sort field (`price`, `created_at`, `rating`, `name`)
        #[arg(long, default_value = "created_at")]
        sort_by: SortField,

        /// Sort direction (`asc` or `desc`)
        #[arg(long, default_value = "desc")]
        sort_order: SortOrder,

        /// Lowest price to include
        #[arg(long)]
        min_price: Option<Price>,

        /// Highest price to include
        #[arg(long)]
        max_price: Option<Price>,

        /// Search text
        #[arg(short, long)]
        query: Option<String>,

        /// Only products in this category
        #[arg(short, long)]
        category: Option<CategoryId>,
    },
    /// Show one product
    Product {
        id: ProductId,
    },
    /// List home page banners
    Banners,
    /// List categories
    Categories,
    /// Check backend health
    Health,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Sign in, sign up, sign out
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and total
    Show,
    /// Add a product
    Add {
        id: ProductId,

        /// Quantity to add (1-10)
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity of a line (0 removes it)
    Update { id: ProductId, quantity: i64 },
    /// Remove a line
    Remove { id: ProductId },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show saved products (requires sign-in)
    Show,
    /// Save a product
    Add { id: ProductId },
    /// Forget a product
    Remove { id: ProductId },
    /// Save or forget a product
    Toggle { id: ProductId },
    /// Forget everything
    Clear,
    /// Add one unit of a saved product to the cart
    ToCart { id: ProductId },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Repeat the password
        #[arg(long)]
        confirm_password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in account
    Whoami,
}

#[tokio::main]
async fn main() {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            #[allow(clippy::print_stdout)]
            {
                println!("{output}");
            }
        }
        Err(e) => {
            tracing::error!("Command failed: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<String, commands::CommandError> {
    let mut app = commands::open().await?;

    let output = match cli.command {
        Commands::Products {
            page,
            limit,
            sort_by,
            sort_order,
            min_price,
            max_price,
            query,
            category,
        } => {
            let args = ListArgs {
                page,
                limit,
                sort_by,
                sort_order,
                min_price,
                max_price,
                query,
                category,
            };
            commands::catalog::products(&app, &args).await?
        }
        Commands::Product { id } => commands::catalog::product(&app, id).await?,
        Commands::Banners => commands::catalog::banners(&app).await?,
        Commands::Categories => commands::catalog::categories(&app).await?,
        Commands::Health => commands::catalog::health(&app).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&app),
            CartAction::Add { id, quantity } => commands::cart::add(&mut app, id, quantity).await?,
            CartAction::Update { id, quantity } => commands::cart::update(&mut app, id, quantity)?,
            CartAction::Remove { id } => commands::cart::remove(&mut app, id)?,
            CartAction::Clear => commands::cart::clear(&mut app),
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Show => commands::wishlist::show(&app)?,
            WishlistAction::Add { id } => commands::wishlist::add(&mut app, id).await?,
            WishlistAction::Remove { id } => commands::wishlist::remove(&mut app, id),
            WishlistAction::Toggle { id } => commands::wishlist::toggle(&mut app, id).await?,
            WishlistAction::Clear => commands::wishlist::clear(&mut app),
            WishlistAction::ToCart { id } => commands::wishlist::to_cart(&mut app, id)?,
        },
        Commands::Auth { action } => match action {
            AuthAction::Login { email, password } => {
                commands::auth::login(&mut app, email, password).await?
            }
            AuthAction::Register {
                first_name,
                last_name,
                email,
                password,
                confirm_password,
            } => {
                let form = shopfront_storefront::forms::RegistrationForm {
                    first_name,
                    last_name,
                    email,
                    password,
                    confirm_password,
                };
                commands::auth::register(&mut app, &form).await?
            }
            AuthAction::Logout => commands::auth::logout(&mut app).await,
            AuthAction::Whoami => commands::auth::whoami(&app),
        },
    };

    Ok(output)
}
