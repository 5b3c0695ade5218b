//! Bistro CLI - Menu seeding and order management.
//!
//! # Usage
//!
//! ```bash
//! # Print the menu
//! bistro menu
//!
//! # Add menu items from a YAML file
//! bistro seed menu.yaml
//!
//! # List all orders
//! bistro orders list
//!
//! # Show one order
//! bistro order show ORD17000000000003210042
//!
//! # Change an order's status
//! bistro orders status 665f1c2a on-the-way
//! ```
//!
//! # Environment Variables
//!
//! - `BACKEND_API_URL` - Restaurant backend (required)
//! - `BACKEND_ORDERS_API_URL` - Orders backend (defaults to `BACKEND_API_URL`)
//! - `BISTRO_ADMIN_EMAIL` / `BISTRO_ADMIN_PASSWORD` - Admin login for `seed`
//!   and `orders list|status`

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bistro")]
#[command(author, version, about = "Bistro CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current menu
    Menu,
    /// Add menu items from a YAML file
    Seed {
        /// Path to the YAML file
        file: String,

        /// Validate the file and images without sending anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Inspect and manage orders
    #[command(alias = "order")]
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// List all orders
    List,
    /// Show one order by its order number
    Show {
        /// Client order number (e.g. `ORD1700000000000321004`)
        order_id: String,
    },
    /// Change an order's status
    Status {
        /// Backend record ID or order number
        order_ref: String,

        /// New status (`pending`, `preparing`, `on-the-way`, `delivered`)
        status: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Menu => commands::menu::list().await?,
        Commands::Seed { file, dry_run } => commands::seed::run(&file, dry_run).await?,
        Commands::Orders { action } => match action {
            OrderAction::List => commands::orders::list().await?,
            OrderAction::Show { order_id } => commands::orders::show(&order_id).await?,
            OrderAction::Status { order_ref, status } => {
                commands::orders::set_status(&order_ref, &status).await?;
            }
        },
    }
    Ok(())
}
