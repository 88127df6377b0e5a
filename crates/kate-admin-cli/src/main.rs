//! kate-admin - command-line front end for the bot back office.
//!
//! Logs the operator in, opens views through the navigation guard and runs
//! the admin API calls. A `403` from the service clears the stored session
//! and the forced redirect to the login view is reported after the command.

mod format;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kate_admin_core::models::{NotificationCreate, OrderStatus, ProductCreate};
use kate_admin_core::router::{routes, LOGIN_PATH};
use kate_admin_core::{AdminClient, Config, CredentialStore, NavigationGuard, Navigator};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use format::{format_amount, format_date, format_optional, truncate_string};

// ============================================================================
// Constants
// ============================================================================

/// File name prefix for the rolling log
const LOG_FILE_PREFIX: &str = "kate-admin.log";

/// Width of the name column in list output
const NAME_COLUMN_WIDTH: usize = 28;

/// Number of best sellers shown by `stats`
const TOP_PRODUCTS: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "kate-admin", version, about = "Back office client for the Kate bot")]
struct Cli {
    /// Admin service base URL (overrides config and KATE_ADMIN_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, global = true, env = "KATE_ADMIN_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in with an admin id
    Login {
        admin_id: Option<String>,
        /// Confirm the token with the service before storing success
        #[arg(long)]
        verify: bool,
    },
    /// Forget the stored session
    Logout,
    /// Show session and configuration
    Status,
    /// Open a view (path or route name) through the navigation guard
    Open { target: String },
    /// Dashboard statistics
    Stats,
    /// List users, or show one user with their orders
    Users { user_id: Option<i64> },
    /// List products
    Products {
        /// Use the public storefront listing (no login needed)
        #[arg(long)]
        public: bool,
    },
    /// Add a product
    ProductAdd {
        name: String,
        price: i64,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Delete a product
    ProductRm { product_id: i64 },
    /// List orders
    Orders,
    /// Change an order's status
    OrderStatus { order_id: i64, status: OrderStatus },
    /// List notifications
    Notifications,
    /// Schedule a notification
    Notify {
        message: String,
        #[arg(long, default_value = "all")]
        audience: String,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_dir.as_deref());

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };
    config.apply_env_overrides()?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }

    let store = CredentialStore::init(config.open_storage()?);
    let client = AdminClient::from_config(&config, store.clone())
        .context("Failed to build HTTP client")?;
    let mut navigator =
        Navigator::new(NavigationGuard::new(store)).with_events(client.gateway().subscribe());

    let result = run(cli.command, &client, &mut navigator, &mut config).await;

    // A 403 during the command clears the session; report where that leaves us
    for forced in navigator.drain_events()? {
        eprintln!("Session cleared - redirected to {}", forced.location);
    }

    result
}

async fn run(
    command: Command,
    client: &AdminClient,
    navigator: &mut Navigator,
    config: &mut Config,
) -> Result<()> {
    match command {
        Command::Login { admin_id, verify } => {
            let admin_id = admin_id
                .or_else(|| config.last_admin_id.clone())
                .ok_or_else(|| anyhow::anyhow!("Admin id required (none remembered)"))?;

            if verify {
                client.login_verified(&admin_id).await?;
            } else {
                client.login(&admin_id)?;
            }

            config.last_admin_id = Some(admin_id);
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }

            let landing = navigator.navigate(LOGIN_PATH)?;
            info!(location = %landing.location, "Login successful");
            println!("Logged in. Opened {}", landing.location);
        }
        Command::Logout => {
            client.logout();
            println!("Logged out.");
        }
        Command::Status => {
            let session = client.session();
            println!("Service:  {}", client.gateway().base_url());
            println!("Timeout:  {}s", config.timeout_secs);
            println!("Storage:  {:?}", config.storage);
            println!(
                "Session:  {}",
                if session.present() { "logged in" } else { "logged out" }
            );
            println!("Admin id: {}", format_optional(&config.last_admin_id, "-"));
        }
        Command::Open { target } => {
            let navigation = navigator.navigate(routes::resolve(&target))?;
            if navigation.redirected() {
                println!(
                    "{} -> {} (redirected)",
                    navigation.requested, navigation.location
                );
            } else {
                println!("{}", navigation.location);
            }
        }
        Command::Stats => {
            let (stats, orders) =
                futures::try_join!(client.dashboard_stats(), client.list_orders())?;
            let open_orders = orders.iter().filter(|o| !o.status.is_final()).count();

            println!("Users:        {} (+{} today)", stats.total_users, stats.new_users_today);
            println!("Orders:       {} ({} open)", stats.total_orders, open_orders);
            println!("Products:     {}", stats.total_products);
            println!("Revenue:      {}", format_amount(stats.total_revenue));
            for (product_id, sold) in stats.top_products(TOP_PRODUCTS) {
                println!("  product #{:<6} {} sold", product_id, sold);
            }
        }
        Command::Users { user_id: Some(user_id) } => {
            let detail = client.get_user(user_id).await?;
            println!("{}", serde_json::to_string_pretty(&detail)?);
        }
        Command::Users { user_id: None } => {
            for user in client.list_users().await? {
                println!(
                    "{:>10}  {:<width$}  {:<12}  {}",
                    user.user_id,
                    truncate_string(&user.display_name(), NAME_COLUMN_WIDTH),
                    format_optional(&user.stage, "-"),
                    user.registration_date.as_deref().map(format_date).unwrap_or_default(),
                    width = NAME_COLUMN_WIDTH,
                );
            }
        }
        Command::Products { public } => {
            let products = if public {
                client.list_public_products().await?
            } else {
                client.list_products().await?
            };
            for product in products {
                println!(
                    "{:>5}  {:<width$}  {:>12}  {}",
                    product.id,
                    truncate_string(&product.name, NAME_COLUMN_WIDTH),
                    format_amount(product.price),
                    if product.is_active { "" } else { "(inactive)" },
                    width = NAME_COLUMN_WIDTH,
                );
            }
        }
        Command::ProductAdd { name, price, description } => {
            let ack = client
                .create_product(&ProductCreate { name, price, description })
                .await?;
            println!("{} (#{})", ack.message, ack.product_id.unwrap_or_default());
        }
        Command::ProductRm { product_id } => {
            let ack = client.delete_product(product_id).await?;
            println!("{}", ack.message);
        }
        Command::Orders => {
            for order in client.list_orders().await? {
                let customer = order
                    .user
                    .as_ref()
                    .map(|u| u.display_name())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:>6}  {:<10}  {:>12}  {:<width$}  {}",
                    order.id,
                    order.status,
                    format_amount(order.total_amount),
                    truncate_string(&customer, NAME_COLUMN_WIDTH),
                    order.order_date.as_deref().map(format_date).unwrap_or_default(),
                    width = NAME_COLUMN_WIDTH,
                );
            }
        }
        Command::OrderStatus { order_id, status } => {
            let ack = client.update_order_status(order_id, status).await?;
            println!("{}", ack.message);
        }
        Command::Notifications => {
            for n in client.list_notifications().await? {
                println!(
                    "{:>5}  {:<8}  {:<10}  {}",
                    n.id,
                    if n.is_sent { "sent" } else { "pending" },
                    format_optional(&n.target_audience, "all"),
                    truncate_string(&n.message, 60),
                );
            }
        }
        Command::Notify { message, audience } => {
            let request = NotificationCreate::new(message).with_audience(audience);
            let ack = client.create_notification(&request).await?;
            println!("{} (#{})", ack.message, ack.notification_id.unwrap_or_default());
        }
    }

    Ok(())
}
