//! ATL Urban Farms CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run admin database migrations
//! atl-cli migrate
//!
//! # Create admin user
//! atl-cli admin create -e admin@example.com -n "Admin Name" -r super_admin
//!
//! # Issue a gift card
//! atl-cli gift-card issue -a 50.00 --recipient-email friend@example.com
//!
//! # Seed the database with demo data
//! atl-cli seed
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create admin users
//! - `gift-card` - Issue, adjust, and list gift cards
//! - `seed` - Seed database with demo data

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "atl-cli")]
#[command(author, version, about = "ATL Urban Farms CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Manage gift cards
    GiftCard {
        #[command(subcommand)]
        action: GiftCardAction,
    },
    /// Seed database with demo data
    Seed,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin role (`super_admin`, `admin`, `viewer`)
        #[arg(short, long, default_value = "admin")]
        role: String,
    },
}

#[derive(Subcommand)]
enum GiftCardAction {
    /// Issue a new gift card
    Issue {
        /// Balance to load onto the card, e.g. 50.00
        #[arg(short, long)]
        amount: String,

        /// Recipient display name
        #[arg(long)]
        recipient_name: Option<String>,

        /// Recipient email address
        #[arg(long)]
        recipient_email: Option<String>,

        /// Personal message to include
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Adjust a card's balance
    Adjust {
        /// Gift card ID
        #[arg(short, long)]
        id: i32,

        /// Positive amount, e.g. 10.00
        #[arg(short, long)]
        amount: String,

        /// Remove instead of add
        #[arg(long)]
        remove: bool,

        /// Notes for the ledger entry
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List gift cards
    List {
        /// Only cards with this status (`active`, `disabled`, `depleted`)
        #[arg(short, long)]
        status: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::admin().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create { email, name, role } => {
                commands::admin::create_user(&email, &name, &role).await?;
            }
        },
        Commands::GiftCard { action } => match action {
            GiftCardAction::Issue {
                amount,
                recipient_name,
                recipient_email,
                message,
            } => {
                commands::gift_cards::issue(
                    &amount,
                    recipient_name.as_deref(),
                    recipient_email.as_deref(),
                    message.as_deref(),
                )
                .await?;
            }
            GiftCardAction::Adjust {
                id,
                amount,
                remove,
                notes,
            } => {
                commands::gift_cards::adjust(id, &amount, remove, notes.as_deref()).await?;
            }
            GiftCardAction::List { status } => {
                commands::gift_cards::list(status.as_deref()).await?;
            }
        },
        Commands::Seed => commands::seed::demo_data().await?,
    }
    Ok(())
}
