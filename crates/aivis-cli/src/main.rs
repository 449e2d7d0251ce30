mod account;
mod analytics;
mod products;
mod render;

use aivis_client::{AnalyticsClient, EntityRef};
use aivis_core::{AppConfig, AuthSession};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "aivis")]
#[command(about = "AI-search visibility analytics from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in and print the session variables to export
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "AIVIS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account, optionally with a new application
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "AIVIS_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// Also create an application (tenant) with this name
        #[arg(long)]
        app_name: Option<String>,
    },
    /// Create a product from a brand name plus the keywords to track
    CreateProduct {
        brand: String,
        /// Repeat for several keywords
        #[arg(long = "keyword", short = 'k')]
        keywords: Vec<String>,
    },
    /// List products of the session's application
    Products,
    /// List the search keywords tracked for a product
    Keywords { product: String },
    /// Ask the backend to (re)generate analytics
    Generate {
        #[command(flatten)]
        target: Target,
    },
    /// Poll analytics until the backend completes them
    Watch {
        #[command(flatten)]
        target: Target,
        /// Override `AIVIS_POLL_INTERVAL_MS`
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: Option<u64>,
        /// Override `AIVIS_POLL_MAX_ATTEMPTS`
        #[arg(long)]
        max_attempts: Option<u32>,
        /// Print each snapshot as JSON
        #[arg(long)]
        json: bool,
    },
}

/// The entity and day an analytics command applies to.
#[derive(Debug, Args)]
struct Target {
    #[arg(long, conflicts_with = "keyword", required_unless_present = "keyword")]
    product: Option<String>,
    #[arg(long)]
    keyword: Option<String>,
    /// Day in `YYYY-MM-DD`; defaults to today (UTC)
    #[arg(long)]
    date: Option<NaiveDate>,
}

impl Target {
    fn entity(&self) -> anyhow::Result<EntityRef> {
        match (&self.product, &self.keyword) {
            (Some(id), None) => Ok(EntityRef::Product(id.clone())),
            (None, Some(id)) => Ok(EntityRef::Keyword(id.clone())),
            _ => anyhow::bail!("pass exactly one of --product or --keyword"),
        }
    }
}

/// Session from `AIVIS_ACCESS_TOKEN` / `AIVIS_APPLICATION_ID`.
fn require_session(config: &AppConfig) -> anyhow::Result<AuthSession> {
    AuthSession::from_config(config)
        .filter(AuthSession::is_authenticated)
        .ok_or_else(|| anyhow::anyhow!("AIVIS_ACCESS_TOKEN is not set; run `aivis login` first"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `.env` must be loaded before parsing so `AIVIS_PASSWORD` can come from it.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = aivis_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(env = %config.env, api_base_url = %config.api_base_url, "configuration loaded");

    let client = AnalyticsClient::from_config(&config)?;

    match cli.command {
        Commands::Login { email, password } => {
            account::run_login(&client, &email, &password).await?;
        }
        Commands::Register {
            email,
            password,
            first_name,
            last_name,
            app_name,
        } => {
            let request = aivis_client::RegisterRequest {
                email,
                password,
                first_name,
                last_name,
                app_name,
            };
            account::run_register(&client, &request).await?;
        }
        Commands::CreateProduct { brand, keywords } => {
            let session = require_session(&config)?;
            products::run_create_product(&client, &session, &brand, &keywords).await?;
        }
        Commands::Products => {
            let session = require_session(&config)?;
            products::run_list_products(&client, &session).await?;
        }
        Commands::Keywords { product } => {
            let session = require_session(&config)?;
            products::run_list_keywords(&client, &session, &product).await?;
        }
        Commands::Generate { target } => {
            let session = require_session(&config)?;
            analytics::run_generate(&client, &session, &target.entity()?, target.date).await?;
        }
        Commands::Watch {
            target,
            interval_ms,
            max_attempts,
            json,
        } => {
            let session = require_session(&config)?;
            let mut policy = aivis_poller::PollPolicy::from_config(&config);
            if let Some(ms) = interval_ms {
                policy.interval = std::time::Duration::from_millis(ms);
            }
            if max_attempts.is_some() {
                policy.max_attempts = max_attempts;
            }
            let request = match target.date {
                Some(date) => aivis_poller::AnalyticsRequest::new(target.entity()?, date, session),
                None => aivis_poller::AnalyticsRequest::for_today(target.entity()?, session),
            };
            analytics::run_watch(client, policy, request, json).await?;
        }
    }

    Ok(())
}
