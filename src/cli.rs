//! Command line configuration

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use thinkery::assistant::gemini::DEFAULT_BASE_URL;

/// Father Dust's Thinkery storefront
#[derive(Debug, Parser)]
#[command(name = "thinkery", about = "Father Dust's Thinkery storefront", long_about = None)]
pub struct Cli {
    /// Catalog fixture file; the bundled catalog is used when omitted
    #[arg(long, global = true, env = "THINKERY_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Load configuration from `.env`, the environment and CLI arguments
    pub fn load() -> Self {
        // Missing .env is fine
        _ = dotenvy::dotenv();

        Self::parse()
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every guide in the catalog
    Catalog,

    /// Put guides in a cart and print the quote
    Quote(QuoteArgs),

    /// Buy guides and write their downloads
    Checkout(CheckoutArgs),

    /// Generate cover artwork for the catalog
    Covers(CoversArgs),

    /// Chat with Father Dust
    Chat(ChatArgs),
}

#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Guide ids, in the order they are added to the cart
    #[arg(required = true)]
    pub ids: Vec<u32>,
}

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Guide ids, in the order they are added to the cart
    #[arg(required = true)]
    pub ids: Vec<u32>,

    /// Customer name
    #[arg(long)]
    pub name: String,

    /// Customer email address
    #[arg(long)]
    pub email: String,

    /// Directory the downloads are written to; nothing is written when omitted
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct GeminiArgs {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Gemini API address
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

#[derive(Debug, Args)]
pub struct CoversArgs {
    #[command(flatten)]
    pub gemini: GeminiArgs,

    /// Pause after a generated cover, in milliseconds
    #[arg(long, env = "THINKERY_COVER_SUCCESS_DELAY_MS", default_value = "1500")]
    pub success_delay_ms: u64,

    /// Pause after a failed request, in milliseconds
    #[arg(long, env = "THINKERY_COVER_FAILURE_DELAY_MS", default_value = "3000")]
    pub failure_delay_ms: u64,

    /// Only generate covers for the first N guides
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct ChatArgs {
    #[command(flatten)]
    pub gemini: GeminiArgs,
}
