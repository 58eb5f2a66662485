//! Thinkery CLI

use std::{
    fs,
    io::{self, Write},
    path::Path,
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use thinkery::{
    assistant::{
        Concierge, CoverWarmup, GeminiClient, GeminiConfig, WarmupDelays,
        chat::WELCOME_MESSAGE, covers,
    },
    cart::{AddOutcome, CartStore},
    catalog::{Catalog, CatalogError, GuideId},
    checkout::{self, CustomerDetails},
    fixtures::{self, FixtureError},
    receipt::Receipt,
};

use crate::cli::{ChatArgs, CheckoutArgs, Cli, Command, CoversArgs, GeminiArgs, QuoteArgs};

mod cli;

/// Longest artwork URL printed in full.
const URL_PREVIEW_LEN: usize = 72;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::load();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let catalog = load_catalog(cli.catalog.as_deref())?;

    match cli.command {
        Command::Catalog => list_catalog(&catalog),
        Command::Quote(args) => quote(&catalog, &args),
        Command::Checkout(args) => checkout(&catalog, args),
        Command::Covers(args) => warm_covers(catalog, args).await,
        Command::Chat(args) => chat(args).await,
    }
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog<'static>, FixtureError> {
    let catalog = match path {
        Some(path) => fixtures::load_catalog_file(path)?,
        None => fixtures::bundled_catalog()?,
    };

    info!(guides = catalog.len(), "catalog loaded");

    Ok(catalog)
}

fn gemini_client(args: &GeminiArgs) -> GeminiClient {
    GeminiClient::new(GeminiConfig::new(&args.api_key).with_base_url(&args.base_url))
}

fn list_catalog(catalog: &Catalog<'_>) -> Result<()> {
    let mut builder = Builder::default();

    builder.push_record(["Id", "Guide", "Pages", "Price"]);

    for item in catalog.iter() {
        builder.push_record([
            item.id().to_string(),
            format!("{} {}", item.emoji(), item.title()),
            item.pages().to_string(),
            item.price().to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..4), Alignment::right());

    writeln!(io::stdout().lock(), "{table}")?;

    Ok(())
}

fn fill_cart<'a>(catalog: &Catalog<'a>, ids: &[u32]) -> Result<CartStore<'a>, CatalogError> {
    let mut cart = CartStore::for_catalog(catalog);

    for &id in ids {
        let id = GuideId::new(id);
        let item = catalog.get(id).ok_or(CatalogError::GuideNotFound(id))?;

        if cart.add(item.clone()) == AddOutcome::AlreadyInCart {
            warn!(guide = %id, "guide listed twice, keeping the first");
        }
    }

    Ok(cart)
}

fn quote(catalog: &Catalog<'_>, args: &QuoteArgs) -> Result<()> {
    let cart = fill_cart(catalog, &args.ids)?;

    Receipt::for_cart(&cart).write_to(io::stdout().lock())?;

    Ok(())
}

fn checkout(catalog: &Catalog<'_>, args: CheckoutArgs) -> Result<()> {
    let mut cart = fill_cart(catalog, &args.ids)?;

    let order = checkout::complete(&mut cart, CustomerDetails::new(args.name, args.email))?;

    let mut stdout = io::stdout().lock();

    Receipt::for_order(&order).write_to(&mut stdout)?;
    writeln!(stdout, "{}", order.confirmation())?;

    let Some(dir) = args.output_dir else {
        return Ok(());
    };

    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create download directory {}", dir.display()))?;

    for download in order.downloads() {
        let path = dir.join(&download.file_name);

        fs::write(&path, &download.contents)
            .with_context(|| format!("failed to write {}", path.display()))?;

        writeln!(stdout, "Downloaded {}", path.display())?;
    }

    Ok(())
}

async fn warm_covers(mut catalog: Catalog<'static>, args: CoversArgs) -> Result<()> {
    let mut jobs = covers::jobs_for(&catalog);

    if let Some(limit) = args.limit {
        jobs.truncate(limit);
    }

    let delays = WarmupDelays {
        success: Duration::from_millis(args.success_delay_ms),
        failure: Duration::from_millis(args.failure_delay_ms),
    };

    let warmup = CoverWarmup::with_delays(Arc::new(gemini_client(&args.gemini)), delays);
    let (mut updates, handle) = warmup.spawn(jobs);

    while let Some(update) = updates.recv().await {
        catalog.set_artwork(update.id, update.url)?;

        if let Some(item) = catalog.get(update.id) {
            writeln!(
                io::stdout().lock(),
                "{:>3}  {}  {}",
                item.id(),
                item.title(),
                url_preview(item.artwork_or_placeholder(400, 300))
            )?;
        }
    }

    let summary = handle.await?;

    writeln!(
        io::stdout().lock(),
        "\n{} covers generated, {} failed",
        summary.generated,
        summary.failed
    )?;

    Ok(())
}

fn url_preview(url: String) -> String {
    if url.chars().count() <= URL_PREVIEW_LEN {
        return url;
    }

    let head: String = url.chars().take(URL_PREVIEW_LEN).collect();

    format!("{head}…")
}

async fn chat(args: ChatArgs) -> Result<()> {
    let mut concierge = Concierge::new(Arc::new(gemini_client(&args.gemini)));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    writeln!(io::stdout().lock(), "Father Dust: {WELCOME_MESSAGE}\n")?;

    loop {
        write!(io::stdout().lock(), "> ")?;
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        if matches!(line.trim(), "exit" | "quit") {
            break;
        }

        if let Some(reply) = concierge.ask(&line).await {
            writeln!(io::stdout().lock(), "\nFather Dust: {reply}\n")?;
        }
    }

    let turns = concierge
        .session()
        .map_or(0, |session| session.history().len());

    info!(turns, "chat ended");

    Ok(())
}
