use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use vcard_client::{JsonFileStore, LogNotifier, Provider, load_config, load_default_config};
use vcard_core::{
    Card, CardId, CardStatus, CardType, DateWindow, FundingSource, OperationType,
    PaymentFilters, PaymentHistory, PaymentTotals, Period, group_by_day,
};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Tier {
    /// Prepaid virtual card
    Prepaid,
    /// Debit virtual card
    Debit,
}

impl From<Tier> for CardType {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Prepaid => CardType::Prepaid,
            Tier::Debit => CardType::Debit,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "vcard", version, about = "Manage virtual payment cards")]
struct Cli {
    /// JSON configuration file (embedded defaults when absent)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify a token and remember it
    Login { token: String },
    /// Forget the saved token
    Logout,
    /// Show the profile of the saved token
    Whoami,
    /// List cards
    Cards {
        /// Only cards with this status (ACTIVE, BLOCKED, ...)
        #[arg(long)]
        status: Option<CardStatus>,
    },
    Block { card_id: CardId },
    Unblock { card_id: CardId },
    /// Show the full number and CVV of a card
    Reveal { card_id: CardId },
    Rename { card_id: CardId, alias: String },
    /// Issue a new card
    Order {
        #[arg(long = "type", value_enum)]
        tier: Tier,
    },
    /// Payment history
    Payments {
        /// today, yesterday, week, month or max
        #[arg(long, default_value = "week")]
        period: Period,
        /// ALL, IN, OUT or QIWI_CARD
        #[arg(long, default_value = "ALL")]
        operation: OperationType,
        /// Funding source; repeat for several
        #[arg(long = "source")]
        sources: Vec<FundingSource>,
        #[arg(long, default_value_t = vcard_core::MAX_ROWS)]
        rows: u32,
        /// Number of pages to follow
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Incoming and outgoing totals
    Stats {
        /// Last week when absent
        #[arg(long)]
        period: Option<Period>,
    },
    /// Funding account balances
    Balances,
    /// Download a card statement
    Statement {
        card_id: CardId,
        #[arg(long, default_value = "month")]
        period: Period,
        /// Target file (suggested name in the current directory when absent)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("vcard=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => load_default_config()?,
    };

    let store = Arc::new(JsonFileStore::open(&config.storage.path)?);
    let provider = Provider::from_config(&config, store, Arc::new(LogNotifier))?;

    match cli.command {
        Command::Login { token } => {
            let profile = provider.login(&token).await?;
            println!("Signed in as {}", profile.person_id);
        }
        Command::Logout => {
            provider.logout();
            println!("Signed out");
        }
        command => {
            provider
                .restore()
                .await
                .context("no valid session, run `vcard login <TOKEN>` first")?;
            run(&provider, command).await?;
        }
    }

    Ok(())
}

async fn run(provider: &Provider, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Whoami => {
            let profile = provider
                .session()
                .profile()
                .context("profile not loaded")?;
            println!("Person id:      {}", profile.person_id);
            if let Some(email) = &profile.bound_email {
                println!("Email:          {}", email);
            }
            if let Some(contract) = profile.contract_id {
                let state = if profile.contract_blocked { "blocked" } else { "active" };
                println!("Contract:       {} ({})", contract, state);
            }
            if let Some(currency) = profile.default_pay_currency {
                println!("Pay currency:   {}", currency);
            }
        }
        Command::Cards { status } => {
            for card in provider.cards().list_cards(status).await? {
                print_card(&card);
            }
        }
        Command::Block { card_id } => {
            let card = find_card(provider, card_id).await?;
            provider.cards().block(&card).await?;
        }
        Command::Unblock { card_id } => {
            let card = find_card(provider, card_id).await?;
            provider.cards().unblock(&card).await?;
        }
        Command::Reveal { card_id } => {
            let card = find_card(provider, card_id).await?;
            let secret = provider.cards().reveal_secret(&card).await?;
            println!("Number: {}", secret.formatted_pan());
            println!("CVV:    {}", secret.cvv);
            if let Some(expiry) = card.expiry {
                println!("Expiry: {}", expiry);
            }
        }
        Command::Rename { card_id, alias } => {
            let card = find_card(provider, card_id).await?;
            if !provider.cards().rename(&card, &alias).await {
                anyhow::bail!("card {} was not renamed", card_id);
            }
        }
        Command::Order { tier } => {
            let done = provider.orders().order_card(&tier.into()).await?;
            println!(
                "Order {} paid: {} (payment {})",
                done.order.id, done.payment.amount, done.payment.id
            );
        }
        Command::Payments {
            period,
            operation,
            sources,
            rows,
            pages,
        } => {
            let mut filters = PaymentFilters::new(window(period))
                .with_operation(operation)
                .with_rows(rows);
            if !sources.is_empty() {
                filters = filters.with_sources(sources);
            }

            let history = provider.history();
            let mut accumulated = PaymentHistory::from_page(history.fetch_payments(&filters).await?);
            for _ in 1..pages.max(1) {
                let Some(cursor) = accumulated.cursor().cloned() else {
                    break;
                };
                accumulated.append(history.load_more(&filters, &cursor).await?);
            }

            for (day, items) in group_by_day(accumulated.items()) {
                println!("{}", day.format("%Y-%m-%d"));
                for txn in items {
                    println!(
                        "  {}  {:>4}  {:>14}  {:<8} {}",
                        txn.date.format("%H:%M"),
                        txn.kind.as_str(),
                        txn.amount.to_string(),
                        txn.status.label(),
                        txn.counterpart
                    );
                }
            }
            if accumulated.has_more() {
                println!("(more available, raise --pages)");
            }
        }
        Command::Stats { period } => {
            let history = provider.history();
            let totals = match period {
                Some(period) => {
                    history
                        .fetch_stats(&PaymentFilters::new(window(period)))
                        .await?
                }
                None => history.fetch_stats_last_week().await?,
            };
            print_totals(&totals);
        }
        Command::Balances => {
            for account in provider.history().fetch_balances().await? {
                let balance = account
                    .balance
                    .map(|b| b.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let marker = if account.is_default { "*" } else { " " };
                println!("{} {:<24} {:>16}", marker, account.title, balance);
            }
        }
        Command::Statement {
            card_id,
            period,
            output,
        } => {
            let card = find_card(provider, card_id).await?;
            let range = window(period);
            let statement = provider
                .history()
                .download_statement(&card, range.start, range.end)
                .await?;
            let path = output.unwrap_or_else(|| PathBuf::from(statement.suggested_file_name()));
            statement
                .save_to(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Saved {} bytes to {}", statement.bytes.len(), path.display());
        }
        Command::Login { .. } | Command::Logout => {}
    }
    Ok(())
}

fn window(period: Period) -> DateWindow {
    DateWindow::for_period(period, Local::now().fixed_offset())
}

async fn find_card(provider: &Provider, card_id: CardId) -> anyhow::Result<Card> {
    provider
        .cards()
        .list_cards(None)
        .await?
        .into_iter()
        .find(|card| card.id == card_id)
        .with_context(|| format!("no card with id {}", card_id))
}

fn print_card(card: &Card) {
    let expiry = card.expiry.map(|e| e.to_string()).unwrap_or_default();
    println!(
        "{:>10}  {}  {:<5}  {:<22}  {}",
        card.id,
        card.masked_number,
        expiry,
        card.status.label(),
        card.title()
    );
}

fn print_totals(totals: &PaymentTotals) {
    println!("Incoming:");
    for money in &totals.incoming {
        println!("  {}", money);
    }
    println!("Outgoing:");
    for money in &totals.outgoing {
        println!("  {}", money);
    }
}
