//! search-terminal CLI
//!
//! One-shot searches with `--query`, or an interactive menu when no query is
//! given. Provider, engine and aggressive mode persist between runs.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::*;
use search_terminal::{
    utils::{browser, debug},
    Config, ProviderRegistry, SearchError, SearchOutcome, SearchResult, Session, SessionSearch,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "search-terminal")]
#[command(about = "Search the web from your terminal through privacy-friendly providers")]
#[command(version)]
struct Cli {
    /// Search query; starts the interactive menu when omitted
    #[arg(short, long)]
    query: Option<String>,

    /// Search provider (see --list)
    #[arg(short, long)]
    provider: Option<String>,

    /// Engine to use with the provider
    #[arg(short, long)]
    engine: Option<String>,

    /// Open the first result in the browser
    #[arg(short, long)]
    open: bool,

    /// List providers and their engines
    #[arg(short, long)]
    list: bool,

    /// Retry and fail over across providers until one returns results
    #[arg(short, long)]
    aggressive: bool,

    /// Country code hint (e.g. US, DE)
    #[arg(long)]
    country: Option<String>,

    /// Language code hint (e.g. en, de)
    #[arg(long)]
    language: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, default_value_t = 15000)]
    timeout: u64,

    /// Attempts per provider in aggressive mode
    #[arg(long, default_value_t = 3)]
    retries: u32,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Table,
    Json,
    Simple,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let registry = ProviderRegistry::with_defaults();

    if cli.list {
        list_providers(&registry);
        return Ok(());
    }

    let mut config = Config::load();
    if let Some(provider) = &cli.provider {
        if !registry.contains(provider) {
            return Err(SearchError::ProviderNotFound {
                name: provider.clone(),
                available: registry.list_provider_ids(),
            }
            .into());
        }
        config.provider = provider.clone();
    }
    if let Some(engine) = &cli.engine {
        config.engine = engine.clone();
    }
    config.aggressive_mode |= cli.aggressive;

    let mut session = Session::from_config(registry, &config)?;
    if let Some(requested) = session.engine_fallback() {
        println!(
            "{}",
            format!(
                "Engine '{requested}' is not available for {}. Using default: {}",
                session.provider_id(),
                session.engine()
            )
            .yellow()
        );
    }

    session.country = cli.country.clone();
    session.language = cli.language.clone();
    session.timeout_ms = cli.timeout;
    session.policy.max_retries_per_provider = cli.retries;
    if cli.debug {
        session.debug = Some(debug::debug_all());
    }

    match &cli.query {
        Some(query) => {
            let found = run_search(&session, query).await?;
            display_search(&found, cli.format);

            if cli.open {
                open_first(found.results())?;
            }
            Ok(())
        }
        None => interactive(session, cli.format).await,
    }
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn list_providers(registry: &ProviderRegistry) {
    println!("{}", "Available Search Providers:".bold().blue());
    println!();

    for provider in registry.load_all() {
        let engines = provider.supported_engines().join(", ");
        println!(
            "{} - engines: {} (default: {})",
            provider.name().bold(),
            engines.italic(),
            provider.default_engine().green()
        );
    }
}

/// Run one search, cancelling it if the user hits Ctrl-C
async fn run_search(session: &Session, query: &str) -> Result<SessionSearch> {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    if session.is_aggressive() {
        eprintln!(
            "{}",
            "Aggressive search mode: will try multiple providers if needed".yellow()
        );
    } else {
        eprintln!(
            "{}",
            format!(
                "Searching for '{query}' via {} ({})...",
                session.provider_id(),
                session.engine()
            )
            .yellow()
        );
    }

    let found = session.search(query, &cancel).await;
    watcher.abort();

    found.context("Search failed")
}

fn open_first(results: &[SearchResult]) -> Result<()> {
    match results.first() {
        Some(first) => {
            println!("{} {}", "Opening".bold(), first.link.blue().underline());
            browser::open_link(&first.link).context("Could not open link")?;
        }
        None => println!("{}", "No result to open.".yellow()),
    }
    Ok(())
}

fn display_search(found: &SessionSearch, format: OutputFormat) {
    match found {
        SessionSearch::Aggressive(SearchOutcome::Exhausted { attempted }) => {
            println!("{}", "Failed to get results from any provider.".red());
            for failure in attempted {
                let reason = failure
                    .last_error
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "no results".to_string());
                println!(
                    "  {} ({}) after {} attempt(s): {}",
                    failure.provider.bold(),
                    failure.engine,
                    failure.attempts,
                    reason.dimmed()
                );
            }
        }
        SessionSearch::Aggressive(SearchOutcome::Success {
            results,
            provider,
            engine,
            attempts,
        }) => {
            if matches!(format, OutputFormat::Table) {
                println!(
                    "{}",
                    format!("Successfully searched with: {provider} ({engine}), attempt {attempts}")
                        .green()
                );
            }
            display_results(results, format, Some(provider.as_str()));
        }
        SessionSearch::Direct {
            results, provider, ..
        } => display_results(results, format, Some(provider.as_str())),
    }
}

fn display_results(results: &[SearchResult], format: OutputFormat, provider: Option<&str>) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(results) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("{} {e}", "Could not serialize results:".red()),
        },
        OutputFormat::Simple => {
            for (i, result) in results.iter().enumerate() {
                println!("{}. {}", i + 1, result.title);
                println!("   {}", result.link);
                if !result.snippet.is_empty() {
                    println!("   {}", result.snippet);
                }
                println!();
            }
        }
        OutputFormat::Table => {
            if results.is_empty() {
                println!("{}", "No results found.".yellow());
                return;
            }

            if let Some(provider) = provider {
                println!("{} {}", "Search Results from".bold(), provider.bold().blue());
            } else {
                println!("{}", "Search Results".bold().blue());
            }
            println!("{}", "─".repeat(80).dimmed());

            for (i, result) in results.iter().enumerate() {
                println!("{}. {}", (i + 1).to_string().bold(), result.title.bold());
                if !result.link.is_empty() {
                    println!("   {}", result.link.blue().underline());
                }
                if !result.snippet.is_empty() {
                    println!("   {}", truncate(&result.snippet, 200).italic());
                }
                println!();
            }

            println!(
                "{} {}",
                "Total results:".bold(),
                results.len().to_string().bold()
            );
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

type Input = Lines<BufReader<Stdin>>;

/// Print `message` and read one trimmed line; `None` on end of input
async fn prompt(input: &mut Input, message: &str) -> Result<Option<String>> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(message.bold().to_string().as_bytes()).await?;
    stdout.flush().await?;

    tokio::select! {
        line = input.next_line() => Ok(line?.map(|line| line.trim().to_string())),
        _ = tokio::signal::ctrl_c() => {
            println!("\n{}", "Exiting...".blue());
            Ok(None)
        }
    }
}

/// Pick one of `items` by its 1-based number
async fn choose<'a>(
    input: &mut Input,
    title: &str,
    items: &'a [String],
) -> Result<Option<&'a String>> {
    println!("\n{}", title.bold());
    for (i, item) in items.iter().enumerate() {
        println!("  {}. {}", i + 1, item);
    }

    let Some(answer) = prompt(input, &format!("Select (1-{}): ", items.len())).await? else {
        return Ok(None);
    };

    match answer.parse::<usize>() {
        Ok(n) if (1..=items.len()).contains(&n) => Ok(Some(&items[n - 1])),
        Ok(_) => {
            println!("{}", "Invalid choice.".red());
            Ok(None)
        }
        Err(_) => {
            println!("{}", "Invalid input.".red());
            Ok(None)
        }
    }
}

fn persist(session: &Session) {
    if let Err(e) = session.to_config().save() {
        println!("{}", format!("Warning: Could not save config: {e}").yellow());
    }
}

fn print_status(session: &Session) {
    let mode = if session.is_aggressive() { "ON" } else { "OFF" };
    println!();
    println!(
        "{} {}",
        "Current provider:".blue(),
        session.provider_id().to_uppercase().bold()
    );
    println!(
        "{} {}",
        "Current search engine:".blue(),
        session.engine().to_uppercase().bold()
    );
    println!("{} {}", "Aggressive search:".blue(), mode.bold());
}

async fn interactive(mut session: Session, format: OutputFormat) -> Result<()> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", "Search Terminal".bold().magenta());

    loop {
        print_status(&session);
        println!();
        println!("  1. Change provider");
        println!("  2. Change search engine");
        println!("  3. Toggle aggressive search");
        println!("  4. Perform a search");
        println!("  5. Exit");

        let Some(choice) = prompt(&mut input, "Select an option (1-5): ").await? else {
            break;
        };

        match choice.as_str() {
            "1" => {
                let providers = session.registry().list_provider_ids();
                if let Some(id) = choose(&mut input, "Available providers", &providers).await? {
                    match session.set_provider(id) {
                        Ok(()) => {
                            println!(
                                "{} {}",
                                "Provider changed to:".blue(),
                                id.to_uppercase().bold()
                            );
                            println!(
                                "{} {}",
                                "Default engine set to:".blue(),
                                session.engine().to_uppercase().bold()
                            );
                            persist(&session);
                        }
                        Err(e) => println!("{}", format!("Failed to load provider: {e}").red()),
                    }
                }
            }
            "2" => {
                let engines: Vec<String> = session
                    .provider()
                    .supported_engines()
                    .iter()
                    .map(|e| e.to_string())
                    .collect();
                if let Some(engine) = choose(&mut input, "Available engines", &engines).await? {
                    match session.set_engine(engine) {
                        Ok(()) => {
                            println!(
                                "{} {}",
                                "Engine changed to:".blue(),
                                engine.to_uppercase().bold()
                            );
                            persist(&session);
                        }
                        Err(e) => println!("{}", e.to_string().red()),
                    }
                }
            }
            "3" => {
                let mode = if session.toggle_aggressive() { "ON" } else { "OFF" };
                println!("{} {}", "Aggressive search mode:".blue(), mode.bold());
                persist(&session);
            }
            "4" => {
                let Some(query) = prompt(&mut input, "Enter search query: ").await? else {
                    break;
                };
                if query.is_empty() {
                    continue;
                }

                match run_search(&session, &query).await {
                    Ok(found) => display_search(&found, format),
                    Err(e) => println!("{}", format!("Error performing search: {e:#}").red()),
                }
            }
            "5" => {
                println!("{}", "Goodbye!".blue());
                break;
            }
            _ => println!("{}", "Invalid option, please try again.".red()),
        }
    }

    Ok(())
}
